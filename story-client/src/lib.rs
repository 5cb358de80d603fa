//! Minimal client for the choice-adventure Story Service.
//!
//! This crate provides a focused client for the service's JSON endpoints:
//! - `GET /start` to open a new story
//! - `POST /choice` to advance it
//! - `POST /summarize` and `POST /conclude` for chapter summaries and endings
//! - `POST /end` to release a server-side session

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5001";

/// Environment variable read by [`StoryClient::from_env`].
pub const BASE_URL_ENV: &str = "STORY_SERVICE_URL";

/// Errors that can occur when talking to the Story Service.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Network(String),

    /// Non-success HTTP status. `message` carries the raw body for logging.
    #[error("HTTP error! Status: {status}")]
    Api { status: u16, message: String },

    /// The service answered with an `{"error": ...}` body.
    #[error("{0}")]
    Rejected(String),

    #[error("Response is missing the `{0}` field")]
    MissingField(&'static str),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Story Service client.
#[derive(Clone)]
pub struct StoryClient {
    client: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for StoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl StoryClient {
    /// Create a client for the service rooted at `base_url`.
    ///
    /// Only connection establishment is bounded; a request that reaches the
    /// service is allowed to run until it answers.
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::Config("service URL is empty".to_string()));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "service URL must start with http:// or https://: {base_url}"
            )));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// Create a client from the `STORY_SERVICE_URL` environment variable,
    /// falling back to [`DEFAULT_BASE_URL`].
    pub fn from_env() -> Result<Self, Error> {
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    /// The service root this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Open a new story.
    pub async fn start(&self) -> Result<Opening, Error> {
        let response: ApiStoryResponse = self.send(self.client.get(self.url("/start"))).await?;
        response.into_opening()
    }

    /// Submit a 1-based choice for the given session.
    pub async fn choice(&self, session_id: &str, choice: usize) -> Result<Continuation, Error> {
        let body = ApiChoiceRequest { choice, session_id };
        let response: ApiStoryResponse = self
            .send(self.client.post(self.url("/choice")).json(&body))
            .await?;
        response.into_continuation()
    }

    /// Summarize a completed chapter together with the choice made after it.
    pub async fn summarize(&self, story: &str, choice: &str) -> Result<String, Error> {
        let body = ApiSummarizeRequest { story, choice };
        let response: ApiSummaryResponse = self
            .send(self.client.post(self.url("/summarize")).json(&body))
            .await?;
        non_empty(response.summary, response.error, "summary")
    }

    /// Generate the story's ending.
    pub async fn conclude(&self, request: &ConclusionRequest) -> Result<String, Error> {
        let response: ApiConclusionResponse = self
            .send(self.client.post(self.url("/conclude")).json(request))
            .await?;
        non_empty(response.conclusion, response.error, "conclusion")
    }

    /// Release the server-side state of a session.
    pub async fn end_session(&self, session_id: &str) -> Result<String, Error> {
        let body = ApiEndRequest { session_id };
        let response: ApiEndResponse = self
            .send(self.client.post(self.url("/end")).json(&body))
            .await?;
        match response.error {
            Some(error) => Err(Error::Rejected(error)),
            None => Ok(response.message.unwrap_or_default()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, Error> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        let url = response.url().path().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        tracing::debug!(path = %url, status = status.as_u16(), "story service responded");

        if !status.is_success() {
            if let Some(message) = rejection_message(&body) {
                return Err(Error::Rejected(message));
            }
            return Err(Error::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Parse(e.to_string()))
    }
}

// ============================================================================
// Public types
// ============================================================================

/// The first chapter of a new story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opening {
    pub story: String,
    pub choices: Vec<String>,
    pub session_id: Option<String>,
}

/// The chapter that follows a submitted choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Continuation {
    pub story: String,
    pub choices: Vec<String>,
    /// Alignment label as reported by the service, if any.
    pub moral_alignment: Option<String>,
}

/// Request body for `POST /conclude`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConclusionRequest {
    pub chapters: Vec<String>,
    pub choices: Vec<String>,
    pub moral_alignment: String,
}

// ============================================================================
// Internal API types
// ============================================================================

#[derive(Debug, Serialize)]
struct ApiChoiceRequest<'a> {
    choice: usize,
    session_id: &'a str,
}

#[derive(Debug, Serialize)]
struct ApiSummarizeRequest<'a> {
    story: &'a str,
    choice: &'a str,
}

#[derive(Debug, Serialize)]
struct ApiEndRequest<'a> {
    session_id: &'a str,
}

/// Shared shape of `/start` and `/choice` responses.
#[derive(Debug, Default, Deserialize)]
struct ApiStoryResponse {
    #[serde(default)]
    story: Option<String>,
    #[serde(default)]
    choices: Option<Vec<String>>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    moral_alignment: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ApiStoryResponse {
    /// A successful `/start` without a story is malformed whatever its
    /// `error` field says.
    fn into_opening(self) -> Result<Opening, Error> {
        let story = self.take_story().map_err(|err| match err {
            Error::Rejected(message) => {
                tracing::debug!(%message, "start answered with an error instead of a story");
                Error::MissingField("story")
            }
            other => other,
        })?;
        Ok(Opening {
            story: story.0,
            choices: story.1,
            session_id: story.2.filter(|id| !id.is_empty()),
        })
    }

    fn into_continuation(self) -> Result<Continuation, Error> {
        let moral_alignment = self
            .moral_alignment
            .clone()
            .filter(|label| !label.trim().is_empty());
        let (story, choices, _) = self.take_story()?;
        Ok(Continuation {
            story,
            choices,
            moral_alignment,
        })
    }

    fn take_story(self) -> Result<(String, Vec<String>, Option<String>), Error> {
        match self.story {
            Some(story) if !story.is_empty() => {
                Ok((story, self.choices.unwrap_or_default(), self.session_id))
            }
            _ => match self.error {
                Some(error) => Err(Error::Rejected(error)),
                None => Err(Error::MissingField("story")),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiSummaryResponse {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiConclusionResponse {
    #[serde(default)]
    conclusion: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiEndResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

fn non_empty(
    value: Option<String>,
    error: Option<String>,
    field: &'static str,
) -> Result<String, Error> {
    match (value, error) {
        (Some(value), _) if !value.is_empty() => Ok(value),
        (_, Some(error)) => Err(Error::Rejected(error)),
        _ => Err(Error::MissingField(field)),
    }
}

/// Extract the message from an `{"error": "..."}` body, if that is what it is.
fn rejection_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .map(|b| b.error)
}
