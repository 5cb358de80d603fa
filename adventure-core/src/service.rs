//! The Story Service seam.
//!
//! The controller talks to the remote service only through [`StoryService`],
//! so tests can swap in [`MockStoryService`](crate::testing::MockStoryService).

use async_trait::async_trait;
use story_client::StoryClient;

pub use story_client::{ConclusionRequest, Continuation, Opening};

/// Error type shared by every service implementation.
pub type ServiceError = story_client::Error;

/// Remote operations the controller depends on.
#[async_trait]
pub trait StoryService: Send + Sync {
    /// Open a new story.
    async fn start(&self) -> Result<Opening, ServiceError>;

    /// Advance the story with a 1-based choice.
    async fn choice(&self, session_id: &str, choice: usize) -> Result<Continuation, ServiceError>;

    /// Summarize a finished chapter and the choice made after it.
    async fn summarize(&self, story: &str, choice: &str) -> Result<String, ServiceError>;

    /// Write the ending.
    async fn conclude(&self, request: &ConclusionRequest) -> Result<String, ServiceError>;

    /// Release server-side state for a session.
    async fn end_session(&self, session_id: &str) -> Result<(), ServiceError>;
}

#[async_trait]
impl StoryService for StoryClient {
    async fn start(&self) -> Result<Opening, ServiceError> {
        tracing::debug!(service = self.base_url(), "GET /start");
        StoryClient::start(self).await
    }

    async fn choice(&self, session_id: &str, choice: usize) -> Result<Continuation, ServiceError> {
        tracing::debug!(service = self.base_url(), session_id, choice, "POST /choice");
        StoryClient::choice(self, session_id, choice).await
    }

    async fn summarize(&self, story: &str, choice: &str) -> Result<String, ServiceError> {
        tracing::debug!(service = self.base_url(), choice, "POST /summarize");
        StoryClient::summarize(self, story, choice).await
    }

    async fn conclude(&self, request: &ConclusionRequest) -> Result<String, ServiceError> {
        tracing::debug!(
            service = self.base_url(),
            chapters = request.chapters.len(),
            "POST /conclude"
        );
        StoryClient::conclude(self, request).await
    }

    async fn end_session(&self, session_id: &str) -> Result<(), ServiceError> {
        tracing::debug!(service = self.base_url(), session_id, "POST /end");
        StoryClient::end_session(self, session_id).await.map(|_| ())
    }
}
