//! Testing utilities for the adventure controller.
//!
//! [`MockStoryService`] stands in for the remote Story Service: it returns
//! scripted openings and continuations in order, can fail any call and can
//! delay individual summaries so they finish out of order. Every call is
//! recorded in [`MockCalls`] for later assertions.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::service::{ConclusionRequest, Continuation, Opening, ServiceError, StoryService};

/// A canned failure, converted to the matching [`ServiceError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFailure {
    /// Non-success HTTP status.
    Status(u16),
    /// Connection-level failure.
    Network,
    /// `{"error": ...}` body from the service.
    Rejected(String),
    /// Success status but no `story` in the body.
    MissingStory,
}

impl MockFailure {
    fn to_error(&self) -> ServiceError {
        match self {
            MockFailure::Status(status) => ServiceError::Api {
                status: *status,
                message: String::new(),
            },
            MockFailure::Network => ServiceError::Network("connection refused".to_string()),
            MockFailure::Rejected(message) => ServiceError::Rejected(message.clone()),
            MockFailure::MissingStory => ServiceError::MissingField("story"),
        }
    }
}

/// Everything the controller asked of the service.
#[derive(Debug, Clone, Default)]
pub struct MockCalls {
    pub starts: usize,
    /// `(session_id, choice)` per `/choice` call.
    pub choices: Vec<(String, usize)>,
    /// `(story, choice)` per `/summarize` call.
    pub summaries: Vec<(String, String)>,
    pub conclusions: Vec<ConclusionRequest>,
    /// Session ids released through `/end`.
    pub ends: Vec<String>,
}

/// Scripted [`StoryService`].
///
/// Summaries default to `"<story> / <choice>"` and the conclusion to
/// `"The end."`. An empty opening or continuation queue answers with a
/// network error, so tests must script every chapter they expect.
pub struct MockStoryService {
    openings: Mutex<VecDeque<Result<Opening, MockFailure>>>,
    continuations: Mutex<VecDeque<Result<Continuation, MockFailure>>>,
    /// Per-story delay before the summary returns.
    summary_delays: HashMap<String, Duration>,
    /// Stories whose summary fails.
    summary_failures: Vec<String>,
    fail_all_summaries: bool,
    conclusion: Result<String, MockFailure>,
    calls: Mutex<MockCalls>,
}

impl Default for MockStoryService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStoryService {
    pub fn new() -> Self {
        Self {
            openings: Mutex::new(VecDeque::new()),
            continuations: Mutex::new(VecDeque::new()),
            summary_delays: HashMap::new(),
            summary_failures: Vec::new(),
            fail_all_summaries: false,
            conclusion: Ok("The end.".to_string()),
            calls: Mutex::new(MockCalls::default()),
        }
    }

    /// Queue an opening chapter.
    pub fn with_opening(self, story: &str, choices: &[&str], session_id: Option<&str>) -> Self {
        self.push_opening(Ok(Opening {
            story: story.to_string(),
            choices: labels(choices),
            session_id: session_id.map(str::to_string),
        }))
    }

    /// Queue a failed `/start`.
    pub fn fail_start(self, failure: MockFailure) -> Self {
        self.push_opening(Err(failure))
    }

    /// Queue a continuation without an alignment label.
    pub fn with_continuation(self, story: &str, choices: &[&str]) -> Self {
        self.push_continuation(Ok(Continuation {
            story: story.to_string(),
            choices: labels(choices),
            moral_alignment: None,
        }))
    }

    /// Queue a continuation that reports an alignment.
    pub fn with_aligned_continuation(self, story: &str, choices: &[&str], alignment: &str) -> Self {
        self.push_continuation(Ok(Continuation {
            story: story.to_string(),
            choices: labels(choices),
            moral_alignment: Some(alignment.to_string()),
        }))
    }

    /// Queue a failed `/choice`.
    pub fn fail_choice(self, failure: MockFailure) -> Self {
        self.push_continuation(Err(failure))
    }

    /// Hold the summary of `story` for `delay` before answering.
    pub fn delay_summary(mut self, story: &str, delay: Duration) -> Self {
        self.summary_delays.insert(story.to_string(), delay);
        self
    }

    /// Fail the summary of `story`.
    pub fn fail_summary(mut self, story: &str) -> Self {
        self.summary_failures.push(story.to_string());
        self
    }

    /// Fail every summary.
    pub fn fail_summaries(mut self) -> Self {
        self.fail_all_summaries = true;
        self
    }

    pub fn with_conclusion(mut self, text: &str) -> Self {
        self.conclusion = Ok(text.to_string());
        self
    }

    pub fn fail_conclusion(mut self, failure: MockFailure) -> Self {
        self.conclusion = Err(failure);
        self
    }

    /// Snapshot of the calls made so far.
    pub fn calls(&self) -> MockCalls {
        lock(&self.calls).clone()
    }

    /// Summary text produced for a successful `/summarize`.
    pub fn summary_for(story: &str, choice: &str) -> String {
        format!("{story} / {choice}")
    }

    fn push_opening(self, opening: Result<Opening, MockFailure>) -> Self {
        lock(&self.openings).push_back(opening);
        self
    }

    fn push_continuation(self, next: Result<Continuation, MockFailure>) -> Self {
        lock(&self.continuations).push_back(next);
        self
    }
}

#[async_trait]
impl StoryService for MockStoryService {
    async fn start(&self) -> Result<Opening, ServiceError> {
        lock(&self.calls).starts += 1;
        match lock(&self.openings).pop_front() {
            Some(Ok(opening)) => Ok(opening),
            Some(Err(failure)) => Err(failure.to_error()),
            None => Err(ServiceError::Network("no scripted opening".to_string())),
        }
    }

    async fn choice(&self, session_id: &str, choice: usize) -> Result<Continuation, ServiceError> {
        lock(&self.calls)
            .choices
            .push((session_id.to_string(), choice));
        match lock(&self.continuations).pop_front() {
            Some(Ok(next)) => Ok(next),
            Some(Err(failure)) => Err(failure.to_error()),
            None => Err(ServiceError::Network("no scripted continuation".to_string())),
        }
    }

    async fn summarize(&self, story: &str, choice: &str) -> Result<String, ServiceError> {
        lock(&self.calls)
            .summaries
            .push((story.to_string(), choice.to_string()));

        if let Some(delay) = self.summary_delays.get(story) {
            tokio::time::sleep(*delay).await;
        }

        if self.fail_all_summaries || self.summary_failures.iter().any(|s| s == story) {
            return Err(MockFailure::Status(500).to_error());
        }
        Ok(Self::summary_for(story, choice))
    }

    async fn conclude(&self, request: &ConclusionRequest) -> Result<String, ServiceError> {
        lock(&self.calls).conclusions.push(request.clone());
        self.conclusion.clone().map_err(|failure| failure.to_error())
    }

    async fn end_session(&self, session_id: &str) -> Result<(), ServiceError> {
        lock(&self.calls).ends.push(session_id.to_string());
        Ok(())
    }
}

fn labels(choices: &[&str]) -> Vec<String> {
    choices.iter().map(|c| c.to_string()).collect()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_responses_in_order() {
        let mock = MockStoryService::new()
            .with_opening("A", &["L"], Some("S1"))
            .with_continuation("B", &["X"])
            .fail_choice(MockFailure::Status(502));

        assert_eq!(mock.start().await.unwrap().story, "A");
        assert_eq!(mock.choice("S1", 1).await.unwrap().story, "B");
        assert!(matches!(
            mock.choice("S1", 1).await,
            Err(ServiceError::Api { status: 502, .. })
        ));
        assert!(matches!(mock.start().await, Err(ServiceError::Network(_))));

        let calls = mock.calls();
        assert_eq!(calls.starts, 2);
        assert_eq!(calls.choices, vec![("S1".to_string(), 1), ("S1".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_summary_failures() {
        let mock = MockStoryService::new().fail_summary("B");
        assert_eq!(mock.summarize("A", "L").await.unwrap(), "A / L");
        assert!(mock.summarize("B", "L").await.is_err());
    }
}
