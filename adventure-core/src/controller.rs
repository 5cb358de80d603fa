//! Adventure Session Controller - the state machine driving a playthrough.
//!
//! The controller owns the [`Session`] and is the only thing that mutates
//! it. Each transition takes `&mut self`, so two transitions can never
//! overlap; the [`ControllerState::Loading`] state additionally rejects any
//! transition started while a request is outstanding (for callers that use
//! the split `begin_*`/`complete_*` form to redraw between the two halves).
//!
//! Chapter summaries are the one piece of work that runs in the background:
//! they are spawned after a choice succeeds and written back by chapter
//! index whenever they arrive. Run [`Controller::apply_pending_summaries`]
//! to collect them.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::alignment::MoralAlignment;
use crate::config::{ChapterLimit, ConfigError, ControllerConfig, RestartMode};
use crate::service::{ConclusionRequest, Continuation, Opening, ServiceError, StoryService};
use crate::session::{fallback_summary, Chapter, JourneyEntry, Progress, Session};

/// Status shown while a choice is being processed.
pub const GENERATING_MESSAGE: &str = "Generating the next part of the story...";

/// Status shown when a choice is attempted without a session id.
pub const MISSING_SESSION_MESSAGE: &str = "Session ID is missing. Please restart the game.";

/// Status shown when `/start` answers without a story.
pub const START_MALFORMED_MESSAGE: &str = "Failed to generate the initial story.";

/// Status shown when `/choice` answers without a story.
pub const CHOICE_MALFORMED_MESSAGE: &str = "Failed to generate the next part of the story.";

/// Ending used when the service cannot write one.
pub const FALLBACK_CONCLUSION: &str = "Your journey has reached its end. The choices you made have shaped your destiny, and now you stand at the threshold of a new beginning.";

/// Errors from driving the controller.
///
/// Failures of the Story Service are not errors here: they are reported
/// through the status message and an [`Advance::Failed`] outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("a request is already in flight")]
    Busy,

    #[error("cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: ControllerState,
    },

    #[error("session id is missing")]
    MissingSession,

    #[error("choice {index} is not on offer ({available} available)")]
    NoSuchChoice { index: usize, available: usize },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Which request a loading state is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Waiting for the opening chapter.
    Initial,
    /// Waiting for the chapter after a choice.
    Next,
}

/// States of a playthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Configuring,
    Loading(LoadPhase),
    Playing,
    Concluding,
    Ended,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControllerState::Configuring => "configuring",
            ControllerState::Loading(LoadPhase::Initial) => "loading the opening",
            ControllerState::Loading(LoadPhase::Next) => "loading the next chapter",
            ControllerState::Playing => "playing",
            ControllerState::Concluding => "concluding",
            ControllerState::Ended => "ended",
        };
        f.write_str(name)
    }
}

/// Where a transition left the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Back on the setup screen (after Restart, or a failed start).
    Configuring,
    /// A chapter is on screen awaiting a choice.
    Playing,
    /// The chapter limit was reached; [`Controller::conclude`] is next.
    Concluding,
    /// The ending is available.
    Ended,
    /// The service call failed; the status message says why.
    Failed,
    /// The result belonged to a session that has since been restarted.
    Discarded,
}

/// A start that is waiting on the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingStart {
    epoch: u64,
}

/// A choice that has been accepted and is waiting on the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingChoice {
    /// 1-based index as sent to the service.
    pub index: usize,
    pub label: String,
    /// 0-based index of the chapter the choice completes.
    pub chapter: usize,
    session_id: String,
    epoch: u64,
}

/// A summary that finished in the background.
#[derive(Debug)]
struct SummaryUpdate {
    epoch: u64,
    chapter: usize,
    summary: String,
}

/// Drives one playthrough at a time against a [`StoryService`].
pub struct Controller<S> {
    service: Arc<S>,
    config: ControllerConfig,
    chapter_limit: ChapterLimit,
    state: ControllerState,
    session: Session,
    status: Option<String>,
    /// Incremented by every reset so stale background work can be ignored.
    epoch: u64,
    summary_tx: mpsc::UnboundedSender<SummaryUpdate>,
    summary_rx: mpsc::UnboundedReceiver<SummaryUpdate>,
    summary_tasks: Vec<JoinHandle<()>>,
}

impl<S: StoryService + 'static> Controller<S> {
    /// Create a controller in the `Configuring` state.
    pub fn new(service: S, config: ControllerConfig) -> Self {
        Self::with_shared_service(Arc::new(service), config)
    }

    /// Create a controller around a service the caller also holds.
    pub fn with_shared_service(service: Arc<S>, config: ControllerConfig) -> Self {
        let (summary_tx, summary_rx) = mpsc::unbounded_channel();
        Self {
            service,
            chapter_limit: config.chapter_limit,
            config,
            state: ControllerState::Configuring,
            session: Session::new(),
            status: None,
            epoch: 0,
            summary_tx,
            summary_rx,
            summary_tasks: Vec::new(),
        }
    }

    // =========================================================================
    // Configure
    // =========================================================================

    /// Set the chapter limit. Only allowed before the session starts.
    pub fn configure(&mut self, limit: u32) -> Result<ChapterLimit, ControllerError> {
        let limit = ChapterLimit::new(limit)?;
        self.set_chapter_limit(limit)
    }

    /// Set the chapter limit from free-form custom input.
    pub fn configure_custom(&mut self, input: &str) -> Result<ChapterLimit, ControllerError> {
        let limit = ChapterLimit::parse(input)?;
        self.set_chapter_limit(limit)
    }

    pub fn set_chapter_limit(&mut self, limit: ChapterLimit) -> Result<ChapterLimit, ControllerError> {
        self.expect_state(ControllerState::Configuring, "change the chapter limit")?;
        self.chapter_limit = limit;
        debug!(limit = limit.get(), "chapter limit configured");
        Ok(limit)
    }

    // =========================================================================
    // StartSession
    // =========================================================================

    /// Fetch the opening chapter.
    pub async fn start_session(&mut self) -> Result<Advance, ControllerError> {
        let pending = self.begin_start()?;
        Ok(self.complete_start(pending).await)
    }

    /// Enter `Loading(Initial)`. Pair with [`Controller::complete_start`].
    pub fn begin_start(&mut self) -> Result<PendingStart, ControllerError> {
        if self.is_loading() {
            return Err(ControllerError::Busy);
        }
        self.expect_state(ControllerState::Configuring, "start a session")?;
        self.state = ControllerState::Loading(LoadPhase::Initial);
        info!(limit = self.chapter_limit.get(), "starting session");
        Ok(PendingStart { epoch: self.epoch })
    }

    /// Call `start()` and apply the result.
    pub async fn complete_start(&mut self, pending: PendingStart) -> Advance {
        let result = self.service.start().await;
        self.finish_start(pending, result)
    }

    /// Apply the result of a `start()` call made after [`Controller::begin_start`].
    pub fn finish_start(
        &mut self,
        pending: PendingStart,
        result: Result<Opening, ServiceError>,
    ) -> Advance {
        if pending.epoch != self.epoch
            || self.state != ControllerState::Loading(LoadPhase::Initial)
        {
            debug!("dropping opening for a restarted session");
            return Advance::Discarded;
        }

        match result {
            Ok(opening) => {
                if opening.session_id.is_none() {
                    warn!("opening arrived without a session id");
                }
                self.session = Session::new();
                self.session.set_id(opening.session_id);
                self.session
                    .push_chapter(Chapter::new(opening.story, opening.choices));
                self.status = None;
                self.state = ControllerState::Playing;
                info!(session_id = ?self.session.id(), "session started");
                Advance::Playing
            }
            Err(err) => {
                warn!(error = %err, "failed to start session");
                self.status = Some(start_failure_message(&err));
                self.state = ControllerState::Configuring;
                Advance::Failed
            }
        }
    }

    // =========================================================================
    // SubmitChoice
    // =========================================================================

    /// Take the 1-based choice `index`, concluding the story if this reaches
    /// the chapter limit.
    pub async fn submit_choice(&mut self, index: usize) -> Result<Advance, ControllerError> {
        let pending = self.begin_choice(index)?;
        match self.complete_choice(pending).await {
            Advance::Concluding => self.conclude().await,
            other => Ok(other),
        }
    }

    /// Validate and record a choice, entering `Loading(Next)`.
    ///
    /// Rejected without side effects while another request is in flight.
    pub fn begin_choice(&mut self, index: usize) -> Result<PendingChoice, ControllerError> {
        match self.state {
            ControllerState::Loading(_) | ControllerState::Concluding => {
                debug!(index, "choice ignored while a request is in flight");
                return Err(ControllerError::Busy);
            }
            ControllerState::Playing => {}
            state => {
                return Err(ControllerError::InvalidState {
                    action: "submit a choice",
                    state,
                })
            }
        }

        let Some(session_id) = self.session.id().map(str::to_string) else {
            self.status = Some(MISSING_SESSION_MESSAGE.to_string());
            return Err(ControllerError::MissingSession);
        };

        let chapter = self.session.chapter_count().saturating_sub(1);
        let available = self
            .session
            .current_chapter()
            .map(|c| c.choices.len())
            .unwrap_or(0);
        let label = match index
            .checked_sub(1)
            .and_then(|i| self.session.current_chapter()?.choices.get(i))
        {
            Some(label) => label.clone(),
            None => return Err(ControllerError::NoSuchChoice { index, available }),
        };

        self.session.record_choice(chapter, label.clone());
        self.status = Some(GENERATING_MESSAGE.to_string());
        self.state = ControllerState::Loading(LoadPhase::Next);
        debug!(index, %label, chapter = chapter + 1, "choice submitted");

        Ok(PendingChoice {
            index,
            label,
            chapter,
            session_id,
            epoch: self.epoch,
        })
    }

    /// Call `choice()` for an accepted choice and apply the result.
    pub async fn complete_choice(&mut self, pending: PendingChoice) -> Advance {
        let result = self.service.choice(&pending.session_id, pending.index).await;
        self.finish_choice(pending, result)
    }

    /// Apply the result of a `choice()` call made after [`Controller::begin_choice`].
    pub fn finish_choice(
        &mut self,
        pending: PendingChoice,
        result: Result<Continuation, ServiceError>,
    ) -> Advance {
        if pending.epoch != self.epoch
            || self.state != ControllerState::Loading(LoadPhase::Next)
        {
            debug!(chapter = pending.chapter + 1, "dropping result for a restarted session");
            return Advance::Discarded;
        }

        match result {
            Ok(next) => {
                if let Some(completed) = self.session.chapters().get(pending.chapter) {
                    let story = completed.story.clone();
                    self.spawn_summary(pending.chapter, story, pending.label.clone());
                }

                self.session.push_chapter(Chapter::new(next.story, next.choices));
                if let Some(label) = next.moral_alignment {
                    self.session.set_alignment(MoralAlignment::parse(&label));
                }
                self.status = None;

                let count = self.session.chapter_count();
                info!(
                    chapter = count,
                    limit = self.chapter_limit.get(),
                    alignment = %self.session.alignment(),
                    "chapter received"
                );

                if count >= self.chapter_limit.get() as usize {
                    self.state = ControllerState::Concluding;
                    Advance::Concluding
                } else {
                    self.state = ControllerState::Playing;
                    Advance::Playing
                }
            }
            Err(err) => {
                warn!(error = %err, chapter = pending.chapter + 1, "choice failed");
                self.session.clear_choice(pending.chapter);
                self.status = Some(choice_failure_message(&err));
                self.state = ControllerState::Playing;
                Advance::Failed
            }
        }
    }

    // =========================================================================
    // Conclude
    // =========================================================================

    /// Wait for outstanding summaries, request the ending and end the session.
    ///
    /// Never fails once in `Concluding`: a service error produces
    /// [`FALLBACK_CONCLUSION`].
    pub async fn conclude(&mut self) -> Result<Advance, ControllerError> {
        self.expect_state(ControllerState::Concluding, "conclude the story")?;

        let tasks = std::mem::take(&mut self.summary_tasks);
        for joined in futures::future::join_all(tasks).await {
            if let Err(err) = joined {
                warn!(error = %err, "summary task did not finish");
            }
        }
        self.apply_pending_summaries();

        let request = ConclusionRequest {
            chapters: self.session.conclusion_chapters(),
            choices: self.session.choices_made(),
            moral_alignment: self.session.alignment().label().to_string(),
        };

        let conclusion = match self.service.conclude(&request).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "conclusion failed, using fallback ending");
                FALLBACK_CONCLUSION.to_string()
            }
        };

        self.session.set_conclusion(conclusion);
        self.status = None;
        self.state = ControllerState::Ended;
        info!(chapters = self.session.chapter_count(), "story concluded");
        Ok(Advance::Ended)
    }

    // =========================================================================
    // Restart
    // =========================================================================

    /// Clear the playthrough and, in [`RestartMode::Immediate`], fetch a new
    /// opening straight away.
    pub async fn restart(&mut self) -> Result<Advance, ControllerError> {
        self.reset();
        match self.config.restart_mode {
            RestartMode::Setup => Ok(Advance::Configuring),
            RestartMode::Immediate => self.start_session().await,
        }
    }

    /// Clear every piece of session state and return to `Configuring`.
    ///
    /// Summaries still running for the old session are left to finish and
    /// their results are ignored.
    pub fn reset(&mut self) {
        let previous = self.session.id().map(str::to_string);

        self.epoch += 1;
        self.summary_tasks.clear();
        while self.summary_rx.try_recv().is_ok() {}

        self.session = Session::new();
        self.status = None;
        self.state = ControllerState::Configuring;
        info!("session reset");

        if self.config.release_on_restart {
            if let Some(session_id) = previous {
                self.spawn_release(session_id);
            }
        }
    }

    // =========================================================================
    // Background summaries
    // =========================================================================

    fn spawn_summary(&mut self, chapter: usize, story: String, label: String) {
        let service = Arc::clone(&self.service);
        let tx = self.summary_tx.clone();
        let epoch = self.epoch;

        let handle = tokio::spawn(async move {
            let summary = match service.summarize(&story, &label).await {
                Ok(summary) => summary,
                Err(err) => {
                    warn!(error = %err, chapter = chapter + 1, "summary failed, using fallback");
                    fallback_summary(&label)
                }
            };
            let _ = tx.send(SummaryUpdate {
                epoch,
                chapter,
                summary,
            });
        });
        self.summary_tasks.push(handle);
    }

    fn spawn_release(&self, session_id: String) {
        let service = Arc::clone(&self.service);
        tokio::spawn(async move {
            if let Err(err) = service.end_session(&session_id).await {
                warn!(error = %err, session_id, "failed to release session");
            }
        });
    }

    /// Write every summary that has arrived into its chapter. Returns how
    /// many were applied.
    pub fn apply_pending_summaries(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(update) = self.summary_rx.try_recv() {
            if update.epoch != self.epoch {
                continue;
            }
            if self.session.set_summary(update.chapter, update.summary) {
                debug!(chapter = update.chapter + 1, "summary applied");
                applied += 1;
            }
        }
        self.summary_tasks.retain(|task| !task.is_finished());
        applied
    }

    /// Wait for every outstanding summary and apply the results.
    pub async fn flush_summaries(&mut self) -> usize {
        let tasks = std::mem::take(&mut self.summary_tasks);
        futures::future::join_all(tasks).await;
        self.apply_pending_summaries()
    }

    // =========================================================================
    // View state
    // =========================================================================

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn chapter_limit(&self) -> ChapterLimit {
        self.chapter_limit
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            self.state,
            ControllerState::Loading(_) | ControllerState::Concluding
        )
    }

    /// Whether choice inputs should accept clicks.
    pub fn choices_enabled(&self) -> bool {
        self.state == ControllerState::Playing
    }

    pub fn is_ended(&self) -> bool {
        self.state == ControllerState::Ended
    }

    pub fn current_story(&self) -> Option<&str> {
        self.session.current_chapter().map(|c| c.story.as_str())
    }

    pub fn current_choices(&self) -> &[String] {
        self.session
            .current_chapter()
            .map(|c| c.choices.as_slice())
            .unwrap_or(&[])
    }

    pub fn conclusion(&self) -> Option<&str> {
        self.session.conclusion()
    }

    pub fn alignment(&self) -> &MoralAlignment {
        self.session.alignment()
    }

    pub fn progress(&self) -> Progress {
        Progress {
            current: self.session.chapter_count(),
            limit: self.chapter_limit.get() as usize,
        }
    }

    pub fn journey(&self) -> Vec<JourneyEntry> {
        self.session.journey()
    }

    /// Number of summaries still running in the background.
    pub fn pending_summary_count(&self) -> usize {
        self.summary_tasks
            .iter()
            .filter(|task| !task.is_finished())
            .count()
    }

    fn expect_state(
        &self,
        expected: ControllerState,
        action: &'static str,
    ) -> Result<(), ControllerError> {
        if self.state == expected {
            Ok(())
        } else if self.is_loading() {
            Err(ControllerError::Busy)
        } else {
            Err(ControllerError::InvalidState {
                action,
                state: self.state,
            })
        }
    }
}

fn start_failure_message(err: &ServiceError) -> String {
    match err {
        ServiceError::MissingField(_) => START_MALFORMED_MESSAGE.to_string(),
        other => format!("Failed to fetch the initial story: {other}"),
    }
}

fn choice_failure_message(err: &ServiceError) -> String {
    match err {
        ServiceError::Rejected(message) => format!("Error: {message}"),
        ServiceError::MissingField(_) => CHOICE_MALFORMED_MESSAGE.to_string(),
        other => format!("Error processing your choice: {other}"),
    }
}
