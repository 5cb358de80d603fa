//! Session controller for an AI-narrated choose-your-path adventure.
//!
//! This crate provides:
//! - The [`Controller`] state machine that drives one playthrough
//! - The [`Session`] aggregate of chapters, choices and summaries
//! - The [`StoryService`] seam, implemented for the HTTP [`StoryClient`]
//! - A line-oriented headless front-end and a scripted mock service
//!
//! # Quick Start
//!
//! ```ignore
//! use adventure_core::{Controller, ControllerConfig, StoryClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = StoryClient::from_env()?;
//!     let mut controller = Controller::new(client, ControllerConfig::new());
//!
//!     controller.configure(5)?;
//!     controller.start_session().await?;
//!     println!("{}", controller.current_story().unwrap_or_default());
//!
//!     controller.submit_choice(1).await?;
//!     Ok(())
//! }
//! ```

pub mod alignment;
pub mod config;
pub mod controller;
pub mod headless;
pub mod service;
pub mod session;
pub mod testing;

pub use story_client::StoryClient;

// Primary public API
pub use alignment::MoralAlignment;
pub use config::{ChapterLimit, ConfigError, ControllerConfig, LengthTier, RestartMode};
pub use controller::{
    Advance, Controller, ControllerError, ControllerState, LoadPhase, PendingChoice,
    PendingStart,
};
pub use service::{ConclusionRequest, Continuation, Opening, ServiceError, StoryService};
pub use session::{Chapter, JourneyEntry, Progress, Session};
pub use testing::{MockCalls, MockFailure, MockStoryService};
