//! Promotion workflow
//!
//! [`Orchestrator::run`] drives one promotion from inspection to the review
//! request, and always returns to the branch it started on.

mod orchestrator;
mod progress;
mod prompt;
mod state;

pub use orchestrator::{Orchestrator, PromotionReport, WorkflowOutcome};
pub use progress::{NoopProgress, ProgressCallback};
pub use prompt::Prompter;
pub use state::{Phase, WorkflowState};
