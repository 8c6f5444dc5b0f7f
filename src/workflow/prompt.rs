//! Interactive choices the workflow delegates to its caller

use crate::error::Result;

/// Answers the workflow's questions
///
/// The orchestrator only sees the resolved values. Implementations may
/// prompt, read flags, or return canned answers.
pub trait Prompter: Send + Sync {
    /// Pick the target among the configured branches
    fn select_target(&self, targets: &[String]) -> Result<String>;

    /// Pick the source among local branches; `current` is the default
    fn select_source(&self, branches: &[String], current: &str) -> Result<String>;

    /// Confirm promoting the changes summarized by `preview`
    fn confirm_changes(&self, source: &str, target: &str, preview: &str) -> Result<bool>;
}
