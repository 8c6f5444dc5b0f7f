//! Progress callback trait for interface-agnostic updates

use super::state::Phase;
use crate::types::PullRequest;
use async_trait::async_trait;

/// Progress callback trait
///
/// Implement this trait to follow a promotion run. The CLI prints styled
/// output; tests use [`NoopProgress`].
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called when entering a new phase
    async fn on_phase(&self, phase: Phase);

    /// Called after a merge with the remote merged and its conflict count
    async fn on_merge(&self, remote: &str, conflicts: usize);

    /// Called once the review request is known
    async fn on_request(&self, request: &PullRequest, created: bool);

    /// Called for conditions that degrade the run without failing it
    async fn on_warning(&self, message: &str);

    /// Called with a general status message
    async fn on_message(&self, message: &str);
}

/// No-op progress callback for testing or when progress isn't needed
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_phase(&self, _phase: Phase) {}
    async fn on_merge(&self, _remote: &str, _conflicts: usize) {}
    async fn on_request(&self, _request: &PullRequest, _created: bool) {}
    async fn on_warning(&self, _message: &str) {}
    async fn on_message(&self, _message: &str) {}
}
