//! Platform services for GitHub and GitLab
//!
//! Provides a unified interface for the review-request operations the
//! promotion workflow needs.

mod detection;
mod factory;
mod github;
mod gitlab;

pub use detection::{detect_platform, parse_repo_info, repo_owner};
pub use factory::{create_platform_service, LazyPlatformService};
pub use github::GitHubService;
pub use gitlab::GitLabService;

use crate::error::Result;
use crate::types::{NewPullRequest, PlatformConfig, PullRequest};
use async_trait::async_trait;

/// Platform service trait for PR/MR operations
///
/// This trait abstracts GitHub and GitLab operations, allowing the same
/// tracking logic to work with either platform.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Login of the authenticated user
    async fn current_user(&self) -> Result<String>;

    /// Open requests whose base is `base_branch`
    async fn list_open_requests(&self, base_branch: &str) -> Result<Vec<PullRequest>>;

    /// Fetch a request by number
    async fn get_request(&self, number: u64) -> Result<PullRequest>;

    /// Open a request, then request reviewers and apply labels
    async fn create_request(&self, request: &NewPullRequest) -> Result<PullRequest>;

    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;
}
