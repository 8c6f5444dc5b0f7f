//! Error types for git-promote
//!
//! Every failure the operator can act on carries a stable [`ErrorKind`].
//! Variants without a kind are internal faults.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Stable, machine-readable error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Working tree has uncommitted changes
    DirtyWorktree,
    /// A required git remote is not configured
    RemoteMissing,
    /// A branch is not in the local branch list
    NotLocalBranchFound,
    /// Target branch has no whitelist policy
    NotWhitelistConfigFoundForBranch,
    /// No configuration file could be located
    ConfigNotFound,
    /// Configuration file is malformed or violates an invariant
    ConfigInvalid,
    /// Fetching the target branch from origin failed
    FetchFromOriginTargetBranch,
    /// Fetching the target branch from upstream failed
    FetchFromUpstreamTargetBranch,
    /// Target branch does not exist on upstream
    NotUpstreamTargetBranch,
    /// Source and target have no whitelisted differences
    NotChangesFound,
    /// The operator dismissed a prompt
    PromptDismissed,
    /// Checking out the target branch failed
    CheckoutToTargetBranch,
    /// Merging origin's target branch failed
    MergeOriginTargetBranch,
    /// Merging upstream's target branch failed
    MergeFromUpstreamTargetBranch,
    /// Merges left conflicted paths
    ConflictsAfterMerge,
    /// Checking out whitelisted paths from the source failed
    MergeFromSource,
    /// Committing the promoted paths failed
    CommitPromotion,
    /// Pushing the target branch to origin failed
    PushToOriginTargetBranch,
    /// Listing open review requests failed
    ListOpenedPullRequest,
    /// Creating the review request failed
    CreatingPullRequest,
    /// Creating the local record folder failed
    CreatingPullRequestLocalFolder,
    /// Writing the record or instruction files failed
    CreatingInfoPullRequestFiles,
    /// Reading a persisted record failed
    ReadingPullRequestRecord,
    /// No remote points at a supported hosting platform
    NoSupportedRemotes,
    /// Authentication failed or is missing
    Auth,
    /// Hosting platform API error
    Platform,
    /// A git command failed outside a workflow step
    Git,
}

impl ErrorKind {
    /// Upper-snake code shown to the operator
    pub const fn code(self) -> &'static str {
        match self {
            Self::DirtyWorktree => "DIRTY_WORKTREE",
            Self::RemoteMissing => "REMOTE_MISSING",
            Self::NotLocalBranchFound => "NOT_LOCAL_BRANCH_FOUND",
            Self::NotWhitelistConfigFoundForBranch => "NOT_WHITELIST_CONFIG_FOUND_FOR_BRANCH",
            Self::ConfigNotFound => "CONFIG_NOT_FOUND",
            Self::ConfigInvalid => "CONFIG_INVALID",
            Self::FetchFromOriginTargetBranch => "FETCH_FROM_ORIGIN_TARGET_BRANCH",
            Self::FetchFromUpstreamTargetBranch => "FETCH_FROM_UPSTREAM_TARGET_BRANCH",
            Self::NotUpstreamTargetBranch => "NOT_UPSTREAM_TARGET_BRANCH",
            Self::NotChangesFound => "NOT_CHANGES_FOUND",
            Self::PromptDismissed => "PROMPT_DISMISSED",
            Self::CheckoutToTargetBranch => "CHECKOUT_TO_TARGET_BRANCH",
            Self::MergeOriginTargetBranch => "MERGE_ORIGIN_TARGET_BRANCH",
            Self::MergeFromUpstreamTargetBranch => "MERGE_FROM_UPSTREAM_TARGET_BRANCH",
            Self::ConflictsAfterMerge => "CONFLICTS_AFTER_MERGE",
            Self::MergeFromSource => "MERGE_FROM_SOURCE",
            Self::CommitPromotion => "COMMIT_PROMOTION",
            Self::PushToOriginTargetBranch => "PUSH_TO_ORIGIN_TARGET_BRANCH",
            Self::ListOpenedPullRequest => "LIST_OPENED_PULL_REQUEST",
            Self::CreatingPullRequest => "CREATING_PULL_REQUEST",
            Self::CreatingPullRequestLocalFolder => "CREATING_PULL_REQUEST_LOCAL_FOLDER",
            Self::CreatingInfoPullRequestFiles => "CREATING_INFO_PULL_REQUEST_FILES",
            Self::ReadingPullRequestRecord => "READING_PULL_REQUEST_RECORD",
            Self::NoSupportedRemotes => "NO_SUPPORTED_REMOTES",
            Self::Auth => "AUTH",
            Self::Platform => "PLATFORM",
            Self::Git => "GIT",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error type for git-promote operations
#[derive(Debug, Error)]
pub enum Error {
    /// Working tree is not clean
    #[error("working tree has uncommitted changes, commit or stash them first:\n{0}")]
    DirtyWorktree(String),

    /// Required remote not configured
    #[error("remote '{0}' is not configured, add it with `git remote add {0} <url>`")]
    RemoteMissing(String),

    /// Branch missing from the local branch list
    #[error("branch '{0}' was not found among your local branches")]
    NotLocalBranchFound(String),

    /// Target branch has no policy
    #[error("no whitelist configuration found for branch '{0}'")]
    NotWhitelistConfigFoundForBranch(String),

    /// No config file located
    #[error("no configuration file found (searched: {})", .0.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", "))]
    ConfigNotFound(Vec<PathBuf>),

    /// Config file malformed
    #[error("invalid configuration in '{}': {message}", .path.display())]
    ConfigInvalid {
        /// File the error was found in
        path: PathBuf,
        /// What is wrong
        message: String,
    },

    /// Origin fetch failed for a reason other than a missing ref
    #[error("failed to fetch '{branch}' from {remote}: {message}")]
    FetchFromOrigin {
        /// Fork remote name
        remote: String,
        /// Target branch
        branch: String,
        /// Underlying git message
        message: String,
    },

    /// Upstream fetch failed for a reason other than a missing ref
    #[error("failed to fetch '{branch}' from {remote}: {message}")]
    FetchFromUpstream {
        /// Upstream remote name
        remote: String,
        /// Target branch
        branch: String,
        /// Underlying git message
        message: String,
    },

    /// Target branch is absent on upstream
    #[error("branch '{branch}' does not exist on {remote}")]
    NotUpstreamTargetBranch {
        /// Upstream remote name
        remote: String,
        /// Target branch
        branch: String,
    },

    /// Nothing whitelisted differs between source and target
    #[error("no whitelisted differences between source '{source_branch}' and target '{target_branch}'")]
    NotChangesFound {
        /// Source branch
        source_branch: String,
        /// Target branch
        target_branch: String,
    },

    /// A prompt was dismissed before it was answered
    #[error("prompt dismissed")]
    PromptDismissed,

    /// Checkout of the target branch failed
    #[error("failed to checkout target branch '{branch}', check for uncommitted changes: {message}")]
    CheckoutToTarget {
        /// Target branch
        branch: String,
        /// Underlying git message
        message: String,
    },

    /// Merge of origin/target failed
    #[error("failed to merge {remote}/{branch}: {message}")]
    MergeOrigin {
        /// Fork remote name
        remote: String,
        /// Target branch
        branch: String,
        /// Underlying git message
        message: String,
    },

    /// Merge of upstream/target failed
    #[error("failed to merge {remote}/{branch}: {message}")]
    MergeUpstream {
        /// Upstream remote name
        remote: String,
        /// Target branch
        branch: String,
        /// Underlying git message
        message: String,
    },

    /// A merge produced conflicts
    #[error(
        "merging {remote}/{branch} into '{branch}' left {conflicts} conflicted paths; \
         merge it into '{branch}' manually, resolve the conflicts and run again"
    )]
    ConflictsAfterMerge {
        /// Remote whose branch conflicted
        remote: String,
        /// Target branch
        branch: String,
        /// Conflicted paths
        conflicts: usize,
    },

    /// Whitelisted checkout from source failed
    #[error("failed to bring whitelisted paths from '{branch}': {message}")]
    MergeFromSource {
        /// Source branch
        branch: String,
        /// Underlying git message
        message: String,
    },

    /// Commit of promoted paths failed
    #[error("failed to commit promoted changes on '{branch}': {message}")]
    CommitPromotion {
        /// Target branch
        branch: String,
        /// Underlying git message
        message: String,
    },

    /// Push to origin failed
    #[error("failed to push '{branch}' to {remote}: {message}")]
    PushToOrigin {
        /// Fork remote name
        remote: String,
        /// Target branch
        branch: String,
        /// Underlying git message
        message: String,
    },

    /// Listing open requests failed
    #[error("failed to list open pull requests for '{branch}': {message}")]
    ListOpenRequests {
        /// Target branch
        branch: String,
        /// Underlying platform message
        message: String,
    },

    /// Creating the request failed
    #[error("failed to create pull request against '{branch}': {message}")]
    CreateRequest {
        /// Target branch
        branch: String,
        /// Underlying platform message
        message: String,
    },

    /// Record folder could not be created
    #[error("failed to create local folder '{}': {source}", .path.display())]
    CreateRecordFolder {
        /// Folder path
        path: PathBuf,
        /// I/O cause
        source: std::io::Error,
    },

    /// Record or instructions could not be written
    #[error("failed to write '{}': {source}", .path.display())]
    WriteRecordFiles {
        /// File path
        path: PathBuf,
        /// I/O cause
        source: std::io::Error,
    },

    /// Record could not be read or parsed
    #[error("failed to read pull request record '{}': {message}", .path.display())]
    ReadRecord {
        /// File path
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// No supported remote
    #[error("remote URL does not point at GitHub or GitLab: {0}")]
    NoSupportedRemotes(String),

    /// Authentication error
    #[error("authentication error: {0}")]
    Auth(String),

    /// Generic platform error
    #[error("platform error: {0}")]
    Platform(String),

    /// GitHub API error
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// GitLab API error
    #[error("GitLab API error: {0}")]
    GitLabApi(String),

    /// A git command failed
    #[error("`git {command}` failed: {message}")]
    Git {
        /// Arguments passed to git
        command: String,
        /// stderr (or stdout when stderr is empty)
        message: String,
    },

    /// Octocrab error
    #[error("GitHub API error: {0}")]
    Octocrab(#[from] octocrab::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable kind for operator-facing errors, `None` for internal faults
    pub fn kind(&self) -> Option<ErrorKind> {
        Some(match self {
            Self::DirtyWorktree(_) => ErrorKind::DirtyWorktree,
            Self::RemoteMissing(_) => ErrorKind::RemoteMissing,
            Self::NotLocalBranchFound(_) => ErrorKind::NotLocalBranchFound,
            Self::NotWhitelistConfigFoundForBranch(_) => {
                ErrorKind::NotWhitelistConfigFoundForBranch
            }
            Self::ConfigNotFound(_) => ErrorKind::ConfigNotFound,
            Self::ConfigInvalid { .. } => ErrorKind::ConfigInvalid,
            Self::FetchFromOrigin { .. } => ErrorKind::FetchFromOriginTargetBranch,
            Self::FetchFromUpstream { .. } => ErrorKind::FetchFromUpstreamTargetBranch,
            Self::NotUpstreamTargetBranch { .. } => ErrorKind::NotUpstreamTargetBranch,
            Self::NotChangesFound { .. } => ErrorKind::NotChangesFound,
            Self::PromptDismissed => ErrorKind::PromptDismissed,
            Self::CheckoutToTarget { .. } => ErrorKind::CheckoutToTargetBranch,
            Self::MergeOrigin { .. } => ErrorKind::MergeOriginTargetBranch,
            Self::MergeUpstream { .. } => ErrorKind::MergeFromUpstreamTargetBranch,
            Self::ConflictsAfterMerge { .. } => ErrorKind::ConflictsAfterMerge,
            Self::MergeFromSource { .. } => ErrorKind::MergeFromSource,
            Self::CommitPromotion { .. } => ErrorKind::CommitPromotion,
            Self::PushToOrigin { .. } => ErrorKind::PushToOriginTargetBranch,
            Self::ListOpenRequests { .. } => ErrorKind::ListOpenedPullRequest,
            Self::CreateRequest { .. } => ErrorKind::CreatingPullRequest,
            Self::CreateRecordFolder { .. } => ErrorKind::CreatingPullRequestLocalFolder,
            Self::WriteRecordFiles { .. } => ErrorKind::CreatingInfoPullRequestFiles,
            Self::ReadRecord { .. } => ErrorKind::ReadingPullRequestRecord,
            Self::NoSupportedRemotes(_) => ErrorKind::NoSupportedRemotes,
            Self::Auth(_) => ErrorKind::Auth,
            Self::Platform(_)
            | Self::GitHubApi(_)
            | Self::GitLabApi(_)
            | Self::Octocrab(_)
            | Self::Http(_) => ErrorKind::Platform,
            Self::Git { .. } => ErrorKind::Git,
            Self::Io(_) | Self::Json(_) | Self::Internal(_) => return None,
        })
    }
}
