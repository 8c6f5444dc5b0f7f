//! Version-control command surface
//!
//! The workflow never touches git internals directly. Everything goes through
//! the [`Vcs`] trait so the orchestration can run against the `git` binary
//! ([`GitCli`]) or an in-memory double in tests.

mod git;
mod status;

pub use git::GitCli;
pub use status::{parse_porcelain_status, WorktreeStatus};

use crate::error::Result;
use crate::types::GitRemote;
use async_trait::async_trait;

/// Local branches and the one currently checked out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalBranches {
    /// All local branch names
    pub all: Vec<String>,
    /// Checked-out branch, or the commit id when HEAD is detached
    pub current: String,
}

impl LocalBranches {
    /// Whether `name` is a local branch
    pub fn contains(&self, name: &str) -> bool {
        self.all.iter().any(|b| b == name)
    }
}

/// Result of fetching a branch from a remote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Branch fetched
    Fetched,
    /// Remote has no such branch
    RemoteRefMissing,
}

/// Result of a merge that ran to completion or stopped on conflicts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Paths left unmerged
    pub conflicts: Vec<String>,
}

/// Output format for [`Vcs::diff`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffFormat {
    /// `--stat`, for previews
    Stat,
    /// `--name-status`, for change lists
    NameStatus,
}

/// Version-control operations used by the promotion workflow
#[async_trait]
pub trait Vcs: Send + Sync {
    /// Configured remotes
    async fn remotes(&self) -> Result<Vec<GitRemote>>;

    /// Working tree status
    async fn status(&self) -> Result<WorktreeStatus>;

    /// Local branches and the current one
    async fn branches(&self) -> Result<LocalBranches>;

    /// Fetch a single branch from a remote
    async fn fetch(&self, remote: &str, branch: &str) -> Result<FetchOutcome>;

    /// Switch to a branch
    async fn checkout(&self, branch: &str) -> Result<()>;

    /// Check out `paths` from `from` into the index and working tree
    async fn checkout_paths(&self, from: &str, paths: &[String]) -> Result<()>;

    /// Reset the index and working tree to `HEAD`
    ///
    /// Paths staged since `HEAD`, including newly added ones, are dropped.
    async fn discard_changes(&self) -> Result<()>;

    /// Merge a reference into the current branch
    async fn merge(&self, reference: &str) -> Result<MergeOutcome>;

    /// Abort an in-progress merge
    async fn abort_merge(&self) -> Result<()>;

    /// Resolve a reference to a commit id
    async fn rev_parse(&self, reference: &str) -> Result<String>;

    /// Diff two references, optionally restricted to `paths`
    async fn diff(&self, from: &str, to: &str, format: DiffFormat, paths: &[String])
    -> Result<String>;

    /// Commit staged changes; returns false when nothing was staged
    async fn commit(&self, message: &str) -> Result<bool>;

    /// Subject line of the last commit on a branch
    async fn last_commit_subject(&self, branch: &str) -> Result<String>;

    /// Push a branch to a remote
    async fn push(&self, remote: &str, branch: &str) -> Result<()>;
}
