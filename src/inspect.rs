//! Read-only inspection of remotes, branches and the working tree
//!
//! Every check here runs before the workflow mutates anything.

use crate::error::{Error, Result};
use crate::repo::{Vcs, WorktreeStatus};
use tracing::debug;

/// Snapshot of the repository taken at the start of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoStatus {
    /// Whether every status category is empty
    pub clean: bool,
    /// Checked-out branch (commit id when detached)
    pub current_branch: String,
    /// All local branches
    pub local_branches: Vec<String>,
    /// Raw status categories
    pub worktree: WorktreeStatus,
}

/// Queries remotes, branches and cleanliness without side effects
pub struct RemoteStateInspector<'a> {
    vcs: &'a dyn Vcs,
}

impl<'a> RemoteStateInspector<'a> {
    /// Create an inspector over a repository
    pub const fn new(vcs: &'a dyn Vcs) -> Self {
        Self { vcs }
    }

    /// Current branch, local branches and working tree state
    pub async fn current_status(&self) -> Result<RepoStatus> {
        let worktree = self.vcs.status().await?;
        let branches = self.vcs.branches().await?;

        debug!(
            "on {} with {} local branches, clean: {}",
            branches.current,
            branches.all.len(),
            worktree.is_clean()
        );

        Ok(RepoStatus {
            clean: worktree.is_clean(),
            current_branch: branches.current,
            local_branches: branches.all,
            worktree,
        })
    }

    /// Whether a remote with this name is configured
    pub async fn has_remote(&self, name: &str) -> Result<bool> {
        Ok(self.vcs.remotes().await?.iter().any(|r| r.name == name))
    }

    /// Fail with `REMOTE_MISSING` unless the remote exists
    pub async fn require_remote(&self, name: &str) -> Result<()> {
        if self.has_remote(name).await? {
            Ok(())
        } else {
            Err(Error::RemoteMissing(name.to_string()))
        }
    }

    /// Fail with `DIRTY_WORKTREE` unless the tree is clean
    pub async fn require_clean(&self) -> Result<RepoStatus> {
        let status = self.current_status().await?;
        if status.clean {
            Ok(status)
        } else {
            Err(Error::DirtyWorktree(status.worktree.summary()))
        }
    }

    /// Fail with `NOT_LOCAL_BRANCH_FOUND` unless `branch` is local
    pub async fn require_local_branch(&self, branch: &str) -> Result<()> {
        if self.vcs.branches().await?.contains(branch) {
            Ok(())
        } else {
            Err(Error::NotLocalBranchFound(branch.to_string()))
        }
    }
}
