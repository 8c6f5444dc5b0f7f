//! Branch synchronization and path-restricted promotion
//!
//! One [`SyncEngine`] drives a single run through
//! `Idle → Fetching → Merging → Promoting → Diffing → Done`, landing in
//! `Failed` on the first error. Calls made out of order are rejected.
//!
//! Conflicts are never resolved here: a merge that leaves unmerged paths is
//! aborted and reported as [`Error::ConflictsAfterMerge`].

mod diff;

pub use diff::parse_name_status;

use crate::error::{Error, Result};
use crate::repo::{DiffFormat, FetchOutcome, Vcs};
use crate::types::{BranchRef, FileChangeEntry, RemoteNames};
use chrono::NaiveDate;
use std::fmt;
use tracing::{debug, info, warn};

/// Phase of a sync run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Nothing done yet
    Idle,
    /// Target fetched from the remotes
    Fetching,
    /// Remotes merged into the local target
    Merging,
    /// Whitelisted paths committed on the target
    Promoting,
    /// Computing the change list
    Diffing,
    /// Run finished
    Done,
    /// A step failed
    Failed,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Merging => "merging",
            Self::Promoting => "promoting",
            Self::Diffing => "diffing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// What the fetch step found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchReport {
    /// Origin has the target branch, so it must be merged
    pub origin_available: bool,
}

/// What the merge step found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    /// Conflicted paths from merging origin
    pub origin_conflicts: usize,
    /// Conflicted paths from merging upstream
    pub upstream_conflicts: usize,
    /// Upstream target commit before the promotion
    pub upstream_commit: String,
}

/// Result of the promotion commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionCommit {
    /// Whether a commit was created (false when the target already matched)
    pub committed: bool,
    /// Commit message used
    pub message: String,
}

/// Fetches, merges and promotes for one target branch
pub struct SyncEngine<'a> {
    vcs: &'a dyn Vcs,
    remotes: RemoteNames,
    state: SyncState,
}

fn git_message(err: Error) -> String {
    match err {
        Error::Git { message, .. } => message,
        other => other.to_string(),
    }
}

impl<'a> SyncEngine<'a> {
    /// Create an idle engine
    pub const fn new(vcs: &'a dyn Vcs, remotes: RemoteNames) -> Self {
        Self {
            vcs,
            remotes,
            state: SyncState::Idle,
        }
    }

    /// Current phase
    pub const fn state(&self) -> SyncState {
        self.state
    }

    fn enter(&mut self, allowed: &[SyncState], next: SyncState) -> Result<()> {
        if !allowed.contains(&self.state) {
            return Err(Error::Internal(format!(
                "sync engine cannot enter {next} while {}",
                self.state
            )));
        }
        debug!("sync: {} -> {next}", self.state);
        self.state = next;
        Ok(())
    }

    fn require(&self, state: SyncState) -> Result<()> {
        if self.state == state {
            Ok(())
        } else {
            Err(Error::Internal(format!(
                "sync engine expected {state}, is {}",
                self.state
            )))
        }
    }

    fn fail<T>(&mut self, err: Error) -> Result<T> {
        self.state = SyncState::Failed;
        Err(err)
    }

    /// Re-read HEAD and fail unless `branch` is checked out
    async fn ensure_on(&self, branch: &str) -> Result<()> {
        let current = self.vcs.branches().await?.current;
        if current == branch {
            Ok(())
        } else {
            Err(Error::CheckoutToTarget {
                branch: branch.to_string(),
                message: format!("HEAD is on '{current}'"),
            })
        }
    }

    /// Drop whatever a failed promotion left staged on the target
    async fn discard_promotion(&mut self, target: &str, err: Error) -> Result<PromotionCommit> {
        warn!("promotion onto '{target}' failed, discarding staged paths");
        if let Err(e) = self.vcs.discard_changes().await {
            warn!("could not reset '{target}': {e}");
        }
        self.fail(err)
    }

    fn upstream_ref(&self, target: &str) -> String {
        BranchRef::remote(&self.remotes.upstream, target).to_string()
    }

    /// Fetch the target from origin (when configured) and upstream
    ///
    /// A target missing on origin only disables the origin merge; missing on
    /// upstream is fatal.
    pub async fn fetch(&mut self, target: &str, origin_configured: bool) -> Result<FetchReport> {
        self.enter(&[SyncState::Idle], SyncState::Fetching)?;

        let origin_available = if origin_configured {
            match self.vcs.fetch(&self.remotes.origin, target).await {
                Ok(FetchOutcome::Fetched) => true,
                Ok(FetchOutcome::RemoteRefMissing) => {
                    info!("{} has no '{target}' yet, skipping origin merge", self.remotes.origin);
                    false
                }
                Err(e) => {
                    return self.fail(Error::FetchFromOrigin {
                        remote: self.remotes.origin.clone(),
                        branch: target.to_string(),
                        message: git_message(e),
                    });
                }
            }
        } else {
            warn!("remote '{}' is not configured, skipping origin merge", self.remotes.origin);
            false
        };

        match self.vcs.fetch(&self.remotes.upstream, target).await {
            Ok(FetchOutcome::Fetched) => {}
            Ok(FetchOutcome::RemoteRefMissing) => {
                return self.fail(Error::NotUpstreamTargetBranch {
                    remote: self.remotes.upstream.clone(),
                    branch: target.to_string(),
                });
            }
            Err(e) => {
                return self.fail(Error::FetchFromUpstream {
                    remote: self.remotes.upstream.clone(),
                    branch: target.to_string(),
                    message: git_message(e),
                });
            }
        }

        Ok(FetchReport { origin_available })
    }

    /// `--stat` diff of the whitelisted paths between upstream's target and `source`
    ///
    /// Read-only. Fails with `NOT_CHANGES_FOUND` when there is nothing to promote.
    pub async fn preview(&mut self, source: &str, target: &str, paths: &[String]) -> Result<String> {
        self.require(SyncState::Fetching)?;

        let upstream = self.upstream_ref(target);
        let stat = match self
            .vcs
            .diff(&upstream, source, DiffFormat::Stat, paths)
            .await
        {
            Ok(stat) => stat,
            Err(e) => return self.fail(e),
        };

        if stat.trim().is_empty() {
            return self.fail(Error::NotChangesFound {
                source_branch: source.to_string(),
                target_branch: target.to_string(),
            });
        }
        Ok(stat)
    }

    /// Check out the target and merge origin (if fetched) then upstream into it
    pub async fn merge(&mut self, target: &str, fetched: FetchReport) -> Result<MergeReport> {
        self.enter(&[SyncState::Fetching], SyncState::Merging)?;

        if let Err(e) = self.vcs.checkout(target).await {
            return self.fail(Error::CheckoutToTarget {
                branch: target.to_string(),
                message: git_message(e),
            });
        }
        if let Err(e) = self.ensure_on(target).await {
            return self.fail(e);
        }

        let mut origin_conflicts = 0;
        if fetched.origin_available {
            let origin = BranchRef::remote(&self.remotes.origin, target).to_string();
            match self.vcs.merge(&origin).await {
                Ok(outcome) => origin_conflicts = outcome.conflicts.len(),
                Err(e) => {
                    return self.fail(Error::MergeOrigin {
                        remote: self.remotes.origin.clone(),
                        branch: target.to_string(),
                        message: git_message(e),
                    });
                }
            }
            if origin_conflicts > 0 {
                let remote = self.remotes.origin.clone();
                return self.abort_on_conflicts(&remote, target, origin_conflicts).await;
            }
        }

        let upstream = self.upstream_ref(target);
        let upstream_conflicts = match self.vcs.merge(&upstream).await {
            Ok(outcome) => outcome.conflicts.len(),
            Err(e) => {
                return self.fail(Error::MergeUpstream {
                    remote: self.remotes.upstream.clone(),
                    branch: target.to_string(),
                    message: git_message(e),
                });
            }
        };
        if upstream_conflicts > 0 {
            let remote = self.remotes.upstream.clone();
            return self.abort_on_conflicts(&remote, target, upstream_conflicts).await;
        }

        let upstream_commit = match self.vcs.rev_parse(&upstream).await {
            Ok(id) => id,
            Err(e) => return self.fail(e),
        };

        Ok(MergeReport {
            origin_conflicts,
            upstream_conflicts,
            upstream_commit,
        })
    }

    async fn abort_on_conflicts<T>(&mut self, remote: &str, target: &str, conflicts: usize) -> Result<T> {
        warn!("merging {remote}/{target} left conflicts, aborting it");
        if let Err(e) = self.vcs.abort_merge().await {
            warn!("could not abort merge: {e}");
        }
        self.fail(Error::ConflictsAfterMerge {
            remote: remote.to_string(),
            branch: target.to_string(),
            conflicts,
        })
    }

    /// Bring exactly `paths` from `source` onto the checked-out target and commit
    ///
    /// On failure the target's index and working tree are reset, so nothing
    /// staged follows the operator back to their branch.
    pub async fn promote(
        &mut self,
        source: &str,
        target: &str,
        paths: &[String],
    ) -> Result<PromotionCommit> {
        self.enter(&[SyncState::Merging], SyncState::Promoting)?;

        let message = match self.vcs.last_commit_subject(source).await {
            Ok(subject) if !subject.is_empty() => subject,
            Ok(_) => format!("Promote {source} into {target}"),
            Err(e) => {
                return self.fail(Error::MergeFromSource {
                    branch: source.to_string(),
                    message: git_message(e),
                });
            }
        };

        if let Err(e) = self.ensure_on(target).await {
            return self.fail(e);
        }

        if let Err(e) = self.vcs.checkout_paths(source, paths).await {
            let err = Error::MergeFromSource {
                branch: source.to_string(),
                message: git_message(e),
            };
            return self.discard_promotion(target, err).await;
        }
        if let Err(e) = self.ensure_on(target).await {
            return self.discard_promotion(target, e).await;
        }

        let committed = match self.vcs.commit(&message).await {
            Ok(committed) => committed,
            Err(e) => {
                let err = Error::CommitPromotion {
                    branch: target.to_string(),
                    message: git_message(e),
                };
                return self.discard_promotion(target, err).await;
            }
        };
        if !committed {
            info!("'{target}' already contains the whitelisted content of '{source}'");
        }

        Ok(PromotionCommit { committed, message })
    }

    /// Push the promoted target to origin; returns false when origin is absent
    pub async fn push(&mut self, target: &str, origin_configured: bool) -> Result<bool> {
        self.require(SyncState::Promoting)?;

        if !origin_configured {
            warn!("remote '{}' is not configured, not pushing '{target}'", self.remotes.origin);
            return Ok(false);
        }
        if let Err(e) = self.vcs.push(&self.remotes.origin, target).await {
            return self.fail(Error::PushToOrigin {
                remote: self.remotes.origin.clone(),
                branch: target.to_string(),
                message: git_message(e),
            });
        }
        Ok(true)
    }

    /// Everything on the local target that upstream's target lacks
    pub async fn diff(&mut self, target: &str, date: NaiveDate) -> Result<Vec<FileChangeEntry>> {
        self.enter(&[SyncState::Promoting], SyncState::Diffing)?;

        let upstream = self.upstream_ref(target);
        let output = match self
            .vcs
            .diff(&upstream, target, DiffFormat::NameStatus, &[])
            .await
        {
            Ok(out) => out,
            Err(e) => return self.fail(e),
        };

        let entries = parse_name_status(&output, date);
        debug!("{} files differ from {upstream}", entries.len());
        self.state = SyncState::Done;
        Ok(entries)
    }
}
