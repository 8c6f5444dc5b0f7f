//! Per-run workflow state

use crate::sync::MergeReport;
use crate::types::FileChangeEntry;
use std::fmt;

/// Workflow phase, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    /// Checking remotes and the working tree
    Inspecting,
    /// Choosing the target branch and its policy
    SelectingTarget,
    /// Fetching the target from the remotes
    Fetching,
    /// Choosing the source branch
    SelectingSource,
    /// Showing what would be promoted
    Previewing,
    /// Merging the remotes into the target
    Merging,
    /// Committing whitelisted paths onto the target
    Promoting,
    /// Pushing the target to origin
    Pushing,
    /// Listing files new to upstream
    Diffing,
    /// Filing or amending the review request
    Tracking,
    /// Returning to the original branch
    Restoring,
    /// Finished
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Inspecting => "Inspecting repository",
            Self::SelectingTarget => "Selecting target branch",
            Self::Fetching => "Fetching target branch",
            Self::SelectingSource => "Selecting source branch",
            Self::Previewing => "Previewing changes",
            Self::Merging => "Merging remotes",
            Self::Promoting => "Promoting whitelisted paths",
            Self::Pushing => "Pushing to origin",
            Self::Diffing => "Listing changed files",
            Self::Tracking => "Updating review request",
            Self::Restoring => "Restoring original branch",
            Self::Complete => "Done",
        };
        f.write_str(s)
    }
}

/// Everything one run has learned so far
///
/// Never persisted. Each phase hands the orchestrator a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowState {
    /// Current phase
    pub phase: Phase,
    /// Branch checked out when the run started
    pub original_branch: String,
    /// Selected target branch
    pub target: Option<String>,
    /// Selected source branch
    pub source: Option<String>,
    /// Conflicted paths from merging origin
    pub origin_conflicts: usize,
    /// Conflicted paths from merging upstream
    pub upstream_conflicts: usize,
    /// Upstream target commit before the promotion
    pub upstream_commit: Option<String>,
    /// Entries newly listed in the review request
    pub new_files: Vec<FileChangeEntry>,
}

impl WorkflowState {
    /// State at the start of a run on `original_branch`
    pub fn start(original_branch: impl Into<String>) -> Self {
        Self {
            phase: Phase::Inspecting,
            original_branch: original_branch.into(),
            target: None,
            source: None,
            origin_conflicts: 0,
            upstream_conflicts: 0,
            upstream_commit: None,
            new_files: Vec::new(),
        }
    }

    /// Move to `phase`
    #[must_use]
    pub fn at(self, phase: Phase) -> Self {
        Self { phase, ..self }
    }

    /// Record the chosen target
    #[must_use]
    pub fn with_target(self, target: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            ..self
        }
    }

    /// Record the chosen source
    #[must_use]
    pub fn with_source(self, source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..self
        }
    }

    /// Record merge results
    #[must_use]
    pub fn with_merge(self, merge: &MergeReport) -> Self {
        Self {
            origin_conflicts: merge.origin_conflicts,
            upstream_conflicts: merge.upstream_conflicts,
            upstream_commit: Some(merge.upstream_commit.clone()),
            ..self
        }
    }

    /// Record the files this run listed
    #[must_use]
    pub fn with_new_files(self, new_files: Vec<FileChangeEntry>) -> Self {
        Self { new_files, ..self }
    }
}
