//! Core types for git-promote

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A remote-tracking branch (`<remote>/<name>`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchRef {
    /// Remote that provides this branch
    pub remote: String,
    /// Branch name (without remote prefix)
    pub name: String,
}

impl BranchRef {
    /// `name` as fetched from `remote`
    pub fn remote(remote: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            remote: remote.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for BranchRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.remote, self.name)
    }
}

/// A git remote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GitRemote {
    /// Remote name (e.g., "origin")
    pub name: String,
    /// Remote URL
    pub url: String,
}

/// Names of the two remotes the workflow synchronizes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteNames {
    /// The developer's fork
    pub origin: String,
    /// The canonical repository
    pub upstream: String,
}

impl Default for RemoteNames {
    fn default() -> Self {
        Self {
            origin: "origin".to_string(),
            upstream: "upstream".to_string(),
        }
    }
}

/// Kind of change reported by `git diff --name-status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// File added
    Added,
    /// File copied
    Copied,
    /// File deleted
    Deleted,
    /// File modified (includes type changes)
    Modified,
    /// File renamed
    Renamed,
}

impl ChangeKind {
    /// Parse the leading status letter (`A`, `C90`, `R100`, ...)
    pub fn from_status(status: &str) -> Option<Self> {
        match status.chars().next()?.to_ascii_uppercase() {
            'A' => Some(Self::Added),
            'C' => Some(Self::Copied),
            'D' => Some(Self::Deleted),
            'M' | 'T' => Some(Self::Modified),
            'R' => Some(Self::Renamed),
            _ => None,
        }
    }

    /// Human-readable description used in generated instructions
    pub const fn description(self) -> &'static str {
        match self {
            Self::Added => "File added",
            Self::Copied => "File copied",
            Self::Deleted => "File deleted",
            Self::Modified => "File modified",
            Self::Renamed => "File renamed",
        }
    }
}

/// One changed file, produced by diffing the target against upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChangeEntry {
    /// Repository-relative path (destination path for renames/copies)
    pub path: String,
    /// What happened to the file
    pub kind: ChangeKind,
    /// 1-based position across the lifetime of the review request
    pub sequence: usize,
    /// Date the entry was recorded
    pub date: NaiveDate,
}

/// A pull request / merge request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequest {
    /// PR/MR number
    pub number: u64,
    /// Web URL for the PR/MR
    pub html_url: String,
    /// Base branch name
    pub base_ref: String,
    /// Head branch name
    pub head_ref: String,
    /// PR/MR title
    pub title: String,
    /// Login of the author
    pub author: String,
}

/// Parameters for opening a new review request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    /// Owner of the fork holding the head branch, `None` for same-repo heads
    pub head_owner: Option<String>,
    /// Head branch name
    pub head_branch: String,
    /// Base branch name on upstream
    pub base: String,
    /// Title
    pub title: String,
    /// Reviewer logins (author already excluded)
    pub reviewers: Vec<String>,
    /// Labels to apply
    pub labels: Vec<String>,
}

/// Detected platform type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    /// GitHub or GitHub Enterprise
    GitHub,
    /// GitLab or self-hosted GitLab
    GitLab,
}

/// Platform configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Platform type
    pub platform: Platform,
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com/gitlab.com)
    pub host: Option<String>,
}
