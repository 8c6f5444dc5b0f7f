//! Credential lookup for GitHub and GitLab
//!
//! Tokens come from the platform CLI (`gh`, `glab`) when it is logged in,
//! otherwise from environment variables.

mod github;
mod gitlab;

pub use github::{get_github_auth, test_github_auth, GitHubAuthConfig};
pub use gitlab::{get_gitlab_auth, test_gitlab_auth, GitLabAuthConfig};

use std::env;
use tokio::process::Command;
use tracing::debug;

/// Source of authentication token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from CLI tool (gh or glab)
    Cli,
    /// Token from the named environment variable
    EnvVar(&'static str),
}

impl std::fmt::Display for AuthSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::EnvVar(name) => write!(f, "${name}"),
        }
    }
}

/// Ask a platform CLI for its token, if it is installed and logged in
async fn cli_token(program: &str, host_args: &[&str]) -> Option<String> {
    let status = Command::new(program)
        .args(["auth", "status"])
        .args(host_args)
        .output()
        .await
        .ok()?;
    if !status.status.success() {
        debug!("{program} is not logged in");
        return None;
    }

    let output = Command::new(program)
        .args(["auth", "token"])
        .args(host_args)
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }

    non_empty(String::from_utf8_lossy(&output.stdout).trim())
}

/// First non-empty variable among `names`
fn env_token(names: &[&'static str]) -> Option<(String, &'static str)> {
    names
        .iter()
        .find_map(|name| env::var(name).ok().and_then(|v| non_empty(v.trim())).map(|v| (v, *name)))
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
