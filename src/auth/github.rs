//! GitHub credentials

use super::{cli_token, env_token, AuthSource};
use crate::error::{Error, Result};

/// GitHub token and where it came from
#[derive(Debug, Clone)]
pub struct GitHubAuthConfig {
    /// Authentication token
    pub token: String,
    /// Where the token was obtained from
    pub source: AuthSource,
}

/// Get GitHub authentication
///
/// Priority: `gh auth token`, then `GITHUB_TOKEN`, then `GH_TOKEN`.
pub async fn get_github_auth() -> Result<GitHubAuthConfig> {
    if let Some(token) = cli_token("gh", &[]).await {
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::Cli,
        });
    }

    env_token(&["GITHUB_TOKEN", "GH_TOKEN"])
        .map(|(token, var)| GitHubAuthConfig {
            token,
            source: AuthSource::EnvVar(var),
        })
        .ok_or_else(|| {
            Error::Auth(
                "No GitHub authentication found. Run `gh auth login` or set GITHUB_TOKEN"
                    .to_string(),
            )
        })
}

/// Check the token against the API and return the authenticated login
pub async fn test_github_auth(config: &GitHubAuthConfig) -> Result<String> {
    let octocrab = octocrab::Octocrab::builder()
        .personal_token(config.token.clone())
        .build()
        .map_err(|e| Error::GitHubApi(e.to_string()))?;

    let user = octocrab
        .current()
        .user()
        .await
        .map_err(|e| Error::Auth(format!("Invalid token: {e}")))?;

    Ok(user.login)
}
