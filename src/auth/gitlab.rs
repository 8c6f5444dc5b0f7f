//! GitLab credentials

use super::{cli_token, env_token, AuthSource};
use crate::error::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use std::env;

/// GitLab token, its origin, and the host it applies to
#[derive(Debug, Clone)]
pub struct GitLabAuthConfig {
    /// Authentication token
    pub token: String,
    /// Where the token was obtained from
    pub source: AuthSource,
    /// GitLab host (e.g., "gitlab.com")
    pub host: String,
}

/// Get GitLab authentication for `host` (default `$GITLAB_HOST`, then gitlab.com)
///
/// Priority: `glab auth token`, then `GITLAB_TOKEN`, then `GL_TOKEN`.
pub async fn get_gitlab_auth(host: Option<&str>) -> Result<GitLabAuthConfig> {
    let host = host
        .map(String::from)
        .or_else(|| env::var("GITLAB_HOST").ok())
        .unwrap_or_else(|| "gitlab.com".to_string());

    if let Some(token) = cli_token("glab", &["--hostname", &host]).await {
        return Ok(GitLabAuthConfig {
            token,
            source: AuthSource::Cli,
            host,
        });
    }

    match env_token(&["GITLAB_TOKEN", "GL_TOKEN"]) {
        Some((token, var)) => Ok(GitLabAuthConfig {
            token,
            source: AuthSource::EnvVar(var),
            host,
        }),
        None => Err(Error::Auth(format!(
            "No GitLab authentication found for {host}. Run `glab auth login` or set GITLAB_TOKEN"
        ))),
    }
}

#[derive(Deserialize)]
struct GitLabUser {
    username: String,
}

/// Check the token against `/api/v4/user` and return the username
pub async fn test_gitlab_auth(config: &GitLabAuthConfig) -> Result<String> {
    let url = format!("https://{}/api/v4/user", config.host);

    let user: GitLabUser = Client::new()
        .get(&url)
        .header("PRIVATE-TOKEN", &config.token)
        .send()
        .await?
        .error_for_status()
        .map_err(|e| Error::Auth(format!("Invalid token: {e}")))?
        .json()
        .await?;

    Ok(user.username)
}
