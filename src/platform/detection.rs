//! Platform detection from remote URLs

use crate::error::{Error, Result};
use crate::types::{Platform, PlatformConfig};
use regex::Regex;
use std::env;
use std::sync::OnceLock;

fn repo_path_patterns() -> &'static [Regex; 2] {
    static PATTERNS: OnceLock<[Regex; 2]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            // SSH format: git@host:owner/repo.git
            Regex::new(r"^[^@/]+@[^:]+:(.+?)(?:\.git)?/?$").expect("hardcoded pattern is valid"),
            // HTTPS/SSH URL format: https://host/owner/repo.git
            Regex::new(r"^[a-z+]+://[^/]+/(.+?)(?:\.git)?/?$").expect("hardcoded pattern is valid"),
        ]
    })
}

/// Detect platform (GitHub or GitLab) from a remote URL
pub fn detect_platform(url: &str) -> Option<Platform> {
    let gh_host = env::var("GH_HOST").ok();
    let gitlab_host = env::var("GITLAB_HOST").ok();

    let hostname = extract_hostname(url)?;

    if hostname == "github.com"
        || hostname.ends_with(".github.com")
        || gh_host.as_ref().is_some_and(|h| hostname == *h)
    {
        return Some(Platform::GitHub);
    }

    if hostname == "gitlab.com"
        || hostname.ends_with(".gitlab.com")
        || gitlab_host.as_ref().is_some_and(|h| hostname == *h)
    {
        return Some(Platform::GitLab);
    }

    None
}

/// Parse repository info (owner/repo) from a remote URL
pub fn parse_repo_info(url: &str) -> Result<PlatformConfig> {
    let platform =
        detect_platform(url).ok_or_else(|| Error::NoSupportedRemotes(url.to_string()))?;
    let (owner, repo) = split_repo_path(url)
        .ok_or_else(|| Error::Platform(format!("cannot parse owner/repo from remote URL: {url}")))?;

    let default_host = match platform {
        Platform::GitHub => "github.com",
        Platform::GitLab => "gitlab.com",
    };
    let host = extract_hostname(url).filter(|h| h != default_host);

    Ok(PlatformConfig {
        platform,
        owner,
        repo,
        host,
    })
}

/// Owner part of a remote URL (user or group owning the repository)
pub fn repo_owner(url: &str) -> Option<String> {
    split_repo_path(url).map(|(owner, _)| owner)
}

fn split_repo_path(url: &str) -> Option<(String, String)> {
    let path = repo_path_patterns()
        .iter()
        .find_map(|re| re.captures(url))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())?;

    // GitLab supports nested groups: everything before the last segment is the owner
    let (owner, repo) = path.rsplit_once('/')?;
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

fn extract_hostname(url: &str) -> Option<String> {
    if !url.contains("://") {
        // scp-like SSH: user@host:path
        let (_, rest) = url.split_once('@')?;
        return rest.split(':').next().map(ToString::to_string);
    }

    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(ToString::to_string))
}
