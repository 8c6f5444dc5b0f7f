//! Platform service factory

use crate::auth::{get_github_auth, get_gitlab_auth};
use crate::error::Result;
use crate::platform::{parse_repo_info, GitHubService, GitLabService, PlatformService};
use crate::types::{NewPullRequest, Platform, PlatformConfig, PullRequest};
use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

/// Connect to the platform hosting the repository at `remote_url`
///
/// Detects GitHub or GitLab from the URL, authenticates, and scopes the
/// service to that repository.
pub async fn create_platform_service(remote_url: &str) -> Result<Box<dyn PlatformService>> {
    let config = parse_repo_info(remote_url)?;
    debug!(
        "using {:?} repository {}/{}",
        config.platform, config.owner, config.repo
    );

    match config.platform {
        Platform::GitHub => {
            let auth = get_github_auth().await?;
            Ok(Box::new(GitHubService::new(
                &auth.token,
                config.owner,
                config.repo,
                config.host,
            )?))
        }
        Platform::GitLab => {
            let auth = get_gitlab_auth(config.host.as_deref()).await?;
            Ok(Box::new(GitLabService::new(
                auth.token,
                config.owner,
                config.repo,
                Some(auth.host),
            )))
        }
    }
}

/// Platform service that authenticates on first use
///
/// The repository is identified up front from the remote URL. Credentials
/// are only looked up when the first request is made, so a run that stops
/// early never touches the platform.
pub struct LazyPlatformService {
    remote_url: String,
    config: PlatformConfig,
    inner: OnceCell<Box<dyn PlatformService>>,
}

impl LazyPlatformService {
    /// Identify the repository behind `remote_url` without connecting
    pub fn new(remote_url: &str) -> Result<Self> {
        Ok(Self {
            config: parse_repo_info(remote_url)?,
            remote_url: remote_url.to_string(),
            inner: OnceCell::new(),
        })
    }

    async fn service(&self) -> Result<&dyn PlatformService> {
        let service = self
            .inner
            .get_or_try_init(|| create_platform_service(&self.remote_url))
            .await?;
        Ok(service.as_ref())
    }
}

#[async_trait]
impl PlatformService for LazyPlatformService {
    async fn current_user(&self) -> Result<String> {
        self.service().await?.current_user().await
    }

    async fn list_open_requests(&self, base_branch: &str) -> Result<Vec<PullRequest>> {
        self.service().await?.list_open_requests(base_branch).await
    }

    async fn get_request(&self, number: u64) -> Result<PullRequest> {
        self.service().await?.get_request(number).await
    }

    async fn create_request(&self, request: &NewPullRequest) -> Result<PullRequest> {
        self.service().await?.create_request(request).await
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
