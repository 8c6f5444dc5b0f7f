//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{NewPullRequest, Platform, PlatformConfig, PullRequest};
use async_trait::async_trait;
use octocrab::Octocrab;
use tracing::debug;

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
}

impl GitHubService {
    /// Create a new GitHub service
    pub fn new(token: &str, owner: String, repo: String, host: Option<String>) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());

        if let Some(ref h) = host {
            let base_url = format!("https://{h}/api/v3");
            builder = builder
                .base_uri(&base_url)
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
        }

        let client = builder.build().map_err(|e| Error::GitHubApi(e.to_string()))?;

        Ok(Self {
            client,
            config: PlatformConfig {
                platform: Platform::GitHub,
                owner,
                repo,
                host,
            },
        })
    }
}

fn to_pull_request(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        html_url: pr
            .html_url
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default(),
        base_ref: pr.base.ref_field.clone(),
        head_ref: pr.head.ref_field.clone(),
        title: pr.title.as_deref().unwrap_or_default().to_string(),
        author: pr
            .user
            .as_ref()
            .map(|u| u.login.clone())
            .unwrap_or_default(),
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn current_user(&self) -> Result<String> {
        let user = self
            .client
            .current()
            .user()
            .await
            .map_err(|e| Error::Auth(format!("Invalid token: {e}")))?;
        Ok(user.login)
    }

    async fn list_open_requests(&self, base_branch: &str) -> Result<Vec<PullRequest>> {
        let first = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .list()
            .base(base_branch)
            .state(octocrab::params::State::Open)
            .per_page(100)
            .send()
            .await?;
        let prs = self.client.all_pages(first).await?;

        debug!("{} open pull requests against {base_branch}", prs.len());
        Ok(prs.iter().map(to_pull_request).collect())
    }

    async fn get_request(&self, number: u64) -> Result<PullRequest> {
        let pr = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .get(number)
            .await?;
        Ok(to_pull_request(&pr))
    }

    async fn create_request(&self, request: &NewPullRequest) -> Result<PullRequest> {
        let head = request.head_owner.as_ref().map_or_else(
            || request.head_branch.clone(),
            |owner| format!("{owner}:{}", request.head_branch),
        );

        let pr = self
            .client
            .pulls(&self.config.owner, &self.config.repo)
            .create(&request.title, head, &request.base)
            .send()
            .await?;

        if !request.reviewers.is_empty() {
            debug!("requesting reviews from {:?}", request.reviewers);
            self.client
                .pulls(&self.config.owner, &self.config.repo)
                .request_reviews(pr.number, request.reviewers.clone(), Vec::<String>::new())
                .await?;
        }

        if !request.labels.is_empty() {
            debug!("labelling #{} with {:?}", pr.number, request.labels);
            self.client
                .issues(&self.config.owner, &self.config.repo)
                .add_labels(pr.number, &request.labels)
                .await?;
        }

        Ok(to_pull_request(&pr))
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
