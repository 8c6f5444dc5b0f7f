//! GitLab platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{NewPullRequest, Platform, PlatformConfig, PullRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// GitLab service using reqwest
pub struct GitLabService {
    client: Client,
    token: String,
    api_base: String,
    config: PlatformConfig,
    project_path: String,
}

#[derive(Deserialize)]
struct MrAuthor {
    username: String,
}

#[derive(Deserialize)]
struct MergeRequest {
    iid: u64,
    web_url: String,
    source_branch: String,
    target_branch: String,
    title: String,
    author: MrAuthor,
}

impl From<MergeRequest> for PullRequest {
    fn from(mr: MergeRequest) -> Self {
        Self {
            number: mr.iid,
            html_url: mr.web_url,
            base_ref: mr.target_branch,
            head_ref: mr.source_branch,
            title: mr.title,
            author: mr.author.username,
        }
    }
}

#[derive(Deserialize)]
struct Project {
    id: u64,
}

#[derive(Deserialize)]
struct User {
    id: u64,
    username: String,
}

#[derive(Serialize)]
struct CreateMrPayload {
    source_branch: String,
    target_branch: String,
    title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_project_id: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    reviewer_ids: Vec<u64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    labels: String,
}

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Response header naming the next page of a list, empty on the last page
const NEXT_PAGE_HEADER: &str = "x-next-page";

impl GitLabService {
    /// Create a new GitLab service
    pub fn new(token: String, owner: String, repo: String, host: Option<String>) -> Self {
        let host = host.unwrap_or_else(|| "gitlab.com".to_string());
        let api_base = format!("https://{host}/api/v4");
        let config_host = if host == "gitlab.com" { None } else { Some(host) };
        Self::with_api_base(token, owner, repo, config_host, api_base)
    }

    /// Create a service talking to an explicit API base URL (`.../api/v4`)
    pub fn with_api_base(
        token: String,
        owner: String,
        repo: String,
        host: Option<String>,
        api_base: String,
    ) -> Self {
        let project_path = format!("{owner}/{repo}");

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            token,
            api_base: api_base.trim_end_matches('/').to_string(),
            config: PlatformConfig {
                platform: Platform::GitLab,
                owner,
                repo,
                host,
            },
            project_path,
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn encoded(project_path: &str) -> String {
        urlencoding::encode(project_path).into_owned()
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let mut request = self.client.get(url).header("PRIVATE-TOKEN", &self.token);
        if !query.is_empty() {
            request = request.query(query);
        }
        Ok(request
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::GitLabApi(e.to_string()))?
            .json()
            .await?)
    }

    /// Every page of a list endpoint, following `x-next-page`
    async fn get_all<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = "1".to_string();
        loop {
            let response = self
                .client
                .get(url)
                .header("PRIVATE-TOKEN", &self.token)
                .query(query)
                .query(&[("page", page.as_str())])
                .send()
                .await?
                .error_for_status()
                .map_err(|e| Error::GitLabApi(e.to_string()))?;

            let next = response
                .headers()
                .get(NEXT_PAGE_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty() && *v != page)
                .map(ToString::to_string);

            let batch: Vec<T> = response.json().await?;
            items.extend(batch);

            match next {
                Some(n) => page = n,
                None => break,
            }
        }
        Ok(items)
    }

    async fn project_id(&self, project_path: &str) -> Result<u64> {
        let url = self.api_url(&format!("/projects/{}", Self::encoded(project_path)));
        let project: Project = self.get_json(&url, &[]).await?;
        Ok(project.id)
    }

    async fn user_ids(&self, usernames: &[String]) -> Result<Vec<u64>> {
        let url = self.api_url("/users");
        let mut ids = Vec::with_capacity(usernames.len());
        for name in usernames {
            let users: Vec<User> = self.get_json(&url, &[("username", name)]).await?;
            match users.into_iter().find(|u| u.username.eq_ignore_ascii_case(name)) {
                Some(user) => ids.push(user.id),
                None => tracing::warn!("GitLab user '{name}' not found, not adding as reviewer"),
            }
        }
        Ok(ids)
    }
}

#[async_trait]
impl PlatformService for GitLabService {
    async fn current_user(&self) -> Result<String> {
        let user: User = self
            .get_json(&self.api_url("/user"), &[])
            .await
            .map_err(|e| Error::Auth(format!("Invalid token: {e}")))?;
        Ok(user.username)
    }

    async fn list_open_requests(&self, base_branch: &str) -> Result<Vec<PullRequest>> {
        let url = self.api_url(&format!(
            "/projects/{}/merge_requests",
            Self::encoded(&self.project_path)
        ));

        let mrs: Vec<MergeRequest> = self
            .get_all(
                &url,
                &[
                    ("target_branch", base_branch),
                    ("state", "opened"),
                    ("per_page", "100"),
                ],
            )
            .await?;

        Ok(mrs.into_iter().map(PullRequest::from).collect())
    }

    async fn get_request(&self, number: u64) -> Result<PullRequest> {
        let url = self.api_url(&format!(
            "/projects/{}/merge_requests/{number}",
            Self::encoded(&self.project_path)
        ));
        let mr: MergeRequest = self.get_json(&url, &[]).await?;
        Ok(mr.into())
    }

    async fn create_request(&self, request: &NewPullRequest) -> Result<PullRequest> {
        // Fork heads open the MR in the fork, targeting the upstream project.
        let (source_project, target_project_id) = match &request.head_owner {
            Some(owner) if *owner != self.config.owner => {
                let fork = format!("{owner}/{}", self.config.repo);
                (fork, Some(self.project_id(&self.project_path).await?))
            }
            _ => (self.project_path.clone(), None),
        };

        let payload = CreateMrPayload {
            source_branch: request.head_branch.clone(),
            target_branch: request.base.clone(),
            title: request.title.clone(),
            target_project_id,
            reviewer_ids: self.user_ids(&request.reviewers).await?,
            labels: request.labels.join(","),
        };

        let url = self.api_url(&format!(
            "/projects/{}/merge_requests",
            Self::encoded(&source_project)
        ));

        let mr: MergeRequest = self
            .client
            .post(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&payload)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::GitLabApi(e.to_string()))?
            .json()
            .await?;

        Ok(mr.into())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
