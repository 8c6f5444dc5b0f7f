//! CLI commands
//!
//! Command implementations for the `git-promote` binary.

mod auth;
mod policies;
mod progress;
mod promote;
mod records;
mod style;

pub use auth::{run_auth, AuthAction};
pub use policies::run_policies;
pub use promote::{run_promote, PromoteOptions};
pub use records::run_records;
pub use style::Stylize;

use git_promote::config::Config;
use git_promote::error::{Error, Result};
use git_promote::platform::LazyPlatformService;
use git_promote::repo::{GitCli, Vcs};
use git_promote::tracker::RecordStore;
use std::path::Path;

/// Repository, configuration and record store for one invocation
struct Workspace {
    repo: GitCli,
    config: Config,
    store: RecordStore,
}

impl Workspace {
    async fn open(path: &Path, config_path: Option<&Path>) -> Result<Self> {
        let repo = GitCli::open(path).await?;
        let config = Config::load(config_path, repo.root())?;
        let git_dir = repo.git_dir().await?;
        let store = RecordStore::new(config.settings.resolve_state_dir(repo.root(), &git_dir));
        Ok(Self {
            repo,
            config,
            store,
        })
    }

    /// Platform hosting the upstream remote, connected on first use
    async fn platform(&self) -> Result<LazyPlatformService> {
        let upstream = &self.config.settings.upstream_remote;
        let remote = self
            .repo
            .remotes()
            .await?
            .into_iter()
            .find(|r| &r.name == upstream)
            .ok_or_else(|| Error::RemoteMissing(upstream.clone()))?;
        LazyPlatformService::new(&remote.url)
    }
}
