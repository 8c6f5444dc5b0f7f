//! Configuration loading
//!
//! Policies and settings come from a single TOML file. Searched in order:
//! 1. explicit path (the `--config` flag)
//! 2. `$GIT_PROMOTE_CONFIG`
//! 3. `<repo>/.git-promote.toml`
//! 4. `<config dir>/git-promote/config.toml`
//!
//! ```toml
//! [settings]
//! upstream_remote = "upstream"
//!
//! [branches.develop]
//! whitelist = ["src/", "package.json"]
//! reviewers = ["alice"]
//! labels = ["deploy"]
//!
//! [branches.develop.process]
//! name = "api"
//! path = "/srv/api"
//! execution_script = "yarn start"
//!
//! [branches.develop.steps]
//! rollback = "git checkout {last_commit} && pm2 restart {name}"
//! ```

use crate::error::{Error, Result};
use crate::policy::{InstructionTemplates, PolicySet, ProcessInfo, WhitelistPolicy};
use crate::types::RemoteNames;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "GIT_PROMOTE_CONFIG";

/// File name looked up at the repository root
pub const REPO_CONFIG_FILE: &str = ".git-promote.toml";

const DEFAULT_TITLE: &str = "new pull request by {author}";

/// General settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Remote holding the canonical repository
    pub upstream_remote: String,
    /// Remote holding the developer's fork
    pub origin_remote: String,
    /// Where request records live; relative paths resolve against the repo root.
    /// Defaults to `<git dir>/git-promote`.
    pub state_dir: Option<PathBuf>,
    /// Title for new requests; `{author}` is replaced with the author login
    pub title: String,
}

impl Default for Settings {
    fn default() -> Self {
        let remotes = RemoteNames::default();
        Self {
            upstream_remote: remotes.upstream,
            origin_remote: remotes.origin,
            state_dir: None,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

impl Settings {
    /// Configured remote names
    pub fn remotes(&self) -> RemoteNames {
        RemoteNames {
            origin: self.origin_remote.clone(),
            upstream: self.upstream_remote.clone(),
        }
    }

    /// Title for a request opened by `author`
    pub fn request_title(&self, author: &str) -> String {
        self.title.replace("{author}", author)
    }

    /// Resolve the record directory for a repository
    pub fn resolve_state_dir(&self, repo_root: &Path, git_dir: &Path) -> PathBuf {
        match &self.state_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => repo_root.join(dir),
            None => git_dir.join("git-promote"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BranchConfig {
    whitelist: Vec<String>,
    #[serde(default)]
    reviewers: Vec<String>,
    #[serde(default)]
    labels: Vec<String>,
    process: Option<ProcessInfo>,
    #[serde(default)]
    steps: InstructionTemplates,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    settings: Settings,
    #[serde(default)]
    branches: BTreeMap<String, BranchConfig>,
}

/// Loaded configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// General settings
    pub settings: Settings,
    /// Whitelist policies
    pub policies: PolicySet,
    /// File the configuration was read from
    pub source: PathBuf,
}

impl Config {
    /// Locate and load the configuration for a repository
    pub fn load(explicit: Option<&Path>, repo_root: &Path) -> Result<Self> {
        let candidates = Self::search_paths(explicit, repo_root);
        let Some(path) = candidates.iter().find(|p| p.is_file()) else {
            return Err(Error::ConfigNotFound(candidates));
        };
        debug!("loading config from {}", path.display());
        Self::from_file(path)
    }

    /// Candidate config locations, highest precedence first
    ///
    /// An explicit path or `$GIT_PROMOTE_CONFIG` is the only candidate when set.
    pub fn search_paths(explicit: Option<&Path>, repo_root: &Path) -> Vec<PathBuf> {
        if let Some(path) = explicit {
            return vec![path.to_path_buf()];
        }
        if let Ok(path) = env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return vec![PathBuf::from(path)];
            }
        }

        let mut paths = vec![repo_root.join(REPO_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("git-promote").join("config.toml"));
        }
        paths
    }

    /// Load and validate a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigInvalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content, path)
    }

    /// Parse and validate config text; `path` is used in error messages
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let invalid = |message: String| Error::ConfigInvalid {
            path: path.to_path_buf(),
            message,
        };

        let file: ConfigFile = toml::from_str(content).map_err(|e| invalid(e.to_string()))?;

        if file.settings.upstream_remote.trim().is_empty() {
            return Err(invalid("settings.upstream_remote is empty".to_string()));
        }

        let policies = file.branches.into_iter().map(|(branch, cfg)| WhitelistPolicy {
            branch,
            paths: cfg.whitelist,
            reviewers: cfg.reviewers,
            labels: cfg.labels,
            process: cfg.process,
            steps: cfg.steps,
        });

        let policies = PolicySet::new(policies).map_err(|e| match e {
            Error::ConfigInvalid { message, .. } => invalid(message),
            other => other,
        })?;

        Ok(Self {
            settings: file.settings,
            policies,
            source: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
[settings]
origin_remote = "fork"

[branches.develop]
whitelist = ["."]
reviewers = ["alice"]
labels = ["deploy"]

[branches.develop.process]
name = "api"
path = "/srv/api"
execution_script = "yarn start"

[branches.develop.steps]
rollback = "git checkout {last_commit}"

[branches.qa]
whitelist = ["package.json", "folder1/"]
"#;

    #[test]
    fn test_parse_sample() {
        let config = Config::parse(SAMPLE, Path::new("sample.toml")).unwrap();
        assert_eq!(config.settings.origin_remote, "fork");
        assert_eq!(config.settings.upstream_remote, "upstream");
        assert_eq!(config.policies.branches(), vec!["develop", "qa"]);

        let develop = config.policies.resolve("develop").unwrap();
        assert_eq!(develop.labels, vec!["deploy"]);
        assert_eq!(develop.process.as_ref().unwrap().name, "api");
        assert!(develop.steps.installation.is_none());

        let qa = config.policies.resolve("qa").unwrap();
        assert!(qa.reviewers.is_empty());
        assert_eq!(qa.paths, vec!["package.json", "folder1/"]);
    }

    #[test]
    fn test_empty_whitelist_is_invalid() {
        let err = Config::parse("[branches.main]\nwhitelist = []\n", Path::new("c.toml"))
            .unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { .. }));
        assert!(err.to_string().contains("main"));
        assert!(err.to_string().contains("c.toml"));
    }

    #[test]
    fn test_missing_whitelist_is_invalid() {
        let err = Config::parse("[branches.main]\nreviewers = [\"a\"]\n", Path::new("c.toml"))
            .unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { .. }));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = Config::parse("[settings]\nupstream = \"x\"\n", Path::new("c.toml"))
            .unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { .. }));
    }

    #[test]
    fn test_request_title() {
        let settings = Settings::default();
        assert_eq!(settings.request_title("bob"), "new pull request by bob");
    }

    #[test]
    fn test_state_dir_resolution() {
        let mut settings = Settings::default();
        let root = Path::new("/repo");
        let git_dir = Path::new("/repo/.git");
        assert_eq!(
            settings.resolve_state_dir(root, git_dir),
            PathBuf::from("/repo/.git/git-promote")
        );

        settings.state_dir = Some(PathBuf::from("records"));
        assert_eq!(
            settings.resolve_state_dir(root, git_dir),
            PathBuf::from("/repo/records")
        );
    }

    #[test]
    fn test_explicit_path_wins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = Config::load(Some(file.path()), Path::new("/nonexistent")).unwrap();
        assert_eq!(config.source, file.path());
    }

    #[test]
    fn test_explicit_missing_path_not_found() {
        let err = Config::load(Some(Path::new("/nonexistent/x.toml")), Path::new("/")).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }
}
