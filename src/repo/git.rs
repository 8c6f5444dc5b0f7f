//! `git` binary implementation of [`Vcs`]

use crate::error::{Error, Result};
use crate::repo::{
    parse_porcelain_status, DiffFormat, FetchOutcome, LocalBranches, MergeOutcome, Vcs,
    WorktreeStatus,
};
use crate::types::GitRemote;
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::sync::OnceLock;
use tokio::process::Command;
use tracing::debug;

fn missing_ref_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)couldn't find remote ref").expect("hardcoded pattern is valid")
    })
}

/// Repository driven through the `git` command line
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    /// Open the repository containing `path`
    pub async fn open(path: &Path) -> Result<Self> {
        let output = Command::new("git")
            .current_dir(path)
            .args(["rev-parse", "--show-toplevel"])
            .output()
            .await?;

        if !output.status.success() {
            return Err(Error::Git {
                command: "rev-parse --show-toplevel".to_string(),
                message: failure_message(&output),
            });
        }

        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Self {
            root: PathBuf::from(root),
        })
    }

    /// Working tree root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the `.git` directory
    pub async fn git_dir(&self) -> Result<PathBuf> {
        let dir = self.run(&["rev-parse", "--absolute-git-dir"]).await?;
        Ok(PathBuf::from(dir.trim()))
    }

    async fn output(&self, args: &[&str]) -> Result<Output> {
        debug!("git {}", args.join(" "));
        Ok(Command::new("git")
            .current_dir(&self.root)
            .args(args)
            .output()
            .await?)
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        let output = self.output(args).await?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(Error::Git {
                command: args.join(" "),
                message: failure_message(&output),
            })
        }
    }

    async fn unmerged_paths(&self) -> Result<Vec<String>> {
        let out = self
            .run(&["diff", "--name-only", "--diff-filter=U"])
            .await?;
        Ok(out.lines().map(ToString::to_string).collect())
    }
}

fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    } else {
        stderr
    }
}

fn with_paths<'a>(mut args: Vec<&'a str>, paths: &'a [String]) -> Vec<&'a str> {
    if !paths.is_empty() {
        args.push("--");
        args.extend(paths.iter().map(String::as_str));
    }
    args
}

#[async_trait]
impl Vcs for GitCli {
    async fn remotes(&self) -> Result<Vec<GitRemote>> {
        let out = self.run(&["remote", "-v"]).await?;
        let mut remotes: Vec<GitRemote> = Vec::new();
        for line in out.lines() {
            let mut parts = line.split_whitespace();
            let (Some(name), Some(url)) = (parts.next(), parts.next()) else {
                continue;
            };
            if !remotes.iter().any(|r| r.name == name) {
                remotes.push(GitRemote {
                    name: name.to_string(),
                    url: url.to_string(),
                });
            }
        }
        Ok(remotes)
    }

    async fn status(&self) -> Result<WorktreeStatus> {
        let out = self.run(&["status", "--porcelain"]).await?;
        Ok(parse_porcelain_status(&out))
    }

    async fn branches(&self) -> Result<LocalBranches> {
        let out = self
            .run(&["branch", "--format=%(refname:short)"])
            .await?;
        let all = out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('('))
            .map(ToString::to_string)
            .collect();

        let symbolic = self
            .output(&["symbolic-ref", "--quiet", "--short", "HEAD"])
            .await?;
        let current = if symbolic.status.success() {
            String::from_utf8_lossy(&symbolic.stdout).trim().to_string()
        } else {
            self.rev_parse("HEAD").await?
        };

        Ok(LocalBranches { all, current })
    }

    async fn fetch(&self, remote: &str, branch: &str) -> Result<FetchOutcome> {
        let output = self.output(&["fetch", remote, branch]).await?;
        if output.status.success() {
            return Ok(FetchOutcome::Fetched);
        }

        let message = failure_message(&output);
        if missing_ref_pattern().is_match(&message) {
            debug!("{remote} has no branch {branch}");
            return Ok(FetchOutcome::RemoteRefMissing);
        }
        Err(Error::Git {
            command: format!("fetch {remote} {branch}"),
            message,
        })
    }

    async fn checkout(&self, branch: &str) -> Result<()> {
        self.run(&["checkout", branch]).await.map(|_| ())
    }

    async fn checkout_paths(&self, from: &str, paths: &[String]) -> Result<()> {
        let args = with_paths(vec!["checkout", from], paths);
        self.run(&args).await.map(|_| ())
    }

    async fn discard_changes(&self) -> Result<()> {
        self.run(&["reset", "--hard", "HEAD"]).await.map(|_| ())
    }

    async fn merge(&self, reference: &str) -> Result<MergeOutcome> {
        let output = self.output(&["merge", "--no-edit", reference]).await?;
        if output.status.success() {
            return Ok(MergeOutcome::default());
        }

        let conflicts = self.unmerged_paths().await?;
        if conflicts.is_empty() {
            return Err(Error::Git {
                command: format!("merge --no-edit {reference}"),
                message: failure_message(&output),
            });
        }
        Ok(MergeOutcome { conflicts })
    }

    async fn abort_merge(&self) -> Result<()> {
        self.run(&["merge", "--abort"]).await.map(|_| ())
    }

    async fn rev_parse(&self, reference: &str) -> Result<String> {
        let out = self.run(&["rev-parse", "--verify", reference]).await?;
        Ok(out.trim().to_string())
    }

    async fn diff(
        &self,
        from: &str,
        to: &str,
        format: DiffFormat,
        paths: &[String],
    ) -> Result<String> {
        let flag = match format {
            DiffFormat::Stat => "--stat",
            DiffFormat::NameStatus => "--name-status",
        };
        let args = with_paths(vec!["diff", flag, from, to], paths);
        self.run(&args).await
    }

    async fn commit(&self, message: &str) -> Result<bool> {
        let staged = self.output(&["diff", "--cached", "--quiet"]).await?;
        if staged.status.success() {
            return Ok(false);
        }
        self.run(&["commit", "-m", message]).await?;
        Ok(true)
    }

    async fn last_commit_subject(&self, branch: &str) -> Result<String> {
        let out = self.run(&["log", "-1", "--format=%s", branch]).await?;
        Ok(out.trim().to_string())
    }

    async fn push(&self, remote: &str, branch: &str) -> Result<()> {
        self.run(&["push", remote, branch]).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_paths_appends_separator() {
        let paths = vec!["src/".to_string(), "README.md".to_string()];
        assert_eq!(
            with_paths(vec!["checkout", "feature"], &paths),
            vec!["checkout", "feature", "--", "src/", "README.md"]
        );
        assert_eq!(with_paths(vec!["diff"], &[]), vec!["diff"]);
    }

    #[test]
    fn test_missing_ref_pattern() {
        assert!(missing_ref_pattern().is_match("fatal: couldn't find remote ref develop"));
        assert!(missing_ref_pattern().is_match("fatal: Couldn't find remote ref refs/heads/x"));
        assert!(!missing_ref_pattern().is_match("fatal: unable to access"));
    }
}
