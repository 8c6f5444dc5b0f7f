//! Test data factories for git-promote types
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use chrono::NaiveDate;
use git_promote::config::Settings;
use git_promote::error::{Error, Result};
use git_promote::policy::{InstructionTemplates, PolicySet, ProcessInfo, WhitelistPolicy};
use git_promote::types::PullRequest;
use git_promote::workflow::Prompter;

/// Fixed run date
pub fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()
}

/// Policy for `branch` over `paths`, reviewed by alice and bob
pub fn make_policy(branch: &str, paths: &[&str]) -> WhitelistPolicy {
    WhitelistPolicy {
        branch: branch.to_string(),
        paths: paths.iter().map(ToString::to_string).collect(),
        reviewers: vec!["alice".to_string(), "bob".to_string()],
        labels: vec!["promotion".to_string()],
        process: Some(ProcessInfo {
            name: "api".to_string(),
            path: "/srv/api".to_string(),
            execution_script: "npm start".to_string(),
        }),
        steps: InstructionTemplates {
            preconditions: None,
            installation: Some("cd {path} && git pull upstream {branch}".to_string()),
            verification: Some("check {name} is running".to_string()),
            rollback: Some("git reset --hard {last_commit} && restart {name}".to_string()),
        },
    }
}

/// Only `develop` is configured
pub fn make_policies() -> PolicySet {
    PolicySet::new([make_policy("develop", &["src/", "config/app.json"])]).unwrap()
}

/// Default settings
pub fn make_settings() -> Settings {
    Settings::default()
}

/// Open request against `base` authored by `author`
pub fn make_pull_request(number: u64, base: &str, author: &str) -> PullRequest {
    PullRequest {
        number,
        html_url: format!("https://github.com/upstream/repo/pull/{number}"),
        base_ref: base.to_string(),
        head_ref: base.to_string(),
        title: format!("new pull request by {author}"),
        author: author.to_string(),
    }
}

/// Prompter with canned answers
pub struct ScriptedPrompter {
    /// Target answer
    pub target: String,
    /// Source answer
    pub source: String,
    /// Confirmation answer
    pub confirm: bool,
    /// Dismiss the source prompt instead of answering
    pub dismiss_source: bool,
}

impl ScriptedPrompter {
    /// Promote `source` into `target` and confirm
    pub fn new(target: &str, source: &str) -> Self {
        Self {
            target: target.to_string(),
            source: source.to_string(),
            confirm: true,
            dismiss_source: false,
        }
    }

    /// Decline the preview
    pub fn declining(mut self) -> Self {
        self.confirm = false;
        self
    }

    /// Dismiss the source branch prompt (Esc or Ctrl-C)
    pub fn dismissing_source(mut self) -> Self {
        self.dismiss_source = true;
        self
    }
}

impl Prompter for ScriptedPrompter {
    fn select_target(&self, _targets: &[String]) -> Result<String> {
        Ok(self.target.clone())
    }

    fn select_source(&self, _branches: &[String], _current: &str) -> Result<String> {
        if self.dismiss_source {
            return Err(Error::PromptDismissed);
        }
        Ok(self.source.clone())
    }

    fn confirm_changes(&self, _source: &str, _target: &str, _preview: &str) -> Result<bool> {
        Ok(self.confirm)
    }
}
