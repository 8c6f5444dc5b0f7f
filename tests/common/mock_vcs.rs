//! In-memory repository for workflow tests
//!
//! Records every call as a short string (`"fetch upstream develop"`,
//! `"checkout develop"`, ...) so tests can assert on ordering and on what
//! never happened.

#![allow(dead_code)]

use async_trait::async_trait;
use git_promote::error::{Error, Result};
use git_promote::repo::{
    DiffFormat, FetchOutcome, LocalBranches, MergeOutcome, Vcs, WorktreeStatus,
};
use git_promote::types::GitRemote;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Scriptable [`Vcs`] double
pub struct MockVcs {
    remotes: Mutex<Vec<GitRemote>>,
    status: Mutex<WorktreeStatus>,
    branches: Mutex<Vec<String>>,
    current: Mutex<String>,
    missing_refs: Mutex<HashSet<String>>,
    conflicts: Mutex<HashMap<String, Vec<String>>>,
    stat: Mutex<String>,
    name_status: Mutex<String>,
    nothing_to_commit: Mutex<bool>,
    failures: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<String>>,
}

impl MockVcs {
    /// Clean repository on `feature` with `develop` and `main` branches,
    /// `origin` and `upstream` remotes, and one whitelisted change
    pub fn new() -> Self {
        Self {
            remotes: Mutex::new(vec![
                GitRemote {
                    name: "origin".to_string(),
                    url: "git@github.com:alice/repo.git".to_string(),
                },
                GitRemote {
                    name: "upstream".to_string(),
                    url: "git@github.com:upstream/repo.git".to_string(),
                },
            ]),
            status: Mutex::new(WorktreeStatus::default()),
            branches: Mutex::new(vec![
                "develop".to_string(),
                "feature".to_string(),
                "main".to_string(),
            ]),
            current: Mutex::new("feature".to_string()),
            missing_refs: Mutex::new(HashSet::new()),
            conflicts: Mutex::new(HashMap::new()),
            stat: Mutex::new(" src/a.txt | 2 +-\n 1 file changed\n".to_string()),
            name_status: Mutex::new("A\ta.txt\nM\tb.txt\n".to_string()),
            nothing_to_commit: Mutex::new(false),
            failures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    // === Scripting ===

    /// Drop a remote
    pub fn without_remote(self, name: &str) -> Self {
        self.remotes.lock().unwrap().retain(|r| r.name != name);
        self
    }

    /// Mark the working tree dirty
    pub fn with_modified(self, path: &str) -> Self {
        self.status.lock().unwrap().modified.push(path.to_string());
        self
    }

    /// Make `remote` report no `branch`
    pub fn with_missing_ref(self, remote: &str, branch: &str) -> Self {
        self.missing_refs
            .lock()
            .unwrap()
            .insert(format!("{remote}/{branch}"));
        self
    }

    /// Make merging `reference` leave `paths` conflicted
    pub fn with_conflicts(self, reference: &str, paths: &[&str]) -> Self {
        self.conflicts.lock().unwrap().insert(
            reference.to_string(),
            paths.iter().map(ToString::to_string).collect(),
        );
        self
    }

    /// Output of the `--stat` preview
    pub fn with_stat(self, stat: &str) -> Self {
        *self.stat.lock().unwrap() = stat.to_string();
        self
    }

    /// Output of the `--name-status` diff
    pub fn with_name_status(&self, output: &str) {
        *self.name_status.lock().unwrap() = output.to_string();
    }

    /// Make the promotion commit find nothing staged
    pub fn with_nothing_to_commit(self) -> Self {
        *self.nothing_to_commit.lock().unwrap() = true;
        self
    }

    /// Make the operation named `op` (`"push"`, `"commit"`, ...) fail
    pub fn fail_on(self, op: &str, message: &str) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(op.to_string(), message.to_string());
        self
    }

    // === Verification ===

    /// All calls in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls whose name starts with `prefix`
    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(prefix))
            .collect()
    }

    /// Whether any call started with `prefix`
    pub fn called(&self, prefix: &str) -> bool {
        !self.calls_starting_with(prefix).is_empty()
    }

    /// Branch checked out now
    pub fn current_branch(&self) -> String {
        self.current.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, op: &str) -> Result<()> {
        match self.failures.lock().unwrap().get(op) {
            Some(message) => Err(Error::Git {
                command: op.to_string(),
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Vcs for MockVcs {
    async fn remotes(&self) -> Result<Vec<GitRemote>> {
        Ok(self.remotes.lock().unwrap().clone())
    }

    async fn status(&self) -> Result<WorktreeStatus> {
        Ok(self.status.lock().unwrap().clone())
    }

    async fn branches(&self) -> Result<LocalBranches> {
        Ok(LocalBranches {
            all: self.branches.lock().unwrap().clone(),
            current: self.current_branch(),
        })
    }

    async fn fetch(&self, remote: &str, branch: &str) -> Result<FetchOutcome> {
        self.record(format!("fetch {remote} {branch}"));
        self.check("fetch")?;
        if self
            .missing_refs
            .lock()
            .unwrap()
            .contains(&format!("{remote}/{branch}"))
        {
            return Ok(FetchOutcome::RemoteRefMissing);
        }
        Ok(FetchOutcome::Fetched)
    }

    async fn checkout(&self, branch: &str) -> Result<()> {
        self.record(format!("checkout {branch}"));
        self.check("checkout")?;
        if !self.branches.lock().unwrap().iter().any(|b| b == branch) {
            return Err(Error::Git {
                command: format!("checkout {branch}"),
                message: format!("pathspec '{branch}' did not match"),
            });
        }
        *self.current.lock().unwrap() = branch.to_string();
        Ok(())
    }

    async fn checkout_paths(&self, from: &str, paths: &[String]) -> Result<()> {
        self.record(format!("checkout_paths {from} {}", paths.join(" ")));
        self.check("checkout_paths")
    }

    async fn discard_changes(&self) -> Result<()> {
        self.record("discard_changes".to_string());
        Ok(())
    }

    async fn merge(&self, reference: &str) -> Result<MergeOutcome> {
        self.record(format!("merge {reference}"));
        self.check("merge")?;
        Ok(MergeOutcome {
            conflicts: self
                .conflicts
                .lock()
                .unwrap()
                .get(reference)
                .cloned()
                .unwrap_or_default(),
        })
    }

    async fn abort_merge(&self) -> Result<()> {
        self.record("abort_merge".to_string());
        Ok(())
    }

    async fn rev_parse(&self, reference: &str) -> Result<String> {
        self.record(format!("rev_parse {reference}"));
        Ok(format!("{}0000", reference.replace('/', "_")))
    }

    async fn diff(
        &self,
        from: &str,
        to: &str,
        format: DiffFormat,
        _paths: &[String],
    ) -> Result<String> {
        self.record(format!("diff {from} {to} {format:?}"));
        self.check("diff")?;
        Ok(match format {
            DiffFormat::Stat => self.stat.lock().unwrap().clone(),
            DiffFormat::NameStatus => self.name_status.lock().unwrap().clone(),
        })
    }

    async fn commit(&self, message: &str) -> Result<bool> {
        self.record(format!("commit {message}"));
        self.check("commit")?;
        Ok(!*self.nothing_to_commit.lock().unwrap())
    }

    async fn last_commit_subject(&self, branch: &str) -> Result<String> {
        Ok(format!("Work on {branch}"))
    }

    async fn push(&self, remote: &str, branch: &str) -> Result<()> {
        self.record(format!("push {remote} {branch}"));
        self.check("push")
    }
}
