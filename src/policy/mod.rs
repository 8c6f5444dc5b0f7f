//! Per-target-branch whitelist policies
//!
//! A policy names the paths that may be promoted onto a target branch, who
//! reviews the resulting request, how it is labelled, and the instruction
//! templates written next to the request record.

mod template;

pub use template::{render, TemplateSlots};

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Process the target branch deploys, used to fill instruction templates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessInfo {
    /// Process name
    pub name: String,
    /// Installation directory
    pub path: String,
    /// Command that launches the process
    pub execution_script: String,
}

/// Instruction templates, each optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstructionTemplates {
    /// What must be installed beforehand
    pub preconditions: Option<String>,
    /// How to install the change
    pub installation: Option<String>,
    /// How to verify the installation
    pub verification: Option<String>,
    /// How to roll the installation back
    pub rollback: Option<String>,
}

/// Complete policy for one target branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhitelistPolicy {
    /// Target branch this policy applies to
    pub branch: String,
    /// Ordered path patterns eligible for promotion (never empty)
    pub paths: Vec<String>,
    /// Ordered reviewer logins
    pub reviewers: Vec<String>,
    /// Ordered labels
    pub labels: Vec<String>,
    /// Deployed process, if any
    pub process: Option<ProcessInfo>,
    /// Instruction templates
    pub steps: InstructionTemplates,
}

impl WhitelistPolicy {
    /// Reviewers other than the request author
    pub fn reviewers_excluding(&self, author: &str) -> Vec<String> {
        self.reviewers
            .iter()
            .filter(|r| !r.eq_ignore_ascii_case(author))
            .cloned()
            .collect()
    }
}

/// All configured policies, keyed by target branch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicySet {
    policies: BTreeMap<String, WhitelistPolicy>,
}

impl PolicySet {
    /// Build a set from complete policies
    ///
    /// Rejects any policy with an empty path set.
    pub fn new(policies: impl IntoIterator<Item = WhitelistPolicy>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for policy in policies {
            if policy.paths.iter().all(|p| p.trim().is_empty()) {
                return Err(Error::ConfigInvalid {
                    path: std::path::PathBuf::new(),
                    message: format!("branch '{}' has an empty whitelist", policy.branch),
                });
            }
            map.insert(policy.branch.clone(), policy);
        }
        Ok(Self { policies: map })
    }

    /// Policy for `target`, or `NOT_WHITELIST_CONFIG_FOUND_FOR_BRANCH`
    pub fn resolve(&self, target: &str) -> Result<&WhitelistPolicy> {
        self.policies
            .get(target)
            .ok_or_else(|| Error::NotWhitelistConfigFoundForBranch(target.to_string()))
    }

    /// Target branches offered for selection
    pub fn branches(&self) -> Vec<String> {
        self.policies.keys().cloned().collect()
    }

    /// Iterate over every policy
    pub fn iter(&self) -> impl Iterator<Item = &WhitelistPolicy> {
        self.policies.values()
    }

    /// Number of configured branches
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Whether no branch is configured
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(branch: &str, paths: &[&str]) -> WhitelistPolicy {
        WhitelistPolicy {
            branch: branch.to_string(),
            paths: paths.iter().map(ToString::to_string).collect(),
            reviewers: vec!["alice".into(), "bob".into()],
            labels: vec![],
            process: None,
            steps: InstructionTemplates::default(),
        }
    }

    #[test]
    fn test_resolve_known_branch() {
        let set = PolicySet::new([policy("develop", &["src/"])]).unwrap();
        assert_eq!(set.resolve("develop").unwrap().paths, vec!["src/"]);
    }

    #[test]
    fn test_resolve_unknown_branch() {
        let set = PolicySet::new([policy("develop", &["src/"])]).unwrap();
        let err = set.resolve("main").unwrap_err();
        assert!(matches!(err, Error::NotWhitelistConfigFoundForBranch(b) if b == "main"));
    }

    #[test]
    fn test_empty_whitelist_rejected() {
        let err = PolicySet::new([policy("develop", &[])]).unwrap_err();
        assert!(err.to_string().contains("empty whitelist"));
    }

    #[test]
    fn test_branches_sorted() {
        let set = PolicySet::new([policy("qa", &["."]), policy("develop", &["."])]).unwrap();
        assert_eq!(set.branches(), vec!["develop", "qa"]);
    }

    #[test]
    fn test_reviewers_excluding_author() {
        let p = policy("develop", &["."]);
        assert_eq!(p.reviewers_excluding("Alice"), vec!["bob"]);
        assert_eq!(p.reviewers_excluding("carol").len(), 2);
    }
}
