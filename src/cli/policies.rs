//! Policies command - show configured target branches

use crate::cli::style::{bullet, Stylize};
use anstream::println;
use git_promote::config::Config;
use git_promote::error::Result;
use git_promote::repo::GitCli;
use std::path::Path;

/// Print every whitelist policy
///
/// Outside a repository, `path` stands in for the repository root.
pub async fn run_policies(path: &Path, config_path: Option<&Path>) -> Result<()> {
    let repo_root = match GitCli::open(path).await {
        Ok(repo) => repo.root().to_path_buf(),
        Err(_) => path.to_path_buf(),
    };
    let config = Config::load(config_path, &repo_root)?;

    println!(
        "{} {}",
        "Policies from".muted(),
        config.source.display()
    );
    for policy in config.policies.iter() {
        println!();
        println!("{}", policy.branch.emphasis());
        for path in &policy.paths {
            println!("  {} {path}", bullet());
        }
        if !policy.reviewers.is_empty() {
            println!("  {} {}", "reviewers:".muted(), policy.reviewers.join(", "));
        }
        if !policy.labels.is_empty() {
            println!("  {} {}", "labels:".muted(), policy.labels.join(", "));
        }
        if let Some(process) = &policy.process {
            println!(
                "  {} {} in {}",
                "process:".muted(),
                process.name,
                process.path
            );
        }
    }
    Ok(())
}
