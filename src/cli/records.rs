//! Records command - list and prune stored request records

use crate::cli::style::{check, Stylize};
use crate::cli::Workspace;
use anstream::println;
use git_promote::error::Result;
use git_promote::tracker::ReviewRequestTracker;
use std::path::Path;

/// List stored records, deleting those of closed requests when `prune`
pub async fn run_records(path: &Path, config_path: Option<&Path>, prune: bool) -> Result<()> {
    let workspace = Workspace::open(path, config_path).await?;
    let store = &workspace.store;

    if prune {
        let platform = workspace.platform().await?;
        let tracker = ReviewRequestTracker::new(&platform, store.clone());
        let removed = tracker.prune_closed(&workspace.config.policies.branches()).await?;
        for number in &removed {
            println!("{} Removed record for closed request #{number}", check());
        }
    }

    let numbers = store.list()?;
    if numbers.is_empty() {
        println!("{}", format!("No records in {}", store.root().display()).muted());
        return Ok(());
    }

    println!("{} {}", "Records in".muted(), store.root().display());
    for number in numbers {
        let record = store.load(number)?;
        println!(
            "  {} {} files",
            format!("#{number}").accent(),
            record.files.len()
        );
    }
    Ok(())
}
