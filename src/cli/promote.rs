//! Promote command - run the promotion workflow interactively

use crate::cli::progress::CliProgress;
use crate::cli::style::{bullet, check, hyperlink_url, Stream, Stylize};
use crate::cli::Workspace;
use anstream::{eprintln, println};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Select};
use git_promote::error::{Error, Result};
use git_promote::workflow::{Orchestrator, Prompter, WorkflowOutcome};
use std::io;
use std::path::Path;
use tracing::warn;

/// Answers given on the command line
#[derive(Debug, Clone, Default)]
pub struct PromoteOptions {
    /// Target branch, skipping the prompt
    pub target: Option<String>,
    /// Source branch, skipping the prompt
    pub source: Option<String>,
    /// Accept the change preview without asking
    pub yes: bool,
    /// Open the request in the browser afterwards
    pub open: bool,
}

/// Prompts with dialoguer unless the answer was given as a flag
struct InteractivePrompter<'a> {
    options: &'a PromoteOptions,
}

/// Ctrl-C while a prompt is open counts as dismissing it
fn prompt_error(err: dialoguer::Error) -> Error {
    match err {
        dialoguer::Error::IO(e) if e.kind() == io::ErrorKind::Interrupted => Error::PromptDismissed,
        dialoguer::Error::IO(e) => Error::Io(e),
    }
}

/// Esc or `q` on a prompt yields no answer
fn answered<T>(answer: Option<T>) -> Result<T> {
    answer.ok_or(Error::PromptDismissed)
}

impl Prompter for InteractivePrompter<'_> {
    fn select_target(&self, targets: &[String]) -> Result<String> {
        if let Some(target) = &self.options.target {
            return Ok(target.clone());
        }
        if targets.is_empty() {
            return Err(Error::NotWhitelistConfigFoundForBranch(String::new()));
        }
        let index = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Target branch")
            .items(targets)
            .default(0)
            .interact_opt()
            .map_err(prompt_error)
            .and_then(answered)?;
        Ok(targets[index].clone())
    }

    fn select_source(&self, branches: &[String], current: &str) -> Result<String> {
        if let Some(source) = &self.options.source {
            return Ok(source.clone());
        }
        let default = branches.iter().position(|b| b == current).unwrap_or(0);
        let index = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Source branch")
            .items(branches)
            .default(default)
            .interact_opt()
            .map_err(prompt_error)
            .and_then(answered)?;
        Ok(branches[index].clone())
    }

    fn confirm_changes(&self, source: &str, target: &str, preview: &str) -> Result<bool> {
        println!(
            "Whitelisted changes from {} to {}:",
            source.accent(),
            target.accent()
        );
        println!("{}", preview.trim_end());
        if self.options.yes {
            return Ok(true);
        }
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Promote these changes?")
            .default(false)
            .interact_opt()
            .map_err(prompt_error)
            .map(|answer| answer.unwrap_or(false))
    }
}

/// Run the promote command
pub async fn run_promote(
    path: &Path,
    config_path: Option<&Path>,
    options: &PromoteOptions,
) -> Result<()> {
    let workspace = Workspace::open(path, config_path).await?;
    let platform = workspace.platform().await?;

    let orchestrator = Orchestrator::new(
        &workspace.repo,
        &platform,
        &workspace.config.settings,
        &workspace.config.policies,
        workspace.store.clone(),
    );
    let prompter = InteractivePrompter { options };
    let progress = CliProgress::new();

    let outcome = orchestrator.run(&prompter, &progress).await;
    progress.finish(outcome.is_ok());

    let report = match outcome? {
        WorkflowOutcome::Cancelled => {
            println!("{}", "Promotion cancelled, nothing was changed".muted());
            return Ok(());
        }
        WorkflowOutcome::Completed(report) => report,
    };

    let verb = if report.created { "Created" } else { "Updated" };
    println!(
        "{} {verb} request {} against {}",
        check(),
        format!("#{}", report.request.number).accent(),
        report.request.base_ref.accent()
    );
    println!("  {}", hyperlink_url(Stream::Stdout, &report.request.html_url));

    if report.increment.is_empty() {
        println!("  {}", "No new files to list".muted());
    } else {
        println!(
            "  {} new files ({} listed in total):",
            report.increment.len().to_string().accent(),
            report.record.files.len()
        );
        for entry in &report.increment.entries {
            println!(
                "    {} {} {}",
                bullet(),
                entry.path,
                entry.kind.description().muted()
            );
        }
    }
    println!(
        "  {} {}",
        "Instructions:".muted(),
        workspace
            .store
            .request_dir(report.request.number)
            .display()
    );
    if !report.restored {
        eprintln!(
            "{}: could not return to '{}'",
            "warning".warn().for_stderr(),
            report.state.original_branch
        );
    }

    if options.open {
        if let Err(e) = open::that(&report.request.html_url) {
            warn!("could not open browser: {e}");
        }
    }
    Ok(())
}
