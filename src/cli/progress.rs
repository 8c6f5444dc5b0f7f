//! Styled progress output for the promotion workflow

use crate::cli::style::{check, cross, hyperlink_url, spinner_style, Stream, Stylize};
use anstream::{eprintln, println};
use async_trait::async_trait;
use git_promote::types::PullRequest;
use git_promote::workflow::{Phase, ProgressCallback};
use indicatif::ProgressBar;
use std::sync::Mutex;
use std::time::Duration;

/// Prints each phase, with a spinner while non-interactive phases run
pub struct CliProgress {
    active: Mutex<Option<(Phase, ProgressBar)>>,
}

impl CliProgress {
    /// Create progress output with no phase running
    pub const fn new() -> Self {
        Self {
            active: Mutex::new(None),
        }
    }

    /// Close the running phase, marking it done when `success`
    pub fn finish(&self, success: bool) {
        let Ok(mut active) = self.active.lock() else {
            return;
        };
        if let Some((phase, bar)) = active.take() {
            bar.finish_and_clear();
            if success {
                println!("{} {phase}", check());
            } else {
                eprintln!("{} {phase}", cross().for_stderr());
            }
        }
    }

    /// Print without tearing the spinner
    fn print(&self, line: impl FnOnce()) {
        match self.active.lock() {
            Ok(active) => match active.as_ref() {
                Some((_, bar)) => bar.suspend(line),
                None => line(),
            },
            Err(_) => line(),
        }
    }
}

/// Phases that prompt the operator and must not draw a spinner
const fn is_interactive(phase: Phase) -> bool {
    matches!(
        phase,
        Phase::SelectingTarget | Phase::SelectingSource | Phase::Previewing
    )
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_phase(&self, phase: Phase) {
        self.finish(true);
        if phase == Phase::Complete || is_interactive(phase) {
            return;
        }

        let bar = ProgressBar::new_spinner();
        bar.set_style(spinner_style());
        bar.set_message(phase.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        if let Ok(mut active) = self.active.lock() {
            *active = Some((phase, bar));
        }
    }

    async fn on_merge(&self, remote: &str, conflicts: usize) {
        self.print(|| {
            println!(
                "  merged {} ({} conflicts)",
                remote.accent(),
                conflicts.to_string().muted()
            );
        });
    }

    async fn on_request(&self, request: &PullRequest, created: bool) {
        let verb = if created { "Created" } else { "Amending" };
        let number = format!("#{}", request.number);
        self.print(|| {
            println!(
                "  {verb} request {} {}",
                number.accent(),
                request.title.muted()
            );
            println!("    {}", hyperlink_url(Stream::Stdout, &request.html_url));
        });
    }

    async fn on_warning(&self, message: &str) {
        self.print(|| eprintln!("{}: {message}", "warning".warn().for_stderr()));
    }

    async fn on_message(&self, message: &str) {
        self.print(|| println!("  {}", message.muted()));
    }
}

impl Default for CliProgress {
    fn default() -> Self {
        Self::new()
    }
}
