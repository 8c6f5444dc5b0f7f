//! End-to-end promotion run

use super::progress::ProgressCallback;
use super::prompt::Prompter;
use super::state::{Phase, WorkflowState};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::inspect::{RemoteStateInspector, RepoStatus};
use crate::platform::{repo_owner, PlatformService};
use crate::policy::{PolicySet, TemplateSlots, WhitelistPolicy};
use crate::repo::Vcs;
use crate::sync::{PromotionCommit, SyncEngine};
use crate::tracker::{
    Increment, RecordStore, RequestDraft, ReviewRequestRecord, ReviewRequestTracker,
};
use crate::types::{PullRequest, RemoteNames};
use chrono::{Local, NaiveDate};
use tracing::{debug, error, info};

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionReport {
    /// Final workflow state
    pub state: WorkflowState,
    /// Request the changes went into
    pub request: PullRequest,
    /// Whether this run filed the request
    pub created: bool,
    /// Promotion commit on the target
    pub commit: PromotionCommit,
    /// Whether the target was pushed to origin
    pub pushed: bool,
    /// Entries newly listed in the request
    pub increment: Increment,
    /// Record after this run
    pub record: ReviewRequestRecord,
    /// Whether the original branch was checked out again
    pub restored: bool,
}

/// How a run ended, when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// Changes promoted and tracked
    Completed(Box<PromotionReport>),
    /// Operator declined the preview; nothing was changed
    Cancelled,
}

/// Sequences inspection, sync and tracking for one run
pub struct Orchestrator<'a> {
    vcs: &'a dyn Vcs,
    platform: &'a dyn PlatformService,
    settings: &'a Settings,
    policies: &'a PolicySet,
    store: RecordStore,
    today: NaiveDate,
}

impl<'a> Orchestrator<'a> {
    /// Create an orchestrator dated today
    pub fn new(
        vcs: &'a dyn Vcs,
        platform: &'a dyn PlatformService,
        settings: &'a Settings,
        policies: &'a PolicySet,
        store: RecordStore,
    ) -> Self {
        Self {
            vcs,
            platform,
            settings,
            policies,
            store,
            today: Local::now().date_naive(),
        }
    }

    /// Stamp recorded entries with `date` instead of today
    #[must_use]
    pub const fn with_date(mut self, date: NaiveDate) -> Self {
        self.today = date;
        self
    }

    fn remotes(&self) -> RemoteNames {
        self.settings.remotes()
    }

    /// Run the workflow
    ///
    /// Whatever happens after inspection, the branch checked out at the start
    /// is checked out again before returning.
    pub async fn run(
        &self,
        prompter: &dyn Prompter,
        progress: &dyn ProgressCallback,
    ) -> Result<WorkflowOutcome> {
        progress.on_phase(Phase::Inspecting).await;
        let inspector = RemoteStateInspector::new(self.vcs);
        inspector.require_remote(&self.remotes().upstream).await?;
        let status = inspector.require_clean().await?;

        let state = WorkflowState::start(&status.current_branch);
        let result = self.drive(state, &status, prompter, progress).await;

        progress.on_phase(Phase::Restoring).await;
        let restored = self.restore(&status.current_branch, progress).await;

        match result {
            Ok(WorkflowOutcome::Completed(mut report)) => {
                report.restored = restored;
                report.state = report.state.at(Phase::Complete);
                progress.on_phase(Phase::Complete).await;
                Ok(WorkflowOutcome::Completed(report))
            }
            Err(Error::PromptDismissed) => {
                info!("prompt dismissed, nothing was promoted");
                Ok(WorkflowOutcome::Cancelled)
            }
            other => other,
        }
    }

    async fn restore(&self, original: &str, progress: &dyn ProgressCallback) -> bool {
        let current = match self.vcs.branches().await {
            Ok(branches) => branches.current,
            Err(e) => {
                error!("could not read the current branch: {e}");
                return false;
            }
        };
        if current == original {
            return true;
        }

        debug!("returning from {current} to {original}");
        match self.vcs.checkout(original).await {
            Ok(()) => true,
            Err(e) => {
                error!("could not check out '{original}' again: {e}");
                progress
                    .on_warning(&format!(
                        "still on '{current}', run `git checkout {original}` to return"
                    ))
                    .await;
                false
            }
        }
    }

    async fn drive(
        &self,
        state: WorkflowState,
        status: &RepoStatus,
        prompter: &dyn Prompter,
        progress: &dyn ProgressCallback,
    ) -> Result<WorkflowOutcome> {
        let remotes = self.remotes();
        let inspector = RemoteStateInspector::new(self.vcs);

        let state = state.at(Phase::SelectingTarget);
        progress.on_phase(state.phase).await;
        let target = prompter.select_target(&self.policies.branches())?;
        let policy = self.policies.resolve(&target)?;
        inspector.require_local_branch(&target).await?;
        let state = state.with_target(&target).at(Phase::Fetching);

        progress.on_phase(state.phase).await;
        let origin_configured = inspector.has_remote(&remotes.origin).await?;
        if !origin_configured {
            progress
                .on_warning(&format!(
                    "remote '{}' is not configured, the target will not be pushed",
                    remotes.origin
                ))
                .await;
        }
        let mut engine = SyncEngine::new(self.vcs, remotes.clone());
        let fetched = engine.fetch(&target, origin_configured).await?;

        let state = state.at(Phase::SelectingSource);
        progress.on_phase(state.phase).await;
        let source = prompter.select_source(&status.local_branches, &status.current_branch)?;
        inspector.require_local_branch(&source).await?;
        let state = state.with_source(&source).at(Phase::Previewing);

        progress.on_phase(state.phase).await;
        let preview = engine.preview(&source, &target, &policy.paths).await?;
        if !prompter.confirm_changes(&source, &target, &preview)? {
            info!("promotion of '{source}' into '{target}' cancelled");
            return Ok(WorkflowOutcome::Cancelled);
        }

        let state = state.at(Phase::Merging);
        progress.on_phase(state.phase).await;
        let merged = engine.merge(&target, fetched).await?;
        if fetched.origin_available {
            progress.on_merge(&remotes.origin, merged.origin_conflicts).await;
        }
        progress.on_merge(&remotes.upstream, merged.upstream_conflicts).await;
        let state = state.with_merge(&merged).at(Phase::Promoting);

        progress.on_phase(state.phase).await;
        let commit = engine.promote(&source, &target, &policy.paths).await?;
        let state = state.at(Phase::Pushing);

        progress.on_phase(state.phase).await;
        let pushed = engine.push(&target, origin_configured).await?;
        let state = state.at(Phase::Diffing);

        progress.on_phase(state.phase).await;
        let entries = engine.diff(&target, self.today).await?;
        let state = state.at(Phase::Tracking);

        progress.on_phase(state.phase).await;
        let author = self.platform.current_user().await?;
        let draft = RequestDraft {
            title: self.settings.request_title(&author),
            head_owner: self.origin_owner(origin_configured).await?,
            author,
        };
        let slots = template_slots(policy, &target, &merged.upstream_commit);

        let tracker = ReviewRequestTracker::new(self.platform, self.store.clone());
        let tracked = tracker
            .amend_or_create(&target, policy, &draft, &slots)
            .await?;
        progress.on_request(&tracked.request, tracked.created).await;

        let update = tracker.record_increment(tracked.request.number, &entries)?;
        if update.increment.is_empty() {
            progress
                .on_message("no new files, the request already lists every change")
                .await;
        }
        let state = state.with_new_files(update.increment.entries.clone());

        Ok(WorkflowOutcome::Completed(Box::new(PromotionReport {
            state,
            request: tracked.request,
            created: tracked.created,
            commit,
            pushed,
            increment: update.increment,
            record: update.record,
            restored: false,
        })))
    }

    async fn origin_owner(&self, origin_configured: bool) -> Result<Option<String>> {
        if !origin_configured {
            return Ok(None);
        }
        let origin = self.remotes().origin;
        Ok(self
            .vcs
            .remotes()
            .await?
            .into_iter()
            .find(|r| r.name == origin)
            .and_then(|r| repo_owner(&r.url)))
    }
}

fn template_slots(policy: &WhitelistPolicy, target: &str, upstream_commit: &str) -> TemplateSlots {
    let process = policy.process.clone().unwrap_or_default();
    TemplateSlots {
        path: process.path,
        branch: target.to_string(),
        execution_script: process.execution_script,
        process_name: process.name,
        last_commit: upstream_commit.to_string(),
    }
}
