//! Review-request tracking across runs
//!
//! A promotion either amends the caller's open request against the target
//! branch or files a new one. Files already listed in that request are kept
//! in a [`RecordStore`], so re-running only appends what is new.

mod increment;
mod instructions;
mod record;

pub use increment::{compute_increment, Increment, BATCH_SIZE};
pub use instructions::{render_entries, render_instructions, README};
pub use record::{RecordStore, ReviewRequestRecord};

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::policy::{TemplateSlots, WhitelistPolicy};
use crate::types::{FileChangeEntry, NewPullRequest, PullRequest};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

const README_FILE: &str = "README.txt";
const INSTRUCTIONS_FILE: &str = "INSTRUCTIONS.txt";

/// Who files a new request, and how it is titled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDraft {
    /// Login of the operator
    pub author: String,
    /// Title for a new request
    pub title: String,
    /// Owner of the fork holding the pushed target, if any
    pub head_owner: Option<String>,
}

/// Request the run is contributing to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedRequest {
    /// The request
    pub request: PullRequest,
    /// Whether this run filed it
    pub created: bool,
}

/// Files newly listed by one run, and the record after persisting them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordUpdate {
    /// Entries appended to the instructions
    pub increment: Increment,
    /// Persisted record
    pub record: ReviewRequestRecord,
}

/// Finds, files and records review requests
pub struct ReviewRequestTracker<'a> {
    platform: &'a dyn PlatformService,
    store: RecordStore,
}

impl<'a> ReviewRequestTracker<'a> {
    /// Create a tracker persisting into `store`
    pub const fn new(platform: &'a dyn PlatformService, store: RecordStore) -> Self {
        Self { platform, store }
    }

    /// Record store in use
    pub const fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Open request against `target` filed by `author`
    ///
    /// When several match, the most recent (highest number) wins.
    pub async fn find_open_request(&self, target: &str, author: &str) -> Result<Option<PullRequest>> {
        let open = self
            .platform
            .list_open_requests(target)
            .await
            .map_err(|e| Error::ListOpenRequests {
                branch: target.to_string(),
                message: e.to_string(),
            })?;

        debug!("{} open requests against {target}", open.len());
        Ok(open
            .into_iter()
            .filter(|pr| pr.author.eq_ignore_ascii_case(author))
            .max_by_key(|pr| pr.number))
    }

    /// Record of files already listed in request `number`
    pub fn load_record(&self, number: u64) -> Result<ReviewRequestRecord> {
        self.store.load(number)
    }

    /// Reuse the author's open request against `target`, or file one
    ///
    /// The request folder gets its README and instruction header the first
    /// time it is seen.
    pub async fn amend_or_create(
        &self,
        target: &str,
        policy: &WhitelistPolicy,
        draft: &RequestDraft,
        slots: &TemplateSlots,
    ) -> Result<TrackedRequest> {
        let tracked = match self.find_open_request(target, &draft.author).await? {
            Some(request) => {
                info!("amending open request #{}: {}", request.number, request.html_url);
                TrackedRequest {
                    request,
                    created: false,
                }
            }
            None => {
                let new = NewPullRequest {
                    head_owner: draft.head_owner.clone(),
                    head_branch: target.to_string(),
                    base: target.to_string(),
                    title: draft.title.clone(),
                    reviewers: policy.reviewers_excluding(&draft.author),
                    labels: policy.labels.clone(),
                };
                let request = self.platform.create_request(&new).await.map_err(|e| {
                    Error::CreateRequest {
                        branch: target.to_string(),
                        message: e.to_string(),
                    }
                })?;
                info!("created request #{}: {}", request.number, request.html_url);
                TrackedRequest {
                    request,
                    created: true,
                }
            }
        };

        let dir = self.store.ensure_request_dir(tracked.request.number)?;
        let instructions = dir.join(INSTRUCTIONS_FILE);
        if tracked.created || !instructions.exists() {
            write_file(&dir.join(README_FILE), README)?;
            write_file(&instructions, &render_instructions(policy, slots))?;
        }

        Ok(tracked)
    }

    /// List the diff entries request `number` does not have yet, then persist
    ///
    /// Entries are appended to the instructions before the record is saved.
    pub fn record_increment(&self, number: u64, diff: &[FileChangeEntry]) -> Result<RecordUpdate> {
        let record = self.store.load(number)?;
        let increment = compute_increment(diff, &record);

        if !increment.is_empty() {
            let dir = self.store.ensure_request_dir(number)?;
            let text = render_entries(&increment, !record.files.is_empty());
            append_file(&dir.join(INSTRUCTIONS_FILE), &text)?;
        }

        let record = record.with_paths(increment.paths());
        self.store.save(&record)?;
        debug!(
            "request #{number}: {} new, {} total",
            increment.len(),
            record.files.len()
        );

        Ok(RecordUpdate { increment, record })
    }

    /// Delete stored records whose request is no longer open
    ///
    /// Returns the removed request numbers.
    pub fn prune(&self, open: &[u64]) -> Result<Vec<u64>> {
        let mut removed = Vec::new();
        for number in self.store.list()? {
            if !open.contains(&number) {
                self.store.remove(number)?;
                removed.push(number);
            }
        }
        Ok(removed)
    }

    /// [`prune`](Self::prune) against the requests open on any of `targets`
    pub async fn prune_closed(&self, targets: &[String]) -> Result<Vec<u64>> {
        let mut open = Vec::new();
        for target in targets {
            let requests = self.platform.list_open_requests(target).await.map_err(|e| {
                Error::ListOpenRequests {
                    branch: target.clone(),
                    message: e.to_string(),
                }
            })?;
            open.extend(requests.iter().map(|pr| pr.number));
        }
        self.prune(&open)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|source| Error::WriteRecordFiles {
        path: path.to_path_buf(),
        source,
    })
}

fn append_file(path: &Path, contents: &str) -> Result<()> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| file.write_all(contents.as_bytes()))
        .map_err(|source| Error::WriteRecordFiles {
            path: path.to_path_buf(),
            source,
        })
}
