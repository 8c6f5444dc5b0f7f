//! Review-request tracker against the mock platform

mod common;

use common::{make_policy, make_pull_request, run_date, MockPlatformService};
use git_promote::policy::TemplateSlots;
use git_promote::tracker::{RecordStore, RequestDraft, ReviewRequestTracker, README};
use git_promote::types::{ChangeKind, FileChangeEntry};
use std::fs;
use tempfile::TempDir;

fn draft() -> RequestDraft {
    RequestDraft {
        author: "alice".to_string(),
        title: "new pull request by alice".to_string(),
        head_owner: Some("alice".to_string()),
    }
}

fn entries(paths: &[&str]) -> Vec<FileChangeEntry> {
    paths
        .iter()
        .enumerate()
        .map(|(i, path)| FileChangeEntry {
            path: (*path).to_string(),
            kind: ChangeKind::Modified,
            sequence: i + 1,
            date: run_date(),
        })
        .collect()
}

#[tokio::test]
async fn test_most_recent_open_request_wins() {
    let platform = MockPlatformService::new("alice");
    platform.add_open(make_pull_request(4, "develop", "alice"));
    platform.add_open(make_pull_request(11, "develop", "Alice"));
    platform.add_open(make_pull_request(20, "develop", "carol"));
    platform.add_open(make_pull_request(30, "main", "alice"));
    let dir = TempDir::new().unwrap();
    let tracker = ReviewRequestTracker::new(&platform, RecordStore::new(dir.path()));

    let found = tracker.find_open_request("develop", "alice").await.unwrap();

    assert_eq!(found.map(|pr| pr.number), Some(11));
    assert_eq!(platform.list_calls(), vec!["develop"]);
}

#[tokio::test]
async fn test_amending_request_opened_elsewhere_writes_instructions() {
    let platform = MockPlatformService::new("alice");
    platform.add_open(make_pull_request(8, "develop", "alice"));
    let dir = TempDir::new().unwrap();
    let tracker = ReviewRequestTracker::new(&platform, RecordStore::new(dir.path()));

    let tracked = tracker
        .amend_or_create(
            "develop",
            &make_policy("develop", &["src/"]),
            &draft(),
            &TemplateSlots::default(),
        )
        .await
        .unwrap();

    assert!(!tracked.created);
    let folder = dir.path().join("pr8");
    assert_eq!(fs::read_to_string(folder.join("README.txt")).unwrap(), README);
    assert!(folder.join("INSTRUCTIONS.txt").exists());
    assert!(tracker.load_record(8).unwrap().files.is_empty());
}

#[tokio::test]
async fn test_increments_append_with_cumulative_numbering() {
    let platform = MockPlatformService::new("alice");
    let dir = TempDir::new().unwrap();
    let tracker = ReviewRequestTracker::new(&platform, RecordStore::new(dir.path()));
    let tracked = tracker
        .amend_or_create(
            "develop",
            &make_policy("develop", &["src/"]),
            &draft(),
            &TemplateSlots::default(),
        )
        .await
        .unwrap();
    let number = tracked.request.number;

    let first = tracker.record_increment(number, &entries(&["a.txt"])).unwrap();
    let second = tracker
        .record_increment(number, &entries(&["a.txt", "c.txt"]))
        .unwrap();

    assert_eq!(first.record.files, vec!["a.txt"]);
    assert_eq!(second.increment.entries[0].path, "c.txt");
    assert_eq!(second.increment.entries[0].sequence, 2);
    assert!(second.record.files.len() >= first.record.files.len());

    let instructions =
        fs::read_to_string(dir.path().join(format!("pr{number}")).join("INSTRUCTIONS.txt"))
            .unwrap();
    assert!(instructions.ends_with(
        "a.txt,File modified a.txt,1,17-05-2024\n\nc.txt,File modified c.txt,2,17-05-2024\n"
    ));
}

#[tokio::test]
async fn test_prune_removes_closed_requests_only() {
    let platform = MockPlatformService::new("alice");
    platform.add_open(make_pull_request(2, "develop", "alice"));
    let dir = TempDir::new().unwrap();
    let store = RecordStore::new(dir.path());
    store.ensure_request_dir(1).unwrap();
    store.ensure_request_dir(2).unwrap();
    let tracker = ReviewRequestTracker::new(&platform, store.clone());

    let removed = tracker
        .prune_closed(&["develop".to_string(), "qa".to_string()])
        .await
        .unwrap();

    assert_eq!(removed, vec![1]);
    assert_eq!(store.list().unwrap(), vec![2]);
    assert_eq!(platform.list_calls(), vec!["develop", "qa"]);
}
