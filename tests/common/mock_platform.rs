//! Mock platform service for testing
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use git_promote::error::{Error, Result};
use git_promote::platform::PlatformService;
use git_promote::types::{NewPullRequest, Platform, PlatformConfig, PullRequest};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// In-memory review requests with call tracking and error injection
///
/// Requests created through the mock become open, so a second run against
/// the same mock finds them.
pub struct MockPlatformService {
    config: PlatformConfig,
    user: String,
    next_number: AtomicU64,
    open: Mutex<Vec<PullRequest>>,
    // Call tracking
    list_calls: Mutex<Vec<String>>,
    create_calls: Mutex<Vec<NewPullRequest>>,
    user_calls: AtomicU64,
    // Error injection
    error_on_list: Mutex<Option<String>>,
    error_on_create: Mutex<Option<String>>,
    error_on_user: Mutex<Option<String>>,
}

impl MockPlatformService {
    /// Mock authenticated as `user` on `upstream/repo`
    pub fn new(user: &str) -> Self {
        Self {
            config: PlatformConfig {
                platform: Platform::GitHub,
                owner: "upstream".to_string(),
                repo: "repo".to_string(),
                host: None,
            },
            user: user.to_string(),
            next_number: AtomicU64::new(100),
            open: Mutex::new(Vec::new()),
            list_calls: Mutex::new(Vec::new()),
            create_calls: Mutex::new(Vec::new()),
            user_calls: AtomicU64::new(0),
            error_on_list: Mutex::new(None),
            error_on_create: Mutex::new(None),
            error_on_user: Mutex::new(None),
        }
    }

    /// Add an already-open request
    pub fn add_open(&self, pr: PullRequest) {
        self.open.lock().unwrap().push(pr);
    }

    // === Error injection methods ===

    /// Make `list_open_requests` return an error
    pub fn fail_list(&self, msg: &str) {
        *self.error_on_list.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `create_request` return an error
    pub fn fail_create(&self, msg: &str) {
        *self.error_on_create.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `current_user` return an error
    pub fn fail_user(&self, msg: &str) {
        *self.error_on_user.lock().unwrap() = Some(msg.to_string());
    }

    // === Call verification methods ===

    /// Bases `list_open_requests` was called with
    pub fn list_calls(&self) -> Vec<String> {
        self.list_calls.lock().unwrap().clone()
    }

    /// Every `create_request` payload
    pub fn create_calls(&self) -> Vec<NewPullRequest> {
        self.create_calls.lock().unwrap().clone()
    }

    /// Whether any call reached the platform
    pub fn was_contacted(&self) -> bool {
        self.user_calls.load(Ordering::SeqCst) > 0
            || !self.list_calls().is_empty()
            || !self.create_calls().is_empty()
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn current_user(&self) -> Result<String> {
        self.user_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(msg) = self.error_on_user.lock().unwrap().as_ref() {
            return Err(Error::Auth(msg.clone()));
        }
        Ok(self.user.clone())
    }

    async fn list_open_requests(&self, base_branch: &str) -> Result<Vec<PullRequest>> {
        self.list_calls.lock().unwrap().push(base_branch.to_string());
        if let Some(msg) = self.error_on_list.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }
        Ok(self
            .open
            .lock()
            .unwrap()
            .iter()
            .filter(|pr| pr.base_ref == base_branch)
            .cloned()
            .collect())
    }

    async fn get_request(&self, number: u64) -> Result<PullRequest> {
        self.open
            .lock()
            .unwrap()
            .iter()
            .find(|pr| pr.number == number)
            .cloned()
            .ok_or_else(|| Error::Platform(format!("no request #{number}")))
    }

    async fn create_request(&self, request: &NewPullRequest) -> Result<PullRequest> {
        self.create_calls.lock().unwrap().push(request.clone());
        if let Some(msg) = self.error_on_create.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        let number = self.next_number.fetch_add(1, Ordering::SeqCst);
        let pr = PullRequest {
            number,
            html_url: format!("https://github.com/upstream/repo/pull/{number}"),
            base_ref: request.base.clone(),
            head_ref: request.head_branch.clone(),
            title: request.title.clone(),
            author: self.user.clone(),
        };
        self.open.lock().unwrap().push(pr.clone());
        Ok(pr)
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
