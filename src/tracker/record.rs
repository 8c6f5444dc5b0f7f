//! On-disk record of the files already listed in a review request

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

const RECORD_FILE: &str = "files.json";
const FOLDER_PREFIX: &str = "pr";

/// Files already promoted into one open review request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequestRecord {
    /// Request number
    pub number: u64,
    /// Promoted paths, in the order they were first listed
    pub files: Vec<String>,
}

impl ReviewRequestRecord {
    /// Fresh record with no files
    pub const fn empty(number: u64) -> Self {
        Self {
            number,
            files: Vec::new(),
        }
    }

    /// Whether `path` was already listed
    pub fn contains(&self, path: &str) -> bool {
        self.files.iter().any(|f| f == path)
    }

    /// Record extended with `paths` not yet listed
    #[must_use]
    pub fn with_paths<'p>(mut self, paths: impl IntoIterator<Item = &'p str>) -> Self {
        for path in paths {
            if !self.contains(path) {
                self.files.push(path.to_string());
            }
        }
        self
    }
}

/// Directory holding one `pr<N>` folder per tracked request
#[derive(Debug, Clone)]
pub struct RecordStore {
    root: PathBuf,
}

impl RecordStore {
    /// Store rooted at `root` (created lazily)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder for request `number`
    pub fn request_dir(&self, number: u64) -> PathBuf {
        self.root.join(format!("{FOLDER_PREFIX}{number}"))
    }

    /// Create the request folder if needed and return it
    pub fn ensure_request_dir(&self, number: u64) -> Result<PathBuf> {
        let dir = self.request_dir(number);
        fs::create_dir_all(&dir).map_err(|source| Error::CreateRecordFolder {
            path: dir.clone(),
            source,
        })?;
        Ok(dir)
    }

    /// Load the record for `number`; a missing record is empty
    pub fn load(&self, number: u64) -> Result<ReviewRequestRecord> {
        let path = self.request_dir(number).join(RECORD_FILE);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                debug!("no record at {}, starting empty", path.display());
                return Ok(ReviewRequestRecord::empty(number));
            }
            Err(e) => {
                return Err(Error::ReadRecord {
                    path,
                    message: e.to_string(),
                });
            }
        };

        let record: ReviewRequestRecord =
            serde_json::from_str(&content).map_err(|e| Error::ReadRecord {
                path: path.clone(),
                message: e.to_string(),
            })?;
        if record.number != number {
            return Err(Error::ReadRecord {
                path,
                message: format!("record belongs to request #{}", record.number),
            });
        }
        Ok(record)
    }

    /// Persist `record`, replacing the previous one atomically
    pub fn save(&self, record: &ReviewRequestRecord) -> Result<()> {
        let dir = self.ensure_request_dir(record.number)?;
        let path = dir.join(RECORD_FILE);
        let tmp = dir.join(format!("{RECORD_FILE}.tmp"));

        let json = serde_json::to_string_pretty(record)?;
        fs::write(&tmp, json).map_err(|source| Error::WriteRecordFiles {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| Error::WriteRecordFiles {
            path: path.clone(),
            source,
        })?;

        debug!("saved {} files to {}", record.files.len(), path.display());
        Ok(())
    }

    /// Request numbers with a folder in the store, ascending
    pub fn list(&self) -> Result<Vec<u64>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut numbers = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(number) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.strip_prefix(FOLDER_PREFIX))
                .and_then(|n| n.parse().ok())
            {
                numbers.push(number);
            }
        }
        numbers.sort_unstable();
        Ok(numbers)
    }

    /// Delete the folder for request `number`
    pub fn remove(&self, number: u64) -> Result<()> {
        fs::remove_dir_all(self.request_dir(number))?;
        Ok(())
    }
}
