//! Delta between a diff and what a request already lists

use super::record::ReviewRequestRecord;
use crate::types::FileChangeEntry;
use std::collections::HashSet;

/// Entries per block in the generated file list
pub const BATCH_SIZE: usize = 20;

/// Files new to a review request in this run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Increment {
    /// New entries, numbered after the ones already recorded
    pub entries: Vec<FileChangeEntry>,
}

impl Increment {
    /// Whether nothing new was found
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of new entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in blocks of [`BATCH_SIZE`]
    pub fn batches(&self) -> impl Iterator<Item = &[FileChangeEntry]> {
        self.entries.chunks(BATCH_SIZE)
    }

    /// Paths of the new entries
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.path.as_str())
    }
}

/// Keep the diff entries `record` does not list yet
///
/// Duplicates inside `diff` are dropped too. Sequence numbers continue from
/// the record's length so numbering stays cumulative across runs.
pub fn compute_increment(diff: &[FileChangeEntry], record: &ReviewRequestRecord) -> Increment {
    let mut seen: HashSet<&str> = record.files.iter().map(String::as_str).collect();
    let start = record.files.len();

    let entries = diff
        .iter()
        .filter(|entry| seen.insert(entry.path.as_str()))
        .enumerate()
        .map(|(i, entry)| FileChangeEntry {
            sequence: start + i + 1,
            ..entry.clone()
        })
        .collect();

    Increment { entries }
}
