//! Parsing of `git diff --name-status` output

use crate::types::{ChangeKind, FileChangeEntry};
use chrono::NaiveDate;
use tracing::warn;

/// Parse name-status lines (`M\tpath`, `R100\told\tnew`) into entries
///
/// Entries are numbered from 1 in diff order. Renames and copies report
/// their destination path. Lines with an unknown status letter are skipped.
pub fn parse_name_status(output: &str, date: NaiveDate) -> Vec<FileChangeEntry> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let mut fields = line.split('\t');
            let status = fields.next()?;
            let path = fields.last()?;
            match ChangeKind::from_status(status) {
                Some(kind) => Some((path.to_string(), kind)),
                None => {
                    warn!("skipping diff line with unknown status: {line}");
                    None
                }
            }
        })
        .enumerate()
        .map(|(i, (path, kind))| FileChangeEntry {
            path,
            kind,
            sequence: i + 1,
            date,
        })
        .collect()
}
