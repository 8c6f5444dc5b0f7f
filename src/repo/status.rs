//! Working tree status categories

use std::fmt::Write;

/// Paths grouped by the state `git status` reports for them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeStatus {
    /// Untracked paths
    pub not_added: Vec<String>,
    /// Unmerged paths
    pub conflicted: Vec<String>,
    /// Paths added to the index
    pub created: Vec<String>,
    /// Deleted paths
    pub deleted: Vec<String>,
    /// Modified paths
    pub modified: Vec<String>,
    /// Renamed paths (destination)
    pub renamed: Vec<String>,
    /// Paths with any staged change
    pub staged: Vec<String>,
}

impl WorktreeStatus {
    /// True when every category is empty
    pub fn is_clean(&self) -> bool {
        self.categories().iter().all(|(_, paths)| paths.is_empty())
    }

    /// Category name and paths, in display order
    pub fn categories(&self) -> [(&'static str, &[String]); 7] {
        [
            ("not added", self.not_added.as_slice()),
            ("conflicted", self.conflicted.as_slice()),
            ("created", self.created.as_slice()),
            ("deleted", self.deleted.as_slice()),
            ("modified", self.modified.as_slice()),
            ("renamed", self.renamed.as_slice()),
            ("staged", self.staged.as_slice()),
        ]
    }

    /// Multi-line summary of the non-empty categories
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for (name, paths) in self.categories() {
            if !paths.is_empty() {
                let _ = writeln!(out, "  {name}: {}", paths.join(", "));
            }
        }
        out
    }
}

/// Parse `git status --porcelain` (v1) output
pub fn parse_porcelain_status(output: &str) -> WorktreeStatus {
    let mut status = WorktreeStatus::default();

    for line in output.lines() {
        if line.len() < 4 {
            continue;
        }
        let mut codes = line.chars();
        let (Some(index), Some(worktree)) = (codes.next(), codes.next()) else {
            continue;
        };
        let raw_path = &line[3..];
        let path = raw_path
            .rsplit_once(" -> ")
            .map_or(raw_path, |(_, to)| to)
            .trim_matches('"')
            .to_string();

        if index == '?' && worktree == '?' {
            status.not_added.push(path);
            continue;
        }
        if index == '!' {
            continue;
        }

        let unmerged = index == 'U'
            || worktree == 'U'
            || (index == 'A' && worktree == 'A')
            || (index == 'D' && worktree == 'D');
        if unmerged {
            status.conflicted.push(path);
            continue;
        }

        match index {
            'A' => status.created.push(path.clone()),
            'R' => status.renamed.push(path.clone()),
            _ => {}
        }
        if index == 'D' || worktree == 'D' {
            status.deleted.push(path.clone());
        }
        if index == 'M' || worktree == 'M' {
            status.modified.push(path.clone());
        }
        if index != ' ' {
            status.staged.push(path);
        }
    }

    status
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_output_is_clean() {
        assert!(parse_porcelain_status("").is_clean());
    }

    #[test]
    fn test_categories() {
        let out = "?? notes.txt\n M src/lib.rs\nM  README.md\nA  new.rs\n D gone.rs\nR  old.rs -> moved.rs\nUU both.rs\n";
        let status = parse_porcelain_status(out);

        assert_eq!(status.not_added, vec!["notes.txt"]);
        assert_eq!(status.modified, vec!["src/lib.rs", "README.md"]);
        assert_eq!(status.created, vec!["new.rs"]);
        assert_eq!(status.deleted, vec!["gone.rs"]);
        assert_eq!(status.renamed, vec!["moved.rs"]);
        assert_eq!(status.conflicted, vec!["both.rs"]);
        assert_eq!(status.staged, vec!["README.md", "new.rs", "moved.rs"]);
        assert!(!status.is_clean());
    }

    #[test]
    fn test_summary_lists_only_dirty_categories() {
        let status = parse_porcelain_status("?? a.txt\n");
        assert_eq!(status.summary(), "  not added: a.txt\n");
    }
}
