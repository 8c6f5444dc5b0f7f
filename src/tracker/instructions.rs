//! Human-readable files kept next to a request record

use super::increment::Increment;
use crate::policy::{render, TemplateSlots, WhitelistPolicy};
use std::fmt::Write as _;

/// Contents of `README.txt`
pub const README: &str = "Do not edit the files in this folder.\n\
Delete this folder once the pull request has been merged.\n";

/// `INSTRUCTIONS.txt` header for a request against `policy`'s branch
///
/// Sections without a template are left out. The header ends with the
/// changed-files heading that entries are appended under.
pub fn render_instructions(policy: &WhitelistPolicy, slots: &TemplateSlots) -> String {
    let steps = &policy.steps;
    let sections = [
        ("Installation preconditions", &steps.preconditions),
        ("Installation steps", &steps.installation),
        ("Verification steps", &steps.verification),
        ("Rollback steps", &steps.rollback),
    ];

    let mut out = String::new();
    for (title, template) in sections {
        if let Some(template) = template {
            let _ = writeln!(out, "{title}:\n{}\n", render(template, slots).trim_end());
        }
    }
    out.push_str("Changed files:\n");
    out
}

/// One line per entry, with a blank line between batches
///
/// `continued` prefixes a blank line, separating this run from earlier ones.
pub fn render_entries(increment: &Increment, continued: bool) -> String {
    let mut out = String::new();
    for (i, batch) in increment.batches().enumerate() {
        if i > 0 || continued {
            out.push('\n');
        }
        for entry in batch {
            let _ = writeln!(
                out,
                "{path},{action} {path},{seq},{date}",
                path = entry.path,
                action = entry.kind.description(),
                seq = entry.sequence,
                date = entry.date.format("%d-%m-%Y"),
            );
        }
    }
    out
}
