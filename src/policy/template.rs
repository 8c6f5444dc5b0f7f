//! Instruction template rendering

/// Values substituted into instruction templates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSlots {
    /// `{path}`: installation directory
    pub path: String,
    /// `{branch}`: target branch
    pub branch: String,
    /// `{execution_script}`: launch command
    pub execution_script: String,
    /// `{name}`: process name
    pub process_name: String,
    /// `{last_commit}`: upstream commit id before the promotion
    pub last_commit: String,
}

/// Replace every slot placeholder in `template`
///
/// Unknown placeholders are left as written.
pub fn render(template: &str, slots: &TemplateSlots) -> String {
    [
        ("{path}", slots.path.as_str()),
        ("{branch}", slots.branch.as_str()),
        ("{execution_script}", slots.execution_script.as_str()),
        ("{name}", slots.process_name.as_str()),
        ("{last_commit}", slots.last_commit.as_str()),
    ]
    .iter()
    .fold(template.to_string(), |acc, (placeholder, value)| {
        acc.replace(placeholder, value)
    })
}
