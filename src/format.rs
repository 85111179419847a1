//! Output formatting utilities for markdown and JSON.

use crate::overrides::{OverrideIssue, Resolution, ValueSource};
use serde_json::{Value, json};

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "markdown" | "md" => Some(OutputFormat::Markdown),
            _ => None,
        }
    }
}

fn source_label(source: &ValueSource) -> String {
    match source {
        ValueSource::Default => "default".to_string(),
        ValueSource::Global => "global".to_string(),
        ValueSource::Override { descriptor } => format!("override `{}`", descriptor),
    }
}

/// Format resolved settings as a markdown table.
pub fn format_resolutions_markdown(resolutions: &[Resolution]) -> String {
    let mut md = String::new();

    let matched = resolutions.iter().find_map(|r| r.matched_override.as_deref());
    match matched {
        Some(name) => md.push_str(&format!("Matched override: `{}`\n\n", name)),
        None => md.push_str("Matched override: none\n\n"),
    }

    md.push_str("| Setting | Value | Source |\n");
    md.push_str("|---------|-------|--------|\n");
    for resolution in resolutions {
        md.push_str(&format!(
            "| {} | {} | {} |\n",
            resolution.key,
            resolution.value,
            source_label(&resolution.source)
        ));
    }

    md
}

/// Format resolved settings as JSON.
pub fn format_resolutions_json(resolutions: &[Resolution]) -> Value {
    json!({ "resolutions": resolutions })
}

/// Format override issues as a markdown list.
pub fn format_issues_markdown(issues: &[OverrideIssue]) -> String {
    if issues.is_empty() {
        return "No problems found in Overrides.\n".to_string();
    }

    let mut md = format!("# Override problems ({})\n\n", issues.len());
    for issue in issues {
        md.push_str(&format!("- {}\n", issue));
    }
    md
}

/// Format override issues as JSON.
pub fn format_issues_json(issues: &[OverrideIssue]) -> Value {
    json!({
        "count": issues.len(),
        "issues": issues,
    })
}
