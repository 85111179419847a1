//! Check subcommand: report override entries that can never match.

use crate::format::{OutputFormat, format_issues_json, format_issues_markdown};
use crate::settings::Settings;
use anyhow::Result;
use clap::Args;

/// Arguments for the check subcommand
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Exit with a failure status when problems are found
    #[arg(long)]
    pub strict: bool,
}

/// Outcome of a check run.
pub struct CheckReport {
    pub output: String,
    pub issue_count: usize,
}

impl CheckReport {
    /// Whether the run should fail under `--strict`.
    pub fn fails(&self, args: &CheckArgs) -> bool {
        args.strict && self.issue_count > 0
    }
}

pub fn run_check(settings: &Settings, format: OutputFormat) -> Result<CheckReport> {
    let issues = settings.check();
    let output = match format {
        OutputFormat::Markdown => format_issues_markdown(&issues),
        OutputFormat::Json => serde_json::to_string_pretty(&format_issues_json(&issues))?,
    };
    Ok(CheckReport {
        output,
        issue_count: issues.len(),
    })
}
