//! Output formatting for detection reports and ledger status.
//!
//! Three renderings: human text, pretty JSON, and `actions` - the CI
//! step-output format of `key=value` lines whose JSON values stay on a
//! single line so the trigger layer can read them verbatim.

use anyhow::{Context, Result};
use serde_json::json;

use crate::detection::service::DetectionReport;
use crate::issue::IssueContent;
use crate::ledger::LedgerState;

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// Human-readable formatted text
    Human,
    /// CI step-output lines
    Actions,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render a detection report. `skip_build` is advisory for the
    /// downstream CI layer and only echoed through.
    pub fn format_report(&self, report: &DetectionReport, skip_build: bool) -> Result<String> {
        let issues: Vec<IssueContent> = report
            .new_releases
            .iter()
            .map(|release| IssueContent::for_release(release, report.checked_at))
            .collect();

        match self.format {
            OutputFormat::Json => self.format_report_json(report, skip_build, &issues),
            OutputFormat::Human => Ok(self.format_report_human(report, skip_build)),
            OutputFormat::Actions => self.format_report_actions(report, skip_build, &issues),
        }
    }

    /// Render ledger bookkeeping for the `status` command.
    pub fn format_status(&self, state: &LedgerState) -> Result<String> {
        match self.format {
            OutputFormat::Json => self.format_status_json(state),
            // Step outputs make no sense for status; fall back to text.
            OutputFormat::Human | OutputFormat::Actions => Ok(self.format_status_human(state)),
        }
    }

    fn format_report_json(
        &self,
        report: &DetectionReport,
        skip_build: bool,
        issues: &[IssueContent],
    ) -> Result<String> {
        let output = json!({
            "has_new": report.has_new,
            "skip_build": skip_build,
            "checked_at": report.checked_at,
            "already_tracked": report.already_tracked,
            "new_releases": report.new_releases,
            "matrix": { "include": report.matrix },
            "issues": issues,
        });
        serde_json::to_string_pretty(&output).context("Failed to serialize report to JSON")
    }

    fn format_report_human(&self, report: &DetectionReport, skip_build: bool) -> String {
        let mut out = report.to_string();
        if skip_build {
            out.push_str("Downstream builds advised to skip (--skip-build).\n");
        }
        out
    }

    fn format_report_actions(
        &self,
        report: &DetectionReport,
        skip_build: bool,
        issues: &[IssueContent],
    ) -> Result<String> {
        let new_releases = serde_json::to_string(&report.new_releases)
            .context("Failed to serialize new releases")?;
        let matrix = serde_json::to_string(&json!({ "include": report.matrix }))
            .context("Failed to serialize matrix")?;
        let issues = serde_json::to_string(issues).context("Failed to serialize issues")?;

        Ok(format!(
            "has_new={}\nskip_build={}\nnew_releases={}\nreleases_matrix={}\nissues={}\n",
            report.has_new, skip_build, new_releases, matrix, issues
        ))
    }

    fn format_status_json(&self, state: &LedgerState) -> Result<String> {
        let output = json!({
            "tracked_builds": state.len(),
            "check_count": state.check_count,
            "last_check": state.last_check,
            "builds": state.builds,
        });
        serde_json::to_string_pretty(&output).context("Failed to serialize status to JSON")
    }

    fn format_status_human(&self, state: &LedgerState) -> String {
        let mut out = String::new();
        out.push_str("Ledger Status\n");
        out.push_str("=============\n");
        out.push_str(&format!("Tracked builds: {}\n", state.len()));
        out.push_str(&format!("Checks run:     {}\n", state.check_count));
        match state.last_check {
            Some(at) => out.push_str(&format!("Last check:     {}\n", at.to_rfc3339())),
            None => out.push_str("Last check:     never\n"),
        }

        if !state.is_empty() {
            let mut entries: Vec<_> = state.builds.values().collect();
            entries.sort_by(|a, b| b.detected_date.cmp(&a.detected_date));

            out.push_str("\nMost recent detections:\n");
            for entry in entries.iter().take(5) {
                out.push_str(&format!(
                    "  {}  {}  (build {}, {})\n",
                    entry.detected_date.format("%Y-%m-%d"),
                    entry.version,
                    entry.build_number,
                    entry.channel
                ));
            }
        }
        out
    }
}
