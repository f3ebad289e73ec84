//! Console output: run summary and the per-device report table.
//!
//! Colors go through `owo-colors` and honor `--color` plus `NO_COLOR`;
//! the report table uses `tabled` with the rounded style.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use licpush_core::RunReport;

use crate::cli::ColorMode;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

pub fn green(text: &str, color: bool) -> String {
    if color {
        text.green().to_string()
    } else {
        text.into()
    }
}

pub fn red(text: &str, color: bool) -> String {
    if color {
        text.red().to_string()
    } else {
        text.into()
    }
}

pub fn bold(text: &str, color: bool) -> String {
    if color {
        text.bold().to_string()
    } else {
        text.into()
    }
}

// ── Run summary ─────────────────────────────────────────────────────

/// End-of-run summary: success count, and an error count when nonzero.
///
/// Invalid addresses never reached a device, so they count as neither;
/// they show up in the report table instead.
pub fn render_summary(report: &RunReport, color: bool) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&green("Run completed!", color));
    out.push('\n');
    out.push_str(&format!(
        "{} devices were configured successfully.",
        report.success_count()
    ));
    if report.failure_count() > 0 {
        out.push('\n');
        out.push_str(&red(
            &format!("{} errors occurred.", report.failure_count()),
            color,
        ));
    }
    out
}

// ── Report table ────────────────────────────────────────────────────

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "IP Address")]
    address: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Error")]
    error: String,
}

/// Per-device report table: successes first, then failures, then
/// addresses that never parsed as IPs.
pub fn render_report_table(report: &RunReport, color: bool) -> String {
    let mut rows = Vec::new();

    for address in report.succeeded() {
        rows.push(ReportRow {
            address: address.clone(),
            status: green("Successful", color),
            error: String::new(),
        });
    }

    for (address, reason) in report.failures() {
        rows.push(ReportRow {
            address: address.clone(),
            status: red("Failed", color),
            error: reason.to_string(),
        });
    }

    for address in report.invalid() {
        rows.push(ReportRow {
            address: address.clone(),
            status: red("Failed", color),
            error: "Invalid IP address".into(),
        });
    }

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Print rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use licpush_core::{FailureKind, FailureReason};

    use super::*;

    #[test]
    fn summary_counts() {
        let mut report = RunReport::with_invalid(vec![]);
        report.record("10.0.0.1".into(), licpush_core::DeviceOutcome::Success);
        report.record("10.0.0.2".into(), licpush_core::DeviceOutcome::Success);

        let out = render_summary(&report, false);
        assert!(out.contains("Run completed!"));
        assert!(out.contains("2 devices were configured successfully."));
        assert!(!out.contains("errors occurred"));
    }

    #[test]
    fn summary_reports_error_count() {
        let mut report = RunReport::with_invalid(vec!["bogus".into()]);
        report.record(
            "10.0.0.1".into(),
            licpush_core::DeviceOutcome::Failed(FailureReason {
                kind: FailureKind::Connect,
                detail: "no route".into(),
            }),
        );

        let out = render_summary(&report, false);
        assert!(out.contains("0 devices were configured successfully."));
        // Invalid addresses are not counted as errors
        assert!(out.contains("1 errors occurred."));
    }

    #[test]
    fn report_table_row_order_and_columns() {
        let mut report = RunReport::with_invalid(vec!["not-an-ip".into()]);
        report.record("10.0.0.1".into(), licpush_core::DeviceOutcome::Success);
        report.record(
            "10.0.0.2".into(),
            licpush_core::DeviceOutcome::Failed(FailureReason {
                kind: FailureKind::Authentication,
                detail: "bad password".into(),
            }),
        );

        let table = render_report_table(&report, false);
        assert!(table.contains("IP Address"));
        assert!(table.contains("Status"));
        assert!(table.contains("Error"));
        assert!(table.contains("Successful"));
        assert!(table.contains("authentication: bad password"));
        assert!(table.contains("Invalid IP address"));

        let success_at = table.find("10.0.0.1").unwrap();
        let failed_at = table.find("10.0.0.2").unwrap();
        let invalid_at = table.find("not-an-ip").unwrap();
        assert!(success_at < failed_at && failed_at < invalid_at);
    }
}
