//! Rendering of discovery findings as console text or a CSV file.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::debug;

use crate::discovery::SubscriptionFinding;
use crate::errors::{AuditError, Result};

/// Column names of the CSV export
pub const CSV_HEADER: [&str; 4] = [
    "Topic ARN",
    "Subscription ARN",
    "Lambda Function",
    "Owner Account",
];

/// Printed when the audit comes back clean
pub const NONE_FOUND: &str = "No cross-account Lambda subscriptions found";

const STDOUT: &str = "<stdout>";

/// Where the findings go
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReportTarget {
    /// human readable text on the given writer
    #[default]
    Console,
    /// CSV file; a timestamped name is chosen when `path` is `None`
    Csv {
        /// destination file
        path: Option<PathBuf>,
    },
}

/// Render `findings` to `target`. Status lines go to `out`.
///
/// # Errors
/// `AuditError::Output` / `AuditError::CsvOutput` when the destination
/// cannot be created or written. A partially written file is left in place.
pub fn render<W: Write>(
    findings: &[SubscriptionFinding],
    target: &ReportTarget,
    out: &mut W,
) -> Result<()> {
    match target {
        ReportTarget::Console => {
            write_console(out, findings).map_err(|e| AuditError::output("write", STDOUT, e))
        }
        ReportTarget::Csv { path } => {
            if findings.is_empty() {
                writeln!(out, "{NONE_FOUND}").map_err(|e| AuditError::output("write", STDOUT, e))?;
            }
            let path = path
                .clone()
                .unwrap_or_else(|| default_csv_path(Local::now()));
            export_csv(findings, &path)?;
            writeln!(out, "Successfully exported to {}", path.display())
                .map_err(|e| AuditError::output("write", STDOUT, e))
        }
    }
}

/// Write the console form of the report
///
/// # Errors
/// Any error from the underlying writer.
pub fn write_console<W: Write>(w: &mut W, findings: &[SubscriptionFinding]) -> std::io::Result<()> {
    if findings.is_empty() {
        return writeln!(w, "{NONE_FOUND}");
    }

    writeln!(
        w,
        "\nFound {} cross-account Lambda subscriptions:\n",
        findings.len()
    )?;
    for finding in findings {
        writeln!(w, "Topic: {}", finding.topic_arn)?;
        writeln!(w, "Subscription: {}", finding.subscription_arn)?;
        writeln!(w, "Lambda Function: {}", finding.endpoint)?;
        writeln!(w, "Owner Account: {}", finding.owner)?;
        writeln!(w, "---")?;
    }
    Ok(())
}

/// File name used when no output path is given, e.g.
/// `sns-subscriptions-20240131-154502.csv`
#[must_use]
pub fn default_csv_path(now: DateTime<Local>) -> PathBuf {
    PathBuf::from(format!(
        "sns-subscriptions-{}.csv",
        now.format("%Y%m%d-%H%M%S")
    ))
}

/// Write the header row and one row per finding to `path`
///
/// # Errors
/// `AuditError::Output` if the file cannot be created or flushed,
/// `AuditError::CsvOutput` if a row cannot be written.
pub fn export_csv(findings: &[SubscriptionFinding], path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| AuditError::output("create", path, e))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    writer
        .write_record(CSV_HEADER)
        .map_err(|e| AuditError::csv_output(path, e))?;
    for finding in findings {
        writer
            .serialize(finding)
            .map_err(|e| AuditError::csv_output(path, e))?;
    }
    writer
        .flush()
        .map_err(|e| AuditError::output("flush", path, e))?;

    debug!("Wrote {} CSV rows to {}", findings.len(), path.display());
    Ok(())
}
