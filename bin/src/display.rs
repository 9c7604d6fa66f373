//! Display utilities and output formatting for the czds CLI.

use clap::ValueEnum;
use czds_lib::prelude::*;
use czds_lib::url::zone_name;
use std::fmt::Write as _;

/// Output format for the zone request report.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum Format {
    Csv,
    Json,
}

impl From<Format> for ReportFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => Self::Csv,
            Format::Json => Self::Json,
        }
    }
}

/// One line describing a finished download.
pub(crate) fn result_line(result: &DownloadResult) -> String {
    let zone = zone_name(&result.url);
    match &result.outcome {
        Outcome::Success => {
            let path = result
                .path
                .as_deref()
                .and_then(|p| p.file_name())
                .map_or_else(String::new, |name| name.to_string_lossy().into_owned());
            format!("{zone}: {path} ({})", format_bytes(result.bytes))
        }
        Outcome::Failed { kind, message } => {
            format!("{zone}: {kind} after {} attempt(s): {message}", result.attempts)
        }
    }
}

/// Renders the end-of-run summary.
pub(crate) fn summary(summary: &DownloadSummary) -> String {
    let mut out = String::new();
    let succeeded: Vec<_> = summary.succeeded().collect();
    let failed: Vec<_> = summary.failed().collect();

    let _ = writeln!(out, "\nDownload complete:");
    let _ = writeln!(
        out,
        "  Successful: {} ({})",
        succeeded.len(),
        format_bytes(summary.total_bytes())
    );
    for result in &succeeded {
        let _ = writeln!(out, "    {}", result_line(result));
    }
    if !failed.is_empty() {
        let _ = writeln!(out, "  Failed: {}", failed.len());
        for (i, result) in failed.iter().enumerate() {
            let _ = writeln!(out, "    {}: {}", i + 1, result_line(result));
        }
    }
    out
}
