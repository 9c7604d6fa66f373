//! Zone request report command.

use crate::credentials::Credentials;
use anyhow::{Context, Result};
use czds_lib::prelude::*;
use czds_lib::process_report;
use std::path::{Path, PathBuf};

/// Where a report in `format` is saved inside the dated output directory.
pub(crate) fn report_path(directory: &Path, format: ReportFormat) -> PathBuf {
    directory.join(format!(".report.{}", format.extension()))
}

/// Execute the report command.
pub(crate) async fn report(
    credentials: &Credentials,
    output: &Path,
    scrub: bool,
    format: ReportFormat,
    strict_csv: bool,
    quiet: bool,
) -> Result<()> {
    let session = super::authenticate(credentials).await?;
    let content = session
        .report()
        .await
        .context("Failed to download zone stats report")?;

    let options = ReportOptions {
        scrub,
        format,
        parser: if strict_csv {
            ReportParser::Delimited
        } else {
            ReportParser::Naive
        },
    };
    let report = process_report(&content, session.username(), &options)
        .await
        .context("Failed to convert report")?;

    let directory = super::output_directory(output);
    tokio::fs::create_dir_all(&directory)
        .await
        .with_context(|| format!("Failed to create {}", directory.display()))?;

    let path = report_path(&directory, format);
    report
        .save(&path)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    if !quiet {
        println!("Report saved to {}", path.display());
    }
    Ok(())
}
