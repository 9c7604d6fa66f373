//! Zone file download command.

use crate::credentials::Credentials;
use crate::display;
use anyhow::{Context, Result};
use czds_lib::prelude::*;
use czds_lib::url::zone_name;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeSet;
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Flags of the `zones` subcommand.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ZonesOptions {
    pub(crate) concurrency: usize,
    pub(crate) decompress: bool,
    pub(crate) keep: bool,
    pub(crate) max_attempts: u32,
    pub(crate) require_content_length: bool,
}

impl ZonesOptions {
    fn download_config(&self) -> DownloadConfig {
        DownloadConfig {
            retry: RetryPolicy {
                max_attempts: self.max_attempts,
                ..Default::default()
            },
            content_length: if self.require_content_length {
                ContentLengthPolicy::Require
            } else {
                ContentLengthPolicy::Warn
            },
            ..Default::default()
        }
    }

    const fn task_options(&self) -> TaskOptions {
        TaskOptions {
            decompress: self.decompress,
            cleanup: !self.keep,
        }
    }
}

/// Execute the zones command.
pub(crate) async fn zones(
    credentials: &Credentials,
    output: &Path,
    options: ZonesOptions,
    quiet: bool,
) -> Result<()> {
    let session = super::authenticate(credentials).await?;
    let links = session
        .zone_links()
        .await
        .context("Failed to fetch zone links")?;

    let zones = links.iter().collect::<BTreeSet<_>>().len();
    if zones == 0 {
        if !quiet {
            println!("No zone files available for this account");
        }
        return Ok(());
    }

    let destination = super::output_directory(output);
    tracing::info!(zones, destination = %destination.display(), "Downloading zone files");

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupted, cancelling downloads");
                cancel.cancel();
            }
        }
    });

    let downloader =
        Downloader::new(session, options.download_config()).with_cancellation(cancel.clone());
    let orchestrator = Orchestrator::new(downloader, options.concurrency)?;

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(zones as u64)
    };
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} zones ({percent}%) {msg}")
            .context("Invalid progress template")?
            .progress_chars("=>-"),
    );

    let summary = orchestrator
        .download_all_with(
            links,
            &destination,
            options.task_options(),
            |result| {
                progress.inc(1);
                progress.set_message(zone_name(&result.url).to_string());
                if !result.is_success() {
                    progress.println(display::result_line(result));
                }
            },
        )
        .await
        .with_context(|| format!("Failed to prepare {}", destination.display()))?;

    progress.finish_and_clear();

    if !quiet {
        print!("{}", display::summary(&summary));
        println!("  Output: {}", destination.display());
    }

    if cancel.is_cancelled() {
        anyhow::bail!("Download interrupted");
    }

    let failed = summary.failed().count();
    if failed > 0 {
        anyhow::bail!("{} out of {} downloads failed", failed, summary.len());
    }

    Ok(())
}
