//! Bounded-concurrency fan-out over many zone downloads.

use czds_types::{CzdsError, DownloadResult, DownloadSummary, DownloadTask};
use futures::stream::{self, Stream, StreamExt};
use std::collections::BTreeSet;
use std::path::Path;

use crate::downloader::Downloader;
use crate::transport::Transport;

/// Per-task options applied to every URL of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskOptions {
    /// Decompress downloaded gzip archives.
    pub decompress: bool,
    /// Remove archives after successful decompression.
    pub cleanup: bool,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            decompress: false,
            cleanup: true,
        }
    }
}

/// Runs many [`Downloader`] invocations with at most `concurrency` in flight.
///
/// Tasks are independent: a failed task is recorded in its result and never
/// affects its siblings. Retrying is left entirely to the downloader.
#[derive(Debug)]
pub struct Orchestrator<T> {
    downloader: Downloader<T>,
    concurrency: usize,
}

impl<T: Transport> Orchestrator<T> {
    /// Creates an orchestrator.
    ///
    /// # Errors
    ///
    /// Returns [`CzdsError::Config`] if `concurrency` is zero.
    pub fn new(downloader: Downloader<T>, concurrency: usize) -> Result<Self, CzdsError> {
        if concurrency == 0 {
            return Err(CzdsError::Config("concurrency must be at least 1".into()));
        }
        Ok(Self {
            downloader,
            concurrency,
        })
    }

    /// Returns the underlying downloader.
    #[must_use]
    pub const fn downloader(&self) -> &Downloader<T> {
        &self.downloader
    }

    /// Builds one task per distinct URL, sorted lexicographically.
    #[must_use]
    pub fn plan<I, S>(urls: I, destination: &Path, options: TaskOptions) -> Vec<DownloadTask>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        urls.into_iter()
            .map(Into::into)
            .collect::<BTreeSet<String>>()
            .into_iter()
            .map(|url| {
                DownloadTask::new(url, destination)
                    .with_decompress(options.decompress)
                    .with_cleanup(options.cleanup)
            })
            .collect()
    }

    /// Streams results as tasks finish, in completion order.
    ///
    /// The destination directory must already exist.
    pub fn stream(&self, tasks: Vec<DownloadTask>) -> impl Stream<Item = DownloadResult> + '_ {
        stream::iter(tasks)
            .map(move |task| async move { self.downloader.download(&task).await })
            .buffer_unordered(self.concurrency)
    }

    /// Downloads every URL and returns the results keyed by URL.
    ///
    /// # Errors
    ///
    /// Fails only if the destination directory cannot be created; individual
    /// download failures are recorded in the summary.
    pub async fn download_all<I, S>(
        &self,
        urls: I,
        destination: &Path,
        options: TaskOptions,
    ) -> Result<DownloadSummary, CzdsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.download_all_with(urls, destination, options, |_| {})
            .await
    }

    /// Like [`Self::download_all`], calling `on_result` as each task finishes.
    ///
    /// # Errors
    ///
    /// Fails only if the destination directory cannot be created.
    pub async fn download_all_with<I, S, F>(
        &self,
        urls: I,
        destination: &Path,
        options: TaskOptions,
        mut on_result: F,
    ) -> Result<DownloadSummary, CzdsError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnMut(&DownloadResult),
    {
        tokio::fs::create_dir_all(destination).await?;

        let tasks = Self::plan(urls, destination, options);
        tracing::info!(
            zones = tasks.len(),
            concurrency = self.concurrency,
            destination = %destination.display(),
            "Starting concurrent download of zones"
        );

        let mut summary = DownloadSummary::new();
        let mut results = std::pin::pin!(self.stream(tasks));
        while let Some(result) = results.next().await {
            on_result(&result);
            summary.insert(result);
        }

        tracing::info!(
            succeeded = summary.succeeded().count(),
            failed = summary.failed().count(),
            "Completed downloading all zone files"
        );
        Ok(summary)
    }
}
