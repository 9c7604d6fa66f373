//! Single zone file download with retry, size verification and decompression.

use czds_types::{CzdsError, DownloadResult, DownloadTask, format_bytes};
use futures::StreamExt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;

use crate::decompress::{decompress_file, decompressed_path};
use crate::retry::RetryPolicy;
use crate::transport::{BodyStream, Transport};
use crate::url::filename_from_disposition;

/// What to do when the server does not declare a content length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentLengthPolicy {
    /// Log a warning and skip size verification.
    #[default]
    Warn,
    /// Fail the download as a protocol violation.
    Require,
}

/// Configuration for the [`Downloader`].
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Attempt limit and backoff.
    pub retry: RetryPolicy,
    /// Write buffer size in bytes.
    pub chunk_size: usize,
    /// Longest wait for response headers or the next body chunk.
    pub read_timeout: Option<Duration>,
    /// Behavior when `Content-Length` is absent.
    pub content_length: ContentLengthPolicy,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            chunk_size: 64 * 1024,
            read_timeout: Some(Duration::from_secs(60)),
            content_length: ContentLengthPolicy::Warn,
        }
    }
}

/// Downloads one zone file per call.
///
/// Every failure path removes its partial output before the retry decision,
/// so a returned failure never leaves a file behind.
#[derive(Debug)]
pub struct Downloader<T> {
    transport: T,
    config: DownloadConfig,
    cancel: CancellationToken,
}

/// A verified file on disk.
#[derive(Debug)]
struct Transfer {
    path: PathBuf,
    bytes: u64,
}

/// Error of one attempt and the path it was writing to, if known.
#[derive(Debug)]
struct AttemptFailure {
    error: CzdsError,
    path: Option<PathBuf>,
}

impl AttemptFailure {
    const fn new(error: CzdsError, path: Option<PathBuf>) -> Self {
        Self { error, path }
    }
}

/// Mutable state of a single attempt. Never outlives the attempt.
#[derive(Debug)]
struct TransferState {
    attempt: u32,
    written: u64,
    expected: Option<u64>,
    path: PathBuf,
    writer: BufWriter<File>,
}

impl TransferState {
    async fn create(
        path: PathBuf,
        attempt: u32,
        expected: Option<u64>,
        chunk_size: usize,
    ) -> Result<Self, CzdsError> {
        let file = File::create(&path).await?;
        Ok(Self {
            attempt,
            written: 0,
            expected,
            path,
            writer: BufWriter::with_capacity(chunk_size.max(1), file),
        })
    }

    async fn write(&mut self, chunk: &[u8]) -> Result<(), CzdsError> {
        self.writer.write_all(chunk).await?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Flushes and checks the byte count against the declared length.
    async fn finish(mut self) -> Result<Transfer, CzdsError> {
        if let Err(e) = self.writer.flush().await {
            self.discard().await;
            return Err(e.into());
        }

        match self.expected {
            Some(expected) if expected != self.written => {
                let received = self.written;
                tracing::warn!(
                    path = %self.path.display(),
                    attempt = self.attempt,
                    expected,
                    received,
                    "Size mismatch, discarding partial file"
                );
                self.discard().await;
                Err(CzdsError::IncompleteTransfer { expected, received })
            }
            _ => Ok(Transfer {
                path: self.path,
                bytes: self.written,
            }),
        }
    }

    /// Drops buffered data and removes the file.
    async fn discard(self) {
        let mut file = self.writer.into_inner();
        let _ = file.flush().await;
        drop(file);
        remove_partial(&self.path).await;
    }
}

impl<T: Transport> Downloader<T> {
    /// Creates a downloader over the given transport.
    #[must_use]
    pub fn new(transport: T, config: DownloadConfig) -> Self {
        Self {
            transport,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Uses `cancel` to abort in-flight downloads at their next suspension point.
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns the downloader configuration.
    #[must_use]
    pub const fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Returns the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Downloads a single task to completion.
    ///
    /// Transient transport errors and size mismatches are retried according
    /// to the [`RetryPolicy`]; everything else ends the task immediately. The
    /// returned result records the last classified error on failure.
    pub async fn download(&self, task: &DownloadTask) -> DownloadResult {
        let url = task.url();
        let retry = &self.config.retry;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let AttemptFailure { error, path } = match self.attempt(task, attempt).await {
                Ok(transfer) => return self.complete(task, transfer, attempt).await,
                Err(failure) => failure,
            };

            if error.is_retryable() && retry.allows_retry_after(attempt) {
                let delay = retry.delay_after(attempt);
                tracing::warn!(
                    url,
                    error = %error,
                    attempt,
                    max_attempts = retry.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "Download failed, retrying"
                );
                if let Err(cancelled) = self.sleep(delay).await {
                    return DownloadResult::failed(url, path, attempt, &cancelled);
                }
                continue;
            }

            tracing::error!(url, error = %error, attempts = attempt, "Download failed");
            return DownloadResult::failed(url, path, attempt, &error);
        }
    }

    async fn attempt(&self, task: &DownloadTask, attempt: u32) -> Result<Transfer, AttemptFailure> {
        tracing::debug!(url = task.url(), attempt, "Starting download attempt");

        let response = self
            .guard(self.transport.get(task.url()))
            .await
            .and_then(|response| response)
            .map_err(|e| AttemptFailure::new(e, None))?;

        let filename = response
            .content_disposition
            .as_deref()
            .ok_or_else(|| CzdsError::Protocol("Missing Content-Disposition header".into()))
            .and_then(|header| {
                filename_from_disposition(header).ok_or_else(|| {
                    CzdsError::Protocol(format!("No filename in Content-Disposition: {header}"))
                })
            })
            .map_err(|e| AttemptFailure::new(e, None))?;
        let path = task.destination().join(filename);

        let expected = match (response.content_length, self.config.content_length) {
            (Some(length), _) => Some(length),
            (None, ContentLengthPolicy::Warn) => {
                tracing::warn!(
                    url = task.url(),
                    "Missing Content-Length header, skipping size verification"
                );
                None
            }
            (None, ContentLengthPolicy::Require) => {
                return Err(AttemptFailure::new(
                    CzdsError::Protocol("Missing Content-Length header".into()),
                    Some(path),
                ));
            }
        };

        let chunk_size = self.config.chunk_size;
        let mut state = TransferState::create(path.clone(), attempt, expected, chunk_size)
            .await
            .map_err(|e| AttemptFailure::new(e, Some(path.clone())))?;

        if let Err(e) = self.stream_body(&mut state, response.body).await {
            state.discard().await;
            return Err(AttemptFailure::new(e, Some(path)));
        }

        state
            .finish()
            .await
            .map_err(|e| AttemptFailure::new(e, Some(path)))
    }

    async fn stream_body(
        &self,
        state: &mut TransferState,
        mut body: BodyStream,
    ) -> Result<(), CzdsError> {
        while let Some(chunk) = self.guard(body.next()).await? {
            state.write(&chunk?).await?;
        }
        Ok(())
    }

    /// Runs the verified file through the decompressor if requested.
    async fn complete(
        &self,
        task: &DownloadTask,
        transfer: Transfer,
        attempts: u32,
    ) -> DownloadResult {
        let url = task.url();
        tracing::info!(
            url,
            path = %transfer.path.display(),
            size = %format_bytes(transfer.bytes),
            attempts,
            "Downloaded"
        );

        if !task.decompress() {
            return DownloadResult::success(url, transfer.path, transfer.bytes, attempts);
        }

        match decompress_file(&transfer.path, task.cleanup(), &self.cancel).await {
            Ok(out) => DownloadResult::success(url, out.path, out.bytes, attempts),
            Err(error) => {
                // The archive is not re-downloaded; it is removed along with any output.
                remove_partial(&transfer.path).await;
                tracing::error!(url, error = %error, "Decompression failed");
                DownloadResult::failed(
                    url,
                    Some(decompressed_path(&transfer.path)),
                    attempts,
                    &error,
                )
            }
        }
    }

    /// Awaits `fut` unless the read timeout expires or the task is cancelled.
    async fn guard<F: Future>(&self, fut: F) -> Result<F::Output, CzdsError> {
        let timed = async {
            match self.config.read_timeout {
                Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
                    CzdsError::Transport(format!("no data received within {limit:?}"))
                }),
                None => Ok(fut.await),
            }
        };

        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(CzdsError::Cancelled),
            output = timed => output,
        }
    }

    async fn sleep(&self, delay: Duration) -> Result<(), CzdsError> {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(CzdsError::Cancelled),
            () = tokio::time::sleep(delay) => Ok(()),
        }
    }
}

async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed partial file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove partial file");
        }
    }
}
