//! Download tasks and their results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::{CzdsError, FailureKind};

/// A single zone file to download.
///
/// Tasks are immutable once built; the orchestrator creates one per URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadTask {
    url: String,
    destination: PathBuf,
    decompress: bool,
    cleanup: bool,
}

impl DownloadTask {
    /// Creates a task that downloads `url` into the `destination` directory.
    ///
    /// Decompression is off and cleanup is on by default.
    #[must_use]
    pub fn new(url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            destination: destination.into(),
            decompress: false,
            cleanup: true,
        }
    }

    /// Sets whether the downloaded gzip archive is decompressed.
    #[must_use]
    pub const fn with_decompress(mut self, decompress: bool) -> Self {
        self.decompress = decompress;
        self
    }

    /// Sets whether the archive is removed after successful decompression.
    #[must_use]
    pub const fn with_cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Returns the source URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the destination directory.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Returns true if the archive should be decompressed.
    #[must_use]
    pub const fn decompress(&self) -> bool {
        self.decompress
    }

    /// Returns true if the archive should be removed after decompression.
    #[must_use]
    pub const fn cleanup(&self) -> bool {
        self.cleanup
    }
}

/// Terminal state of a download task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    /// The final artifact is on disk.
    Success,
    /// The task failed and left nothing behind.
    Failed {
        /// Error classification.
        kind: FailureKind,
        /// Human-readable error message.
        message: String,
    },
}

impl Outcome {
    /// Returns true for [`Outcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Returns the failure classification, if any.
    #[must_use]
    pub const fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success => None,
            Self::Failed { kind, .. } => Some(*kind),
        }
    }
}

/// Result of a single download task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadResult {
    /// Source URL.
    pub url: String,
    /// Final artifact on success, intended path (when known) on failure.
    pub path: Option<PathBuf>,
    /// Size of the final artifact in bytes.
    pub bytes: u64,
    /// Number of transport attempts made.
    pub attempts: u32,
    /// Terminal outcome.
    pub outcome: Outcome,
}

impl DownloadResult {
    /// Creates a successful result.
    #[must_use]
    pub fn success(url: impl Into<String>, path: PathBuf, bytes: u64, attempts: u32) -> Self {
        Self {
            url: url.into(),
            path: Some(path),
            bytes,
            attempts,
            outcome: Outcome::Success,
        }
    }

    /// Creates a failed result from the error that ended the task.
    #[must_use]
    pub fn failed(
        url: impl Into<String>,
        path: Option<PathBuf>,
        attempts: u32,
        error: &CzdsError,
    ) -> Self {
        Self {
            url: url.into(),
            path,
            bytes: 0,
            attempts,
            outcome: Outcome::Failed {
                kind: error.kind(),
                message: error.to_string(),
            },
        }
    }

    /// Returns true if the download succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

/// Results of a batch download keyed by source URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadSummary {
    results: BTreeMap<String, DownloadResult>,
}

impl DownloadSummary {
    /// Creates an empty summary.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            results: BTreeMap::new(),
        }
    }

    /// Records a result under its URL.
    pub fn insert(&mut self, result: DownloadResult) {
        self.results.insert(result.url.clone(), result);
    }

    /// Looks up the result for a URL.
    #[must_use]
    pub fn get(&self, url: &str) -> Option<&DownloadResult> {
        self.results.get(url)
    }

    /// Iterates over all results in URL order.
    pub fn iter(&self) -> impl Iterator<Item = &DownloadResult> {
        self.results.values()
    }

    /// Iterates over successful results.
    pub fn succeeded(&self) -> impl Iterator<Item = &DownloadResult> {
        self.iter().filter(|r| r.is_success())
    }

    /// Iterates over failed results.
    pub fn failed(&self) -> impl Iterator<Item = &DownloadResult> {
        self.iter().filter(|r| !r.is_success())
    }

    /// Returns the number of recorded results.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true if no results were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Returns true if every recorded download succeeded.
    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.results.values().all(DownloadResult::is_success)
    }

    /// Total bytes of all successful artifacts.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.succeeded().map(|r| r.bytes).sum()
    }
}
