//! Error types for czds.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for czds operations.
pub type Result<T> = std::result::Result<T, CzdsError>;

/// Errors that can occur while talking to CZDS and downloading zone files.
#[derive(Error, Debug)]
pub enum CzdsError {
    /// Credentials were rejected or the token could not be read.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The server violated the download contract (e.g. missing headers).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Transient transport failure (timeout, connection reset, broken body).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// Fewer or more bytes arrived than the server declared.
    #[error("Incomplete transfer: expected {expected} bytes, received {received}")]
    IncompleteTransfer {
        /// Declared content length.
        expected: u64,
        /// Bytes actually written.
        received: u64,
    },

    /// Gzip decompression failed.
    #[error("Decompression error: {0}")]
    Decompression(String),

    /// The operation was cancelled.
    #[error("Cancelled")]
    Cancelled,

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CzdsError {
    /// Returns the flat classification recorded in download results.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Authentication(_) => FailureKind::Authentication,
            Self::Protocol(_) | Self::Json(_) => FailureKind::Protocol,
            Self::Transport(_) => FailureKind::TransientTransport,
            Self::HttpStatus { status, .. } => {
                if is_retryable_status(*status) {
                    FailureKind::TransientTransport
                } else {
                    FailureKind::HttpStatus
                }
            }
            Self::IncompleteTransfer { .. } => FailureKind::IncompleteTransfer,
            Self::Decompression(_) => FailureKind::Decompression,
            Self::Cancelled => FailureKind::Cancelled,
            Self::Config(_) => FailureKind::Config,
            Self::Io(_) => FailureKind::Io,
        }
    }

    /// Returns true if another attempt may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            FailureKind::TransientTransport | FailureKind::IncompleteTransfer
        )
    }
}

/// Request timeout, rate limiting and server errors are worth retrying.
const fn is_retryable_status(status: u16) -> bool {
    status == 408 || status == 429 || status >= 500
}

/// Classification of a failed download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Credentials rejected.
    Authentication,
    /// Server contract violation; never retried.
    Protocol,
    /// Timeout, reset or retryable status.
    TransientTransport,
    /// Non-retryable HTTP status.
    HttpStatus,
    /// Byte count did not match the declared length.
    IncompleteTransfer,
    /// Downloaded archive could not be decompressed.
    Decompression,
    /// Cancelled before reaching a terminal state.
    Cancelled,
    /// Invalid configuration.
    Config,
    /// Local filesystem failure.
    Io,
}

impl FailureKind {
    /// Returns the kind as a string identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::Protocol => "protocol",
            Self::TransientTransport => "transient_transport",
            Self::HttpStatus => "http_status",
            Self::IncompleteTransfer => "incomplete_transfer",
            Self::Decompression => "decompression",
            Self::Cancelled => "cancelled",
            Self::Config => "config",
            Self::Io => "io",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
