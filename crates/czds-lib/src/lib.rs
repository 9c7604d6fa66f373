//! Rust library for downloading ICANN CZDS zone files.
//!
//! This is a facade crate that re-exports functionality from the czds
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use czds_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CzdsClient::with_defaults()?;
//!     let session = client.authenticate("me@example.com", "secret").await?;
//!     let links = session.zone_links().await?;
//!
//!     let downloader = Downloader::new(session, DownloadConfig::default());
//!     let orchestrator = Orchestrator::new(downloader, 3)?;
//!     let summary = orchestrator
//!         .download_all(links, "zones".as_ref(), TaskOptions::default())
//!         .await?;
//!
//!     println!("{} of {} zones downloaded", summary.succeeded().count(), summary.len());
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/czds-rs/czds/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use czds_types::*;

// Re-export fetch functionality
#[cfg(feature = "fetch")]
pub use czds_fetch::{
    BodyStream, ClientConfig, ContentLengthPolicy, CzdsClient, Decompressed, DownloadConfig,
    Downloader, Orchestrator, RetryPolicy, Session, TaskOptions, Transport, TransportResponse,
    decompress_file, decompressed_path, url,
};

// Re-export report processing
#[cfg(feature = "report")]
pub use czds_report::{
    ProcessedReport, REDACTED_ACCOUNT, ReportError, ReportFormat, ReportOptions, ReportParser,
    ReportRow, process as process_report, scrub, to_rows,
};

/// Prelude module for convenient imports.
///
/// ```
/// use czds_lib::prelude::*;
/// ```
pub mod prelude {
    pub use czds_types::{
        CzdsError, DownloadResult, DownloadSummary, DownloadTask, FailureKind, Outcome, Result,
        format_bytes,
    };

    #[cfg(feature = "fetch")]
    pub use czds_fetch::{
        ClientConfig, ContentLengthPolicy, CzdsClient, DownloadConfig, Downloader, Orchestrator,
        RetryPolicy, Session, TaskOptions,
    };

    #[cfg(feature = "report")]
    pub use czds_report::{ProcessedReport, ReportFormat, ReportOptions, ReportParser};
}
