//! Core types for the czds zone file downloader.
//!
//! This crate provides the fundamental data structures used throughout czds:
//!
//! - [`DownloadTask`] - One zone file URL and where to put it
//! - [`DownloadResult`] - Terminal state of a task
//! - [`DownloadSummary`] - Results of a batch keyed by URL
//! - [`CzdsError`] / [`FailureKind`] - Error taxonomy
//! - [`format_bytes`] - Human-readable sizes

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/czds-rs/czds/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod size;
mod task;

pub use error::{CzdsError, FailureKind, Result};
pub use size::format_bytes;
pub use task::{DownloadResult, DownloadSummary, DownloadTask, Outcome};
