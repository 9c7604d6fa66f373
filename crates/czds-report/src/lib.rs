//! Zone request report processing for the czds client.
//!
//! - [`scrub`] - Account redaction
//! - [`to_rows`] - Naive or quote-aware conversion into header-keyed rows
//! - [`process`] / [`ProcessedReport`] - Rendering as CSV or JSON and saving

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/czds-rs/czds/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod format;
mod parse;
mod report;
mod scrub;

pub use format::{ReportError, ReportFormat};
pub use parse::{ReportParser, ReportRow, normalize_header, to_rows};
pub use report::{ProcessedReport, ReportOptions, process};
pub use scrub::{REDACTED_ACCOUNT, scrub};
