//! Zone file downloads for the czds client.
//!
//! This crate provides the download pipeline:
//!
//! - [`CzdsClient`] / [`Session`] - Authentication, link listing and report retrieval
//! - [`Transport`] - Authenticated streaming GET seam
//! - [`Downloader`] - Single file download with retries and size verification
//! - [`decompress_file`] - Streaming multi-member gzip decompression
//! - [`Orchestrator`] - Bounded-concurrency download of many zones
//! - [`url`] - Endpoints and `Content-Disposition` parsing

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/czds-rs/czds/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod decompress;
mod downloader;
mod orchestrator;
mod retry;
mod transport;
pub mod url;

#[cfg(test)]
mod test_helpers;

pub use client::{ClientConfig, CzdsClient, Session};
pub use decompress::{Decompressed, decompress_file, decompressed_path};
pub use downloader::{ContentLengthPolicy, DownloadConfig, Downloader};
pub use orchestrator::{Orchestrator, TaskOptions};
pub use retry::RetryPolicy;
pub use transport::{BodyStream, Transport, TransportResponse};
