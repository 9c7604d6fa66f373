//! Benchmark utilities for czds.

use async_trait::async_trait;
use bytes::Bytes;
use czds_lib::{CzdsError, Transport, TransportResponse};
use flate2::Compression;
use flate2::write::GzEncoder;
use futures::StreamExt;
use std::io::Write;

/// Builds a zone file of roughly `records` resource records.
pub fn synthetic_zone(records: usize) -> Vec<u8> {
    let mut zone = Vec::with_capacity(records * 48);
    zone.extend_from_slice(
        b"example. 86400 IN SOA a.nic.example. hostmaster.example. 1 1800 900 604800 86400\n",
    );
    for i in 0..records {
        let _ = writeln!(zone, "domain{i}.example. 86400 IN NS ns{}.dns-host.net.", i % 4);
    }
    zone
}

/// Compresses `data` as `members` concatenated gzip members.
pub fn gzip_members(data: &[u8], members: usize) -> Vec<u8> {
    let size = data.len().div_ceil(members.max(1)).max(1);
    let mut out = Vec::new();
    for part in data.chunks(size) {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
        let _ = encoder.write_all(part);
        if let Ok(member) = encoder.finish() {
            out.extend(member);
        }
    }
    out
}

/// Builds a report with `rows` request lines for `account`.
pub fn synthetic_report(rows: usize, account: &str) -> String {
    let mut report = String::from("Email,TLD,Status,Reason,Last Updated\n");
    for i in 0..rows {
        report.push_str(&format!(
            "{account},tld{i},approved,\"research, monitoring\",2024-01-{:02}\n",
            i % 28 + 1
        ));
    }
    report
}

/// Serves the same file from memory for every request.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    filename: String,
    body: Bytes,
    chunk_size: usize,
}

impl MemoryTransport {
    /// Creates a transport that serves `body` as `filename` in `chunk_size` pieces.
    pub fn new(filename: &str, body: Vec<u8>, chunk_size: usize) -> Self {
        Self {
            filename: filename.to_string(),
            body: Bytes::from(body),
            chunk_size: chunk_size.max(1),
        }
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn get(&self, _url: &str) -> Result<TransportResponse, CzdsError> {
        let chunks: Vec<Result<Bytes, CzdsError>> = (0..self.body.len())
            .step_by(self.chunk_size)
            .map(|start| {
                let end = (start + self.chunk_size).min(self.body.len());
                Ok(self.body.slice(start..end))
            })
            .collect();

        Ok(TransportResponse::new(
            Some(format!("attachment; filename=\"{}\"", self.filename)),
            Some(self.body.len() as u64),
            futures::stream::iter(chunks).boxed(),
        ))
    }
}
