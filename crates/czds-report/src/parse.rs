//! Conversion of report text into header-keyed rows.

use csv_async::AsyncReaderBuilder;
use futures::StreamExt;
use serde_json::{Map, Value};

use crate::ReportError;

/// One report row keyed by normalized header name.
pub type ReportRow = Map<String, Value>;

/// How report lines are split into fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportParser {
    /// Split every line on `,` with no quote handling.
    ///
    /// Rows are paired with the header positionally and truncated to the
    /// shorter of the two.
    #[default]
    Naive,
    /// Quote-aware CSV reading.
    Delimited,
}

/// Trims a header name, lowercases it and replaces spaces with `_`.
#[must_use]
pub fn normalize_header(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Converts report text into rows.
///
/// The first line is the header. Empty content yields no rows.
///
/// # Errors
///
/// Returns [`ReportError::Csv`] if the delimited parser rejects the input.
/// The naive parser never fails.
pub async fn to_rows(content: &str, parser: ReportParser) -> Result<Vec<ReportRow>, ReportError> {
    match parser {
        ReportParser::Naive => Ok(naive_rows(content)),
        ReportParser::Delimited => delimited_rows(content).await,
    }
}

fn naive_rows(content: &str) -> Vec<ReportRow> {
    let mut lines = content.trim().lines();
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let header: Vec<String> = header.split(',').map(normalize_header).collect();

    lines
        .map(|line| zip_row(&header, line.split(',')))
        .collect()
}

async fn delimited_rows(content: &str) -> Result<Vec<ReportRow>, ReportError> {
    let mut reader = AsyncReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .create_reader(content.trim().as_bytes());

    let header: Vec<String> = reader
        .headers()
        .await?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    let mut records = reader.records();
    while let Some(record) = records.next().await {
        let record = record?;
        rows.push(zip_row(&header, record.iter()));
    }
    Ok(rows)
}

fn zip_row<'a>(header: &[String], fields: impl Iterator<Item = &'a str>) -> ReportRow {
    header
        .iter()
        .zip(fields)
        .map(|(name, value)| (name.clone(), Value::String(value.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUOTED: &str = "Email,TLD,Reason\nnobody@no.name,com,\"research, academic\"\n";

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  Request Status "), "request_status");
        assert_eq!(normalize_header("TLD"), "tld");
    }

    #[tokio::test]
    async fn test_naive_rows() {
        let rows = to_rows(
            "Email,TLD,Status\r\nnobody@no.name,com,approved\r\nnobody@no.name,net,pending\r\n",
            ReportParser::Naive,
        )
        .await
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["email"], "nobody@no.name");
        assert_eq!(rows[1]["tld"], "net");
        assert_eq!(rows[1]["status"], "pending");
    }

    #[tokio::test]
    async fn test_naive_truncates_to_shorter() {
        let rows = to_rows("a,b,c\n1,2\n1,2,3,4\n", ReportParser::Naive)
            .await
            .unwrap();

        assert_eq!(rows[0].len(), 2);
        assert!(!rows[0].contains_key("c"));
        assert_eq!(rows[1].len(), 3);
        assert_eq!(rows[1]["c"], "3");
    }

    #[tokio::test]
    async fn test_naive_splits_quoted_commas() {
        let rows = to_rows(QUOTED, ReportParser::Naive).await.unwrap();
        assert_eq!(rows[0]["reason"], "\"research");
    }

    #[tokio::test]
    async fn test_delimited_honors_quotes() {
        let rows = to_rows(QUOTED, ReportParser::Delimited).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["reason"], "research, academic");
        assert_eq!(rows[0]["tld"], "com");
    }

    #[tokio::test]
    async fn test_empty_content() {
        for parser in [ReportParser::Naive, ReportParser::Delimited] {
            assert!(to_rows("", parser).await.unwrap().is_empty());
            assert!(to_rows("  \n", parser).await.unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_header_only() {
        let rows = to_rows("Email,TLD\n", ReportParser::Naive).await.unwrap();
        assert!(rows.is_empty());
    }
}
