//! Report processing pipeline: redact, convert, render, save.

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::Path;

use crate::parse::{ReportParser, ReportRow, to_rows};
use crate::scrub::scrub;
use crate::{ReportError, ReportFormat};

/// Options for [`process`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportOptions {
    /// Replace the account identifier before anything else.
    pub scrub: bool,
    /// Output format.
    pub format: ReportFormat,
    /// Field splitting used for JSON conversion.
    pub parser: ReportParser,
}

/// A report ready to be written out.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessedReport {
    /// Report text.
    Csv(String),
    /// Header-keyed rows.
    Json(Vec<ReportRow>),
}

impl ProcessedReport {
    /// Returns the format of this report.
    #[must_use]
    pub const fn format(&self) -> ReportFormat {
        match self {
            Self::Csv(_) => ReportFormat::Csv,
            Self::Json(_) => ReportFormat::Json,
        }
    }

    /// Renders the report. JSON is pretty-printed with a 4-space indent.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Json`] if serialization fails.
    pub fn render(&self) -> Result<String, ReportError> {
        match self {
            Self::Csv(text) => Ok(text.clone()),
            Self::Json(rows) => {
                let mut buf = Vec::new();
                let mut serializer =
                    Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
                rows.serialize(&mut serializer)?;
                Ok(String::from_utf8_lossy(&buf).into_owned())
            }
        }
    }

    /// Writes the rendered report to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing fails.
    pub async fn save(&self, path: &Path) -> Result<(), ReportError> {
        let rendered = self.render()?;
        tokio::fs::write(path, rendered).await?;
        tracing::info!(path = %path.display(), format = %self.format(), "Saved report");
        Ok(())
    }
}

/// Redacts and converts raw report text.
///
/// Redaction, when enabled, always runs before conversion so no row can
/// carry the account identifier.
///
/// # Errors
///
/// Returns [`ReportError::Csv`] if the delimited parser rejects the input.
pub async fn process(
    content: &str,
    account: &str,
    options: &ReportOptions,
) -> Result<ProcessedReport, ReportError> {
    let content = if options.scrub {
        tracing::debug!("Scrubbed account from report");
        scrub(content, account)
    } else {
        content.to_string()
    };

    match options.format {
        ReportFormat::Csv => Ok(ProcessedReport::Csv(content)),
        ReportFormat::Json => {
            let rows = to_rows(&content, options.parser).await?;
            tracing::debug!(rows = rows.len(), parser = ?options.parser, "Converted report");
            Ok(ProcessedReport::Json(rows))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::REDACTED_ACCOUNT;

    const ACCOUNT: &str = "me@example.com";
    const REPORT: &str =
        "Email,TLD,Status\nme@example.com,com,approved\nme@example.com,net,denied\n";

    #[tokio::test]
    async fn test_csv_passthrough_with_scrub() {
        let options = ReportOptions {
            scrub: true,
            ..Default::default()
        };
        let report = process(REPORT, ACCOUNT, &options).await.unwrap();

        let ProcessedReport::Csv(text) = &report else {
            panic!("expected csv");
        };
        assert!(!text.contains(ACCOUNT));
        assert!(text.starts_with("Email,TLD,Status\nnobody@no.name,com"));
    }

    #[tokio::test]
    async fn test_csv_without_scrub_keeps_account() {
        let report = process(REPORT, ACCOUNT, &ReportOptions::default())
            .await
            .unwrap();
        assert_eq!(report, ProcessedReport::Csv(REPORT.to_string()));
    }

    #[tokio::test]
    async fn test_json_rows_are_scrubbed() {
        let options = ReportOptions {
            scrub: true,
            format: ReportFormat::Json,
            parser: ReportParser::Naive,
        };
        let report = process(REPORT, ACCOUNT, &options).await.unwrap();

        let ProcessedReport::Json(rows) = &report else {
            panic!("expected json");
        };
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row["email"] == REDACTED_ACCOUNT));
        assert!(!report.render().unwrap().contains(ACCOUNT));
    }

    #[tokio::test]
    async fn test_json_render_uses_four_space_indent() {
        let options = ReportOptions {
            format: ReportFormat::Json,
            ..Default::default()
        };
        let report = process("A,B\n1,2\n", ACCOUNT, &options).await.unwrap();

        assert_eq!(
            report.render().unwrap(),
            "[\n    {\n        \"a\": \"1\",\n        \"b\": \"2\"\n    }\n]"
        );
    }

    #[tokio::test]
    async fn test_empty_json_report() {
        let options = ReportOptions {
            format: ReportFormat::Json,
            ..Default::default()
        };
        let report = process("", ACCOUNT, &options).await.unwrap();
        assert_eq!(report.render().unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".report.json");
        let options = ReportOptions {
            scrub: true,
            format: ReportFormat::Json,
            parser: ReportParser::Delimited,
        };

        process(REPORT, ACCOUNT, &options)
            .await
            .unwrap()
            .save(&path)
            .await
            .unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved[1]["status"], "denied");
        assert_eq!(saved[0]["email"], REDACTED_ACCOUNT);
    }
}
