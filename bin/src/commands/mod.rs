//! CLI command implementations.

pub(crate) mod report;
pub(crate) mod zones;

use crate::credentials::Credentials;
use anyhow::{Context, Result};
use czds_lib::prelude::*;
use std::path::{Path, PathBuf};

/// Dated directory all output of a run goes to: `<output>/zones/<YYYY-MM-DD>`.
pub(crate) fn output_directory(output: &Path) -> PathBuf {
    let today = chrono::Local::now().date_naive();
    output.join("zones").join(today.format("%Y-%m-%d").to_string())
}

/// Authenticates with the default endpoints.
pub(crate) async fn authenticate(credentials: &Credentials) -> Result<Session> {
    tracing::info!("Authenticating with ICANN API");
    let client = CzdsClient::with_defaults()?;
    client
        .authenticate(&credentials.username, &credentials.password)
        .await
        .context("Authentication failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_directory_is_dated() {
        let dir = output_directory(Path::new("/data"));
        assert!(dir.starts_with("/data/zones"));

        let date = dir.file_name().unwrap().to_str().unwrap();
        assert!(chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok());
    }
}
