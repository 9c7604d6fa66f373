//! CZDS endpoints and URL/header helpers.

use std::path::Path;

/// ICANN account API endpoint used for authentication.
pub const AUTH_URL: &str = "https://account-api.icann.org/api/authenticate";

/// Base URL of the CZDS API.
pub const API_BASE_URL: &str = "https://czds-api.icann.org";

/// Path listing the zone files the account may download.
pub const LINKS_PATH: &str = "/czds/downloads/links";

/// Path of the zone request report.
pub const REPORT_PATH: &str = "/czds/requests/report";

/// Extracts the destination filename from a `Content-Disposition` value.
///
/// The filename is whatever follows the last `filename=` with surrounding
/// whitespace and double quotes removed. Only the final path component is
/// kept, so a hostile header cannot escape the destination directory.
///
/// Returns `None` when no usable filename is present. A bare `.gz` is not
/// usable because it has no name left once decompressed.
///
/// # Example
///
/// ```
/// use czds_fetch::url::filename_from_disposition;
///
/// let name = filename_from_disposition(r#"attachment; filename="com.txt.gz""#);
/// assert_eq!(name.as_deref(), Some("com.txt.gz"));
/// ```
#[must_use]
pub fn filename_from_disposition(header: &str) -> Option<String> {
    let (_, raw) = header.rsplit_once("filename=")?;
    let name = raw.trim().trim_end_matches(';').trim_matches('"').trim();
    let name = Path::new(name).file_name()?.to_str()?;
    if name.is_empty() || name == ".gz" {
        return None;
    }
    Some(name.to_string())
}

/// Derives a short zone label from a download link.
///
/// CZDS links end in `<tld>.zone`; the label is the last path segment
/// without that suffix.
///
/// # Example
///
/// ```
/// use czds_fetch::url::zone_name;
///
/// assert_eq!(zone_name("https://czds-api.icann.org/czds/downloads/com.zone"), "com");
/// ```
#[must_use]
pub fn zone_name(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').find(|s| !s.is_empty()).unwrap_or(path);
    segment.strip_suffix(".zone").unwrap_or(segment)
}
