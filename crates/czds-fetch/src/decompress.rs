//! Streaming gzip decompression for downloaded zone files.

use czds_types::{CzdsError, format_bytes};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Buffer size for both the compressed reader and the decompressed writer.
const BUFFER_SIZE: usize = 64 * 1024;

/// A finished decompression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decompressed {
    /// Path of the decompressed file.
    pub path: PathBuf,
    /// Size of the decompressed file in bytes.
    pub bytes: u64,
}

/// Returns the path a gzip archive decompresses to.
///
/// A trailing `.gz` is removed from the file name; any other name, including
/// a bare `.gz`, gets `.out` appended.
#[must_use]
pub fn decompressed_path(path: &Path) -> PathBuf {
    let file_name = path.file_name().and_then(|name| name.to_str());
    match file_name.and_then(|name| name.strip_suffix(".gz")) {
        Some(stem) if !stem.is_empty() => path.with_file_name(stem),
        _ => {
            let mut name = path.as_os_str().to_os_string();
            name.push(".out");
            PathBuf::from(name)
        }
    }
}

/// Decompresses a gzip file next to itself.
///
/// Concatenated gzip members are decoded as one stream. The work runs on the
/// blocking thread pool with fixed-size buffers, so memory use does not
/// depend on the file size. The cancellation token is polled between chunks.
///
/// On failure the partial output is removed and the input is left untouched.
/// On success the input is removed only if `cleanup` is set.
///
/// # Errors
///
/// Returns [`CzdsError::Decompression`] if the input is empty, not gzip, or
/// truncated, or if the output cannot be written, and [`CzdsError::Cancelled`]
/// if the token fires mid-stream.
pub async fn decompress_file(
    path: &Path,
    cleanup: bool,
    cancel: &CancellationToken,
) -> Result<Decompressed, CzdsError> {
    let input = path.to_path_buf();
    let output = decompressed_path(path);
    let cancel = cancel.clone();

    tokio::task::spawn_blocking(move || decompress_blocking(&input, &output, cleanup, &cancel))
        .await
        .map_err(|e| CzdsError::Decompression(format!("spawn_blocking failed: {e}")))?
}

fn decompress_blocking(
    input: &Path,
    output: &Path,
    cleanup: bool,
    cancel: &CancellationToken,
) -> Result<Decompressed, CzdsError> {
    let compressed_size = std::fs::metadata(input)
        .map_err(|e| CzdsError::Decompression(format!("{}: {e}", input.display())))?
        .len();
    if compressed_size == 0 {
        return Err(CzdsError::Decompression(format!(
            "{}: empty input",
            input.display()
        )));
    }

    tracing::debug!(
        path = %input.display(),
        size = %format_bytes(compressed_size),
        "Decompressing"
    );

    let bytes = match stream_members(input, output, cancel) {
        Ok(bytes) => bytes,
        Err(e) => {
            remove_partial(output);
            return Err(e);
        }
    };

    tracing::debug!(
        path = %output.display(),
        size = %format_bytes(bytes),
        "Decompressed"
    );

    if cleanup {
        match std::fs::remove_file(input) {
            Ok(()) => tracing::debug!(path = %input.display(), "Removed original gzip file"),
            Err(e) => {
                tracing::warn!(path = %input.display(), error = %e, "Failed to remove gzip file");
            }
        }
    }

    Ok(Decompressed {
        path: output.to_path_buf(),
        bytes,
    })
}

fn stream_members(
    input: &Path,
    output: &Path,
    cancel: &CancellationToken,
) -> Result<u64, CzdsError> {
    let decompression_error = |e: std::io::Error| CzdsError::Decompression(e.to_string());

    let file = File::open(input).map_err(decompression_error)?;
    let mut decoder = MultiGzDecoder::new(BufReader::with_capacity(BUFFER_SIZE, file));
    let file = File::create(output).map_err(decompression_error)?;
    let mut writer = BufWriter::with_capacity(BUFFER_SIZE, file);

    let mut buf = vec![0u8; BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        if cancel.is_cancelled() {
            return Err(CzdsError::Cancelled);
        }
        let n = decoder.read(&mut buf).map_err(decompression_error)?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n]).map_err(decompression_error)?;
        total += n as u64;
    }

    let file = writer
        .into_inner()
        .map_err(|e| CzdsError::Decompression(e.error().to_string()))?;
    file.sync_all().map_err(decompression_error)?;
    Ok(total)
}

fn remove_partial(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "Removed partial output"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove partial output");
        }
    }
}
