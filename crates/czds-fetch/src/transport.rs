//! Transport seam between the downloader and HTTP.

use async_trait::async_trait;
use bytes::Bytes;
use czds_types::CzdsError;
use futures::stream::BoxStream;

/// Streaming response body.
pub type BodyStream = BoxStream<'static, Result<Bytes, CzdsError>>;

/// Headers and body of an authenticated GET.
pub struct TransportResponse {
    /// Raw `Content-Disposition` header value.
    pub content_disposition: Option<String>,
    /// Declared `Content-Length`, if any.
    pub content_length: Option<u64>,
    /// Response body.
    pub body: BodyStream,
}

impl TransportResponse {
    /// Creates a response from its parts.
    #[must_use]
    pub fn new(
        content_disposition: Option<String>,
        content_length: Option<u64>,
        body: BodyStream,
    ) -> Self {
        Self {
            content_disposition,
            content_length,
            body,
        }
    }
}

impl std::fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("content_disposition", &self.content_disposition)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Performs authenticated streaming GET requests.
///
/// Implementations attach the bearer credential themselves and classify
/// failures into [`CzdsError`] so the downloader can decide whether to retry:
/// transient network trouble maps to [`CzdsError::Transport`], non-success
/// responses to [`CzdsError::HttpStatus`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Starts a GET request and returns once headers have arrived.
    async fn get(&self, url: &str) -> Result<TransportResponse, CzdsError>;
}
