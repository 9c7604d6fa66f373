//! HTTP client for the ICANN account and CZDS APIs.

use async_trait::async_trait;
use czds_types::CzdsError;
use futures::StreamExt;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::transport::{Transport, TransportResponse};
use crate::url::{API_BASE_URL, AUTH_URL, LINKS_PATH, REPORT_PATH};

/// Configuration for the CZDS client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Authentication endpoint.
    pub auth_url: String,
    /// Base URL of the CZDS API.
    pub api_base: String,
    /// Timeout for authentication, link listing and report requests.
    ///
    /// Zone downloads are not bounded by this; they use the downloader's
    /// per-read timeout instead.
    pub request_timeout: Duration,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Idle connections kept per host.
    pub pool_max_idle_per_host: usize,
    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            auth_url: AUTH_URL.to_string(),
            api_base: API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 10,
            user_agent: format!("czds/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    access_token: Option<String>,
}

/// Unauthenticated client. Call [`CzdsClient::authenticate`] to get a [`Session`].
#[derive(Debug, Clone)]
pub struct CzdsClient {
    client: Client,
    config: ClientConfig,
}

impl CzdsClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CzdsError::Config`] if the HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, CzdsError> {
        let client = Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .tcp_keepalive(Duration::from_secs(60))
            // No whole-request timeout: zone files can take many minutes
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| CzdsError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Creates a client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CzdsError::Config`] if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self, CzdsError> {
        Self::new(ClientConfig::default())
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Exchanges account credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`CzdsError::Authentication`] on any non-200 response, a body
    /// without an `accessToken`, or a network failure.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Session, CzdsError> {
        tracing::info!(url = %self.config.auth_url, username, "Authenticating");

        let response = self
            .client
            .post(&self.config.auth_url)
            .timeout(self.config.request_timeout)
            .json(&Credentials { username, password })
            .send()
            .await
            .map_err(|e| CzdsError::Authentication(format!("request failed: {e}")))?;

        let status = response.status();
        if status != StatusCode::OK {
            let reason = match status {
                StatusCode::UNAUTHORIZED => "invalid username or password".to_string(),
                StatusCode::NOT_FOUND => format!("invalid url {}", self.config.auth_url),
                StatusCode::INTERNAL_SERVER_ERROR => "internal server error".to_string(),
                other => format!("unexpected status {}", other.as_u16()),
            };
            return Err(CzdsError::Authentication(reason));
        }

        let body: AuthResponse = response
            .json()
            .await
            .map_err(|e| CzdsError::Authentication(format!("malformed response: {e}")))?;
        let token = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CzdsError::Authentication("response has no accessToken".into()))?;

        tracing::debug!(username, "Authenticated");
        Ok(Session {
            client: self.client.clone(),
            api_base: self.config.api_base.trim_end_matches('/').to_string(),
            request_timeout: self.config.request_timeout,
            username: username.to_string(),
            token,
        })
    }
}

/// An authenticated CZDS session.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct Session {
    client: Client,
    api_base: String,
    request_timeout: Duration,
    username: String,
    token: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("api_base", &self.api_base)
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Account the session was opened for.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Lists the zone file URLs the account may download.
    ///
    /// # Errors
    ///
    /// Returns [`CzdsError::HttpStatus`] on a non-success status, a transport
    /// error on network failure, or [`CzdsError::Json`] if the body is not a
    /// JSON array of strings.
    pub async fn zone_links(&self) -> Result<Vec<String>, CzdsError> {
        let url = format!("{}{LINKS_PATH}", self.api_base);
        let body = self.fetch(&url).await?.bytes().await.map_err(classify)?;
        let links: Vec<String> = serde_json::from_slice(&body)?;
        tracing::info!(zones = links.len(), "Fetched zone links");
        Ok(links)
    }

    /// Fetches the zone request report as CSV text.
    ///
    /// # Errors
    ///
    /// Returns [`CzdsError::HttpStatus`] on a non-success status or a
    /// transport error on network failure.
    pub async fn report(&self) -> Result<String, CzdsError> {
        let url = format!("{}{REPORT_PATH}", self.api_base);
        let text = self.fetch(&url).await?.text().await.map_err(classify)?;
        tracing::debug!(bytes = text.len(), "Fetched report");
        Ok(text)
    }

    async fn fetch(&self, url: &str) -> Result<Response, CzdsError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(classify)?;
        check_status(response).await
    }
}

#[async_trait]
impl Transport for Session {
    async fn get(&self, url: &str) -> Result<TransportResponse, CzdsError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(classify)?;
        let response = check_status(response).await?;

        let content_disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let content_length = response.content_length();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(classify))
            .boxed();

        Ok(TransportResponse::new(content_disposition, content_length, body))
    }
}

/// Turns a non-success response into [`CzdsError::HttpStatus`].
async fn check_status(response: Response) -> Result<Response, CzdsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match body.trim() {
        "" => status.canonical_reason().unwrap_or("unknown status").to_string(),
        text => text.chars().take(200).collect(),
    };
    Err(CzdsError::HttpStatus {
        status: status.as_u16(),
        message,
    })
}

/// Maps a reqwest failure onto the error taxonomy.
fn classify(error: reqwest::Error) -> CzdsError {
    if let Some(status) = error.status() {
        return CzdsError::HttpStatus {
            status: status.as_u16(),
            message: error.to_string(),
        };
    }
    if error.is_builder() {
        return CzdsError::Config(error.to_string());
    }
    if error.is_decode() {
        return CzdsError::Protocol(error.to_string());
    }
    // Timeouts, refused or reset connections and broken bodies
    CzdsError::Transport(error.to_string())
}
