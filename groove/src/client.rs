//! HTTP client for the Groove worker API
//!
//! This module is the transport and decode boundary: one GET per call, no
//! retry and no caching. Resilience policies live in the façade.
//!
//! # Example
//!
//! ```no_run
//! use groove::GrooveApi;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = GrooveApi::new()?;
//!
//!     let results = api.search("arijit").await?;
//!     println!("{} songs", results.songs.len());
//!
//!     let latest = api.latest().await?;
//!     println!("{} latest releases", latest.latest_release_songs.len());
//!
//!     Ok(())
//! }
//! ```

use crate::error::{GrooveError, Result};
use crate::models::{
    AlbumPageResponse, CategoryFeedResponse, LatestReleaseResponse, SearchResponsePayload,
    SongDetailsResponse,
};
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default worker API base URL
pub const DEFAULT_BASE_URL: &str = "https://testingapipagalworld.indexer.workers.dev/api";

/// Base URL relative cover paths are resolved against
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://pagalnew.com/";

/// Default timeout for HTTP requests (15 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Default User-Agent
///
/// The upstream rejects requests that do not look like they come from a browser.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 13; Pixel 7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/137.0.0.0 Mobile Safari/537.36";

const ACCEPT_JSON: &str = "application/json";

/// Groove worker API client
///
/// One method per endpoint, each returning the decoded payload:
/// - `GET /search?q=`
/// - `GET /album?url=`
/// - `GET /song?url=`
/// - `GET /latest`
/// - `GET /category?url=`
///
/// The client is stateless. Cloning it shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct GrooveApi {
    client: Client,
    base_url: String,
}

impl GrooveApi {
    /// Create a new client with default settings
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    // ========================================================================
    // Endpoints
    // ========================================================================

    /// Search songs and albums
    pub async fn search(&self, query: &str) -> Result<SearchResponsePayload> {
        let query = required("query", query)?;
        let url = self.endpoint("search", &[("q", query)])?;
        self.get_json(url).await
    }

    /// Fetch one album page
    ///
    /// `url` is the album page on the source site, not a worker URL.
    pub async fn album(&self, url: &str) -> Result<AlbumPageResponse> {
        let page_url = required("url", url)?;
        let url = self.endpoint("album", &[("url", page_url)])?;
        self.get_json(url).await
    }

    /// Fetch the details of one song, including its download links
    pub async fn song(&self, url: &str) -> Result<SongDetailsResponse> {
        let song_url = required("url", url)?;
        let url = self.endpoint("song", &[("url", song_url)])?;
        self.get_json(url).await
    }

    /// Fetch the latest releases
    pub async fn latest(&self) -> Result<LatestReleaseResponse> {
        let url = self.endpoint("latest", &[])?;
        self.get_json(url).await
    }

    /// Fetch one category listing
    pub async fn category(&self, url: &str) -> Result<CategoryFeedResponse> {
        let category_url = required("url", url)?;
        let url = self.endpoint("category", &[("url", category_url)])?;
        self.get_json(url).await
    }

    // ========================================================================
    // Internal
    // ========================================================================

    /// Builds `{base}/{path}?k=v`; query values are percent-encoded
    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        let raw = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let mut url = Url::parse(&raw).map_err(|e| {
            GrooveError::invalid_argument(format!("invalid API URL {}: {}", raw, e))
        })?;

        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, ACCEPT_JSON)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, status = status.as_u16(), "Worker API error");
            return Err(GrooveError::UpstreamHttp {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Rejects blank parameters before any network call
fn required<'a>(name: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(GrooveError::invalid_argument(format!("{} must not be blank", name)));
    }
    Ok(value)
}

/// Builder for configuring a GrooveApi
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: String,
    timeout: Duration,
    user_agent: String,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the connect and read timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the client
    pub fn build(self) -> Result<GrooveApi> {
        let client = Client::builder()
            .user_agent(&self.user_agent)
            .connect_timeout(self.timeout)
            .timeout(self.timeout)
            .build()?;

        Ok(GrooveApi {
            client,
            base_url: self.base_url,
        })
    }
}
