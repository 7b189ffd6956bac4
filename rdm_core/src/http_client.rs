use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::byte_range::ByteRange;
use crate::error::DownloadError;
use crate::metadata::FileMetadata;

/// The narrow, swappable HTTP surface the core consumes.
///
/// Tests substitute in-memory or `wiremock`-backed fakes; production code
/// uses [`ReqwestHttpClient`]. Every method is cancel-safe in the sense that
/// dropping the returned future aborts the underlying request cleanly.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Probes `url` (semantically a HEAD request) for content length and range support.
    ///
    /// A missing `Content-Length` is a `NetworkError`, not a panic — the core
    /// cannot plan chunks without it.
    async fn fetch_metadata(&self, url: &str) -> Result<FileMetadata, DownloadError>;

    /// Issues a range request for `range` and returns the full response body.
    ///
    /// Only HTTP 206 is accepted; any other status is a `NetworkError`.
    async fn download_range(&self, url: &str, range: ByteRange) -> Result<Bytes, DownloadError>;

    /// Issues a plain GET and returns the full response body.
    ///
    /// Only HTTP 200 is accepted; any other status is a `NetworkError`.
    async fn download_full(&self, url: &str) -> Result<Bytes, DownloadError>;

    /// Releases underlying transport resources. Idempotent.
    async fn close(&self);
}

/// The one production [`HttpClient`]: a thin adapter over a shared `reqwest::Client`.
///
/// Content-encoding negotiation is disabled so `Content-Length` always
/// matches the bytes actually transferred — a gzip-negotiating client would
/// see a body length that disagrees with the declared range length and
/// spuriously trip `ChunkSizeMismatch`.
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .tcp_nodelay(true)
            .no_gzip()
            .no_deflate()
            .no_brotli()
            .build()
            .expect("failed to build HTTP client");
        Self { client }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns `true` if the `Accept-Ranges` header value contains the `bytes` token, case-insensitively.
fn accepts_byte_ranges(headers: &reqwest::header::HeaderMap) -> bool {
    headers
        .get(reqwest::header::ACCEPT_RANGES)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').any(|tok| tok.trim().eq_ignore_ascii_case("bytes")))
        .unwrap_or(false)
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn fetch_metadata(&self, url: &str) -> Result<FileMetadata, DownloadError> {
        let response = self.client.head(url).send().await?;

        let content_length = response.content_length().ok_or_else(|| {
            DownloadError::network(format!("{url}: response missing Content-Length"))
        })?;
        if content_length == 0 {
            return Err(DownloadError::network(format!(
                "{url}: Content-Length is 0"
            )));
        }

        let accepts_ranges = accepts_byte_ranges(response.headers());

        log::info!(
            "[http_client] probed {url}: content_length={content_length} accepts_ranges={accepts_ranges}"
        );

        Ok(FileMetadata::new(content_length, accepts_ranges))
    }

    async fn download_range(&self, url: &str, range: ByteRange) -> Result<Bytes, DownloadError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::RANGE, range.to_range_header())
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::PARTIAL_CONTENT {
            return Err(DownloadError::network(format!(
                "{url}: range request {} expected 206 Partial Content, got {status}",
                range.to_range_header()
            )));
        }

        Ok(response.bytes().await?)
    }

    async fn download_full(&self, url: &str) -> Result<Bytes, DownloadError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(DownloadError::network(format!(
                "{url}: full GET expected 200 OK, got {status}"
            )));
        }

        Ok(response.bytes().await?)
    }

    async fn close(&self) {
        // reqwest::Client has no explicit close; dropping it releases pooled
        // connections. This exists so fake/test clients and any future
        // non-reqwest backend have somewhere to release sockets.
    }
}
