use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::chunk_splitter;
use crate::config::DownloadConfig;
use crate::error::DownloadError;
use crate::fetcher::Fetcher;
use crate::http_client::HttpClient;
use crate::progress::ProgressListener;
use crate::retry::with_retry;
use crate::writer::PositionalWriter;

/// End-to-end orchestration: probe → plan → fetch, or fall back to a single
/// retried GET when the origin doesn't advertise range support.
///
/// Owns the `HttpClient` (shared, `Arc`'d so it can outlive a single
/// `download` call if the caller wants to reuse it) and a validated
/// [`DownloadConfig`]. Does not catch or reinterpret `DownloadError` — every
/// error from the probe, the fetcher, or the fallback path propagates out of
/// [`Downloader::download`] unchanged.
pub struct Downloader {
    http_client: Arc<dyn HttpClient>,
    config: DownloadConfig,
    listener: Option<Arc<dyn ProgressListener>>,
    cancel_token: CancellationToken,
}

impl Downloader {
    pub fn new(http_client: Arc<dyn HttpClient>, config: DownloadConfig) -> Self {
        Self {
            http_client,
            config,
            listener: None,
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn with_progress_listener(mut self, listener: Arc<dyn ProgressListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// A clone of this downloader's cancellation token. Cancelling it from
    /// another task (e.g. a Ctrl-C handler) cooperatively aborts an
    /// in-flight `download` call at its next suspension point.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Runs one download: probe, then either the parallel range path or the
    /// single-stream fallback.
    pub async fn download(&self, url: &str, output_path: impl AsRef<Path>) -> Result<(), DownloadError> {
        let output_path = output_path.as_ref();
        let metadata = self.http_client.fetch_metadata(url).await?;

        if !metadata.accepts_ranges() {
            log::info!("[downloader] {url} does not advertise range support, falling back to single-stream GET");
            return self.download_fallback(url, output_path, metadata.content_length()).await;
        }

        let ranges = chunk_splitter::split(metadata.content_length(), self.config.chunk_size())?;
        log::info!(
            "[downloader] {url}: content_length={} split into {} ranges, max_parallel={}",
            metadata.content_length(),
            ranges.len(),
            self.config.max_parallel_downloads()
        );

        let writer = Arc::new(PositionalWriter::new(output_path, metadata.content_length()).await?);

        let fetcher = Fetcher::new(
            url,
            Arc::clone(&self.http_client),
            Arc::clone(&writer),
            self.config,
            self.listener.clone(),
            self.cancel_token.clone(),
        );
        let result = fetcher.run(&ranges, metadata.content_length()).await;
        drop(fetcher);

        let writer = Arc::try_unwrap(writer)
            .unwrap_or_else(|_| panic!("fetcher must release its writer handle before returning"));
        writer.close().await?;

        result?;

        log::info!("[downloader] {url}: download complete");
        Ok(())
    }

    async fn download_fallback(
        &self,
        url: &str,
        output_path: &Path,
        total_bytes: u64,
    ) -> Result<(), DownloadError> {
        let http_client = Arc::clone(&self.http_client);
        let bytes = with_retry(
            self.config.max_retries(),
            self.config.retry_delay_ms(),
            DownloadError::is_network,
            &self.cancel_token,
            || {
                let http_client = Arc::clone(&http_client);
                let url = url.to_string();
                async move { http_client.download_full(&url).await }
            },
        )
        .await?;

        if let Some(listener) = &self.listener {
            listener.on_progress(bytes.len() as u64, total_bytes).await;
        }

        tokio::fs::write(output_path, &bytes)
            .await
            .map_err(DownloadError::from)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Mutex as StdMutex;

    use super::*;
    use crate::byte_range::ByteRange;
    use crate::metadata::FileMetadata;

    struct FakeOrigin {
        body: Vec<u8>,
        resumable: bool,
    }

    #[async_trait]
    impl HttpClient for FakeOrigin {
        async fn fetch_metadata(&self, _url: &str) -> Result<FileMetadata, DownloadError> {
            Ok(FileMetadata::new(self.body.len() as u64, self.resumable))
        }

        async fn download_range(&self, _url: &str, range: ByteRange) -> Result<Bytes, DownloadError> {
            let start = range.start() as usize;
            let end = range.end() as usize;
            Ok(Bytes::copy_from_slice(&self.body[start..=end]))
        }

        async fn download_full(&self, _url: &str) -> Result<Bytes, DownloadError> {
            Ok(Bytes::copy_from_slice(&self.body))
        }

        async fn close(&self) {}
    }

    struct RecordingListener(Arc<StdMutex<Vec<(u64, u64)>>>);

    #[async_trait]
    impl ProgressListener for RecordingListener {
        async fn on_progress(&self, downloaded: u64, total: u64) {
            self.0.lock().unwrap().push((downloaded, total));
        }
    }

    fn generate(size: usize) -> Vec<u8> {
        (0..size).map(|i| (i % 251) as u8).collect()
    }

    #[tokio::test]
    async fn downloads_small_range_capable_file() {
        let body = b"Hello, World!".to_vec();
        let origin: Arc<dyn HttpClient> = Arc::new(FakeOrigin { body: body.clone(), resumable: true });
        let downloader = Downloader::new(origin, DownloadConfig::default());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        downloader.download("http://fake", &path).await.unwrap();

        assert_eq!(tokio::fs::read(&path).await.unwrap(), body);
    }

    #[tokio::test]
    async fn falls_back_to_full_get_when_ranges_unsupported() {
        let body = generate(64 * 1024);
        let origin: Arc<dyn HttpClient> = Arc::new(FakeOrigin { body: body.clone(), resumable: false });

        let events = Arc::new(StdMutex::new(Vec::new()));
        let listener: Arc<dyn ProgressListener> = Arc::new(RecordingListener(Arc::clone(&events)));

        let downloader = Downloader::new(origin, DownloadConfig::default()).with_progress_listener(listener);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        downloader.download("http://fake", &path).await.unwrap();

        assert_eq!(tokio::fs::read(&path).await.unwrap(), body);
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0], (body.len() as u64, body.len() as u64));
    }

    #[tokio::test]
    async fn running_the_same_download_twice_produces_identical_output() {
        let body = generate(10_000);
        let origin: Arc<dyn HttpClient> = Arc::new(FakeOrigin { body: body.clone(), resumable: true });
        let config = DownloadConfig::new(1024, 3, 3, 1).unwrap();
        let downloader = Downloader::new(origin, config);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");

        downloader.download("http://fake", &path).await.unwrap();
        let first = tokio::fs::read(&path).await.unwrap();

        downloader.download("http://fake", &path).await.unwrap();
        let second = tokio::fs::read(&path).await.unwrap();

        assert_eq!(first, body);
        assert_eq!(first, second);
    }
}
