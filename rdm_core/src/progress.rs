use async_trait::async_trait;

/// Single-method sink for `(bytes_downloaded, total_bytes)` updates.
///
/// Called once per successfully written chunk, after the shared progress
/// counter's atomic increment — never before a write lands, never for a
/// chunk whose download or write ultimately fails. Implementations must not
/// block the caller for long and must not panic; anything that needs to
/// report asynchronously should post to its own queue rather than await here.
///
/// An absent listener and a no-op listener are treated identically by the
/// core — [`crate::fetcher::Fetcher`] and [`crate::downloader::Downloader`] take
/// `Option<Arc<dyn ProgressListener>>` throughout.
#[async_trait]
pub trait ProgressListener: Send + Sync {
    async fn on_progress(&self, bytes_downloaded: u64, total_bytes: u64);
}

/// A listener that does nothing. Equivalent in effect to passing `None`,
/// useful when a caller's API shape wants a concrete listener regardless.
pub struct NoopProgressListener;

#[async_trait]
impl ProgressListener for NoopProgressListener {
    async fn on_progress(&self, _bytes_downloaded: u64, _total_bytes: u64) {}
}
