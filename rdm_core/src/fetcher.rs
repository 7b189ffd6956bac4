use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::byte_range::ByteRange;
use crate::config::DownloadConfig;
use crate::error::DownloadError;
use crate::http_client::HttpClient;
use crate::progress::ProgressListener;
use crate::retry::with_retry;
use crate::writer::PositionalWriter;

/// Drives the parallel range-fetch phase: bounded concurrency, per-range
/// retry, chunk-size verification, positional writes, and progress fan-out.
///
/// Every range task lives inside a [`JoinSet`] owned by this `Fetcher` for
/// the duration of one [`Fetcher::run`] call — a structured scope tied to
/// that call. The set is drained to completion (or abort) before `run`
/// returns, so no task can outlive it.
pub struct Fetcher<'a> {
    url: &'a str,
    http_client: Arc<dyn HttpClient>,
    writer: Arc<PositionalWriter>,
    config: DownloadConfig,
    listener: Option<Arc<dyn ProgressListener>>,
    cancel_token: CancellationToken,
}

impl<'a> Fetcher<'a> {
    pub fn new(
        url: &'a str,
        http_client: Arc<dyn HttpClient>,
        writer: Arc<PositionalWriter>,
        config: DownloadConfig,
        listener: Option<Arc<dyn ProgressListener>>,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            url,
            http_client,
            writer,
            config,
            listener,
            cancel_token,
        }
    }

    /// Runs every range in `ranges` to completion under the configured
    /// parallelism ceiling. Returns the first error to escape retry, having
    /// first cancelled and joined every sibling task. No partial success.
    pub async fn run(&self, ranges: &[ByteRange], total_bytes: u64) -> Result<(), DownloadError> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel_downloads()));
        let progress = Arc::new(AtomicU64::new(0));

        let mut tasks = JoinSet::new();

        for range in ranges.iter().copied() {
            let semaphore = Arc::clone(&semaphore);
            let http_client = Arc::clone(&self.http_client);
            let writer = Arc::clone(&self.writer);
            let progress = Arc::clone(&progress);
            let listener = self.listener.clone();
            let cancel_token = self.cancel_token.clone();
            let url = self.url.to_string();
            let config = self.config;

            tasks.spawn(async move {
                run_one_range(
                    url,
                    range,
                    total_bytes,
                    http_client,
                    writer,
                    config,
                    progress,
                    listener,
                    semaphore,
                    cancel_token,
                )
                .await
            });
        }

        let mut first_error: Option<DownloadError> = None;
        while let Some(joined) = tasks.join_next().await {
            let result = match joined {
                Ok(result) => result,
                Err(join_err) => Err(DownloadError::network(format!(
                    "range task panicked: {join_err}"
                ))),
            };
            if let Err(err) = result {
                if first_error.is_none() {
                    log::error!("[fetcher] range task failed: {err}, cancelling siblings");
                    self.cancel_token.cancel();
                    first_error = Some(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_one_range(
    url: String,
    range: ByteRange,
    total_bytes: u64,
    http_client: Arc<dyn HttpClient>,
    writer: Arc<PositionalWriter>,
    config: DownloadConfig,
    progress: Arc<AtomicU64>,
    listener: Option<Arc<dyn ProgressListener>>,
    semaphore: Arc<Semaphore>,
    cancel_token: CancellationToken,
) -> Result<(), DownloadError> {
    if cancel_token.is_cancelled() {
        return Err(DownloadError::Cancelled);
    }

    let permit = tokio::select! {
        permit = semaphore.acquire_owned() => permit.expect("semaphore never closed"),
        _ = cancel_token.cancelled() => return Err(DownloadError::Cancelled),
    };

    log::debug!("[fetcher] requesting range {range}");

    let bytes = with_retry(
        config.max_retries(),
        config.retry_delay_ms(),
        DownloadError::is_network,
        &cancel_token,
        || {
            let http_client = Arc::clone(&http_client);
            let url = url.clone();
            async move { http_client.download_range(&url, range).await }
        },
    )
    .await?;

    if bytes.len() as u64 != range.length() {
        return Err(DownloadError::chunk_size_mismatch(
            range.length(),
            bytes.len() as u64,
            &range,
        ));
    }

    writer.write_at(range.start(), &bytes).await?;

    let new_total = progress.fetch_add(bytes.len() as u64, Ordering::SeqCst) + bytes.len() as u64;
    if let Some(listener) = &listener {
        listener.on_progress(new_total, total_bytes).await;
    }

    drop(permit);
    Ok(())
}
