use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::DownloadError;

/// Runs `block` up to `max_retries + 1` times with exponential backoff between attempts.
///
/// - Attempt 0 always runs.
/// - On failure, retries only while the attempt index is `< max_retries` AND
///   `should_retry(&error)` holds; otherwise the error is returned immediately.
/// - The delay before attempt `n` (`n >= 1`) is `initial_delay_ms * 2^(n-1)` —
///   no jitter, no cap.
/// - `cancel_token` preempts the inter-attempt sleep: a cancellation arriving
///   mid-backoff aborts without a further attempt and surfaces `Cancelled`.
///
/// Pass `|_| true` for `should_retry` to get "always retry" — there is no
/// separate default entry point, callers are expected to be explicit.
pub async fn with_retry<T, F, Fut>(
    max_retries: u32,
    initial_delay_ms: u64,
    should_retry: impl Fn(&DownloadError) -> bool,
    cancel_token: &CancellationToken,
    mut block: F,
) -> Result<T, DownloadError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DownloadError>>,
{
    let mut attempt = 0u32;
    let mut delay_ms = initial_delay_ms;

    loop {
        if cancel_token.is_cancelled() {
            return Err(DownloadError::Cancelled);
        }

        match block().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= max_retries || !should_retry(&err) {
                    return Err(err);
                }

                log::debug!(
                    "[retry] attempt {} failed ({}), backing off {}ms before retry",
                    attempt,
                    err,
                    delay_ms
                );

                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_millis(delay_ms)) => {}
                    _ = cancel_token.cancelled() => {
                        return Err(DownloadError::Cancelled);
                    }
                }

                attempt += 1;
                delay_ms = delay_ms.saturating_mul(2);
            }
        }
    }
}
