use crate::error::DownloadError;

const DEFAULT_CHUNK_SIZE: u64 = 1024 * 1024; // 1 MiB
const DEFAULT_MAX_PARALLEL_DOWNLOADS: usize = 4;
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Validated tuning knobs for a single [`crate::downloader::Downloader::download`] call.
///
/// Construction is the only place these are checked — once built, a
/// `DownloadConfig` is immutable and every field is known-good.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadConfig {
    chunk_size: u64,
    max_parallel_downloads: usize,
    max_retries: u32,
    retry_delay_ms: u64,
}

impl DownloadConfig {
    /// Builds a config, validating every field's invariants.
    ///
    /// Returns `InvalidConfig` on the first violation found — chunk size
    /// first, then parallelism (the rest, `max_retries`/`retry_delay_ms`,
    /// are `u32`/`u64` and therefore can't go negative; only zero `chunk_size`
    /// or zero `max_parallel_downloads` are actually reachable invalid states).
    pub fn new(
        chunk_size: u64,
        max_parallel_downloads: usize,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<Self, DownloadError> {
        if chunk_size == 0 {
            return Err(DownloadError::InvalidConfig(
                "chunk_size must be > 0".to_string(),
            ));
        }
        if max_parallel_downloads == 0 {
            return Err(DownloadError::InvalidConfig(
                "max_parallel_downloads must be >= 1".to_string(),
            ));
        }
        Ok(Self {
            chunk_size,
            max_parallel_downloads,
            max_retries,
            retry_delay_ms,
        })
    }

    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    pub fn max_parallel_downloads(&self) -> usize {
        self.max_parallel_downloads
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn retry_delay_ms(&self) -> u64 {
        self.retry_delay_ms
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_parallel_downloads: DEFAULT_MAX_PARALLEL_DOWNLOADS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_documented_values() {
        let cfg = DownloadConfig::default();
        assert_eq!(cfg.chunk_size(), 1024 * 1024);
        assert_eq!(cfg.max_parallel_downloads(), 4);
        assert_eq!(cfg.max_retries(), 3);
        assert_eq!(cfg.retry_delay_ms(), 1000);
    }

    #[test]
    fn rejects_zero_chunk_size() {
        let err = DownloadConfig::new(0, 4, 3, 1000).unwrap_err();
        assert!(matches!(err, DownloadError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_zero_parallelism() {
        let err = DownloadConfig::new(1024, 0, 3, 1000).unwrap_err();
        assert!(matches!(err, DownloadError::InvalidConfig(_)));
    }

    #[test]
    fn accepts_zero_retries_and_delay() {
        let cfg = DownloadConfig::new(1024, 1, 0, 0).unwrap();
        assert_eq!(cfg.max_retries(), 0);
        assert_eq!(cfg.retry_delay_ms(), 0);
    }
}
