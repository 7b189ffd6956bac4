use crate::byte_range::ByteRange;

/// Closed taxonomy of everything that can go wrong during a download.
///
/// Every variant is terminal once it escapes the retry layer: it cancels
/// sibling range tasks and propagates out of [`crate::downloader::Downloader::download`]
/// unchanged. Nothing here is caught and reinterpreted further up the stack.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The origin was probed successfully but does not support byte ranges.
    ///
    /// Reserved: the current [`crate::downloader::Downloader`] never raises this on its own —
    /// it falls back to a single-stream download instead (see [`crate::downloader`]).
    /// Kept as a variant for implementations that prefer strict mode over fallback.
    #[error("server does not support range requests: {0}")]
    RangesNotSupported(String),

    /// Any transport-level fault, a non-accepted HTTP status, or a missing
    /// required response header. Retryable by default.
    #[error("network error: {message}")]
    NetworkError {
        message: String,
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A `206` response body did not have the length the `Range` header demanded.
    /// Indicates server misbehavior, not a transient fault — never retried.
    #[error("chunk size mismatch for {range_header}: expected {expected} bytes, got {actual}")]
    ChunkSizeMismatch {
        expected: u64,
        actual: u64,
        range_header: String,
    },

    /// Failure creating, sizing, seeking within, writing to, or closing the output file.
    #[error("file write error: {message}")]
    FileWriteError {
        message: String,
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A `DownloadConfig` was constructed with a value outside its valid range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A pure-function precondition was violated (e.g. zero chunk size passed to the splitter).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Cancelled cooperatively, either via the download's own cancellation handle
    /// or because a sibling range task raised an unrecoverable error first.
    #[error("download cancelled")]
    Cancelled,
}

impl DownloadError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
            cause: None,
        }
    }

    pub fn network_with_cause(
        message: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::NetworkError {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    pub fn file_write(message: impl Into<String>) -> Self {
        Self::FileWriteError {
            message: message.into(),
            cause: None,
        }
    }

    pub fn file_write_with_cause(
        message: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::FileWriteError {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    pub fn chunk_size_mismatch(expected: u64, actual: u64, range: &ByteRange) -> Self {
        Self::ChunkSizeMismatch {
            expected,
            actual,
            range_header: range.to_range_header(),
        }
    }

    /// Whether this error is the kind the core's retry predicate for HTTP phases matches.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::NetworkError { .. })
    }
}

impl From<reqwest::Error> for DownloadError {
    fn from(err: reqwest::Error) -> Self {
        Self::network_with_cause(err.to_string(), err)
    }
}

impl From<std::io::Error> for DownloadError {
    fn from(err: std::io::Error) -> Self {
        Self::file_write_with_cause(err.to_string(), err)
    }
}
