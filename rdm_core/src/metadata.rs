/// Result of a successful metadata probe against an origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadata {
    content_length: u64,
    accepts_ranges: bool,
}

impl FileMetadata {
    /// `content_length` must be `>= 1` — probes for empty resources are not
    /// something this downloader plans a chunk split for.
    pub fn new(content_length: u64, accepts_ranges: bool) -> Self {
        debug_assert!(content_length >= 1, "content_length must be >= 1");
        Self {
            content_length,
            accepts_ranges,
        }
    }

    pub fn content_length(&self) -> u64 {
        self.content_length
    }

    pub fn accepts_ranges(&self) -> bool {
        self.accepts_ranges
    }
}
