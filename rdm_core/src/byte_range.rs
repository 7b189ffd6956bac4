/// An inclusive, immutable `[start, end]` byte range within a file.
///
/// `end` is always `>= start`, so every `ByteRange` covers at least one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteRange {
    start: u64,
    end: u64,
}

impl ByteRange {
    /// Builds a range covering `[start, end]` inclusive.
    ///
    /// Panics if `end < start` — callers that derive ranges from untrusted
    /// input should validate before constructing one; every range produced
    /// internally by [`crate::chunk_splitter::split`] already satisfies this.
    pub fn new(start: u64, end: u64) -> Self {
        assert!(end >= start, "ByteRange end {end} must be >= start {start}");
        Self { start, end }
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    /// Number of bytes this range spans, inclusive on both ends.
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Renders the `Range` request header value, e.g. `bytes=0-1023`.
    pub fn to_range_header(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

impl std::fmt::Display for ByteRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_range_header())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_format() {
        assert_eq!(ByteRange::new(0, 1023).to_range_header(), "bytes=0-1023");
        assert_eq!(ByteRange::new(5, 5).to_range_header(), "bytes=5-5");
    }

    #[test]
    fn length_is_inclusive() {
        assert_eq!(ByteRange::new(0, 0).length(), 1);
        assert_eq!(ByteRange::new(0, 1023).length(), 1024);
        assert_eq!(ByteRange::new(1024, 2047).length(), 1024);
    }

    #[test]
    #[should_panic]
    fn rejects_inverted_range() {
        ByteRange::new(10, 5);
    }
}
