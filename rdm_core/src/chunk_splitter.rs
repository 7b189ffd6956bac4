use crate::byte_range::ByteRange;
use crate::error::DownloadError;

/// Partitions `[0, content_length)` into an ordered, covering, non-overlapping
/// sequence of [`ByteRange`]s, each at most `chunk_size` bytes long.
///
/// Pure and deterministic: no I/O, no allocation beyond the returned `Vec`.
/// Only the last range may be shorter than `chunk_size`.
pub fn split(content_length: u64, chunk_size: u64) -> Result<Vec<ByteRange>, DownloadError> {
    if content_length == 0 {
        return Err(DownloadError::InvalidArgument(
            "content_length must be > 0".to_string(),
        ));
    }
    if chunk_size == 0 {
        return Err(DownloadError::InvalidArgument(
            "chunk_size must be > 0".to_string(),
        ));
    }

    let mut ranges = Vec::with_capacity(((content_length - 1) / chunk_size + 1) as usize);
    let mut start = 0u64;
    while start < content_length {
        let end = (start + chunk_size - 1).min(content_length - 1);
        ranges.push(ByteRange::new(start, end));
        start = end + 1;
    }

    log::debug!(
        "[chunk_splitter] split content_length={} chunk_size={} into {} ranges",
        content_length,
        chunk_size,
        ranges.len()
    );

    Ok(ranges)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_range_when_file_fits_in_one_chunk() {
        let ranges = split(13, 1024).unwrap();
        assert_eq!(ranges, vec![ByteRange::new(0, 12)]);
    }

    #[test]
    fn exact_multiple_of_chunk_size_has_no_short_final_range() {
        // 2 * 1024 bytes, chunk 1024 -> exactly two full ranges, not three.
        let ranges = split(2048, 1024).unwrap();
        assert_eq!(ranges, vec![ByteRange::new(0, 1023), ByteRange::new(1024, 2047)]);
    }

    #[test]
    fn single_chunk_size_file_is_one_range_not_two() {
        let ranges = split(1024, 1024).unwrap();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0], ByteRange::new(0, 1023));
    }

    #[test]
    fn n_chunks_plus_one_byte_has_short_final_range() {
        // 3 full chunks of 1024 plus 1 trailing byte -> 4 ranges, last length 1.
        let ranges = split(3 * 1024 + 1, 1024).unwrap();
        assert_eq!(ranges.len(), 4);
        assert_eq!(ranges[3], ByteRange::new(3072, 3072));
        assert_eq!(ranges[3].length(), 1);
    }

    #[test]
    fn five_thousand_bytes_in_1024_chunks() {
        let ranges = split(5000, 1024).unwrap();
        assert_eq!(
            ranges,
            vec![
                ByteRange::new(0, 1023),
                ByteRange::new(1024, 2047),
                ByteRange::new(2048, 3071),
                ByteRange::new(3072, 4095),
                ByteRange::new(4096, 4999),
            ]
        );
    }

    #[test]
    fn covers_without_gaps_or_overlaps() {
        let ranges = split(10_000_000, 1_048_576).unwrap();
        assert_eq!(ranges.len(), 10);
        assert_eq!(ranges[0].start(), 0);
        assert_eq!(ranges.last().unwrap().end(), 9_999_999);
        let total: u64 = ranges.iter().map(|r| r.length()).sum();
        assert_eq!(total, 10_000_000);
        for window in ranges.windows(2) {
            assert_eq!(window[1].start(), window[0].end() + 1);
        }
        for r in &ranges[..ranges.len() - 1] {
            assert!(r.length() <= 1_048_576);
        }
    }

    #[test]
    fn rejects_zero_content_length() {
        assert!(matches!(
            split(0, 1024).unwrap_err(),
            DownloadError::InvalidArgument(_)
        ));
    }

    #[test]
    fn rejects_zero_chunk_size() {
        assert!(matches!(
            split(1024, 0).unwrap_err(),
            DownloadError::InvalidArgument(_)
        ));
    }
}
