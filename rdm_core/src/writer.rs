use std::path::Path;

use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::error::DownloadError;

/// A single output file, pre-sized to the full content length, that many
/// concurrent range tasks write into at their absolute offsets.
///
/// Writes are serialized behind an internal `tokio::sync::Mutex` guarding
/// the one shared `File` handle — a seek-then-write pair never interleaves
/// with another task's seek-then-write, so no byte is ever torn or written twice.
pub struct PositionalWriter {
    file: Mutex<File>,
}

impl PositionalWriter {
    /// Opens (creating if absent) `path` for read/write and sets its length
    /// to exactly `total_bytes`, truncating or extending as needed.
    pub async fn new(path: impl AsRef<Path>, total_bytes: u64) -> Result<Self, DownloadError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .await?;

        file.set_len(total_bytes).await?;

        log::debug!("[writer] pre-sized output file to {total_bytes} bytes");

        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Seeks to `offset` and writes `bytes` in full, holding the internal
    /// lock for the duration of the seek + write so no other task's write
    /// can land between them.
    pub async fn write_at(&self, offset: u64, bytes: &[u8]) -> Result<(), DownloadError> {
        let mut file = self.file.lock().await;
        file.seek(std::io::SeekFrom::Start(offset)).await?;
        file.write_all(bytes).await?;
        Ok(())
    }

    /// Flushes and releases the handle. On any terminal failure of the
    /// enclosing download the writer is still closed; the file is left with
    /// indeterminate (partial) contents — the core does not unlink it.
    pub async fn close(self) -> Result<(), DownloadError> {
        let mut file = self.file.into_inner();
        file.flush().await?;
        Ok(())
    }
}
