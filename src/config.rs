//! Download settings.

use std::path::PathBuf;
use std::time::Duration;

/// Size of each ranged request (1 MiB).
pub const DOWNLOAD_CHUNK_SIZE: u64 = 1024 * 1024;

/// Extra attempts per chunk after the first one fails.
pub const DOWNLOAD_CHUNK_RETRIES: u32 = 2;

/// Pause before retrying a chunk.
pub const DOWNLOAD_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Children requested per files.list page.
pub const FOLDER_ITEMS_PAGE_SIZE: u32 = 300;

/// Where run directories are created by default.
pub const DESTINATION_ROOT: &str = "./buffer_folder";

/// Tunables for one download run.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub destination_root: PathBuf,
    pub chunk_size: u64,
    pub chunk_retries: u32,
    pub retry_delay: Duration,
    pub page_size: u32,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            destination_root: PathBuf::from(DESTINATION_ROOT),
            chunk_size: DOWNLOAD_CHUNK_SIZE,
            chunk_retries: DOWNLOAD_CHUNK_RETRIES,
            retry_delay: DOWNLOAD_RETRY_DELAY,
            page_size: FOLDER_ITEMS_PAGE_SIZE,
        }
    }
}

impl DownloadOptions {
    pub fn with_destination_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.destination_root = root.into();
        self
    }

    /// Chunk size in bytes; zero is bumped to one.
    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_chunk_retries(mut self, retries: u32) -> Self {
        self.chunk_retries = retries;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, 1000);
        self
    }
}
