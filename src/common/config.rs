use crate::common::types::DEFAULT_PAGE_SIZE;

/// Default number of pages the buffer pool keeps in memory
pub const DEFAULT_CACHE_CAPACITY: usize = 50;

/// Configuration for the storage layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Size of every page in every table file, in bytes
    pub page_size: usize,

    /// Maximum number of decoded pages held by the buffer pool
    pub cache_capacity: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl StorageConfig {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_cache_capacity(mut self, cache_capacity: usize) -> Self {
        self.cache_capacity = cache_capacity;
        self
    }
}
