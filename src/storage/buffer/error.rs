use thiserror::Error;
use crate::common::types::{PageId, TableId};
use crate::storage::heap::HeapFileError;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache is full ({capacity} entries); evict before inserting")]
    Full { capacity: usize },
    #[error("Cache capacity must be at least 1")]
    ZeroCapacity,
}

#[derive(Error, Debug)]
pub enum BufferPoolError {
    #[error("Heap file error: {0}")]
    HeapFileError(#[from] HeapFileError),
    #[error("Cache error: {0}")]
    CacheError(#[from] CacheError),
    #[error("No table with ID {0} is registered")]
    UnknownTable(TableId),
    #[error("Page {0} not found in buffer pool")]
    PageNotFound(PageId),
}
