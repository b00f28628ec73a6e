// heapdb storage engine: heap table files, slotted pages and the LRU page cache

pub mod catalog;
pub mod common;
pub mod storage;

// Re-export key items for convenient access
pub use catalog::{Catalog, CatalogError, DataType, DataValue, RowSchema};
pub use common::config::StorageConfig;
pub use common::types::{PageId, Permission, RecordId, TxnId};
pub use storage::buffer::{BufferPool, BufferPoolError, CacheError, LruCache};
pub use storage::heap::{HeapFile, HeapFileError, HeapFileIterator, PageAccess};
pub use storage::page::{HeapPage, PageError};
pub use storage::tuple::Tuple;
