pub mod error;
pub mod heap_file;
pub mod iterator;

pub use error::HeapFileError;
pub use heap_file::{table_id_for_path, HeapFile};
pub use iterator::HeapFileIterator;

use crate::common::types::{PageId, PagePtr, Permission, TxnId};

/// Permissioned page access, normally provided by the buffer pool.
///
/// Pages handed out here may be shared with other transactions and stay
/// owned by the cache.
pub trait PageAccess: Send + Sync {
    fn fetch_page(&self, txn: TxnId, page_id: PageId, perm: Permission) -> error::Result<PagePtr>;
}
