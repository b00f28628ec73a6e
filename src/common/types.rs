use std::fmt;
use std::sync::Arc;
use parking_lot::RwLock;

use crate::storage::page::HeapPage;

/// Default page size in bytes (4KB)
pub const DEFAULT_PAGE_SIZE: usize = 4096;

/// Table ID type
pub type TableId = u32;

/// Page number within a table file
pub type PageNo = u32;

/// Slot index within a page
pub type SlotNo = u32;

/// Transaction ID type
pub type TxnId = u32;

/// Identifies one page of one table file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId {
    pub table_id: TableId,
    pub page_no: PageNo,
}

impl PageId {
    pub fn new(table_id: TableId, page_no: PageNo) -> Self {
        Self { table_id, page_no }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.table_id, self.page_no)
    }
}

/// Address of a stored tuple: the page plus the slot inside it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId {
    pub page_id: PageId,
    pub slot: SlotNo,
}

impl RecordId {
    pub fn new(page_id: PageId, slot: SlotNo) -> Self {
        Self { page_id, slot }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, slot {})", self.page_id, self.slot)
    }
}

/// Access mode requested when fetching a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ReadOnly,
    ReadWrite,
}

/// Shared handle to a decoded page
pub type PagePtr = Arc<RwLock<HeapPage>>;
