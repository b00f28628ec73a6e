use thiserror::Error;
use crate::common::types::{PageId, RecordId, TableId};

#[derive(Error, Debug)]
pub enum PageError {
    #[error("Tuple does not match the row schema of table {0}")]
    SchemaMismatch(TableId),
    #[error("No free slot in page {0}")]
    PageFull(PageId),
    #[error("Cannot delete tuple at {0:?}: slot is empty or belongs to another page")]
    InvalidDelete(Option<RecordId>),
    #[error("Corrupt page {page_id}, slot {slot}: {reason}")]
    Corrupt {
        page_id: PageId,
        slot: u32,
        reason: String,
    },
}
