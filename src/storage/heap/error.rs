use std::io;
use thiserror::Error;

use crate::common::types::{PageId, TableId};
use crate::storage::page::PageError;

#[derive(Error, Debug)]
pub enum HeapFileError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Page {page_id} is beyond the end of the file ({num_pages} pages)")]
    OutOfRange { page_id: PageId, num_pages: u32 },
    #[error("Page size {page_size} cannot hold a single {slot_width}-byte slot")]
    UnusablePageSize { page_size: usize, slot_width: usize },
    #[error("Short read of page {0}")]
    ShortRead(PageId),
    #[error("Page {page_id} does not belong to table {table_id}")]
    TableMismatch { page_id: PageId, table_id: TableId },
    #[error("Page error: {0}")]
    PageError(#[from] PageError),
    #[error("Iterator used before open or after close")]
    IterationMisuse,
    #[error("No more tuples")]
    IterationExhausted,
    #[error("Page access failed: {0}")]
    AccessError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, HeapFileError>;
