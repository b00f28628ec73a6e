// Heap File Iterator
//
// Walks every occupied slot of a heap file, page by page, fetching each page
// through the page access layer only when the scan reaches it.

use std::vec::IntoIter;

use crate::common::types::{PageId, PageNo, Permission, TxnId};
use crate::storage::heap::error::{HeapFileError, Result};
use crate::storage::heap::heap_file::HeapFile;
use crate::storage::heap::PageAccess;
use crate::storage::tuple::Tuple;

/// Restartable tuple scan over a `HeapFile`.
///
/// Protocol: `open`, then `has_next` / `next` until exhausted; `rewind` starts
/// over from page 0 and `close` releases the current page's tuples.
pub struct HeapFileIterator<'a> {
    file: &'a HeapFile,
    txn: TxnId,
    access: &'a dyn PageAccess,
    /// Page whose tuples are in `current`
    page_no: PageNo,
    /// `None` until opened and after close
    current: Option<IntoIter<Tuple>>,
}

impl<'a> HeapFileIterator<'a> {
    pub(crate) fn new(file: &'a HeapFile, txn: TxnId, access: &'a dyn PageAccess) -> Self {
        Self {
            file,
            txn,
            access,
            page_no: 0,
            current: None,
        }
    }

    /// Reset to page 0. An empty file opens fine and yields nothing.
    pub fn open(&mut self) -> Result<()> {
        self.page_no = 0;
        self.current = Some(self.page_tuples(0)?);
        Ok(())
    }

    /// Whether another tuple remains, moving to later pages as needed
    pub fn has_next(&mut self) -> Result<bool> {
        loop {
            let current = self.current.as_ref().ok_or(HeapFileError::IterationMisuse)?;
            if current.len() > 0 {
                return Ok(true);
            }

            let next_page = self.page_no + 1;
            if next_page >= self.file.num_pages()? {
                return Ok(false);
            }
            self.current = Some(self.page_tuples(next_page)?);
            self.page_no = next_page;
        }
    }

    pub fn next(&mut self) -> Result<Tuple> {
        if !self.has_next()? {
            return Err(HeapFileError::IterationExhausted);
        }
        self.current
            .as_mut()
            .and_then(Iterator::next)
            .ok_or(HeapFileError::IterationExhausted)
    }

    /// Close and reopen from the first page
    pub fn rewind(&mut self) -> Result<()> {
        self.close();
        self.open()
    }

    pub fn close(&mut self) {
        self.current = None;
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// Snapshot the occupied tuples of one page, in slot order
    fn page_tuples(&self, page_no: PageNo) -> Result<IntoIter<Tuple>> {
        if page_no >= self.file.num_pages()? {
            return Ok(Vec::new().into_iter());
        }

        let page_id = PageId::new(self.file.id(), page_no);
        let page = self.access.fetch_page(self.txn, page_id, Permission::ReadOnly)?;
        let tuples: Vec<Tuple> = page.read().tuples().cloned().collect();
        Ok(tuples.into_iter())
    }
}
