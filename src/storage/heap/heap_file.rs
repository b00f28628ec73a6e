use std::collections::hash_map::DefaultHasher;
use std::fs::{File, OpenOptions};
use std::hash::{Hash, Hasher};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use log::{debug, trace};
use parking_lot::Mutex;

use crate::catalog::schema::RowSchema;
use crate::common::types::{PageId, PageNo, PagePtr, Permission, TableId, TxnId};
use crate::storage::heap::error::{HeapFileError, Result};
use crate::storage::heap::iterator::HeapFileIterator;
use crate::storage::heap::PageAccess;
use crate::storage::page::{HeapPage, PageError, PageLayout};
use crate::storage::tuple::Tuple;

/// Derive a stable table ID from the absolute path of a table file.
///
/// Two different paths may collide; prefer IDs assigned by the `Catalog`.
pub fn table_id_for_path(path: impl AsRef<Path>) -> std::io::Result<TableId> {
    let absolute = std::path::absolute(path.as_ref())?;
    let mut hasher = DefaultHasher::new();
    absolute.hash(&mut hasher);
    let hash = hasher.finish();
    Ok((hash ^ (hash >> 32)) as TableId)
}

/// A table stored as an unordered, contiguous sequence of fixed-size pages.
///
/// Page `i` occupies bytes `[i * page_size, (i + 1) * page_size)` of the file.
/// The file only grows, one page at a time, through `write_page`.
pub struct HeapFile {
    table_id: TableId,
    path: PathBuf,
    schema: Arc<RowSchema>,
    page_size: usize,
    file: Mutex<File>,
}

impl HeapFile {
    /// Open (or create) the table file at `path`.
    ///
    /// Fails with `UnusablePageSize` when a page cannot hold at least one
    /// slot, which includes a page size of zero.
    pub fn open(
        path: impl AsRef<Path>,
        table_id: TableId,
        schema: Arc<RowSchema>,
        page_size: usize,
    ) -> Result<Self> {
        if PageLayout::new(page_size, schema.slot_width()).slot_count == 0 {
            return Err(HeapFileError::UnusablePageSize {
                page_size,
                slot_width: schema.slot_width(),
            });
        }

        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        debug!("Opened heap file {} as table {} with schema {}", path.display(), table_id, schema);

        Ok(Self {
            table_id,
            path,
            schema,
            page_size,
            file: Mutex::new(file),
        })
    }

    pub fn id(&self) -> TableId {
        self.table_id
    }

    pub fn schema(&self) -> &Arc<RowSchema> {
        &self.schema
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Number of pages currently on disk: ceil(file length / page size)
    pub fn num_pages(&self) -> Result<PageNo> {
        let len = self.file.lock().metadata()?.len();
        Ok(len.div_ceil(self.page_size as u64) as PageNo)
    }

    /// Read and decode one page. Takes no locks beyond the file handle;
    /// the caller must already hold permission on the page.
    pub fn read_page(&self, page_id: PageId) -> Result<HeapPage> {
        self.check_table(page_id)?;

        let page_size = self.page_size as u64;
        let mut buffer = vec![0u8; self.page_size];
        {
            let mut file = self.file.lock();
            let len = file.metadata()?.len();
            if (page_id.page_no as u64 + 1) * page_size > len {
                return Err(HeapFileError::OutOfRange {
                    page_id,
                    num_pages: len.div_ceil(page_size) as PageNo,
                });
            }

            file.seek(SeekFrom::Start(page_id.page_no as u64 * page_size))?;
            file.read_exact(&mut buffer).map_err(|e| match e.kind() {
                ErrorKind::UnexpectedEof => HeapFileError::ShortRead(page_id),
                _ => HeapFileError::IoError(e),
            })?;
        }

        trace!("Read page {} from {}", page_id, self.path.display());
        Ok(HeapPage::from_bytes(page_id, self.schema.clone(), &buffer)?)
    }

    /// Write the page's full encoding at its offset, extending the file if needed
    pub fn write_page(&self, page: &HeapPage) -> Result<()> {
        let page_id = page.page_id();
        self.check_table(page_id)?;

        let data = page.to_bytes();
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(page_id.page_no as u64 * self.page_size as u64))?;
        file.write_all(&data)?;
        file.flush()?;

        trace!("Wrote page {} to {}", page_id, self.path.display());
        Ok(())
    }

    /// Insert into the first page with a free slot, growing the file by one
    /// page when every existing page is full. Returns the mutated page,
    /// already marked dirty by `txn`.
    ///
    /// Callers must serialize inserts that may grow the file: two inserts
    /// that both see every page full would both append the same page number.
    pub fn insert_tuple(&self, txn: TxnId, tuple: &mut Tuple, access: &dyn PageAccess) -> Result<PagePtr> {
        // Checked up front so a bad tuple never grows the file
        if !self.schema.conforms(tuple.values()) {
            return Err(PageError::SchemaMismatch(self.table_id).into());
        }

        let num_pages = self.num_pages()?;
        for page_no in 0..num_pages {
            let page_id = PageId::new(self.table_id, page_no);
            let page = access.fetch_page(txn, page_id, Permission::ReadWrite)?;

            let inserted = {
                let mut guard = page.write();
                if guard.has_free_slot() {
                    guard.insert_tuple(tuple)?;
                    guard.mark_dirty(Some(txn));
                    true
                } else {
                    false
                }
            };
            if inserted {
                return Ok(page);
            }
        }

        let page_id = PageId::new(self.table_id, num_pages);
        debug!("Table {} has no free slot in {} pages, appending page {}", self.table_id, num_pages, page_id);
        self.write_page(&HeapPage::empty(page_id, self.schema.clone(), self.page_size))?;

        let page = access.fetch_page(txn, page_id, Permission::ReadWrite)?;
        {
            let mut guard = page.write();
            guard.insert_tuple(tuple)?;
            guard.mark_dirty(Some(txn));
        }
        Ok(page)
    }

    /// Delete the tuple at its stored record ID. Returns the mutated page,
    /// marked dirty by `txn`.
    pub fn delete_tuple(&self, txn: TxnId, tuple: &Tuple, access: &dyn PageAccess) -> Result<PagePtr> {
        let rid = tuple.record_id().ok_or(PageError::InvalidDelete(None))?;
        if rid.page_id.table_id != self.table_id || rid.page_id.page_no >= self.num_pages()? {
            return Err(PageError::InvalidDelete(Some(rid)).into());
        }

        let page = access.fetch_page(txn, rid.page_id, Permission::ReadWrite)?;
        {
            let mut guard = page.write();
            guard.delete_tuple(tuple)?;
            guard.mark_dirty(Some(txn));
        }
        Ok(page)
    }

    /// Lazy scan over every tuple, in page then slot order
    pub fn iter<'a>(&'a self, txn: TxnId, access: &'a dyn PageAccess) -> HeapFileIterator<'a> {
        HeapFileIterator::new(self, txn, access)
    }

    fn check_table(&self, page_id: PageId) -> Result<()> {
        if page_id.table_id != self.table_id {
            return Err(HeapFileError::TableMismatch {
                page_id,
                table_id: self.table_id,
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for HeapFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeapFile")
            .field("table_id", &self.table_id)
            .field("path", &self.path)
            .field("page_size", &self.page_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use crate::catalog::schema::DataType;
    use crate::catalog::value::DataValue;
    use parking_lot::RwLock;
    use tempfile::NamedTempFile;

    /// Page access that caches decoded pages in a map, with no eviction
    struct MapAccess<'a> {
        file: &'a HeapFile,
        pages: Mutex<HashMap<PageId, PagePtr>>,
    }

    impl<'a> MapAccess<'a> {
        fn new(file: &'a HeapFile) -> Self {
            Self {
                file,
                pages: Mutex::new(HashMap::new()),
            }
        }

        fn flush_all(&self) {
            for page in self.pages.lock().values() {
                self.file.write_page(&page.read()).unwrap();
            }
        }
    }

    impl PageAccess for MapAccess<'_> {
        fn fetch_page(&self, _txn: TxnId, page_id: PageId, _perm: Permission) -> Result<PagePtr> {
            let mut pages = self.pages.lock();
            if let Some(page) = pages.get(&page_id) {
                return Ok(page.clone());
            }
            let page = Arc::new(RwLock::new(self.file.read_page(page_id)?));
            pages.insert(page_id, page.clone());
            Ok(page)
        }
    }

    fn open_int_file(temp: &NamedTempFile, page_size: usize) -> HeapFile {
        let schema = Arc::new(RowSchema::from_types(&[DataType::Integer]));
        HeapFile::open(temp.path(), 1, schema, page_size).unwrap()
    }

    #[test]
    fn test_num_pages_rounds_up() {
        let temp = NamedTempFile::new().unwrap();
        let file = open_int_file(&temp, 64);
        assert_eq!(file.num_pages().unwrap(), 0);

        std::fs::write(temp.path(), vec![0u8; 65]).unwrap();
        assert_eq!(file.num_pages().unwrap(), 2);
    }

    #[test]
    fn test_read_out_of_range_and_short_page() {
        let temp = NamedTempFile::new().unwrap();
        let file = open_int_file(&temp, 64);
        assert!(matches!(
            file.read_page(PageId::new(1, 0)),
            Err(HeapFileError::OutOfRange { num_pages: 0, .. })
        ));

        // a trailing partial page counts toward num_pages but cannot be read
        std::fs::write(temp.path(), vec![0u8; 100]).unwrap();
        assert!(file.read_page(PageId::new(1, 0)).is_ok());
        assert!(matches!(file.read_page(PageId::new(1, 1)), Err(HeapFileError::OutOfRange { .. })));
    }

    #[test]
    fn test_read_foreign_page() {
        let temp = NamedTempFile::new().unwrap();
        let file = open_int_file(&temp, 64);
        assert!(matches!(
            file.read_page(PageId::new(2, 0)),
            Err(HeapFileError::TableMismatch { table_id: 1, .. })
        ));
    }

    #[test]
    fn test_write_then_read_page() {
        let temp = NamedTempFile::new().unwrap();
        let file = open_int_file(&temp, 64);
        let mut page = HeapPage::empty(PageId::new(1, 1), file.schema().clone(), 64);
        page.insert_tuple(&mut Tuple::new(vec![DataValue::Integer(-5)])).unwrap();

        // writing page 1 of an empty file extends it to two pages
        file.write_page(&page).unwrap();
        assert_eq!(file.num_pages().unwrap(), 2);
        assert_eq!(std::fs::metadata(temp.path()).unwrap().len(), 128);

        let read = file.read_page(PageId::new(1, 1)).unwrap();
        assert_eq!(read.to_bytes(), page.to_bytes());
        assert!(!read.is_dirty());
    }

    #[test]
    fn test_insert_grows_one_page_at_a_time() {
        let temp = NamedTempFile::new().unwrap();
        let file = open_int_file(&temp, 64);
        let access = MapAccess::new(&file);

        // 7 slots per 64 byte page
        for i in 0..7 {
            let mut t = Tuple::new(vec![DataValue::Integer(i)]);
            file.insert_tuple(1, &mut t, &access).unwrap();
            assert_eq!(t.record_id().unwrap().page_id.page_no, 0);
        }
        assert_eq!(file.num_pages().unwrap(), 1);

        let mut t = Tuple::new(vec![DataValue::Integer(7)]);
        let page = file.insert_tuple(1, &mut t, &access).unwrap();
        assert_eq!(file.num_pages().unwrap(), 2);
        assert_eq!(t.record_id().unwrap().page_id.page_no, 1);
        assert_eq!(t.record_id().unwrap().slot, 0);
        assert_eq!(page.read().dirtied_by(), Some(1));
    }

    #[test]
    fn test_schema_mismatch_does_not_grow_file() {
        let temp = NamedTempFile::new().unwrap();
        let file = open_int_file(&temp, 64);
        let access = MapAccess::new(&file);
        let mut bad = Tuple::new(vec![DataValue::Text("x".into())]);
        assert!(matches!(
            file.insert_tuple(1, &mut bad, &access),
            Err(HeapFileError::PageError(PageError::SchemaMismatch(1)))
        ));
        assert_eq!(file.num_pages().unwrap(), 0);
    }

    #[test]
    fn test_delete_and_reuse() {
        let temp = NamedTempFile::new().unwrap();
        let file = open_int_file(&temp, 64);
        let access = MapAccess::new(&file);
        let mut tuples = Vec::new();
        for i in 0..10 {
            let mut t = Tuple::new(vec![DataValue::Integer(i)]);
            file.insert_tuple(1, &mut t, &access).unwrap();
            tuples.push(t);
        }

        file.delete_tuple(1, &tuples[3], &access).unwrap();
        assert!(matches!(
            file.delete_tuple(1, &tuples[3], &access),
            Err(HeapFileError::PageError(PageError::InvalidDelete(Some(_))))
        ));

        let mut t = Tuple::new(vec![DataValue::Integer(100)]);
        file.insert_tuple(1, &mut t, &access).unwrap();
        assert_eq!(t.record_id(), tuples[3].record_id());

        // persisted only after an explicit write-back
        access.flush_all();
        let page = file.read_page(PageId::new(1, 0)).unwrap();
        assert_eq!(page.tuple(3).unwrap().values(), &[DataValue::Integer(100)]);
    }

    #[test]
    fn test_delete_unstored_or_foreign_tuple() {
        let temp = NamedTempFile::new().unwrap();
        let file = open_int_file(&temp, 64);
        let access = MapAccess::new(&file);
        let t = Tuple::new(vec![DataValue::Integer(1)]);
        assert!(matches!(
            file.delete_tuple(1, &t, &access),
            Err(HeapFileError::PageError(PageError::InvalidDelete(None)))
        ));

        let mut far = t.clone();
        far.set_record_id(Some(crate::common::types::RecordId::new(PageId::new(1, 9), 0)));
        assert!(matches!(
            file.delete_tuple(1, &far, &access),
            Err(HeapFileError::PageError(PageError::InvalidDelete(Some(_))))
        ));
    }

    #[test]
    fn test_open_rejects_unusable_page_size() {
        let temp = NamedTempFile::new().unwrap();
        let wide = Arc::new(RowSchema::from_types(&[DataType::Text { max_len: 100 }]));
        assert!(matches!(
            HeapFile::open(temp.path(), 1, wide, 64),
            Err(HeapFileError::UnusablePageSize { page_size: 64, slot_width: 104 })
        ));

        let ints = Arc::new(RowSchema::from_types(&[DataType::Integer]));
        assert!(matches!(
            HeapFile::open(temp.path(), 1, ints.clone(), 0),
            Err(HeapFileError::UnusablePageSize { page_size: 0, .. })
        ));

        // smallest page holding one 8-byte slot plus its bitmap byte
        assert!(HeapFile::open(temp.path(), 1, ints.clone(), 9).is_ok());
        assert!(HeapFile::open(temp.path(), 1, ints, 8).is_err());
        assert_eq!(std::fs::metadata(temp.path()).unwrap().len(), 0);
    }

    #[test]
    fn test_table_id_for_path_is_stable() {
        let a = table_id_for_path("some/table.dat").unwrap();
        let b = table_id_for_path("some/table.dat").unwrap();
        let c = table_id_for_path("other/table.dat").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
