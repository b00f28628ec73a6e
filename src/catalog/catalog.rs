use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use log::debug;
use parking_lot::RwLock;
use thiserror::Error;

use crate::catalog::schema::RowSchema;
use crate::common::types::TableId;
use crate::storage::heap::{HeapFile, HeapFileError};

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Table {0} is already registered")]
    DuplicateTable(TableId),
    #[error("Heap file error: {0}")]
    HeapFileError(#[from] HeapFileError),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Registry of open table files, keyed by table ID
pub struct Catalog {
    /// Page size every registered file is opened with
    page_size: usize,
    tables: RwLock<HashMap<TableId, Arc<HeapFile>>>,
    /// Counter for assigning unique table IDs
    table_id_counter: AtomicU32,
}

impl Catalog {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            tables: RwLock::new(HashMap::new()),
            table_id_counter: AtomicU32::new(1),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Open the table file at `path` under a freshly assigned ID
    pub fn add_table(&self, path: impl AsRef<Path>, schema: RowSchema) -> Result<Arc<HeapFile>> {
        let mut tables = self.tables.write();
        let mut table_id = self.table_id_counter.fetch_add(1, Ordering::SeqCst);
        // skip IDs that were registered explicitly
        while tables.contains_key(&table_id) {
            table_id = self.table_id_counter.fetch_add(1, Ordering::SeqCst);
        }
        self.register(&mut tables, path.as_ref(), table_id, schema)
    }

    /// Open the table file at `path` under a caller-chosen ID
    pub fn add_table_with_id(
        &self,
        path: impl AsRef<Path>,
        table_id: TableId,
        schema: RowSchema,
    ) -> Result<Arc<HeapFile>> {
        let mut tables = self.tables.write();
        if tables.contains_key(&table_id) {
            return Err(CatalogError::DuplicateTable(table_id));
        }
        self.register(&mut tables, path.as_ref(), table_id, schema)
    }

    pub fn get_table(&self, table_id: TableId) -> Option<Arc<HeapFile>> {
        self.tables.read().get(&table_id).cloned()
    }

    pub fn table_ids(&self) -> Vec<TableId> {
        let mut ids: Vec<TableId> = self.tables.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn register(
        &self,
        tables: &mut HashMap<TableId, Arc<HeapFile>>,
        path: &Path,
        table_id: TableId,
        schema: RowSchema,
    ) -> Result<Arc<HeapFile>> {
        let file = Arc::new(HeapFile::open(path, table_id, Arc::new(schema), self.page_size)?);
        tables.insert(table_id, file.clone());
        debug!("Registered table {} at {}", table_id, path.display());
        Ok(file)
    }
}
