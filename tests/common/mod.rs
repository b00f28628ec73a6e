#![allow(dead_code)]

use std::sync::Arc;
use tempfile::TempDir;
use heapdb::catalog::{Catalog, DataType, DataValue, RowSchema};
use heapdb::common::config::StorageConfig;
use heapdb::common::types::TableId;
use heapdb::storage::buffer::BufferPool;
use heapdb::storage::heap::HeapFile;
use heapdb::storage::tuple::Tuple;
use anyhow::Result;

/// A single-table database living in a temporary directory
pub struct TestTable {
    pub dir: TempDir,
    pub pool: Arc<BufferPool>,
    pub file: Arc<HeapFile>,
}

impl TestTable {
    pub fn id(&self) -> TableId {
        self.file.id()
    }
}

// Create a buffer pool over one fresh table with the given column types
pub fn create_test_table(page_size: usize, cache_capacity: usize, types: &[DataType]) -> Result<TestTable> {
    let dir = TempDir::new()?;
    let config = StorageConfig::default()
        .with_page_size(page_size)
        .with_cache_capacity(cache_capacity);
    let catalog = Arc::new(Catalog::new(config.page_size));
    let file = catalog.add_table(dir.path().join("table.dat"), RowSchema::from_types(types))?;
    let pool = Arc::new(BufferPool::new(catalog, &config)?);
    Ok(TestTable { dir, pool, file })
}

// Single integer column tuple
pub fn int_tuple(v: i64) -> Tuple {
    Tuple::new(vec![DataValue::Integer(v)])
}

// Collect every integer in the first column of a full table scan
pub fn scan_ints(table: &TestTable) -> Result<Vec<i64>> {
    let mut iter = table.file.iter(1, table.pool.as_ref());
    iter.open()?;
    let mut out = Vec::new();
    while iter.has_next()? {
        match iter.next()?.value(0) {
            Some(DataValue::Integer(v)) => out.push(*v),
            other => anyhow::bail!("unexpected value {:?}", other),
        }
    }
    iter.close();
    Ok(out)
}
