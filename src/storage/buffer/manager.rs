use std::sync::Arc;
use log::{debug, trace, warn};
use parking_lot::{Mutex, RwLock};

use crate::catalog::Catalog;
use crate::common::config::StorageConfig;
use crate::common::types::{PageId, PagePtr, Permission, TableId, TxnId};
use crate::storage::buffer::error::BufferPoolError;
use crate::storage::buffer::lru_cache::LruCache;
use crate::storage::heap::{HeapFile, HeapFileError, PageAccess};
use crate::storage::page::PageError;
use crate::storage::tuple::Tuple;

/// Owns the page cache and is the only path through which callers fetch
/// heap-file pages.
///
/// Eviction always inspects the least recently used page, writes it back if
/// it is dirty, and only then drops it from the cache. Permission is passed
/// through for the external lock manager and is not enforced here.
pub struct BufferPool {
    catalog: Arc<Catalog>,
    cache: Mutex<LruCache<PageId, PagePtr>>,
}

impl BufferPool {
    pub fn new(catalog: Arc<Catalog>, config: &StorageConfig) -> Result<Self, BufferPoolError> {
        Ok(Self {
            catalog,
            cache: Mutex::new(LruCache::new(config.cache_capacity)?),
        })
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Fetch a page from the cache, or from its heap file on a miss
    pub fn get_page(&self, txn: TxnId, page_id: PageId, perm: Permission) -> Result<PagePtr, BufferPoolError> {
        if let Some(page) = self.cache.lock().get(&page_id) {
            trace!("Cache hit for page {} (txn {}, {:?})", page_id, txn, perm);
            return Ok(page.clone());
        }

        let file = self.heap_file(page_id.table_id)?;
        let page = Arc::new(RwLock::new(file.read_page(page_id)?));
        trace!("Cache miss for page {} (txn {}, {:?})", page_id, txn, perm);

        let mut cache = self.cache.lock();
        // another caller may have loaded it while the cache was unlocked
        if let Some(existing) = cache.get(&page_id) {
            return Ok(existing.clone());
        }
        self.cache_page(&mut cache, page_id, page.clone())?;
        Ok(page)
    }

    /// Insert into the table's heap file; the mutated page stays cached and dirty
    pub fn insert_tuple(&self, txn: TxnId, table_id: TableId, tuple: &mut Tuple) -> Result<PagePtr, BufferPoolError> {
        let file = self.heap_file(table_id)?;
        let page = file.insert_tuple(txn, tuple, self)?;
        self.recache(&page)?;
        Ok(page)
    }

    /// Delete the tuple at its record ID; the mutated page stays cached and dirty
    pub fn delete_tuple(&self, txn: TxnId, tuple: &Tuple) -> Result<PagePtr, BufferPoolError> {
        let table_id = tuple
            .record_id()
            .map(|rid| rid.page_id.table_id)
            .ok_or(HeapFileError::PageError(PageError::InvalidDelete(None)))?;
        let file = self.heap_file(table_id)?;
        let page = file.delete_tuple(txn, tuple, self)?;
        self.recache(&page)?;
        Ok(page)
    }

    /// Write a cached page back to disk if it is dirty
    pub fn flush_page(&self, page_id: PageId) -> Result<(), BufferPoolError> {
        let page = self
            .cache
            .lock()
            .peek(&page_id)
            .cloned()
            .ok_or(BufferPoolError::PageNotFound(page_id))?;
        self.write_back(&page)
    }

    /// Write back every cached page dirtied by `txn`
    pub fn flush_pages(&self, txn: TxnId) -> Result<(), BufferPoolError> {
        for page in self.cached_pages() {
            if page.read().dirtied_by() == Some(txn) {
                self.write_back(&page)?;
            }
        }
        Ok(())
    }

    pub fn flush_all_pages(&self) -> Result<(), BufferPoolError> {
        for page in self.cached_pages() {
            self.write_back(&page)?;
        }
        Ok(())
    }

    /// Drop a page from the cache without writing it back
    pub fn discard_page(&self, page_id: PageId) {
        if self.cache.lock().remove(&page_id).is_some() {
            debug!("Discarded page {}", page_id);
        }
    }

    pub fn is_cached(&self, page_id: PageId) -> bool {
        self.cache.lock().contains(&page_id)
    }

    pub fn cached_page_count(&self) -> usize {
        self.cache.lock().len()
    }

    /// Snapshot of the cached page handles, in no particular order
    pub fn cached_pages(&self) -> Vec<PagePtr> {
        self.cache.lock().values().cloned().collect()
    }

    /// Cached page IDs from most to least recently used
    pub fn cached_page_ids(&self) -> Vec<PageId> {
        self.cache.lock().keys_by_recency().copied().collect()
    }

    fn heap_file(&self, table_id: TableId) -> Result<Arc<HeapFile>, BufferPoolError> {
        self.catalog
            .get_table(table_id)
            .ok_or(BufferPoolError::UnknownTable(table_id))
    }

    /// Put a page handle in the cache, evicting as needed
    fn cache_page(
        &self,
        cache: &mut LruCache<PageId, PagePtr>,
        page_id: PageId,
        page: PagePtr,
    ) -> Result<(), BufferPoolError> {
        if !cache.contains(&page_id) {
            while cache.is_full() {
                self.evict_page(cache)?;
            }
        }
        cache.put(page_id, page)?;
        Ok(())
    }

    /// Make sure a page returned by a heap-file operation is cached and most recent
    fn recache(&self, page: &PagePtr) -> Result<(), BufferPoolError> {
        let page_id = page.read().page_id();
        let mut cache = self.cache.lock();
        self.cache_page(&mut cache, page_id, page.clone())
    }

    /// Flush the least recently used page if dirty, then drop it
    fn evict_page(&self, cache: &mut LruCache<PageId, PagePtr>) -> Result<(), BufferPoolError> {
        let Some(victim_id) = cache.peek_eviction_candidate().copied() else {
            return Ok(());
        };
        if let Some(victim) = cache.peek(&victim_id) {
            if let Err(e) = self.write_back(victim) {
                warn!("Failed to flush page {} before eviction: {}", victim_id, e);
                return Err(e);
            }
        }
        cache.remove(&victim_id);
        debug!("Evicted page {}", victim_id);
        Ok(())
    }

    fn write_back(&self, page: &PagePtr) -> Result<(), BufferPoolError> {
        let mut guard = page.write();
        if let Some(txn) = guard.dirtied_by() {
            let file = self.heap_file(guard.page_id().table_id)?;
            file.write_page(&guard)?;
            guard.mark_dirty(None);
            trace!("Flushed page {} dirtied by txn {}", guard.page_id(), txn);
        }
        Ok(())
    }
}

impl PageAccess for BufferPool {
    fn fetch_page(&self, txn: TxnId, page_id: PageId, perm: Permission) -> Result<PagePtr, HeapFileError> {
        self.get_page(txn, page_id, perm).map_err(|e| match e {
            BufferPoolError::HeapFileError(inner) => inner,
            other => HeapFileError::AccessError(Box::new(other)),
        })
    }
}
