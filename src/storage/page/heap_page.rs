use std::sync::Arc;

use crate::catalog::schema::RowSchema;
use crate::common::types::{PageId, RecordId, SlotNo, TxnId};
use crate::storage::page::error::PageError;
use crate::storage::page::layout::PageLayout;
use crate::storage::tuple::Tuple;

/// A decoded heap page: occupancy bitmap plus fixed-width tuple slots.
///
/// The page is an in-memory copy; nothing reaches disk until the owner
/// writes it back with `HeapFile::write_page`.
#[derive(Debug, Clone)]
pub struct HeapPage {
    page_id: PageId,
    schema: Arc<RowSchema>,
    layout: PageLayout,
    header: Vec<u8>,
    tuples: Vec<Option<Tuple>>,
    dirtied_by: Option<TxnId>,
}

impl HeapPage {
    /// Create a page with every slot free
    pub fn empty(page_id: PageId, schema: Arc<RowSchema>, page_size: usize) -> Self {
        let layout = PageLayout::new(page_size, schema.slot_width());
        Self {
            page_id,
            schema,
            header: vec![0; layout.bitmap_bytes],
            tuples: vec![None; layout.slot_count],
            layout,
            dirtied_by: None,
        }
    }

    /// Decode a page; the length of `data` is taken as the page size
    pub fn from_bytes(page_id: PageId, schema: Arc<RowSchema>, data: &[u8]) -> Result<Self, PageError> {
        let layout = PageLayout::new(data.len(), schema.slot_width());
        let header = data[..layout.bitmap_bytes].to_vec();

        let mut tuples = Vec::with_capacity(layout.slot_count);
        for slot in 0..layout.slot_count {
            let (byte, mask) = PageLayout::bit_position(slot);
            if header[byte] & mask == 0 {
                tuples.push(None);
                continue;
            }

            let mut tuple = Tuple::decode(&schema, &data[layout.slot_range(slot)])
                .map_err(|reason| PageError::Corrupt {
                    page_id,
                    slot: slot as SlotNo,
                    reason,
                })?;
            tuple.set_record_id(Some(RecordId::new(page_id, slot as SlotNo)));
            tuples.push(Some(tuple));
        }

        Ok(Self {
            page_id,
            schema,
            layout,
            header,
            tuples,
            dirtied_by: None,
        })
    }

    /// Encode the page; always exactly `page_size` bytes with empty slots zeroed
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = vec![0u8; self.layout.page_size];
        data[..self.layout.bitmap_bytes].copy_from_slice(&self.header);

        for (slot, tuple) in self.tuples.iter().enumerate() {
            if let Some(tuple) = tuple {
                tuple.encode_into(&self.schema, &mut data[self.layout.slot_range(slot)]);
            }
        }
        data
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    pub fn schema(&self) -> &Arc<RowSchema> {
        &self.schema
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn slot_count(&self) -> usize {
        self.layout.slot_count
    }

    pub fn has_free_slot(&self) -> bool {
        (0..self.layout.slot_count).any(|slot| !self.is_slot_used(slot))
    }

    /// Number of slots with a clear occupancy bit
    pub fn free_slot_count(&self) -> usize {
        (0..self.layout.slot_count).filter(|&slot| !self.is_slot_used(slot)).count()
    }

    pub fn is_slot_used(&self, slot: usize) -> bool {
        if slot >= self.layout.slot_count {
            return false;
        }
        let (byte, mask) = PageLayout::bit_position(slot);
        self.header[byte] & mask != 0
    }

    fn set_slot(&mut self, slot: usize, used: bool) {
        let (byte, mask) = PageLayout::bit_position(slot);
        if used {
            self.header[byte] |= mask;
        } else {
            self.header[byte] &= !mask;
        }
    }

    /// Store the tuple in the lowest free slot and stamp its record ID
    pub fn insert_tuple(&mut self, tuple: &mut Tuple) -> Result<RecordId, PageError> {
        if !self.schema.conforms(tuple.values()) {
            return Err(PageError::SchemaMismatch(self.page_id.table_id));
        }

        let slot = (0..self.layout.slot_count)
            .find(|&slot| !self.is_slot_used(slot))
            .ok_or(PageError::PageFull(self.page_id))?;

        let rid = RecordId::new(self.page_id, slot as SlotNo);
        tuple.set_record_id(Some(rid));
        self.set_slot(slot, true);
        self.tuples[slot] = Some(tuple.clone());
        Ok(rid)
    }

    /// Free the slot named by the tuple's record ID
    pub fn delete_tuple(&mut self, tuple: &Tuple) -> Result<(), PageError> {
        let rid = tuple.record_id().ok_or(PageError::InvalidDelete(None))?;
        let slot = rid.slot as usize;
        if rid.page_id != self.page_id || !self.is_slot_used(slot) {
            return Err(PageError::InvalidDelete(Some(rid)));
        }

        self.set_slot(slot, false);
        self.tuples[slot] = None;
        Ok(())
    }

    /// Tag the page as dirty by `txn`, or clean when `None`
    pub fn mark_dirty(&mut self, txn: Option<TxnId>) {
        self.dirtied_by = txn;
    }

    /// The transaction that last dirtied this page, if it is dirty
    pub fn dirtied_by(&self) -> Option<TxnId> {
        self.dirtied_by
    }

    pub fn is_dirty(&self) -> bool {
        self.dirtied_by.is_some()
    }

    pub fn tuple(&self, slot: usize) -> Option<&Tuple> {
        self.tuples.get(slot).and_then(Option::as_ref)
    }

    /// Occupied slots in ascending slot order
    pub fn tuples(&self) -> impl Iterator<Item = &Tuple> {
        self.tuples.iter().flatten()
    }
}
