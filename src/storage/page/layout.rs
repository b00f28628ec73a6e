/// Geometry of a slotted heap page.
///
/// A page is an occupancy bitmap of `bitmap_bytes` bytes followed by
/// `slot_count` slots of `slot_width` bytes each. Bit `i` of the bitmap lives
/// in byte `i / 8` at bit position `i % 8`. Any bytes left after the last slot
/// are always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLayout {
    pub page_size: usize,
    pub slot_width: usize,
    pub slot_count: usize,
    pub bitmap_bytes: usize,
}

impl PageLayout {
    /// Largest slot count with `ceil(n / 8) + n * slot_width <= page_size`
    pub fn new(page_size: usize, slot_width: usize) -> Self {
        let slot_count = (page_size * 8) / (slot_width * 8 + 1);
        Self {
            page_size,
            slot_width,
            slot_count,
            bitmap_bytes: slot_count.div_ceil(8),
        }
    }

    /// Byte offset of slot `slot` inside the page
    pub fn slot_offset(&self, slot: usize) -> usize {
        self.bitmap_bytes + slot * self.slot_width
    }

    pub fn slot_range(&self, slot: usize) -> std::ops::Range<usize> {
        let start = self.slot_offset(slot);
        start..start + self.slot_width
    }

    /// Location of the occupancy bit for `slot`: (byte index, bit mask)
    pub fn bit_position(slot: usize) -> (usize, u8) {
        (slot / 8, 1u8 << (slot % 8))
    }
}
