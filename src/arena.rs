//! The data block: a bump-allocated arena for records plus the free list of
//! records reclaimed by removals.
//!
//! Data block layout: [free head][free tail][total_bytes][bytes_used][arena]
//!
//! `bytes_used` is a high-water mark. Freed records go to the free list and
//! are reused first-fit; they never give bytes back to the arena.

use crate::layout::ANCHOR_SIZE;
use crate::layout::DATA_BLOCK_HEADER_SIZE;
use crate::layout::WORD;
use crate::layout::read_word;
use crate::layout::write_word;
use crate::list::Anchor;
use crate::record::RecordRef;
use crate::trace::trace;

const TOTAL_BYTES_OFFSET: usize = ANCHOR_SIZE;
const BYTES_USED_OFFSET: usize = ANCHOR_SIZE + WORD;

/// Location of the data block header in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DataBlock {
    offset: usize,
}

impl DataBlock {
    pub(crate) const fn at(offset: usize) -> Self {
        Self { offset }
    }

    /// Resets the header: empty free list, nothing carved, `total_bytes` of
    /// arena available.
    pub(crate) fn init(self, buf: &mut [u8], total_bytes: u32) {
        self.free_list().clear(buf);
        write_word(buf, self.offset + TOTAL_BYTES_OFFSET, total_bytes);
        write_word(buf, self.offset + BYTES_USED_OFFSET, 0);
    }

    #[inline]
    pub(crate) fn free_list(self) -> Anchor {
        Anchor::at(self.offset)
    }

    #[inline]
    fn arena_start(self) -> usize {
        self.offset + DATA_BLOCK_HEADER_SIZE
    }

    #[inline]
    pub(crate) fn total_bytes(self, buf: &[u8]) -> usize {
        read_word(buf, self.offset + TOTAL_BYTES_OFFSET) as usize
    }

    #[inline]
    pub(crate) fn bytes_used(self, buf: &[u8]) -> usize {
        read_word(buf, self.offset + BYTES_USED_OFFSET) as usize
    }

    #[inline]
    pub(crate) fn bytes_remaining(self, buf: &[u8]) -> usize {
        self.total_bytes(buf) - self.bytes_used(buf)
    }

    /// Finds room for a record of `size` bytes.
    ///
    /// The free list is searched first-fit; failing that a new record is
    /// carved from the end of the arena. On success the record is detached
    /// from every list and its next link is cleared. Returns `None` without
    /// touching the buffer when neither source has room.
    pub(crate) fn allocate(self, buf: &mut [u8], size: usize) -> Option<RecordRef> {
        let free = self.free_list();
        let view: &[u8] = buf;
        let fit = free.find(view, |r| r.capacity(view) >= size);
        if let Some((prev, record)) = fit {
            trace!(offset = record.offset(), size, "reusing free record");
            free.unlink(buf, prev, record);
            return Some(record);
        }

        if size > self.bytes_remaining(buf) {
            return None;
        }

        let used = self.bytes_used(buf);
        let record = RecordRef::at(self.arena_start() + used)?;
        // `size` fits in the remaining arena, so the sum stays within a word.
        write_word(buf, self.offset + BYTES_USED_OFFSET, (used + size) as u32);
        record.set_next(buf, None);
        trace!(offset = record.offset(), size, "carved record from arena");
        Some(record)
    }

    /// Returns `record` to the free list. Its contents are left as-is.
    pub(crate) fn release(self, buf: &mut [u8], record: RecordRef) {
        self.free_list().push_back(buf, record);
    }
}
