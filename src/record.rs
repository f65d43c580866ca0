//! Records: one key/value pair plus the link to the next record of whichever
//! list currently owns it.
//!
//! Record layout: [next][key_len][value_len][key bytes][value bytes]

use core::num::NonZeroU32;

use crate::layout::RECORD_HEADER_SIZE;
use crate::layout::WORD;
use crate::layout::read_word;
use crate::layout::write_word;

const NEXT_OFFSET: usize = 0;
const KEY_LEN_OFFSET: usize = WORD;
const VALUE_LEN_OFFSET: usize = 2 * WORD;

/// Absolute offset of a record within the table buffer.
///
/// Offset zero always falls inside the bucket array, so a stored `0` word
/// encodes "no record" and `Option<RecordRef>` round-trips through the
/// buffer without a separate tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RecordRef(NonZeroU32);

impl RecordRef {
    /// Decodes a stored link.
    #[inline]
    pub(crate) fn from_link(link: u32) -> Option<Self> {
        NonZeroU32::new(link).map(Self)
    }

    /// Encodes an optional record as a stored link.
    #[inline]
    pub(crate) fn to_link(record: Option<Self>) -> u32 {
        record.map_or(0, |r| r.0.get())
    }

    /// Wraps an absolute offset. Returns `None` for offset zero or offsets
    /// beyond the word range.
    #[inline]
    pub(crate) fn at(offset: usize) -> Option<Self> {
        u32::try_from(offset).ok().and_then(Self::from_link)
    }

    #[inline]
    pub(crate) fn offset(self) -> usize {
        self.0.get() as usize
    }

    #[inline]
    pub(crate) fn next(self, buf: &[u8]) -> Option<Self> {
        Self::from_link(read_word(buf, self.offset() + NEXT_OFFSET))
    }

    #[inline]
    pub(crate) fn set_next(self, buf: &mut [u8], next: Option<Self>) {
        write_word(buf, self.offset() + NEXT_OFFSET, Self::to_link(next));
    }

    #[inline]
    pub(crate) fn key_len(self, buf: &[u8]) -> usize {
        read_word(buf, self.offset() + KEY_LEN_OFFSET) as usize
    }

    #[inline]
    pub(crate) fn value_len(self, buf: &[u8]) -> usize {
        read_word(buf, self.offset() + VALUE_LEN_OFFSET) as usize
    }

    /// Bytes this record can hold when reused: its header plus the key and
    /// value lengths it currently stores.
    #[inline]
    pub(crate) fn capacity(self, buf: &[u8]) -> usize {
        RECORD_HEADER_SIZE + self.key_len(buf) + self.value_len(buf)
    }

    #[inline]
    fn payload_start(self) -> usize {
        self.offset() + RECORD_HEADER_SIZE
    }

    pub(crate) fn key(self, buf: &[u8]) -> &[u8] {
        let start = self.payload_start();
        &buf[start..start + self.key_len(buf)]
    }

    pub(crate) fn value(self, buf: &[u8]) -> &[u8] {
        let start = self.payload_start() + self.key_len(buf);
        &buf[start..start + self.value_len(buf)]
    }

    pub(crate) fn value_mut(self, buf: &mut [u8]) -> &mut [u8] {
        let start = self.payload_start() + self.key_len(buf);
        let end = start + self.value_len(buf);
        &mut buf[start..end]
    }

    /// Compares the stored key against `key`, length first.
    #[inline]
    pub(crate) fn key_eq(self, buf: &[u8], key: &[u8]) -> bool {
        self.key_len(buf) == key.len() && self.key(buf) == key
    }

    /// Fills a freshly allocated record. The caller guarantees the record has
    /// room for `RECORD_HEADER_SIZE + key.len() + value.len()` bytes.
    pub(crate) fn write(self, buf: &mut [u8], key: &[u8], value: &[u8]) {
        let start = self.offset();
        write_word(buf, start + NEXT_OFFSET, 0);
        write_word(buf, start + KEY_LEN_OFFSET, key.len() as u32);
        write_word(buf, start + VALUE_LEN_OFFSET, value.len() as u32);

        let key_start = self.payload_start();
        let value_start = key_start + key.len();
        buf[key_start..value_start].copy_from_slice(key);
        buf[value_start..value_start + value.len()].copy_from_slice(value);
    }

    /// Replaces the stored value with one no longer than the current value.
    pub(crate) fn overwrite_value(self, buf: &mut [u8], value: &[u8]) {
        debug_assert!(value.len() <= self.value_len(buf));
        let start = self.payload_start() + self.key_len(buf);
        buf[start..start + value.len()].copy_from_slice(value);
        write_word(buf, self.offset() + VALUE_LEN_OFFSET, value.len() as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_encoding() {
        assert_eq!(RecordRef::from_link(0), None);
        assert_eq!(RecordRef::to_link(None), 0);

        let record = RecordRef::at(40).unwrap();
        assert_eq!(record.offset(), 40);
        assert_eq!(RecordRef::from_link(RecordRef::to_link(Some(record))), Some(record));
        assert!(RecordRef::at(0).is_none());
    }

    #[test]
    fn write_then_read_fields() {
        let mut buf = [0xffu8; 64];
        let record = RecordRef::at(8).unwrap();
        record.write(&mut buf, b"key", b"value");

        assert_eq!(record.next(&buf), None);
        assert_eq!(record.key(&buf), b"key");
        assert_eq!(record.value(&buf), b"value");
        assert_eq!(record.capacity(&buf), RECORD_HEADER_SIZE + 8);
        assert!(record.key_eq(&buf, b"key"));
        assert!(!record.key_eq(&buf, b"ke"));
        assert!(!record.key_eq(&buf, b"kez"));
    }

    #[test]
    fn shrinking_overwrite_shrinks_capacity() {
        let mut buf = [0u8; 64];
        let record = RecordRef::at(4).unwrap();
        record.write(&mut buf, b"k", b"longer");
        record.overwrite_value(&mut buf, b"ab");

        assert_eq!(record.value(&buf), b"ab");
        assert_eq!(record.capacity(&buf), RECORD_HEADER_SIZE + 3);
    }

    #[test]
    fn empty_value() {
        let mut buf = [0u8; 32];
        let record = RecordRef::at(4).unwrap();
        record.write(&mut buf, b"only-key", b"");
        assert_eq!(record.value(&buf), b"");
        assert_eq!(record.key(&buf), b"only-key");
    }

    #[test]
    fn next_link_round_trips() {
        let mut buf = [0u8; 64];
        let first = RecordRef::at(4).unwrap();
        let second = RecordRef::at(32).unwrap();
        first.write(&mut buf, b"a", b"1");
        second.write(&mut buf, b"b", b"2");

        first.set_next(&mut buf, Some(second));
        assert_eq!(first.next(&buf), Some(second));
        first.set_next(&mut buf, None);
        assert_eq!(first.next(&buf), None);
    }
}
