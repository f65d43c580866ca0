//! Resumable traversal state.
//!
//! A cursor walks bucket 0 to the last bucket, each chain head to tail, and
//! never revisits a bucket it has passed. It also stops once it has yielded
//! as many records as the table holds live entries, so a traversal always
//! terminates even if the chains were mutated underneath it.

use crate::hash_table::RawTable;
use crate::record::RecordRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cursor {
    bucket: u32,
    item: Option<RecordRef>,
    traversed: usize,
    exhausted: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}

impl Cursor {
    pub(crate) const fn new() -> Self {
        Self {
            bucket: 0,
            item: None,
            traversed: 0,
            exhausted: false,
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::new();
    }

    /// Returns the next record, or `None` once the walk is over. After the
    /// first `None` every call returns `None` until [`Cursor::reset`].
    pub(crate) fn advance(&mut self, table: &RawTable<'_>, len: usize) -> Option<RecordRef> {
        if self.exhausted {
            return None;
        }

        while self.bucket < table.bucket_count() && self.traversed < len {
            if self.item.is_none() {
                self.item = table.head(self.bucket);
            }

            match self.item {
                Some(record) => {
                    self.item = table.next(record);
                    if self.item.is_none() {
                        self.bucket += 1;
                    }
                    self.traversed += 1;
                    return Some(record);
                }
                None => self.bucket += 1,
            }
        }

        self.exhausted = true;
        None
    }

    /// Upper bound on the records still to come.
    #[inline]
    pub(crate) fn remaining(&self, len: usize) -> usize {
        if self.exhausted {
            0
        } else {
            len.saturating_sub(self.traversed)
        }
    }

    #[cfg(test)]
    pub(crate) fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

#[cfg(test)]
mod tests {
    use std::vec::Vec;

    use super::*;

    fn drain(cursor: &mut Cursor, table: &RawTable<'_>, len: usize) -> Vec<Vec<u8>> {
        let mut keys = Vec::new();
        while let Some(record) = cursor.advance(table, len) {
            keys.push(table.key(record).to_vec());
        }
        keys
    }

    #[test]
    fn walks_buckets_in_order() {
        let mut buf = [0u8; 1024];
        let mut table = RawTable::new(&mut buf, 4).unwrap();
        table.store(2, b"c", b"").unwrap();
        table.store(0, b"a", b"").unwrap();
        table.store(2, b"d", b"").unwrap();
        table.store(3, b"e", b"").unwrap();
        table.store(0, b"b", b"").unwrap();

        let mut cursor = Cursor::new();
        let keys = drain(&mut cursor, &table, 5);
        assert_eq!(keys, [b"a", b"b", b"c", b"d", b"e"].map(|k| k.to_vec()));
        assert!(cursor.is_exhausted());
        assert_eq!(cursor.remaining(5), 0);
    }

    #[test]
    fn exhaustion_is_sticky_until_reset() {
        let mut buf = [0u8; 1024];
        let mut table = RawTable::new(&mut buf, 2).unwrap();
        table.store(1, b"k", b"v").unwrap();

        let mut cursor = Cursor::new();
        assert!(cursor.advance(&table, 1).is_some());
        assert!(cursor.advance(&table, 1).is_none());

        table.store(0, b"late", b"v").unwrap();
        assert!(cursor.advance(&table, 2).is_none());

        cursor.reset();
        assert_eq!(drain(&mut cursor, &table, 2).len(), 2);
    }

    #[test]
    fn live_count_bounds_the_walk() {
        let mut buf = [0u8; 1024];
        let mut table = RawTable::new(&mut buf, 1).unwrap();
        for key in [b"a", b"b", b"c"] {
            table.store(0, key, b"").unwrap();
        }

        let mut cursor = Cursor::new();
        assert_eq!(drain(&mut cursor, &table, 2).len(), 2);
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn empty_table_exhausts_immediately() {
        let mut buf = [0u8; 512];
        let table = RawTable::new(&mut buf, 8).unwrap();

        let mut cursor = Cursor::new();
        assert_eq!(cursor.remaining(0), 0);
        assert!(cursor.advance(&table, 0).is_none());
        assert!(cursor.is_exhausted());
    }
}
