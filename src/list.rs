//! Singly-linked record lists anchored by a head/tail pair in the buffer.
//!
//! Bucket chains and the free list share this implementation; a record is
//! owned by exactly one list at a time and moves between lists by
//! [`Anchor::unlink`] followed by [`Anchor::push_back`].

use crate::layout::WORD;
use crate::layout::read_word;
use crate::layout::write_word;
use crate::record::RecordRef;

/// Location of a head/tail pair in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Anchor {
    offset: usize,
}

impl Anchor {
    pub(crate) const fn at(offset: usize) -> Self {
        Self { offset }
    }

    #[inline]
    pub(crate) fn head(self, buf: &[u8]) -> Option<RecordRef> {
        RecordRef::from_link(read_word(buf, self.offset))
    }

    #[inline]
    pub(crate) fn tail(self, buf: &[u8]) -> Option<RecordRef> {
        RecordRef::from_link(read_word(buf, self.offset + WORD))
    }

    #[inline]
    fn set_head(self, buf: &mut [u8], record: Option<RecordRef>) {
        write_word(buf, self.offset, RecordRef::to_link(record));
    }

    #[inline]
    fn set_tail(self, buf: &mut [u8], record: Option<RecordRef>) {
        write_word(buf, self.offset + WORD, RecordRef::to_link(record));
    }

    #[inline]
    pub(crate) fn is_empty(self, buf: &[u8]) -> bool {
        self.head(buf).is_none()
    }

    pub(crate) fn clear(self, buf: &mut [u8]) {
        self.set_head(buf, None);
        self.set_tail(buf, None);
    }

    /// Appends `record`, clearing any stale next link it carries.
    ///
    /// Returns `true` if the list was empty before the append.
    pub(crate) fn push_back(self, buf: &mut [u8], record: RecordRef) -> bool {
        record.set_next(buf, None);
        match self.tail(buf) {
            None => {
                self.set_head(buf, Some(record));
                self.set_tail(buf, Some(record));
                true
            }
            Some(tail) => {
                tail.set_next(buf, Some(record));
                self.set_tail(buf, Some(record));
                false
            }
        }
    }

    /// Detaches `record`, whose predecessor in this list is `prev`.
    ///
    /// Returns `true` if the list is empty afterwards.
    pub(crate) fn unlink(self, buf: &mut [u8], prev: Option<RecordRef>, record: RecordRef) -> bool {
        let next = record.next(buf);

        if self.head(buf) == Some(record) {
            self.set_head(buf, next);
        }

        if self.tail(buf) == Some(record) {
            self.set_tail(buf, prev);
        }

        if let Some(prev) = prev {
            prev.set_next(buf, next);
        }

        record.set_next(buf, None);
        self.is_empty(buf)
    }

    /// Returns the first record matching `pred` together with its
    /// predecessor.
    pub(crate) fn find(
        self,
        buf: &[u8],
        mut pred: impl FnMut(RecordRef) -> bool,
    ) -> Option<(Option<RecordRef>, RecordRef)> {
        let mut prev = None;
        let mut current = self.head(buf);

        while let Some(record) = current {
            if pred(record) {
                return Some((prev, record));
            }
            prev = Some(record);
            current = record.next(buf);
        }

        None
    }

    /// Walks the list from head to tail.
    pub(crate) fn iter(self, buf: &[u8]) -> Chain<'_> {
        Chain {
            buf,
            current: self.head(buf),
        }
    }
}

/// Iterator over the records of one list.
pub(crate) struct Chain<'a> {
    buf: &'a [u8],
    current: Option<RecordRef>,
}

impl Iterator for Chain<'_> {
    type Item = RecordRef;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.current?;
        self.current = record.next(self.buf);
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use std::vec::Vec;

    use super::*;

    const ANCHOR: Anchor = Anchor::at(0);

    fn records(buf: &mut [u8], count: usize) -> Vec<RecordRef> {
        (0..count)
            .map(|i| {
                let record = RecordRef::at(16 + i * 16).unwrap();
                record.write(buf, &[b'a' + i as u8], b"");
                record
            })
            .collect()
    }

    fn collect(buf: &[u8]) -> Vec<RecordRef> {
        ANCHOR.iter(buf).collect()
    }

    #[test]
    fn push_back_links_in_order() {
        let mut buf = [0u8; 128];
        let recs = records(&mut buf, 3);

        assert!(ANCHOR.is_empty(&buf));
        assert!(ANCHOR.push_back(&mut buf, recs[0]));
        assert!(!ANCHOR.push_back(&mut buf, recs[1]));
        assert!(!ANCHOR.push_back(&mut buf, recs[2]));

        assert_eq!(collect(&buf), recs);
        assert_eq!(ANCHOR.head(&buf), Some(recs[0]));
        assert_eq!(ANCHOR.tail(&buf), Some(recs[2]));
    }

    #[test]
    fn unlink_head_middle_tail() {
        let mut buf = [0u8; 128];
        let recs = records(&mut buf, 4);
        for &r in &recs {
            ANCHOR.push_back(&mut buf, r);
        }

        // middle
        assert!(!ANCHOR.unlink(&mut buf, Some(recs[1]), recs[2]));
        assert_eq!(collect(&buf), [recs[0], recs[1], recs[3]]);
        assert_eq!(recs[2].next(&buf), None);

        // head
        assert!(!ANCHOR.unlink(&mut buf, None, recs[0]));
        assert_eq!(collect(&buf), [recs[1], recs[3]]);
        assert_eq!(ANCHOR.head(&buf), Some(recs[1]));

        // tail
        assert!(!ANCHOR.unlink(&mut buf, Some(recs[1]), recs[3]));
        assert_eq!(collect(&buf), [recs[1]]);
        assert_eq!(ANCHOR.tail(&buf), Some(recs[1]));

        // last one
        assert!(ANCHOR.unlink(&mut buf, None, recs[1]));
        assert!(ANCHOR.is_empty(&buf));
        assert_eq!(ANCHOR.tail(&buf), None);
    }

    #[test]
    fn push_after_tail_unlink_appends_to_new_tail() {
        let mut buf = [0u8; 128];
        let recs = records(&mut buf, 3);
        ANCHOR.push_back(&mut buf, recs[0]);
        ANCHOR.push_back(&mut buf, recs[1]);

        ANCHOR.unlink(&mut buf, Some(recs[0]), recs[1]);
        ANCHOR.push_back(&mut buf, recs[2]);

        assert_eq!(collect(&buf), [recs[0], recs[2]]);
    }

    #[test]
    fn find_reports_predecessor() {
        let mut buf = [0u8; 128];
        let recs = records(&mut buf, 3);
        for &r in &recs {
            ANCHOR.push_back(&mut buf, r);
        }

        assert_eq!(
            ANCHOR.find(&buf, |r| r.key_eq(&buf, b"a")),
            Some((None, recs[0]))
        );
        assert_eq!(
            ANCHOR.find(&buf, |r| r.key_eq(&buf, b"c")),
            Some((Some(recs[1]), recs[2]))
        );
        assert_eq!(ANCHOR.find(&buf, |r| r.key_eq(&buf, b"z")), None);
    }

    #[test]
    fn stale_next_is_cleared_on_push() {
        let mut buf = [0u8; 128];
        let recs = records(&mut buf, 2);
        recs[0].set_next(&mut buf, Some(recs[1]));

        ANCHOR.push_back(&mut buf, recs[0]);
        assert_eq!(collect(&buf), [recs[0]]);
    }
}
