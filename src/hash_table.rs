//! The raw table: a bucket array of chain anchors and a data block, carved
//! out of one caller-supplied buffer.
//!
//! `RawTable` knows nothing about hashing or entry counts. It maps bucket
//! indices to chains and moves records between chains and the free list;
//! [`BufMap`](crate::BufMap) layers the hash function and the bookkeeping on
//! top.

use crate::arena::DataBlock;
use crate::error::BufMapError;
use crate::layout::ANCHOR_SIZE;
use crate::layout::MAX_BUFFER_SIZE;
use crate::layout::RECORD_HEADER_SIZE;
use crate::layout::min_buffer_size;
use crate::list::Anchor;
use crate::record::RecordRef;
use crate::trace::debug;

/// Statistics for inspecting how a table uses its buffer.
///
/// Requires the `stats` feature.
#[cfg(feature = "stats")]
#[derive(Debug, Clone, PartialEq)]
pub struct TableStats {
    /// Number of buckets in the table
    pub bucket_count: u32,
    /// Number of buckets with at least one record
    pub used_buckets: usize,
    /// Number of live entries
    pub entries: usize,
    /// Length of the longest bucket chain
    pub longest_chain: usize,
    /// Number of records waiting on the free list
    pub free_records: usize,
    /// Bytes those free records can hold, headers included
    pub free_bytes: usize,
    /// Bytes carved from the arena so far
    pub bytes_used: usize,
    /// Bytes the arena can hand out in total
    pub total_bytes: usize,
    /// Entries per bucket
    pub load_factor: f64,
}

#[cfg(feature = "stats")]
impl TableStats {
    /// Pretty-print the statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Buffer Table Statistics ===");
        println!(
            "Entries: {} in {}/{} buckets ({:.2} load factor)",
            self.entries, self.used_buckets, self.bucket_count, self.load_factor
        );
        println!("Longest chain: {}", self.longest_chain);
        println!(
            "Arena: {}/{} bytes carved ({:.2}%)",
            self.bytes_used,
            self.total_bytes,
            if self.total_bytes == 0 {
                0.0
            } else {
                (self.bytes_used as f64 / self.total_bytes as f64) * 100.0
            }
        );
        println!(
            "Free list: {} records, {} bytes reusable",
            self.free_records, self.free_bytes
        );
    }
}

pub(crate) struct RawTable<'a> {
    buf: &'a mut [u8],
    bucket_count: u32,
}

impl<'a> RawTable<'a> {
    /// Partitions `buf` into `bucket_count` empty buckets and a data block.
    ///
    /// All checks run before the buffer is written.
    pub(crate) fn new(buf: &'a mut [u8], bucket_count: u32) -> Result<Self, BufMapError> {
        if bucket_count == 0 {
            return Err(BufMapError::ZeroBucketCount);
        }

        if buf.len() > MAX_BUFFER_SIZE {
            return Err(BufMapError::BufferTooLarge {
                provided: buf.len(),
                max: MAX_BUFFER_SIZE,
            });
        }

        let required = min_buffer_size(bucket_count);
        if buf.len() < required {
            return Err(BufMapError::BufferTooSmall {
                required,
                provided: buf.len(),
            });
        }

        let mut table = Self { buf, bucket_count };
        table.reset();
        debug!(
            bucket_count,
            total_bytes = table.total_bytes(),
            "created buffer table"
        );
        Ok(table)
    }

    /// Empties every bucket and the free list and rewinds the arena.
    pub(crate) fn reset(&mut self) {
        let array_bytes = self.bucket_count as usize * ANCHOR_SIZE;
        self.buf[..array_bytes].fill(0);

        // `new` guarantees the buffer is at least the minimum size and fits a word.
        let total_bytes = self.buf.len() - min_buffer_size(self.bucket_count);
        self.data_block().init(self.buf, total_bytes as u32);
    }

    #[inline]
    fn data_block(&self) -> DataBlock {
        DataBlock::at(self.bucket_count as usize * ANCHOR_SIZE)
    }

    #[inline]
    pub(crate) fn bucket_count(&self) -> u32 {
        self.bucket_count
    }

    #[inline]
    pub(crate) fn bucket_index(&self, hash: u32) -> u32 {
        hash % self.bucket_count
    }

    #[inline]
    fn bucket(&self, index: u32) -> Anchor {
        debug_assert!(index < self.bucket_count);
        Anchor::at(index as usize * ANCHOR_SIZE)
    }

    #[inline]
    pub(crate) fn head(&self, index: u32) -> Option<RecordRef> {
        self.bucket(index).head(self.buf)
    }

    #[inline]
    pub(crate) fn next(&self, record: RecordRef) -> Option<RecordRef> {
        record.next(self.buf)
    }

    #[inline]
    pub(crate) fn key(&self, record: RecordRef) -> &[u8] {
        record.key(self.buf)
    }

    #[inline]
    pub(crate) fn value(&self, record: RecordRef) -> &[u8] {
        record.value(self.buf)
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, record: RecordRef) -> &mut [u8] {
        record.value_mut(self.buf)
    }

    #[inline]
    pub(crate) fn value_len(&self, record: RecordRef) -> usize {
        record.value_len(self.buf)
    }

    /// Replaces the value of `record` in place. The new value must not be
    /// longer than the stored one.
    pub(crate) fn overwrite_value(&mut self, record: RecordRef, value: &[u8]) {
        record.overwrite_value(self.buf, value);
    }

    /// Finds `key` in the chain of bucket `index`, returning the record and
    /// its predecessor.
    pub(crate) fn find(&self, index: u32, key: &[u8]) -> Option<(Option<RecordRef>, RecordRef)> {
        let buf: &[u8] = self.buf;
        self.bucket(index).find(buf, |r| r.key_eq(buf, key))
    }

    /// Allocates a record for `key` and `value` and appends it to bucket
    /// `index`.
    ///
    /// Returns `true` if the bucket was empty before. On failure nothing in
    /// the buffer changes.
    pub(crate) fn store(&mut self, index: u32, key: &[u8], value: &[u8]) -> Result<bool, BufMapError> {
        let requested = RECORD_HEADER_SIZE
            .checked_add(key.len())
            .and_then(|n| n.checked_add(value.len()))
            .unwrap_or(usize::MAX);

        let block = self.data_block();
        let Some(record) = block.allocate(self.buf, requested) else {
            let available = block.bytes_remaining(self.buf);
            debug!(requested, available, "no room for record");
            return Err(BufMapError::OutOfSpace {
                requested,
                available,
            });
        };

        record.write(self.buf, key, value);
        Ok(self.bucket(index).push_back(self.buf, record))
    }

    /// Moves `record` from bucket `index` to the free list.
    ///
    /// Returns `true` if the bucket is empty afterwards.
    pub(crate) fn release(&mut self, index: u32, prev: Option<RecordRef>, record: RecordRef) -> bool {
        let emptied = self.bucket(index).unlink(self.buf, prev, record);
        self.data_block().release(self.buf, record);
        emptied
    }

    #[inline]
    pub(crate) fn total_bytes(&self) -> usize {
        self.data_block().total_bytes(self.buf)
    }

    #[inline]
    pub(crate) fn bytes_used(&self) -> usize {
        self.data_block().bytes_used(self.buf)
    }

    #[inline]
    pub(crate) fn bytes_remaining(&self) -> usize {
        self.data_block().bytes_remaining(self.buf)
    }

    /// Number of records in bucket `index`.
    #[cfg(any(test, feature = "stats"))]
    pub(crate) fn chain_len(&self, index: u32) -> usize {
        self.bucket(index).iter(self.buf).count()
    }

    /// Number of records on the free list and the bytes they can hold.
    #[cfg(any(test, feature = "stats"))]
    pub(crate) fn free_list_usage(&self) -> (usize, usize) {
        self.data_block()
            .free_list()
            .iter(self.buf)
            .fold((0, 0), |(count, bytes), r| (count + 1, bytes + r.capacity(self.buf)))
    }

    #[cfg(feature = "stats")]
    pub(crate) fn stats(&self, entries: usize) -> TableStats {
        let (used_buckets, longest_chain) = (0..self.bucket_count)
            .map(|index| self.chain_len(index))
            .filter(|&len| len > 0)
            .fold((0, 0), |(used, longest), len| (used + 1, longest.max(len)));
        let (free_records, free_bytes) = self.free_list_usage();

        TableStats {
            bucket_count: self.bucket_count,
            used_buckets,
            entries,
            longest_chain,
            free_records,
            free_bytes,
            bytes_used: self.bytes_used(),
            total_bytes: self.total_bytes(),
            load_factor: entries as f64 / self.bucket_count as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_buckets() {
        let mut buf = [0u8; 512];
        assert_eq!(
            RawTable::new(&mut buf, 0).err(),
            Some(BufMapError::ZeroBucketCount)
        );
    }

    #[test]
    fn rejects_small_buffer_before_writing() {
        let mut buf = [0xaau8; 200];
        let err = RawTable::new(&mut buf, 10).err();
        assert_eq!(
            err,
            Some(BufMapError::BufferTooSmall {
                required: 224,
                provided: 200,
            })
        );
        assert!(buf.iter().all(|&b| b == 0xaa));
    }

    #[test]
    fn partitions_buffer() {
        let mut buf = [0xffu8; 1024];
        let table = RawTable::new(&mut buf, 4).unwrap();

        assert_eq!(table.bucket_count(), 4);
        assert_eq!(table.total_bytes(), 1024 - min_buffer_size(4));
        assert_eq!(table.bytes_used(), 0);
        assert_eq!(table.free_list_usage(), (0, 0));
        for index in 0..4 {
            assert_eq!(table.head(index), None);
        }
    }

    #[test]
    fn minimum_buffer_has_no_arena() {
        let mut buf = [0u8; 224];
        let mut table = RawTable::new(&mut buf, 10).unwrap();
        assert_eq!(table.total_bytes(), 0);
        assert!(matches!(
            table.store(0, b"k", b"v"),
            Err(BufMapError::OutOfSpace {
                requested: 14,
                available: 0
            })
        ));
    }

    #[test]
    fn store_find_release() {
        let mut buf = [0u8; 512];
        let mut table = RawTable::new(&mut buf, 2).unwrap();

        assert!(table.store(1, b"one", b"1").unwrap());
        assert!(!table.store(1, b"two", b"22").unwrap());
        assert_eq!(table.chain_len(1), 2);
        assert_eq!(table.chain_len(0), 0);

        let (prev, record) = table.find(1, b"two").unwrap();
        assert!(prev.is_some());
        assert_eq!(table.value(record), b"22");
        assert!(table.find(0, b"two").is_none());

        let used = table.bytes_used();
        assert!(!table.release(1, prev, record));
        assert_eq!(table.free_list_usage(), (1, RECORD_HEADER_SIZE + 5));
        assert_eq!(table.bytes_used(), used);

        let (prev, record) = table.find(1, b"one").unwrap();
        assert!(table.release(1, prev, record));
        assert_eq!(table.head(1), None);
    }

    #[test]
    fn failed_store_changes_nothing() {
        let mut buf = [0u8; 300];
        let mut table = RawTable::new(&mut buf, 1).unwrap();
        let total = table.total_bytes();

        let big = [7u8; 200];
        assert!(table.store(0, b"k", &big).is_err());
        assert_eq!(table.bytes_remaining(), total);
        assert_eq!(table.head(0), None);
    }

    #[test]
    fn reset_forgets_everything() {
        let mut buf = [0u8; 512];
        let mut table = RawTable::new(&mut buf, 3).unwrap();
        table.store(0, b"a", b"1").unwrap();
        table.store(2, b"b", b"2").unwrap();
        let (prev, record) = table.find(2, b"b").unwrap();
        table.release(2, prev, record);

        table.reset();
        assert_eq!(table.bytes_used(), 0);
        assert_eq!(table.free_list_usage(), (0, 0));
        assert!((0..3).all(|i| table.head(i).is_none()));
    }

    #[test]
    fn value_mut_edits_in_place() {
        let mut buf = [0u8; 512];
        let mut table = RawTable::new(&mut buf, 1).unwrap();
        table.store(0, b"key", b"abc").unwrap();

        let (_, record) = table.find(0, b"key").unwrap();
        table.value_mut(record).copy_from_slice(b"xyz");
        assert_eq!(table.value(record), b"xyz");
        assert_eq!(table.key(record), b"key");
    }

    #[cfg(feature = "stats")]
    #[test]
    fn stats_walk_the_layout() {
        let mut buf = [0u8; 1024];
        let mut table = RawTable::new(&mut buf, 4).unwrap();
        table.store(0, b"a", b"1").unwrap();
        table.store(0, b"b", b"2").unwrap();
        table.store(3, b"c", b"3").unwrap();
        let (prev, record) = table.find(3, b"c").unwrap();
        table.release(3, prev, record);

        let stats = table.stats(2);
        assert_eq!(stats.used_buckets, 1);
        assert_eq!(stats.longest_chain, 2);
        assert_eq!(stats.free_records, 1);
        assert_eq!(stats.free_bytes, RECORD_HEADER_SIZE + 2);
        assert_eq!(stats.bytes_used, 3 * (RECORD_HEADER_SIZE + 2));
        assert_eq!(stats.load_factor, 0.5);
    }
}
