use core::fmt::Debug;

use crate::config::Config;
use crate::config::default_config;
use crate::cursor::Cursor;
use crate::error::BufMapError;
use crate::hash::Fnv1a;
use crate::hash::KeyHasher;
use crate::hash_table::RawTable;
#[cfg(feature = "stats")]
use crate::hash_table::TableStats;
use crate::record::RecordRef;
use crate::trace::debug;

/// A byte-string map stored entirely inside a caller-supplied buffer.
///
/// `BufMap<'a, H>` resolves collisions by separate chaining: the front of the
/// buffer holds a fixed array of bucket anchors, and the rest is an arena of
/// variable-sized records linked into per-bucket chains. Removed records go
/// to a free list and are reused first-fit by later inserts. Nothing is ever
/// allocated and the table never resizes.
///
/// References returned by [`get`](Self::get), [`next_item`](Self::next_item)
/// and the iterators borrow the table, so the compiler rejects any insert or
/// remove while they are alive.
///
/// # Performance Characteristics
///
/// - **Lookup / insert / remove**: O(chain length)
/// - **Allocation**: O(free-list length) when reusing, O(1) when carving
/// - **Memory**: 12 bytes of header per record plus the key and value bytes;
///   8 bytes per bucket; 144 bytes of fixed overhead
///
/// # Examples
///
/// ```rust
/// use bufmap::BufMap;
///
/// let mut buffer = [0u8; 4096];
/// let mut map = BufMap::with_default_config(&mut buffer).unwrap();
///
/// map.insert(b"key1", b"val1").unwrap();
/// map.insert(b"key2", b"val2").unwrap();
///
/// assert_eq!(map.get(b"key1").unwrap(), Some(&b"val1"[..]));
/// assert!(!map.contains_key(b"key5"));
/// assert_eq!(map.remove(b"key5"), Ok(false));
/// ```
pub struct BufMap<'a, H = Fnv1a> {
    table: RawTable<'a>,
    hasher: H,
    len: usize,
    used_buckets: usize,
    cursor: Cursor,
}

impl<H> Debug for BufMap<'_, H>
where
    H: KeyHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.iter() {
            map.entry(&k, &v);
        }
        map.finish()
    }
}

impl<'a> BufMap<'a, Fnv1a> {
    /// Creates a map in `buffer` using [`default_config`] for its size.
    ///
    /// # Errors
    ///
    /// Returns [`BufMapError::BufferTooSmall`] if the buffer cannot hold the
    /// default bucket array and data block header, and
    /// [`BufMapError::BufferTooLarge`] if it exceeds `u32::MAX` bytes.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bufmap::BufMap;
    /// use bufmap::BufMapError;
    ///
    /// let mut buffer = [0u8; 512];
    /// assert!(BufMap::with_default_config(&mut buffer).is_ok());
    ///
    /// let mut tiny = [0u8; 16];
    /// assert!(matches!(
    ///     BufMap::with_default_config(&mut tiny),
    ///     Err(BufMapError::BufferTooSmall { .. })
    /// ));
    /// ```
    pub fn with_default_config(buffer: &'a mut [u8]) -> Result<Self, BufMapError> {
        let config = default_config(buffer.len());
        Self::new(buffer, config)
    }
}

impl<'a, H> BufMap<'a, H>
where
    H: KeyHasher,
{
    /// Creates a map in `buffer` with the given configuration.
    ///
    /// The buffer is split into `config.bucket_count` empty buckets followed
    /// by the data block. Whatever the buffer held before is overwritten.
    ///
    /// # Errors
    ///
    /// - [`BufMapError::ZeroBucketCount`] if `config.bucket_count` is zero
    /// - [`BufMapError::BufferTooLarge`] if the buffer exceeds `u32::MAX` bytes
    /// - [`BufMapError::BufferTooSmall`] if the buffer is shorter than
    ///   [`min_buffer_size`](crate::min_buffer_size)
    ///
    /// The buffer is untouched when an error is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bufmap::BufMap;
    /// use bufmap::Config;
    /// use bufmap::Fnv1a;
    /// use bufmap::min_buffer_size;
    ///
    /// let mut buffer = vec![0u8; min_buffer_size(8) + 256];
    /// let map = BufMap::new(&mut buffer, Config::new(Fnv1a, 8)).unwrap();
    /// assert_eq!(map.bucket_count(), 8);
    /// assert_eq!(map.bytes_remaining(), 256);
    /// ```
    pub fn new(buffer: &'a mut [u8], config: Config<H>) -> Result<Self, BufMapError> {
        let table = RawTable::new(buffer, config.bucket_count)?;
        Ok(Self {
            table,
            hasher: config.hasher,
            len: 0,
            used_buckets: 0,
            cursor: Cursor::new(),
        })
    }

    /// Returns the number of entries in the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bufmap::BufMap;
    /// let mut buffer = [0u8; 1024];
    /// let mut map = BufMap::with_default_config(&mut buffer).unwrap();
    /// assert_eq!(map.len(), 0);
    /// map.insert(b"a", b"1").unwrap();
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the map contains no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of buckets, fixed at creation.
    pub fn bucket_count(&self) -> u32 {
        self.table.bucket_count()
    }

    /// Returns the number of buckets holding at least one entry.
    pub fn used_buckets(&self) -> usize {
        self.used_buckets
    }

    /// Returns the hasher the map was configured with.
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Returns the number of bytes the arena can hand out in total.
    pub fn total_bytes(&self) -> usize {
        self.table.total_bytes()
    }

    /// Returns the number of arena bytes carved out so far.
    ///
    /// This is a high-water mark: removing entries does not lower it.
    pub fn bytes_used(&self) -> usize {
        self.table.bytes_used()
    }

    /// Returns the number of arena bytes never carved out.
    ///
    /// Removing an entry does not raise this figure. The freed record waits
    /// on the free list and is reused by a later insert that fits in it, in
    /// which case this figure does not drop either.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bufmap::BufMap;
    /// let mut buffer = [0u8; 1024];
    /// let mut map = BufMap::with_default_config(&mut buffer).unwrap();
    ///
    /// map.insert(b"key", b"value").unwrap();
    /// let remaining = map.bytes_remaining();
    ///
    /// map.remove(b"key").unwrap();
    /// assert_eq!(map.bytes_remaining(), remaining);
    /// map.insert(b"key", b"value").unwrap();
    /// assert_eq!(map.bytes_remaining(), remaining);
    /// ```
    pub fn bytes_remaining(&self) -> usize {
        self.table.bytes_remaining()
    }

    #[inline]
    fn bucket_of(&self, key: &[u8]) -> u32 {
        self.table.bucket_index(self.hasher.hash(key))
    }

    #[inline]
    fn find(&self, key: &[u8]) -> Result<Option<(u32, Option<RecordRef>, RecordRef)>, BufMapError> {
        if key.is_empty() {
            return Err(BufMapError::EmptyKey);
        }
        let index = self.bucket_of(key);
        Ok(self
            .table
            .find(index, key)
            .map(|(prev, record)| (index, prev, record)))
    }

    /// Detaches a live record, moves it to the free list and updates the
    /// counters.
    fn unlink(&mut self, index: u32, prev: Option<RecordRef>, record: RecordRef) {
        if self.table.release(index, prev, record) {
            self.used_buckets -= 1;
        }
        self.len -= 1;
    }

    /// Inserts or updates the value stored under `key`.
    ///
    /// `value` may be empty. If `key` is already present and `value` is no
    /// longer than the stored value, the bytes are overwritten in place and
    /// no space is consumed. A longer value moves the entry: the old record
    /// goes to the free list and a new record is allocated, from the free
    /// list first and from the arena otherwise.
    ///
    /// If that allocation fails the old entry stays removed. The key is no
    /// longer present after an [`OutOfSpace`](BufMapError::OutOfSpace) error
    /// on a growing update.
    ///
    /// # Errors
    ///
    /// - [`BufMapError::EmptyKey`] if `key` is empty; the map is unchanged
    /// - [`BufMapError::OutOfSpace`] if no record of the required size can be
    ///   found
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bufmap::BufMap;
    /// let mut buffer = [0u8; 1024];
    /// let mut map = BufMap::with_default_config(&mut buffer).unwrap();
    ///
    /// map.insert(b"key", b"value").unwrap();
    /// map.insert(b"key", b"v").unwrap();
    /// assert_eq!(map.get(b"key").unwrap(), Some(&b"v"[..]));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), BufMapError> {
        let (index, existing) = match self.find(key)? {
            Some((index, prev, record)) => (index, Some((prev, record))),
            None => (self.bucket_of(key), None),
        };

        if let Some((prev, record)) = existing {
            if value.len() <= self.table.value_len(record) {
                self.table.overwrite_value(record, value);
                return Ok(());
            }

            debug!(
                bucket = index,
                old_len = self.table.value_len(record),
                new_len = value.len(),
                "value outgrew its record, relocating"
            );
            self.unlink(index, prev, record);
        }

        if self.table.store(index, key, value)? {
            self.used_buckets += 1;
        }
        self.len += 1;
        Ok(())
    }

    /// Removes `key` from the map.
    ///
    /// Returns `Ok(true)` if the key was present and `Ok(false)` if it was
    /// not; removing an absent key changes nothing. The record's bytes are
    /// not returned to the arena, so [`bytes_remaining`](Self::bytes_remaining)
    /// is unaffected.
    ///
    /// # Errors
    ///
    /// Returns [`BufMapError::EmptyKey`] if `key` is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bufmap::BufMap;
    /// let mut buffer = [0u8; 1024];
    /// let mut map = BufMap::with_default_config(&mut buffer).unwrap();
    ///
    /// map.insert(b"key", b"value").unwrap();
    /// assert_eq!(map.remove(b"key"), Ok(true));
    /// assert_eq!(map.remove(b"key"), Ok(false));
    /// ```
    pub fn remove(&mut self, key: &[u8]) -> Result<bool, BufMapError> {
        match self.find(key)? {
            Some((index, prev, record)) => {
                self.unlink(index, prev, record);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Returns the value stored under `key`, or `None` if the key is absent.
    ///
    /// The returned slice points into the buffer and borrows the map, so it
    /// cannot outlive the next insert or remove.
    ///
    /// # Errors
    ///
    /// Returns [`BufMapError::EmptyKey`] if `key` is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bufmap::BufMap;
    /// let mut buffer = [0u8; 1024];
    /// let mut map = BufMap::with_default_config(&mut buffer).unwrap();
    ///
    /// map.insert(b"flag", b"").unwrap();
    /// assert_eq!(map.get(b"flag").unwrap(), Some(&b""[..]));
    /// assert_eq!(map.get(b"other").unwrap(), None);
    /// ```
    pub fn get(&self, key: &[u8]) -> Result<Option<&[u8]>, BufMapError> {
        Ok(self.find(key)?.map(|(_, _, record)| self.table.value(record)))
    }

    /// Returns the value stored under `key` for in-place editing.
    ///
    /// The slice has the stored value's length; use [`insert`](Self::insert)
    /// to change the length.
    ///
    /// # Errors
    ///
    /// Returns [`BufMapError::EmptyKey`] if `key` is empty.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bufmap::BufMap;
    /// let mut buffer = [0u8; 1024];
    /// let mut map = BufMap::with_default_config(&mut buffer).unwrap();
    ///
    /// map.insert(b"counter", &[0]).unwrap();
    /// if let Some(value) = map.get_mut(b"counter").unwrap() {
    ///     value[0] += 1;
    /// }
    /// assert_eq!(map.get(b"counter").unwrap(), Some(&[1u8][..]));
    /// ```
    pub fn get_mut(&mut self, key: &[u8]) -> Result<Option<&mut [u8]>, BufMapError> {
        match self.find(key)? {
            Some((_, _, record)) => Ok(Some(self.table.value_mut(record))),
            None => Ok(None),
        }
    }

    /// Returns `true` if the map contains `key`.
    ///
    /// An empty key is never stored, so it is never contained.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bufmap::BufMap;
    /// let mut buffer = [0u8; 1024];
    /// let mut map = BufMap::with_default_config(&mut buffer).unwrap();
    ///
    /// map.insert(b"key", b"value").unwrap();
    /// assert!(map.contains_key(b"key"));
    /// assert!(!map.contains_key(b"missing"));
    /// assert!(!map.contains_key(b""));
    /// ```
    pub fn contains_key(&self, key: &[u8]) -> bool {
        matches!(self.find(key), Ok(Some(_)))
    }

    /// Advances the map's built-in cursor and returns the entry under it.
    ///
    /// The cursor visits buckets in index order and each chain from head to
    /// tail, yielding every entry once. When it runs out it returns `None`,
    /// and keeps returning `None` until [`reset_cursor`](Self::reset_cursor)
    /// is called. A fresh map starts with a reset cursor.
    ///
    /// Inserting or removing entries mid-traversal is allowed but the
    /// cursor makes no promise about which entries it then visits; reset it
    /// and start over for a consistent view. The traversal always ends after
    /// at most [`len`](Self::len) entries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bufmap::BufMap;
    /// let mut buffer = [0u8; 4096];
    /// let mut map = BufMap::with_default_config(&mut buffer).unwrap();
    /// map.insert(b"a", b"1").unwrap();
    /// map.insert(b"b", b"2").unwrap();
    ///
    /// map.reset_cursor();
    /// let mut seen = 0;
    /// while let Some((key, value)) = map.next_item() {
    ///     assert_eq!(key.len(), 1);
    ///     assert_eq!(value.len(), 1);
    ///     seen += 1;
    /// }
    /// assert_eq!(seen, 2);
    /// assert!(map.next_item().is_none());
    /// ```
    pub fn next_item(&mut self) -> Option<(&[u8], &[u8])> {
        let record = self.cursor.advance(&self.table, self.len)?;
        Some((self.table.key(record), self.table.value(record)))
    }

    /// Rewinds the built-in cursor to the first bucket.
    pub fn reset_cursor(&mut self) {
        self.cursor.reset();
    }

    /// Returns an iterator over the entries, in cursor order.
    ///
    /// The iterator keeps its own position and leaves the built-in cursor
    /// alone.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bufmap::BufMap;
    /// let mut buffer = [0u8; 4096];
    /// let mut map = BufMap::with_default_config(&mut buffer).unwrap();
    /// map.insert(b"a", b"1").unwrap();
    /// map.insert(b"b", b"2").unwrap();
    ///
    /// let mut pairs: Vec<_> = map.iter().collect();
    /// pairs.sort();
    /// assert_eq!(pairs, [(&b"a"[..], &b"1"[..]), (&b"b"[..], &b"2"[..])]);
    /// ```
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            table: &self.table,
            cursor: Cursor::new(),
            len: self.len,
        }
    }

    /// Returns an iterator over the keys, in cursor order.
    pub fn keys(&self) -> Keys<'_> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values, in cursor order.
    pub fn values(&self) -> Values<'_> {
        Values { inner: self.iter() }
    }

    /// Removes every entry and rewinds the arena.
    ///
    /// Unlike [`remove`](Self::remove), this gives all arena bytes back.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bufmap::BufMap;
    /// let mut buffer = [0u8; 1024];
    /// let mut map = BufMap::with_default_config(&mut buffer).unwrap();
    /// let empty = map.bytes_remaining();
    ///
    /// map.insert(b"key", b"value").unwrap();
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.bytes_remaining(), empty);
    /// ```
    pub fn clear(&mut self) {
        self.table.reset();
        self.len = 0;
        self.used_buckets = 0;
        self.cursor.reset();
    }

    /// Returns statistics about bucket and arena usage.
    ///
    /// Walks every bucket and the free list, so it costs O(buckets +
    /// entries + free records).
    #[cfg(feature = "stats")]
    pub fn stats(&self) -> TableStats {
        self.table.stats(self.len)
    }
}

impl<'b, H> IntoIterator for &'b BufMap<'_, H>
where
    H: KeyHasher,
{
    type Item = (&'b [u8], &'b [u8]);
    type IntoIter = Iter<'b>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the entries of a [`BufMap`].
///
/// Created by [`BufMap::iter`].
pub struct Iter<'b> {
    table: &'b RawTable<'b>,
    cursor: Cursor,
    len: usize,
}

impl<'b> Iterator for Iter<'b> {
    type Item = (&'b [u8], &'b [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let table = self.table;
        let record = self.cursor.advance(table, self.len)?;
        Some((table.key(record), table.value(record)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.cursor.remaining(self.len)))
    }
}

/// An iterator over the keys of a [`BufMap`].
///
/// Created by [`BufMap::keys`].
pub struct Keys<'b> {
    inner: Iter<'b>,
}

impl<'b> Iterator for Keys<'b> {
    type Item = &'b [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// An iterator over the values of a [`BufMap`].
///
/// Created by [`BufMap::values`].
pub struct Values<'b> {
    inner: Iter<'b>,
}

impl<'b> Iterator for Values<'b> {
    type Item = &'b [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
