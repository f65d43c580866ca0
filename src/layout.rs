//! Byte layout of a table inside its buffer.
//!
//! Buffer layout: [bucket anchors][data block header][arena].
//!
//! Every integer stored in the buffer is a little-endian `u32` word, read and
//! written through bounds-checked slices, so the caller's buffer needs no
//! particular alignment.

/// Size of one stored integer.
pub(crate) const WORD: usize = core::mem::size_of::<u32>();

/// A chain anchor: head link followed by tail link.
pub(crate) const ANCHOR_SIZE: usize = 2 * WORD;

/// Free-list anchor, `total_bytes` and `bytes_used`.
pub(crate) const DATA_BLOCK_HEADER_SIZE: usize = ANCHOR_SIZE + 2 * WORD;

/// Record header: next link, key length and value length.
pub(crate) const RECORD_HEADER_SIZE: usize = 3 * WORD;

/// Bytes reserved for record storage when sizing the minimum buffer.
pub(crate) const MIN_DATA_RESERVE: usize = 128;

/// Largest buffer whose offsets fit in a stored word.
pub(crate) const MAX_BUFFER_SIZE: usize = u32::MAX as usize;

/// Returns the smallest buffer [`BufMap::new`](crate::BufMap::new) accepts
/// for `bucket_count` buckets.
///
/// The bucket array, the data block header and a 128-byte reserve all count
/// as overhead; the arena only receives what the buffer holds beyond this
/// size. A buffer of exactly this size therefore creates a valid, empty
/// table that cannot store any record.
///
/// ```rust
/// use bufmap::min_buffer_size;
///
/// assert!(min_buffer_size(10) < min_buffer_size(11));
/// let buffer = vec![0u8; min_buffer_size(32)];
/// # let _ = buffer;
/// ```
pub const fn min_buffer_size(bucket_count: u32) -> usize {
    (bucket_count as usize)
        .saturating_mul(ANCHOR_SIZE)
        .saturating_add(DATA_BLOCK_HEADER_SIZE)
        .saturating_add(MIN_DATA_RESERVE)
}

/// Reads the word stored at `at`.
///
/// # Panics
///
/// Panics if `at..at + WORD` is outside `buf`, which only happens when a
/// stored link is corrupt.
#[inline]
#[allow(clippy::expect_used)]
pub(crate) fn read_word(buf: &[u8], at: usize) -> u32 {
    let bytes = buf
        .get(at..at + WORD)
        .expect("Word offsets are bounds checked when the layout is built");
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Writes `value` as the word stored at `at`.
///
/// # Panics
///
/// Panics if `at..at + WORD` is outside `buf`.
#[inline]
#[allow(clippy::expect_used)]
pub(crate) fn write_word(buf: &mut [u8], at: usize, value: u32) {
    buf.get_mut(at..at + WORD)
        .expect("Word offsets are bounds checked when the layout is built")
        .copy_from_slice(&value.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_size_counts_every_section() {
        assert_eq!(min_buffer_size(0), 16 + 128);
        assert_eq!(min_buffer_size(1), 8 + 16 + 128);
        assert_eq!(min_buffer_size(10), 80 + 16 + 128);
    }

    #[test]
    fn min_size_saturates() {
        let huge = min_buffer_size(u32::MAX);
        assert!(huge >= u32::MAX as usize);
    }

    #[test]
    fn words_are_little_endian() {
        let mut buf = [0u8; 12];
        write_word(&mut buf, 4, 0x0403_0201);
        assert_eq!(buf[4..8], [1, 2, 3, 4]);
        assert_eq!(read_word(&buf, 4), 0x0403_0201);
        assert_eq!(read_word(&buf, 0), 0);
    }

    #[test]
    #[should_panic]
    fn out_of_range_word_panics() {
        let buf = [0u8; 6];
        read_word(&buf, 4);
    }
}
