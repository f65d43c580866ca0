use crate::hash::Fnv1a;
use crate::layout::ANCHOR_SIZE;
use crate::layout::min_buffer_size;

/// Fewest buckets [`default_config`] will ever choose.
pub const MIN_DEFAULT_BUCKETS: u32 = 10;

/// Share of the buffer, in percent, that [`default_config`] spends on the
/// bucket array.
const BUCKET_ARRAY_PERCENT: usize = 11;

/// Table configuration: the hash strategy and the fixed bucket count.
///
/// # Examples
///
/// ```rust
/// use bufmap::BufMap;
/// use bufmap::Config;
///
/// let mut buffer = [0u8; 1024];
/// let config = Config::new(|key: &[u8]| key.len() as u32, 16);
/// let mut map = BufMap::new(&mut buffer, config).unwrap();
/// map.insert(b"key", b"value").unwrap();
/// assert_eq!(map.get(b"key").unwrap(), Some(&b"value"[..]));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config<H = Fnv1a> {
    /// Hashes keys to bucket selectors.
    pub hasher: H,
    /// Number of buckets; fixed for the lifetime of the table.
    pub bucket_count: u32,
}

impl<H> Config<H> {
    /// Creates a configuration from a hasher and a bucket count.
    pub fn new(hasher: H, bucket_count: u32) -> Self {
        Self {
            hasher,
            bucket_count,
        }
    }

    /// Swaps the hash strategy, keeping the bucket count.
    ///
    /// ```rust
    /// use bufmap::default_config;
    ///
    /// let config = default_config(4096).with_hasher(|_: &[u8]| 0u32);
    /// assert_eq!(config.bucket_count, default_config(4096).bucket_count);
    /// ```
    pub fn with_hasher<G>(self, hasher: G) -> Config<G> {
        Config {
            hasher,
            bucket_count: self.bucket_count,
        }
    }

    /// Replaces the bucket count.
    pub fn with_bucket_count(self, bucket_count: u32) -> Self {
        Self {
            bucket_count,
            ..self
        }
    }

    /// Smallest buffer this configuration can be created in.
    pub fn min_buffer_size(&self) -> usize {
        min_buffer_size(self.bucket_count)
    }
}

impl Config<Fnv1a> {
    /// Same as [`default_config`].
    pub fn for_buffer_size(buffer_size: usize) -> Self {
        default_config(buffer_size)
    }
}

/// Derives a configuration for a buffer of `buffer_size` bytes.
///
/// Uses [`Fnv1a`] and sizes the bucket array to roughly 11% of the buffer,
/// never fewer than [`MIN_DEFAULT_BUCKETS`] buckets.
///
/// ```rust
/// use bufmap::MIN_DEFAULT_BUCKETS;
/// use bufmap::default_config;
///
/// assert_eq!(default_config(4096).bucket_count, 56);
/// assert_eq!(default_config(0).bucket_count, MIN_DEFAULT_BUCKETS);
/// ```
pub fn default_config(buffer_size: usize) -> Config<Fnv1a> {
    let target = (buffer_size / ANCHOR_SIZE).saturating_mul(BUCKET_ARRAY_PERCENT) / 100;
    let bucket_count = u32::try_from(target)
        .unwrap_or(u32::MAX)
        .max(MIN_DEFAULT_BUCKETS);

    Config {
        hasher: Fnv1a,
        bucket_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_respects_minimum() {
        for size in [0, 1, 100, 512, 727] {
            assert_eq!(default_config(size).bucket_count, MIN_DEFAULT_BUCKETS, "{size}");
        }
    }

    #[test]
    fn default_targets_share_of_buffer() {
        for size in [4096usize, 65536, 1 << 20] {
            let config = default_config(size);
            let array = config.bucket_count as usize * ANCHOR_SIZE;
            let percent = array * 100 / size;
            assert!((10..=12).contains(&percent), "{size}: {percent}%");
            assert!(config.min_buffer_size() < size);
        }
    }

    #[test]
    fn default_fits_small_buffers() {
        // The buffer from the minimal usage demo.
        assert!(default_config(512).min_buffer_size() <= 512);
    }

    #[test]
    fn builders_keep_other_field() {
        let config = default_config(4096).with_bucket_count(3);
        assert_eq!(config.bucket_count, 3);
        assert_eq!(config.hasher, Fnv1a);

        let config = config.with_hasher(|key: &[u8]| key.len() as u32);
        assert_eq!(config.bucket_count, 3);
    }
}
