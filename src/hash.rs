//! Key hashing strategies.
//!
//! A [`BufMap`](crate::BufMap) hashes every key exactly once per operation
//! and reduces the result modulo its bucket count. Any type implementing
//! [`KeyHasher`] can be injected through [`Config`](crate::Config),
//! including plain functions and closures of shape `Fn(&[u8]) -> u32`.

/// Hashes an opaque byte key to a 32-bit bucket selector.
///
/// Implementations must be deterministic for the lifetime of a table: the
/// same key must always produce the same hash, otherwise lookups walk the
/// wrong chain.
pub trait KeyHasher {
    /// Hashes `key`.
    fn hash(&self, key: &[u8]) -> u32;
}

impl<F> KeyHasher for F
where
    F: Fn(&[u8]) -> u32,
{
    #[inline]
    fn hash(&self, key: &[u8]) -> u32 {
        self(key)
    }
}

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// 32-bit FNV-1a, the default hasher.
///
/// Order-sensitive and seed-free, which keeps bucket placement reproducible
/// across runs and targets.
///
/// ```rust
/// use bufmap::Fnv1a;
/// use bufmap::KeyHasher;
///
/// assert_eq!(Fnv1a.hash(b""), 0x811c_9dc5);
/// assert_ne!(Fnv1a.hash(b"ab"), Fnv1a.hash(b"ba"));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Fnv1a;

impl KeyHasher for Fnv1a {
    #[inline]
    fn hash(&self, key: &[u8]) -> u32 {
        key.iter().fold(FNV_OFFSET_BASIS, |acc, &byte| {
            (acc ^ u32::from(byte)).wrapping_mul(FNV_PRIME)
        })
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        use core::hash::BuildHasher;
        use core::hash::Hasher;

        use foldhash::fast::FixedState;

        /// Seeded [foldhash](https://docs.rs/foldhash) adapter.
        ///
        /// Produces better-distributed hashes than [`Fnv1a`] for long or
        /// adversarially similar keys. The 64-bit output is folded to 32
        /// bits so both halves influence the bucket index.
        ///
        /// ```rust
        /// use bufmap::FoldHash;
        /// use bufmap::KeyHasher;
        ///
        /// let hasher = FoldHash::with_seed(7);
        /// assert_eq!(hasher.hash(b"key"), FoldHash::with_seed(7).hash(b"key"));
        /// ```
        #[derive(Debug, Clone)]
        pub struct FoldHash {
            state: FixedState,
        }

        impl FoldHash {
            /// Creates a hasher with a fixed seed.
            pub fn with_seed(seed: u64) -> Self {
                Self {
                    state: FixedState::with_seed(seed),
                }
            }
        }

        impl Default for FoldHash {
            fn default() -> Self {
                Self {
                    state: FixedState::default(),
                }
            }
        }

        impl KeyHasher for FoldHash {
            #[inline]
            fn hash(&self, key: &[u8]) -> u32 {
                let mut hasher = self.state.build_hasher();
                hasher.write(key);
                let wide = hasher.finish();
                (wide ^ (wide >> 32)) as u32
            }
        }
    }
}
