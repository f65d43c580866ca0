use core::fmt::Debug;

use crate::config::Config;
use crate::error::BufMapError;
use crate::hash::Fnv1a;
use crate::hash::KeyHasher;
use crate::hash_map::BufMap;
use crate::hash_map::Keys;

/// A set of byte strings stored entirely inside a caller-supplied buffer.
///
/// `BufSet<'a, H>` is a [`BufMap`] whose values are always empty, so each
/// member costs its key bytes plus the 12-byte record header.
///
/// # Examples
///
/// ```rust
/// use bufmap::BufSet;
///
/// let mut buffer = [0u8; 1024];
/// let mut set = BufSet::with_default_config(&mut buffer).unwrap();
///
/// assert_eq!(set.insert(b"apple"), Ok(true));
/// assert_eq!(set.insert(b"apple"), Ok(false));
/// assert!(set.contains(b"apple"));
/// assert_eq!(set.remove(b"apple"), Ok(true));
/// assert!(set.is_empty());
/// ```
pub struct BufSet<'a, H = Fnv1a> {
    map: BufMap<'a, H>,
}

impl<H> Debug for BufSet<'_, H>
where
    H: KeyHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a> BufSet<'a, Fnv1a> {
    /// Creates a set in `buffer` using [`default_config`](crate::default_config)
    /// for its size.
    ///
    /// # Errors
    ///
    /// Same as [`BufMap::with_default_config`].
    pub fn with_default_config(buffer: &'a mut [u8]) -> Result<Self, BufMapError> {
        Ok(Self {
            map: BufMap::with_default_config(buffer)?,
        })
    }
}

impl<'a, H> BufSet<'a, H>
where
    H: KeyHasher,
{
    /// Creates a set in `buffer` with the given configuration.
    ///
    /// # Errors
    ///
    /// Same as [`BufMap::new`].
    pub fn new(buffer: &'a mut [u8], config: Config<H>) -> Result<Self, BufMapError> {
        Ok(Self {
            map: BufMap::new(buffer, config)?,
        })
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the set has no members.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the number of arena bytes never carved out.
    pub fn bytes_remaining(&self) -> usize {
        self.map.bytes_remaining()
    }

    /// Adds `key` to the set.
    ///
    /// Returns `Ok(true)` if the key was newly added and `Ok(false)` if it
    /// was already a member, in which case no space is consumed.
    ///
    /// # Errors
    ///
    /// - [`BufMapError::EmptyKey`] if `key` is empty
    /// - [`BufMapError::OutOfSpace`] if there is no room for the key
    pub fn insert(&mut self, key: &[u8]) -> Result<bool, BufMapError> {
        if self.map.get(key)?.is_some() {
            return Ok(false);
        }
        self.map.insert(key, &[])?;
        Ok(true)
    }

    /// Returns `true` if `key` is a member.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.map.contains_key(key)
    }

    /// Removes `key` from the set, returning whether it was a member.
    ///
    /// # Errors
    ///
    /// Returns [`BufMapError::EmptyKey`] if `key` is empty.
    pub fn remove(&mut self, key: &[u8]) -> Result<bool, BufMapError> {
        self.map.remove(key)
    }

    /// Removes every member and rewinds the arena.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Returns an iterator over the members, in bucket order.
    ///
    /// ```rust
    /// # use bufmap::BufSet;
    /// let mut buffer = [0u8; 1024];
    /// let mut set = BufSet::with_default_config(&mut buffer).unwrap();
    /// set.insert(b"x").unwrap();
    /// set.insert(b"y").unwrap();
    ///
    /// let mut members: Vec<_> = set.iter().collect();
    /// members.sort();
    /// assert_eq!(members, [&b"x"[..], &b"y"[..]]);
    /// ```
    pub fn iter(&self) -> Keys<'_> {
        self.map.keys()
    }
}

impl<'b, H> IntoIterator for &'b BufSet<'_, H>
where
    H: KeyHasher,
{
    type Item = &'b [u8];
    type IntoIter = Keys<'b>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
