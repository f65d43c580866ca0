use thiserror::Error;

/// Error types for [`BufMap`](crate::BufMap) operations.
///
/// Variants fall into two tiers. Validation failures (`ZeroBucketCount`,
/// `BufferTooLarge`, `EmptyKey`) are caller mistakes and are never
/// recoverable by retrying. Capacity failures (`BufferTooSmall`,
/// `OutOfSpace`) are expected outcomes the caller can handle by evicting
/// entries or supplying a larger buffer. In both cases the table is left in
/// its last valid state.
///
/// Absent keys and an exhausted cursor are not errors and never surface
/// through this type.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum BufMapError {
    /// The configuration asked for zero buckets.
    #[error("Invalid configuration: bucket count must be nonzero")]
    ZeroBucketCount,
    /// The buffer cannot hold the bucket array, the data block header and the
    /// minimum record reserve.
    #[error("Buffer too small: {required} bytes required, but only {provided} bytes provided")]
    BufferTooSmall {
        /// Minimum buffer size for the requested bucket count
        required: usize,
        /// Size of the buffer that was supplied
        provided: usize,
    },
    /// The buffer is larger than the 32-bit offsets stored in it can address.
    #[error("Buffer too large: {provided} bytes exceeds the addressable maximum of {max}")]
    BufferTooLarge {
        /// Size of the buffer that was supplied
        provided: usize,
        /// Largest supported buffer size
        max: usize,
    },
    /// Keys must contain at least one byte.
    #[error("Invalid key: key must not be empty")]
    EmptyKey,
    /// Neither the free list nor the arena has room for the record.
    #[error("Out of space: record needs {requested} bytes, but only {available} bytes available")]
    OutOfSpace {
        /// Bytes needed for the record header, key and value
        requested: usize,
        /// Bytes still uncarved in the arena
        available: usize,
    },
}

impl BufMapError {
    /// Returns `true` for outcomes caused by running out of buffer space.
    ///
    /// ```rust
    /// # use bufmap::BufMapError;
    /// let err = BufMapError::OutOfSpace { requested: 64, available: 8 };
    /// assert!(err.is_capacity());
    /// assert!(!BufMapError::EmptyKey.is_capacity());
    /// ```
    pub fn is_capacity(&self) -> bool {
        matches!(self, Self::BufferTooSmall { .. } | Self::OutOfSpace { .. })
    }

    /// Returns `true` for outcomes caused by invalid arguments.
    pub fn is_validation(&self) -> bool {
        !self.is_capacity()
    }
}
