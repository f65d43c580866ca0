#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(any(feature = "std", test)), no_std)]

mod arena;
mod config;
mod cursor;
mod error;
mod hash;
mod hash_table;
mod layout;
mod list;
mod record;
mod trace;

/// A byte-string map living in a caller-supplied buffer.
///
/// This module provides [`BufMap`] and its borrowing iterators.
pub mod hash_map;

/// A byte-string set living in a caller-supplied buffer.
///
/// This module provides [`BufSet`], a [`BufMap`] with empty values.
pub mod hash_set;

pub use config::Config;
pub use config::MIN_DEFAULT_BUCKETS;
pub use config::default_config;
pub use error::BufMapError;
#[cfg(feature = "foldhash")]
pub use hash::FoldHash;
pub use hash::Fnv1a;
pub use hash::KeyHasher;
pub use hash_map::BufMap;
pub use hash_map::Iter;
pub use hash_map::Keys;
pub use hash_map::Values;
pub use hash_set::BufSet;
#[cfg(feature = "stats")]
pub use hash_table::TableStats;
pub use layout::min_buffer_size;
