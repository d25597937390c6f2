#![deny(missing_docs)]

//! This crate implements an ordered map backed by a B-tree, [OrderedMap].
//!
//! Keys are kept in ascending order under a comparator, values are opaque. Besides the usual
//! map operations the map offers subscript-style access ([OrderedMap::item], [OrderedMap::set]),
//! a get-or-insert operation ([OrderedMap::set_default]) and a draining iterator
//! ([OrderedMap::drain]) that removes pairs in ascending order as it yields them.
//!
//! Most of the implementation is in the [gb] module, see [gb::OrderedMap].
//!
//! # Example
//!
//! ```
//!     use btree_ordmap::IntMap;
//!     let mut dishes = IntMap::new();
//!     dishes.set(1, "pierogi");
//!     dishes.set(23, "gyoza");
//!     dishes.set(-10, "coco");
//!     assert_eq!(dishes.keys().copied().collect::<Vec<_>>(), [-10, 1, 23]);
//!     assert_eq!(*dishes.set_default(9, "dumpling"), "dumpling");
//!     let drained: Vec<_> = dishes.drain().collect();
//!     assert_eq!(drained.len(), 4);
//!     assert!(dishes.is_empty());
//! ```
//!
//!# Features
//!
//! This crate supports the following cargo features:
//! - `serde` : enables serialisation of [OrderedMap] and [TotalF64] via serde crate.

/// Module with version of OrderedMap that allows B to be specified as generic constant.
pub mod gb;

mod compare;
mod error;
mod typed;

pub use compare::{ByFn, Compare, Natural};
pub use error::MapError;
pub use typed::{BytesMap, FloatMap, IntMap, StrMap, TotalF64};

/// Default B value ( this is capacity, usually B is defined as B/2 + 1 ).
pub const DB: usize = 39;

/// OrderedMap with default node capacity [DB], ordered by `C` ( [Natural] if not given ).
pub type OrderedMap<K, V, C = Natural> = gb::OrderedMap<K, V, C, DB>;

/// Iterator returned by [OrderedMap::iter].
pub type Iter<'a, K, V> = gb::Iter<'a, K, V, DB>;

/// Iterator returned by [OrderedMap::keys].
pub type Keys<'a, K, V> = gb::Keys<'a, K, V, DB>;

/// Iterator returned by [OrderedMap::values].
pub type Values<'a, K, V> = gb::Values<'a, K, V, DB>;

/// Draining iterator returned by [OrderedMap::drain].
pub type Drain<'a, K, V, C = Natural> = gb::Drain<'a, K, V, C, DB>;

/// Draining iterator returned by [OrderedMap::drain_keys].
pub type DrainKeys<'a, K, V, C = Natural> = gb::DrainKeys<'a, K, V, C, DB>;

/// Draining iterator returned by [OrderedMap::drain_values].
pub type DrainValues<'a, K, V, C = Natural> = gb::DrainValues<'a, K, V, C, DB>;

/// Consuming iterator returned by [OrderedMap::into_iter].
pub type IntoIter<K, V, C = Natural> = gb::IntoIter<K, V, C, DB>;

// Tests.

/* mimalloc cannot be used with miri */
#[cfg(all(test, not(miri)))]
use mimalloc::MiMalloc;

#[cfg(all(test, not(miri)))]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[cfg(test)]
mod mytests;
