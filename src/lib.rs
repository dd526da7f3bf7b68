//! # xor-trie
//!
//! A fixed-width binary trie over `u32` keys, stored in a preallocated node
//! arena, answering XOR queries in `O(levels)` per operation.
//!
//! - [`XorTrie`]: multiset insert/remove, maximum and minimum XOR against a
//!   probe, and counts of stored keys whose XOR with a probe is below or at
//!   most a limit.
//! - [`NodeArena`]: the index-addressed node pool behind each trie, reset with
//!   `build`/`clear` in time proportional to the nodes actually used.
//! - [`offline`]: batch drivers that sort queries by an admission bound and
//!   grow a single trie as the bound advances.
//!
//! ## Example
//!
//! ```rust
//! use xor_trie::{offline, TrieConfig, XorTrie};
//!
//! let mut trie = XorTrie::with_config(TrieConfig::for_insertions(5, 6)).unwrap();
//! for v in [3, 10, 5, 25, 2, 8] {
//!     trie.insert(v).unwrap();
//! }
//! assert_eq!(trie.max_xor(5), Some(28));
//!
//! // Only elements <= bound take part in each query.
//! let answers = offline::max_xor_with_bound(&[0, 1, 2, 3, 4], &[(3, 1), (1, 3), (5, 6)]).unwrap();
//! assert_eq!(answers, vec![Some(3), Some(3), Some(7)]);
//! ```
//!
//! ## Capacity
//!
//! Nodes are never reclaimed by `remove`, so an arena must be sized for every
//! insertion between two `clear` calls: `1 + levels * insertions` nodes
//! (see [`TrieConfig::for_insertions`]). Running out is reported as
//! [`Error::CapacityExceeded`] and leaves the trie unchanged.

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod arena;
pub mod config;
pub mod error;
pub mod offline;
pub mod trie;

pub use arena::{NodeArena, NodeIndex};
pub use config::{levels_for, TrieConfig};
pub use error::{Error, Result};
pub use offline::{BoundedCount, OfflineScheduler};
pub use trie::{Iter, XorTrie};

#[cfg(test)]
mod proptests;
