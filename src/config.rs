//! Sizing of a trie: how many bit levels it walks and how many nodes its
//! arena preallocates.

use crate::error::{Error, Result};

/// Widest supported key, in bits.
pub const MAX_LEVELS: u32 = u32::BITS;

const DEFAULT_INSERTIONS: usize = 1024;

/// Configuration for an [`XorTrie`](crate::XorTrie).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrieConfig {
    /// Number of bit levels walked per operation (`high + 1`).
    pub levels: u32,
    /// Usable node slots, root included.
    pub capacity: usize,
}

impl Default for TrieConfig {
    fn default() -> Self {
        Self::for_insertions(MAX_LEVELS, DEFAULT_INSERTIONS)
    }
}

impl TrieConfig {
    /// Capacity for `insertions` keys of `levels` bits: `1 + levels * insertions`.
    ///
    /// Deleted keys do not give their nodes back, so `insertions` counts every
    /// insert between two `clear()` calls, not the live key count.
    pub fn for_insertions(levels: u32, insertions: usize) -> Self {
        Self {
            levels,
            capacity: 1 + levels as usize * insertions,
        }
    }

    /// Levels just wide enough for every key in `values` (at least one).
    pub fn fit(values: impl IntoIterator<Item = u32>, insertions: usize) -> Self {
        Self::for_insertions(levels_for(values), insertions)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.levels == 0 || self.levels > MAX_LEVELS {
            return Err(Error::InvalidLevels {
                levels: self.levels,
            });
        }
        Ok(())
    }
}

/// Index of the highest set bit across `values`, plus one; `1` if all are zero.
pub fn levels_for(values: impl IntoIterator<Item = u32>) -> u32 {
    let all = values.into_iter().fold(0u32, |acc, v| acc | v);
    (MAX_LEVELS - all.leading_zeros()).max(1)
}
