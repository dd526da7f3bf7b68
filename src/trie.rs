//! The fixed-width binary trie and its XOR queries.

use crate::arena::{NodeArena, NodeIndex, NIL, ROOT};
use crate::config::{TrieConfig, MAX_LEVELS};
use crate::error::{Error, Result};

/// Bit of `value` at `level`, as a child slot.
#[inline]
fn bit(value: u32, level: u32) -> usize {
    ((value >> level) & 1) as usize
}

/// Multiset of `u32` keys stored as a binary trie over their low `levels`
/// bits, most significant bit first.
///
/// ```rust
/// use xor_trie::XorTrie;
///
/// let mut trie = XorTrie::new();
/// for v in [3, 10, 5, 25, 2, 8] {
///     trie.insert(v).unwrap();
/// }
/// assert_eq!(trie.max_xor(5), Some(28));
/// assert_eq!(trie.count_xor_at_most(5, 7), 3);
/// ```
#[derive(Clone, Debug)]
pub struct XorTrie {
    arena: NodeArena,
    levels: u32,
}

impl XorTrie {
    /// Full 32-bit trie sized by [`TrieConfig::default`].
    pub fn new() -> Self {
        let config = TrieConfig::default();
        Self {
            arena: NodeArena::with_capacity(config.capacity),
            levels: config.levels,
        }
    }

    pub fn with_config(config: TrieConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            arena: NodeArena::with_capacity(config.capacity),
            levels: config.levels,
        })
    }

    #[inline]
    pub fn levels(&self) -> u32 {
        self.levels
    }

    /// Number of stored keys, counting multiplicity.
    #[inline]
    pub fn len(&self) -> usize {
        self.arena.pass(ROOT)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }

    pub fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>() + self.arena.memory_usage()
    }

    /// Forget every key without zeroing the arena. See [`NodeArena::build`].
    pub fn build(&mut self) {
        self.arena.build();
    }

    /// Forget every key and zero the slots used so far. See [`NodeArena::clear`].
    pub fn clear(&mut self) {
        self.arena.clear();
    }

    /// Mask of the bits the trie walks.
    #[inline]
    fn low_mask(&self) -> u32 {
        if self.levels >= MAX_LEVELS {
            u32::MAX
        } else {
            (1u32 << self.levels) - 1
        }
    }

    #[inline]
    fn fits(&self, value: u32) -> bool {
        value & !self.low_mask() == 0
    }

    /// Add one occurrence of `value`.
    ///
    /// On error nothing is modified.
    pub fn insert(&mut self, value: u32) -> Result<()> {
        if !self.fits(value) {
            return Err(Error::KeyTooWide {
                key: value,
                levels: self.levels,
            });
        }

        // Nodes below the first missing link all have to be allocated.
        let mut cur = ROOT;
        let mut missing = 0usize;
        for level in (0..self.levels).rev() {
            let next = self.arena.child(cur, bit(value, level));
            if next == NIL {
                missing = level as usize + 1;
                break;
            }
            cur = next;
        }
        if missing > self.arena.remaining() {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                key = value,
                missing,
                remaining = self.arena.remaining(),
                "insert: capacity exceeded"
            );
            return Err(Error::CapacityExceeded {
                capacity: self.arena.capacity(),
            });
        }

        let mut cur = ROOT;
        self.arena.node_mut(ROOT).pass += 1;
        for level in (0..self.levels).rev() {
            let b = bit(value, level);
            let mut next = self.arena.child(cur, b);
            if next == NIL {
                next = self.arena.allocate()?;
                self.arena.node_mut(cur).children[b] = next;
            }
            self.arena.node_mut(next).pass += 1;
            cur = next;
        }
        Ok(())
    }

    /// Remove one occurrence of `value`.
    ///
    /// Returns [`Error::NotPresent`] without modifying anything if `value`
    /// has no remaining occurrences. Nodes emptied by the removal keep their
    /// arena slots until the next `clear`.
    pub fn remove(&mut self, value: u32) -> Result<()> {
        if self.count(value) == 0 {
            return Err(Error::NotPresent { key: value });
        }
        let mut cur = ROOT;
        self.arena.node_mut(ROOT).pass -= 1;
        for level in (0..self.levels).rev() {
            cur = self.arena.child(cur, bit(value, level));
            self.arena.node_mut(cur).pass -= 1;
        }
        Ok(())
    }

    /// Number of stored occurrences of `value`.
    pub fn count(&self, value: u32) -> usize {
        if !self.fits(value) {
            return 0;
        }
        let mut cur = ROOT;
        for level in (0..self.levels).rev() {
            match self.arena.live_child(cur, bit(value, level)) {
                Some(next) => cur = next,
                None => return 0,
            }
        }
        self.arena.pass(cur)
    }

    #[inline]
    pub fn contains(&self, value: u32) -> bool {
        self.count(value) > 0
    }

    /// Largest `probe ^ v` over stored keys `v`, or `None` if the trie is empty.
    pub fn max_xor(&self, probe: u32) -> Option<u32> {
        if self.is_empty() {
            return None;
        }
        // Stored keys are zero above the walked levels.
        let mut result = probe & !self.low_mask();
        let mut cur = ROOT;
        for level in (0..self.levels).rev() {
            let b = bit(probe, level);
            match self.arena.live_child(cur, b ^ 1) {
                Some(next) => {
                    result |= 1 << level;
                    cur = next;
                }
                None => cur = self.arena.child(cur, b),
            }
        }
        Some(result)
    }

    /// Smallest `probe ^ v` over stored keys `v`, or `None` if the trie is empty.
    pub fn min_xor(&self, probe: u32) -> Option<u32> {
        if self.is_empty() {
            return None;
        }
        let mut result = probe & !self.low_mask();
        let mut cur = ROOT;
        for level in (0..self.levels).rev() {
            let b = bit(probe, level);
            match self.arena.live_child(cur, b) {
                Some(next) => cur = next,
                None => {
                    result |= 1 << level;
                    cur = self.arena.child(cur, b ^ 1);
                }
            }
        }
        Some(result)
    }

    /// Number of stored keys `v` (with multiplicity) such that `probe ^ v <= k`.
    ///
    /// A negative `k` matches nothing.
    pub fn count_xor_at_most(&self, probe: u32, k: i64) -> usize {
        self.count_xor(probe, k, true)
    }

    /// Number of stored keys `v` (with multiplicity) such that `probe ^ v < k`.
    pub fn count_xor_below(&self, probe: u32, k: i64) -> usize {
        self.count_xor(probe, k, false)
    }

    /// Number of stored keys `v` with `lo <= probe ^ v <= hi`.
    pub fn count_xor_in_range(&self, probe: u32, lo: u32, hi: u32) -> usize {
        if lo > hi {
            return 0;
        }
        self.count_xor_at_most(probe, i64::from(hi)) - self.count_xor_below(probe, i64::from(lo))
    }

    fn count_xor(&self, probe: u32, k: i64, inclusive: bool) -> usize {
        if k < 0 || self.is_empty() {
            return 0;
        }
        let Ok(k) = u32::try_from(k) else {
            return self.len();
        };

        // Above the walked levels every XOR equals the probe's own bits.
        let high = !self.low_mask();
        let (probe_high, k_high) = (probe & high, k & high);
        if probe_high != k_high {
            return if probe_high < k_high { self.len() } else { 0 };
        }

        let mut count = 0usize;
        let mut cur = ROOT;
        for level in (0..self.levels).rev() {
            let p = bit(probe, level);
            let next = if bit(k, level) == 1 {
                // Agreeing with the probe here puts the XOR strictly below k.
                count += self.arena.pass(self.arena.child(cur, p));
                self.arena.live_child(cur, p ^ 1)
            } else {
                self.arena.live_child(cur, p)
            };
            match next {
                Some(next) => cur = next,
                None => return count,
            }
        }
        // `cur` now holds exactly the keys with `probe ^ v == k`.
        if inclusive {
            count += self.arena.pass(cur);
        }
        count
    }

    /// Stored keys in ascending order, each paired with its multiplicity.
    pub fn iter(&self) -> Iter<'_> {
        let mut stack = Vec::with_capacity(self.levels as usize + 1);
        if !self.is_empty() {
            stack.push((ROOT, 0u32, self.levels));
        }
        Iter { trie: self, stack }
    }
}

impl Default for XorTrie {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over `(key, multiplicity)` pairs of an [`XorTrie`].
pub struct Iter<'a> {
    trie: &'a XorTrie,
    /// `(node, key prefix, levels left below node)`
    stack: Vec<(NodeIndex, u32, u32)>,
}

impl Iterator for Iter<'_> {
    type Item = (u32, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let arena = &self.trie.arena;
        while let Some((node, prefix, depth)) = self.stack.pop() {
            if depth == 0 {
                return Some((prefix, arena.pass(node)));
            }
            let level = depth - 1;
            // Push the 1-branch first so the 0-branch is visited first.
            for b in [1usize, 0] {
                if let Some(child) = arena.live_child(node, b) {
                    self.stack.push((child, prefix | ((b as u32) << level), level));
                }
            }
        }
        None
    }
}
