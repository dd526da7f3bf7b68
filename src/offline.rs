//! Offline batch drivers.
//!
//! Queries carrying an admission bound are answered in bound order against a
//! single trie that only ever grows: the dataset is sorted once and each
//! element is inserted the first time a query's bound admits it. Answers are
//! written back in the caller's query order.

use crate::config::{levels_for, TrieConfig};
use crate::error::{Error, Result};
use crate::trie::XorTrie;

/// Threshold query restricted to dataset elements `<= bound`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundedCount {
    pub probe: u32,
    /// Only elements `<= bound` are eligible.
    pub bound: u32,
    /// Inclusive XOR limit; negative matches nothing.
    pub limit: i64,
}

/// Owns one trie and reuses its arena across independent batches.
///
/// The arena is reallocated only when a batch needs more levels or nodes
/// than the current one provides; otherwise it is `clear`ed in place.
#[derive(Clone, Debug)]
pub struct OfflineScheduler {
    trie: XorTrie,
}

impl OfflineScheduler {
    pub fn new() -> Self {
        Self {
            trie: XorTrie::with_config(TrieConfig::for_insertions(1, 0)).unwrap_or_default(),
        }
    }

    pub fn with_config(config: TrieConfig) -> Result<Self> {
        Ok(Self {
            trie: XorTrie::with_config(config)?,
        })
    }

    /// Trie left behind by the last batch.
    pub fn trie(&self) -> &XorTrie {
        &self.trie
    }

    /// Empty trie able to hold `insertions` keys of `levels` bits.
    fn prepare(&mut self, levels: u32, insertions: usize) -> Result<&mut XorTrie> {
        let levels = levels.max(self.trie.levels());
        let needed = TrieConfig::for_insertions(levels, insertions);
        if levels == self.trie.levels() && needed.capacity <= self.trie.arena().capacity() {
            self.trie.clear();
        } else {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                levels,
                capacity = needed.capacity,
                "offline: reallocating arena"
            );
            self.trie = XorTrie::with_config(needed)?;
        }
        Ok(&mut self.trie)
    }

    fn schedule<Q, R>(
        &mut self,
        data: &[u32],
        queries: &[Q],
        bound: impl Fn(&Q) -> u32,
        mut answer: impl FnMut(&XorTrie, &Q) -> R,
    ) -> Result<Vec<R>>
    where
        R: Clone + Default,
    {
        let mut sorted = data.to_vec();
        sorted.sort_unstable();
        let mut order: Vec<usize> = (0..queries.len()).collect();
        order.sort_by_key(|&i| bound(&queries[i]));

        let trie = self.prepare(levels_for(sorted.iter().copied()), sorted.len())?;
        let mut out = vec![R::default(); queries.len()];
        let mut admitted = 0usize;
        for i in order {
            let q = &queries[i];
            let limit = bound(q);
            while admitted < sorted.len() && sorted[admitted] <= limit {
                trie.insert(sorted[admitted])?;
                admitted += 1;
            }
            out[i] = answer(trie, q);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            data = data.len(),
            queries = queries.len(),
            admitted,
            nodes = trie.arena().used(),
            "offline: batch done"
        );
        Ok(out)
    }

    /// For each `(probe, bound)`, the largest `probe ^ v` over dataset
    /// elements `v <= bound`, or `None` when no element is eligible.
    pub fn max_xor_with_bound(
        &mut self,
        data: &[u32],
        queries: &[(u32, u32)],
    ) -> Result<Vec<Option<u32>>> {
        self.schedule(data, queries, |q| q.1, |trie, q| trie.max_xor(q.0))
    }

    /// For each query, how many dataset elements `v <= bound` have
    /// `probe ^ v <= limit`.
    pub fn count_xor_with_bound(
        &mut self,
        data: &[u32],
        queries: &[BoundedCount],
    ) -> Result<Vec<usize>> {
        self.schedule(
            data,
            queries,
            |q| q.bound,
            |trie, q| trie.count_xor_at_most(q.probe, q.limit),
        )
    }

    /// Largest `a ^ b` over pairs of distinct positions, `None` for fewer than
    /// two values.
    pub fn max_pairwise_xor(&mut self, values: &[u32]) -> Result<Option<u32>> {
        let trie = self.prepare(levels_for(values.iter().copied()), values.len())?;
        let mut best = None;
        for &v in values {
            best = best.max(trie.max_xor(v));
            trie.insert(v)?;
        }
        Ok(best)
    }

    /// Number of position pairs `i < j` with `lo <= values[i] ^ values[j] <= hi`.
    pub fn count_pairs_with_xor_in_range(
        &mut self,
        values: &[u32],
        lo: u32,
        hi: u32,
    ) -> Result<u64> {
        let trie = self.prepare(levels_for(values.iter().copied()), values.len())?;
        let mut pairs = 0u64;
        for &v in values {
            pairs += trie.count_xor_in_range(v, lo, hi) as u64;
            trie.insert(v)?;
        }
        Ok(pairs)
    }

    /// Answers `(node, probe)` queries on a rooted forest whose node labels
    /// are their indices: the largest `probe ^ label` over the nodes on the
    /// path from `node` up to its root, `node` included.
    ///
    /// `parents[i]` is `None` for a root. A parent index out of range, a
    /// node that no root reaches (a cycle), or a query on a missing node
    /// yields [`Error::InvalidTree`].
    pub fn max_xor_on_root_paths(
        &mut self,
        parents: &[Option<usize>],
        queries: &[(usize, u32)],
    ) -> Result<Vec<u32>> {
        let n = parents.len();
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut roots = Vec::new();
        for (node, parent) in parents.iter().enumerate() {
            match *parent {
                None => roots.push(node),
                Some(p) if p < n => children[p].push(node),
                Some(_) => return Err(Error::InvalidTree { node }),
            }
        }

        let mut by_node: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (i, &(node, _)) in queries.iter().enumerate() {
            if node >= n {
                return Err(Error::InvalidTree { node });
            }
            by_node[node].push(i);
        }

        let label = |node: usize| u32::try_from(node).map_err(|_| Error::InvalidTree { node });
        let top = n.checked_sub(1).map(label).transpose()?.unwrap_or(0);
        let trie = self.prepare(levels_for([top]), n)?;

        let mut out = vec![0u32; queries.len()];
        let mut visited = vec![false; n];
        // `(node, leaving)`: the node's label is live while between the two visits.
        let mut stack: Vec<(usize, bool)> = roots.into_iter().rev().map(|r| (r, false)).collect();
        while let Some((node, leaving)) = stack.pop() {
            if leaving {
                trie.remove(label(node)?)?;
                continue;
            }
            visited[node] = true;
            trie.insert(label(node)?)?;
            for &i in &by_node[node] {
                out[i] = trie.max_xor(queries[i].1).unwrap_or(0);
            }
            stack.push((node, true));
            stack.extend(children[node].iter().rev().map(|&c| (c, false)));
        }

        if let Some(node) = visited.iter().position(|&seen| !seen) {
            return Err(Error::InvalidTree { node });
        }
        Ok(out)
    }
}

impl Default for OfflineScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot [`OfflineScheduler::max_xor_with_bound`].
pub fn max_xor_with_bound(data: &[u32], queries: &[(u32, u32)]) -> Result<Vec<Option<u32>>> {
    OfflineScheduler::new().max_xor_with_bound(data, queries)
}

/// One-shot [`OfflineScheduler::count_xor_with_bound`].
pub fn count_xor_with_bound(data: &[u32], queries: &[BoundedCount]) -> Result<Vec<usize>> {
    OfflineScheduler::new().count_xor_with_bound(data, queries)
}

/// One-shot [`OfflineScheduler::max_pairwise_xor`].
pub fn max_pairwise_xor(values: &[u32]) -> Result<Option<u32>> {
    OfflineScheduler::new().max_pairwise_xor(values)
}

/// One-shot [`OfflineScheduler::count_pairs_with_xor_in_range`].
pub fn count_pairs_with_xor_in_range(values: &[u32], lo: u32, hi: u32) -> Result<u64> {
    OfflineScheduler::new().count_pairs_with_xor_in_range(values, lo, hi)
}

/// One-shot [`OfflineScheduler::max_xor_on_root_paths`].
pub fn max_xor_on_root_paths(
    parents: &[Option<usize>],
    queries: &[(usize, u32)],
) -> Result<Vec<u32>> {
    OfflineScheduler::new().max_xor_on_root_paths(parents, queries)
}
