//! Preallocated node pool for the binary trie.
//!
//! Nodes are addressed by `u32` index. Two indices are reserved:
//! - [`NIL`] (`0`): the absent-child sentinel, never handed out.
//! - [`ROOT`] (`1`): the root of the trie, live for the arena's lifetime.
//!
//! Slots are bump-allocated and never freed one at a time; the arena returns
//! to a clean state only through [`NodeArena::build`] or [`NodeArena::clear`].

/// Index of a node inside a [`NodeArena`].
pub type NodeIndex = u32;

/// Absent-child sentinel.
pub const NIL: NodeIndex = 0;

/// Index of the root node.
pub const ROOT: NodeIndex = 1;

/// First index handed out by [`NodeArena::allocate`].
const FIRST_FREE: NodeIndex = 2;

/// Trie node: two child links and the number of stored keys passing through.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Node {
    pub(crate) children: [NodeIndex; 2],
    pub(crate) pass: usize,
}

impl Node {
    const EMPTY: Node = Node {
        children: [NIL; 2],
        pass: 0,
    };
}

/// Fixed-capacity pool of trie nodes.
#[derive(Clone, Debug)]
pub struct NodeArena {
    /// Slot 0 is the sentinel; slots `1..=capacity` are usable.
    nodes: Vec<Node>,
    /// Bump cursor: next index `allocate` hands out.
    next: NodeIndex,
    /// Highest index claimed since the last `clear`.
    high_water: NodeIndex,
}

impl NodeArena {
    /// Preallocate `capacity` usable nodes, the root included.
    ///
    /// The capacity is clamped to at least one slot (the root) and to what a
    /// `u32` index can address.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, (NodeIndex::MAX - 1) as usize);
        Self {
            nodes: vec![Node::EMPTY; capacity + 1],
            next: FIRST_FREE,
            high_water: ROOT,
        }
    }

    /// Usable node slots, root included.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Nodes claimed since the last `build`/`clear`, root included.
    #[inline]
    pub fn used(&self) -> usize {
        (self.next - 1) as usize
    }

    /// Nodes that can still be allocated.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity() - self.used()
    }

    /// Heap bytes held by the pool.
    pub fn memory_usage(&self) -> usize {
        self.nodes.capacity() * std::mem::size_of::<Node>()
    }

    /// Reset the cursor and empty the root.
    ///
    /// Slots above the root keep whatever they held; `allocate` zeroes each
    /// one as it is handed out again. Calling `build` repeatedly is harmless.
    pub fn build(&mut self) {
        self.next = FIRST_FREE;
        self.nodes[ROOT as usize] = Node::EMPTY;
        #[cfg(feature = "tracing")]
        tracing::trace!(high_water = self.high_water, "arena: build");
    }

    /// Zero every slot from the root up to the high-water mark, then `build`.
    ///
    /// Runs in time proportional to the slots touched since the previous
    /// `clear`, never to the capacity. Indices handed out earlier are invalid
    /// afterwards.
    pub fn clear(&mut self) {
        let end = self.high_water as usize;
        for node in &mut self.nodes[ROOT as usize..=end] {
            *node = Node::EMPTY;
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(cleared = end, "arena: clear");
        self.high_water = ROOT;
        self.build();
    }

    /// Claim a fresh node with no children and a zero pass count.
    pub fn allocate(&mut self) -> crate::Result<NodeIndex> {
        if self.remaining() == 0 {
            #[cfg(feature = "tracing")]
            tracing::warn!(capacity = self.capacity(), "arena: capacity exceeded");
            return Err(crate::Error::CapacityExceeded {
                capacity: self.capacity(),
            });
        }
        let idx = self.next;
        self.next += 1;
        self.high_water = self.high_water.max(idx);
        self.nodes[idx as usize] = Node::EMPTY;
        Ok(idx)
    }

    #[cfg(test)]
    pub(crate) fn node(&self, idx: NodeIndex) -> &Node {
        debug_assert_ne!(idx, NIL);
        &self.nodes[idx as usize]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, idx: NodeIndex) -> &mut Node {
        debug_assert_ne!(idx, NIL);
        &mut self.nodes[idx as usize]
    }

    /// Child of `idx` for `bit`, or [`NIL`].
    #[inline]
    pub(crate) fn child(&self, idx: NodeIndex, bit: usize) -> NodeIndex {
        self.nodes[idx as usize].children[bit]
    }

    /// Pass count of `idx`; the sentinel always reports zero.
    #[inline]
    pub(crate) fn pass(&self, idx: NodeIndex) -> usize {
        if idx == NIL {
            0
        } else {
            self.nodes[idx as usize].pass
        }
    }

    /// Child of `idx` for `bit` if it exists and still holds keys.
    #[inline]
    pub(crate) fn live_child(&self, idx: NodeIndex, bit: usize) -> Option<NodeIndex> {
        let c = self.child(idx, bit);
        (self.pass(c) > 0).then_some(c)
    }

    #[cfg(test)]
    pub(crate) fn high_water(&self) -> NodeIndex {
        self.high_water
    }

    #[cfg(test)]
    pub(crate) fn slots(&self) -> &[Node] {
        &self.nodes
    }
}
