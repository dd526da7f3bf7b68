//! Error type shared by the arena, the trie and the offline drivers.

/// Errors surfaced by trie operations.
///
/// A failed operation never leaves the trie half-updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The preallocated node pool has no room for the nodes an insert needs.
    CapacityExceeded {
        /// Usable node slots in the arena (root included).
        capacity: usize,
    },
    /// The key has a set bit at or above the configured level count.
    KeyTooWide {
        /// Offending key.
        key: u32,
        /// Configured level count.
        levels: u32,
    },
    /// `remove` was called for a key with no remaining multiplicity.
    NotPresent {
        /// Key that was not stored.
        key: u32,
    },
    /// A parent array references a missing node or contains a cycle.
    InvalidTree {
        /// First node found to be unreachable from a root.
        node: usize,
    },
    /// Level count outside `1..=32`.
    InvalidLevels {
        /// Requested level count.
        levels: u32,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::CapacityExceeded { capacity } => {
                write!(f, "node arena exhausted (capacity {} nodes)", capacity)
            }
            Error::KeyTooWide { key, levels } => {
                write!(f, "key {:#x} does not fit in {} bits", key, levels)
            }
            Error::NotPresent { key } => write!(f, "key {:#x} is not stored", key),
            Error::InvalidTree { node } => {
                write!(f, "node {} is not connected to a root", node)
            }
            Error::InvalidLevels { levels } => {
                write!(f, "level count {} outside 1..=32", levels)
            }
        }
    }
}

impl std::error::Error for Error {}

/// Result type for trie operations.
pub type Result<T> = std::result::Result<T, Error>;
