use thiserror::Error;

/// Error returned by [`OrderedMap::item`](crate::gb::OrderedMap::item) and
/// [`OrderedMap::check`](crate::gb::OrderedMap::check).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// Subscript read of a key that is not in the map.
    #[error("no entry found for key")]
    KeyNotFound,

    /// The comparator does not define a strict total order over the keys it was given.
    #[error("comparator is not a strict total order")]
    InvalidComparator,

    /// A node holds too many or (for a non-root node) too few entries.
    #[error("node holds {entries} entries, allowed {min}..={max}")]
    FanOut {
        /// Entries found in the node.
        entries: usize,
        /// Minimum for the node's position.
        min: usize,
        /// Node capacity.
        max: usize,
    },

    /// Leaves were found at different depths.
    #[error("leaves found at depths {0} and {1}")]
    Unbalanced(usize, usize),

    /// The maintained length disagrees with the number of reachable entries.
    #[error("map reports {expected} entries but holds {found}")]
    LenMismatch {
        /// Value of `len()`.
        expected: usize,
        /// Entries reachable from the root.
        found: usize,
    },
}
