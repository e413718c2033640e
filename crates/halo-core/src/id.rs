//! Strongly-typed identifiers.

use std::fmt;

/// Index of a process in the decomposition (`0..size`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rank(pub usize);

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for Rank {
    fn from(v: usize) -> Self {
        Self(v)
    }
}

/// Deterministic identifier of a planned ghost transfer.
///
/// Computed from the `(dest, source)` pair alone, so the sending and
/// receiving rank derive the same id without talking to each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(pub u64);

impl TransactionId {
    /// Id of the transfer from `source` to `dest` in a world of `size` ranks.
    pub fn for_pair(dest: Rank, source: Rank, size: usize) -> Self {
        Self(dest.0 as u64 * size as u64 + source.0 as u64)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
