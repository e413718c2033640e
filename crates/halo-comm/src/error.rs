//! Communicator error types.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use halo_core::Rank;

use crate::tag::Tag;

/// Failures of the message-passing layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommError {
    /// A peer rank outside `0..size`.
    InvalidRank {
        /// The offending rank.
        rank: Rank,
        /// World size.
        size: usize,
    },
    /// The peer's endpoint was dropped before the message arrived.
    Disconnected {
        /// Rank whose channel closed.
        peer: Rank,
    },
    /// No matching message arrived within the configured timeout.
    Timeout {
        /// Expected source rank.
        source: Rank,
        /// Expected tag.
        tag: Tag,
        /// How long the receive waited.
        waited: Duration,
    },
    /// A matching message arrived with the wrong size.
    PayloadMismatch {
        /// Source rank.
        source: Rank,
        /// Message tag.
        tag: Tag,
        /// Bytes the receive was posted for.
        expected: usize,
        /// Bytes that arrived.
        actual: usize,
    },
}

impl fmt::Display for CommError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRank { rank, size } => {
                write!(f, "rank {rank} outside world of size {size}")
            }
            Self::Disconnected { peer } => write!(f, "rank {peer} disconnected"),
            Self::Timeout {
                source,
                tag,
                waited,
            } => write!(
                f,
                "no message from rank {source} with tag {tag} after {waited:?}"
            ),
            Self::PayloadMismatch {
                source,
                tag,
                expected,
                actual,
            } => write!(
                f,
                "message from rank {source} tag {tag}: expected {expected} bytes, got {actual}"
            ),
        }
    }
}

impl Error for CommError {}
