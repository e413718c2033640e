//! Exchange error types.

use std::error::Error;
use std::fmt;

use halo_comm::CommError;
use halo_core::{ArrayError, Rank, TransactionId};
use halo_extent::{CartesianExtent, ExtentError};
use halo_plan::PlanError;

use crate::config::ConfigError;

/// Fatal exchange failures. Every variant aborts the whole exchange and
/// leaves no output behind.
///
/// Unsupported array types are not errors; they are reported as
/// [`SkippedArray`](crate::exchange::SkippedArray) records on the output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExchangeError {
    /// Configuration or input extents are malformed.
    Config(ConfigError),
    /// The gathered decomposition cannot be planned.
    Plan(PlanError),
    /// A peer computed a different plan or array list than this rank.
    PlanningDivergence {
        /// The disagreeing peer.
        rank: Rank,
        /// This rank's signature.
        local: u64,
        /// The peer's signature.
        peer: u64,
    },
    /// A peer rejected its own input and flagged failure in the extent
    /// gather. That peer reports the underlying error itself.
    PeerFailed {
        /// The failed peer (the lowest-numbered one if several failed).
        rank: Rank,
    },
    /// A peer's gathered payload has the wrong size.
    GatherMismatch {
        /// The sending peer.
        rank: Rank,
        /// Bytes received.
        len: usize,
        /// Bytes expected.
        expected: usize,
    },
    /// A transfer region does not fit the buffer it reads or writes.
    BoundsViolation {
        /// Array being transferred.
        array: String,
        /// Offending transaction.
        transaction: TransactionId,
        /// Region the transaction moves.
        region: CartesianExtent,
        /// Extent the buffer is laid out over.
        buffer: CartesianExtent,
    },
    /// An input array is malformed.
    Array(ArrayError),
    /// The message-passing layer failed.
    Comm(CommError),
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Plan(e) => write!(f, "plan: {e}"),
            Self::PlanningDivergence { rank, local, peer } => write!(
                f,
                "planning divergence with rank {rank}: local {local:#018x}, peer {peer:#018x}"
            ),
            Self::PeerFailed { rank } => write!(f, "rank {rank} rejected its input"),
            Self::GatherMismatch {
                rank,
                len,
                expected,
            } => write!(
                f,
                "rank {rank} gathered {len} bytes, expected {expected}"
            ),
            Self::BoundsViolation {
                array,
                transaction,
                region,
                buffer,
            } => write!(
                f,
                "array '{array}' transaction {transaction}: region {region} outside buffer {buffer}"
            ),
            Self::Array(e) => write!(f, "array: {e}"),
            Self::Comm(e) => write!(f, "comm: {e}"),
        }
    }
}

impl Error for ExchangeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Plan(e) => Some(e),
            Self::Array(e) => Some(e),
            Self::Comm(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for ExchangeError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ExtentError> for ExchangeError {
    fn from(e: ExtentError) -> Self {
        Self::Config(ConfigError::Extent(e))
    }
}

impl From<PlanError> for ExchangeError {
    fn from(e: PlanError) -> Self {
        Self::Plan(e)
    }
}

impl From<ArrayError> for ExchangeError {
    fn from(e: ArrayError) -> Self {
        Self::Array(e)
    }
}

impl From<CommError> for ExchangeError {
    fn from(e: CommError) -> Self {
        Self::Comm(e)
    }
}
