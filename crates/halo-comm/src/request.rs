//! Handles for posted sends and receives.

use halo_core::Rank;

use crate::tag::Tag;

/// A posted send, completed by [`Communicator::wait_all`](crate::Communicator::wait_all).
///
/// The in-process backends copy the payload at post time, so for them the
/// send is already done and the wait only counts it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use = "send requests must be passed to wait_all"]
pub struct SendRequest {
    /// Destination rank.
    pub dest: Rank,
    /// Message tag.
    pub tag: Tag,
    /// Payload size in bytes.
    pub len: usize,
}

/// A posted receive, completed by [`Communicator::wait_all`](crate::Communicator::wait_all).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use = "receive requests must be passed to wait_all"]
pub struct RecvRequest {
    /// Source rank.
    pub source: Rank,
    /// Message tag.
    pub tag: Tag,
    /// Expected payload size in bytes.
    pub len: usize,
}

/// Result of [`Communicator::wait_all`](crate::Communicator::wait_all).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Completion {
    /// Number of sends completed.
    pub sends: usize,
    /// Received payloads, in receive request order.
    pub payloads: Vec<Vec<u8>>,
}
