//! Communicator abstraction for Halo ghost exchange.
//!
//! The exchange engine talks to other ranks only through the
//! [`Communicator`] trait: tagged nonblocking byte sends and receives, a
//! batch wait, and a byte all-gather. Two backends ship here:
//!
//! - [`SerialComm`]: a world of one rank. Every collective is trivial.
//! - [`ThreadComm`]: ranks as threads in one process, connected by
//!   crossbeam channels. Used by tests and benches to drive real
//!   multi-rank exchanges without an external message-passing runtime.
//!
//! Sends copy their payload at post time, so the caller's buffer may be
//! reused as soon as [`Communicator::isend`] returns. The returned
//! [`SendRequest`] must still be handed to [`Communicator::wait_all`]
//! together with the receives; a backend with real nonblocking sends
//! completes them there.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
mod mailbox;
pub mod request;
pub mod serial;
pub mod tag;
pub mod thread;

pub use error::CommError;
pub use request::{Completion, RecvRequest, SendRequest};
pub use serial::SerialComm;
pub use tag::Tag;
pub use thread::ThreadComm;

use halo_core::Rank;

/// Tagged point-to-point and collective messaging between ranks.
///
/// Message matching is by `(source, tag)`. Two messages with the same
/// source and tag are delivered in the order they were sent.
pub trait Communicator {
    /// This process's rank.
    fn rank(&self) -> Rank;

    /// Number of ranks in the world.
    fn size(&self) -> usize;

    /// Post a send of `payload` to `dest`. The payload is copied before
    /// returning.
    fn isend(&self, dest: Rank, tag: Tag, payload: &[u8]) -> Result<SendRequest, CommError>;

    /// Post a receive of exactly `len` bytes from `source`.
    fn irecv(&self, source: Rank, tag: Tag, len: usize) -> Result<RecvRequest, CommError>;

    /// Block until every posted send and receive has completed.
    ///
    /// Received payloads come back in the order of `recvs`. On success
    /// [`Completion::sends`] equals `sends.len()`.
    fn wait_all(
        &self,
        sends: Vec<SendRequest>,
        recvs: Vec<RecvRequest>,
    ) -> Result<Completion, CommError>;

    /// Gather one byte buffer from every rank, indexed by rank.
    ///
    /// Collective: every rank must call it, in the same order relative to
    /// other collectives.
    fn all_gather_bytes(&self, local: &[u8]) -> Result<Vec<Vec<u8>>, CommError>;

    /// Check that `rank` names a member of this world.
    fn check_rank(&self, rank: Rank) -> Result<(), CommError> {
        if rank.0 >= self.size() {
            return Err(CommError::InvalidRank {
                rank,
                size: self.size(),
            });
        }
        Ok(())
    }
}
