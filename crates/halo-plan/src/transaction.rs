//! A single planned ghost transfer.

use std::fmt;

use halo_core::{Rank, TransactionId};
use halo_extent::CartesianExtent;

/// One point-to-point transfer: `source` sends the `intersection` of its
/// owned extent with `dest`'s grown extent.
///
/// `source_extent` is the layout of the sender's buffer and
/// `dest_extent` the layout of the receiver's ghost-padded buffer; the
/// intersection is addressed relative to each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GhostTransaction {
    /// Deterministic id, shared by both parties.
    pub id: TransactionId,
    /// Sending rank.
    pub source: Rank,
    /// Extent owned by the sender.
    pub source_extent: CartesianExtent,
    /// Receiving rank.
    pub dest: Rank,
    /// Ghost-padded extent of the receiver.
    pub dest_extent: CartesianExtent,
    /// Region moved from sender to receiver.
    pub intersection: CartesianExtent,
}

impl GhostTransaction {
    /// Number of grid indices moved.
    pub fn volume(&self) -> usize {
        self.intersection.volume()
    }

    /// Whether `rank` takes part in this transfer.
    pub fn involves(&self, rank: Rank) -> bool {
        self.source == rank || self.dest == rank
    }
}

impl fmt::Display for GhostTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} -> {} {}",
            self.id, self.source, self.dest, self.intersection
        )
    }
}
