//! Message tags.
//!
//! Layout of the 64-bit tag:
//!
//! ```text
//!  63        62..32         31..0
//! [C] [    array slot   ] [ transaction id ]
//! ```
//!
//! `C` set marks a collective; the low 63 bits then hold a per-communicator
//! sequence number instead.
//!
//! Transaction ids past 32 bits (worlds above 65 536 ranks) keep only
//! their low 32 bits. Receives match on the source rank as well, and a
//! `(source, dest)` pair carries at most one transaction per array slot,
//! so a truncated id never aliases another message.

use std::fmt;

use halo_core::TransactionId;

/// A message tag. Receives match on `(source, tag)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u64);

impl Tag {
    const COLLECTIVE: u64 = 1 << 63;
    const SLOT_MASK: u64 = 0x7fff_ffff;
    const ID_MASK: u64 = 0xffff_ffff;

    /// Tag for transaction `id` carrying the array at position `slot` of
    /// the exchanged array list.
    pub fn transfer(slot: usize, id: TransactionId) -> Self {
        let slot = slot as u64 & Self::SLOT_MASK;
        Self((slot << 32) | (id.0 & Self::ID_MASK))
    }

    /// Tag of the `seq`-th collective on a communicator.
    pub fn collective(seq: u64) -> Self {
        Self(Self::COLLECTIVE | (seq & !Self::COLLECTIVE))
    }

    /// Whether this tag belongs to a collective operation.
    pub fn is_collective(self) -> bool {
        self.0 & Self::COLLECTIVE != 0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_collective() {
            write!(f, "collective#{}", self.0 & !Self::COLLECTIVE)
        } else {
            write!(f, "{}:{}", self.0 >> 32, self.0 & Self::ID_MASK)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_tags_differ_by_slot() {
        let id = TransactionId(7);
        assert_ne!(Tag::transfer(0, id), Tag::transfer(1, id));
        assert!(!Tag::transfer(3, id).is_collective());
        assert_eq!(Tag::transfer(3, id).to_string(), "3:7");
    }

    #[test]
    fn collective_never_collides_with_transfer() {
        let c = Tag::collective(0);
        assert!(c.is_collective());
        assert_ne!(c, Tag::transfer(0, TransactionId(0)));
        assert_eq!(Tag::collective(5).to_string(), "collective#5");
    }

    #[test]
    fn ids_of_huge_worlds_keep_their_slot() {
        // dest 70 000 of a 70 000-rank world, source 3.
        let id = TransactionId(70_000 * 70_000 + 3);
        let tag = Tag::transfer(2, id);
        assert!(!tag.is_collective());
        assert_eq!(tag.0 >> 32, 2);
        assert_eq!(tag.0 & 0xffff_ffff, id.0 & 0xffff_ffff);
        assert_ne!(tag, Tag::transfer(3, id));
    }
}
