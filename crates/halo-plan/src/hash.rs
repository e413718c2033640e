//! FNV-1a hashing for plan fingerprints.
//!
//! Not cryptographic. Used only to compare state computed independently
//! on different ranks.

use halo_extent::CartesianExtent;

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

/// Incremental 64-bit FNV-1a state. Multi-byte values are fed
/// little-endian, so the result does not depend on the host.
#[derive(Clone, Copy, Debug)]
pub struct Fnv1a(u64);

impl Default for Fnv1a {
    fn default() -> Self {
        Self::new()
    }
}

impl Fnv1a {
    /// Fresh state at the offset basis.
    pub fn new() -> Self {
        Self(FNV_OFFSET)
    }

    /// Feed raw bytes.
    pub fn bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 = (self.0 ^ b as u64).wrapping_mul(FNV_PRIME);
        }
    }

    /// Feed a `u64`.
    pub fn u64(&mut self, v: u64) {
        self.bytes(&v.to_le_bytes());
    }

    /// Feed the six bounds of an extent.
    pub fn extent(&mut self, e: &CartesianExtent) {
        for v in e.bounds() {
            self.bytes(&v.to_le_bytes());
        }
    }

    /// Current hash value.
    pub fn finish(self) -> u64 {
        self.0
    }
}
