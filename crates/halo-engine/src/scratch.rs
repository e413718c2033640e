//! Reusable pack buffer for outgoing transfers.
//!
//! [`ScratchPool`] holds one byte buffer. Each send packs into it, hands
//! the bytes to the communicator (which copies them), and the next send
//! reuses the same allocation. Capacity only grows, so after the first
//! exchange it matches the largest transaction seen and later exchanges
//! allocate nothing for packing.

/// Exchange-scoped pack buffer with a high-water mark.
#[derive(Debug, Default)]
pub struct ScratchPool {
    /// Backing storage. Cleared, never shrunk, between packs.
    buf: Vec<u8>,
    /// Largest single pack in bytes.
    high_water: usize,
}

impl ScratchPool {
    /// Create a pool with `capacity` bytes preallocated.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            high_water: 0,
        }
    }

    /// Clear the buffer, let `fill` write one message into it, and return
    /// the packed bytes.
    pub fn pack_with(&mut self, fill: impl FnOnce(&mut Vec<u8>)) -> &[u8] {
        self.buf.clear();
        fill(&mut self.buf);
        self.high_water = self.high_water.max(self.buf.len());
        &self.buf
    }

    /// Largest message packed so far, in bytes.
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    /// Bytes currently allocated.
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }
}
