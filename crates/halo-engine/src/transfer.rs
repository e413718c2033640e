//! Strided pack, unpack, and copy of typed array regions, and the
//! per-transaction executor built on them.
//!
//! A region of an extent-shaped array is a sequence of contiguous x-rows
//! (see [`row_offsets`]). Packing walks those rows in `(k, j)` order and
//! appends each row's little-endian bytes; unpacking walks the same rows
//! of the destination layout in the same order. Sender and receiver
//! therefore agree on element order without exchanging layout metadata.
//!
//! Every function here is generic over [`Element`], so the inner loops
//! are monomorphized per numeric kind. Callers pick the kind once per
//! array with [`dispatch_element!`](halo_core::dispatch_element).

use halo_comm::{Communicator, RecvRequest, SendRequest, Tag};
use halo_core::{Element, ElementKind, Rank};
use halo_extent::{row_offsets, CartesianExtent};
use halo_plan::GhostTransaction;
use tracing::trace;

use crate::error::ExchangeError;
use crate::metrics::ExchangeMetrics;
use crate::scratch::ScratchPool;

// ── Region primitives ──────────────────────────────────────────────

/// Pre-flight check that `region` lies inside `buffer` and that a buffer
/// of `len` values with `components` per tuple really covers `buffer`.
pub fn check_bounds(
    array: &str,
    transaction: &GhostTransaction,
    region: &CartesianExtent,
    buffer: &CartesianExtent,
    len: usize,
    components: usize,
) -> Result<(), ExchangeError> {
    if !buffer.contains(region) || len != buffer.volume() * components {
        return Err(ExchangeError::BoundsViolation {
            array: array.to_owned(),
            transaction: transaction.id,
            region: *region,
            buffer: *buffer,
        });
    }
    Ok(())
}

/// Append the values of `region` from `src` (laid out over `outer`) to
/// `out` as little-endian bytes.
pub fn pack_region<T: Element>(
    src: &[T],
    outer: &CartesianExtent,
    region: &CartesianExtent,
    components: usize,
    out: &mut Vec<u8>,
) {
    let row = region.size()[0] * components;
    out.reserve(region.volume() * components * T::SIZE);
    for offset in row_offsets(outer, region) {
        let start = offset * components;
        T::encode(&src[start..start + row], out);
    }
}

/// Decode `bytes` produced by [`pack_region`] into `region` of `dst`
/// (laid out over `outer`).
pub fn unpack_region<T: Element>(
    bytes: &[u8],
    dst: &mut [T],
    outer: &CartesianExtent,
    region: &CartesianExtent,
    components: usize,
) {
    let row = region.size()[0] * components;
    let row_bytes = row * T::SIZE;
    for (offset, chunk) in row_offsets(outer, region).zip(bytes.chunks_exact(row_bytes.max(1))) {
        let start = offset * components;
        T::decode(chunk, &mut dst[start..start + row]);
    }
}

/// Copy `region` from `src` (laid out over `src_outer`) into `dst` (laid
/// out over `dst_outer`). Used for the rank's own interior.
pub fn copy_region<T: Element>(
    src: &[T],
    src_outer: &CartesianExtent,
    dst: &mut [T],
    dst_outer: &CartesianExtent,
    region: &CartesianExtent,
    components: usize,
) {
    let row = region.size()[0] * components;
    for (s, d) in row_offsets(src_outer, region).zip(row_offsets(dst_outer, region)) {
        let (s, d) = (s * components, d * components);
        dst[d..d + row].copy_from_slice(&src[s..s + row]);
    }
}

// ── Transfer executor ──────────────────────────────────────────────

/// What the local rank does with one transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferRole {
    /// Pack and send.
    Send,
    /// Receive and unpack.
    Receive,
    /// Not a party to it.
    Neither,
}

impl TransferRole {
    /// Role of `rank` in `t`. Plans carry no self-transfers, so a rank is
    /// never both sender and receiver.
    pub fn of(t: &GhostTransaction, rank: Rank) -> Self {
        if t.source == rank {
            Self::Send
        } else if t.dest == rank {
            Self::Receive
        } else {
            Self::Neither
        }
    }
}

/// Bytes on the wire for one transaction of an array.
pub fn message_len(t: &GhostTransaction, kind: ElementKind, components: usize) -> usize {
    t.volume() * components * kind.size()
}

/// Posts the sends and receives of one exchange and unpacks completed
/// receives.
///
/// Borrowed for the duration of one exchange; owns nothing that outlives
/// it.
pub struct TransferExecutor<'a, C: Communicator + ?Sized> {
    comm: &'a C,
    scratch: &'a mut ScratchPool,
    metrics: &'a mut ExchangeMetrics,
}

impl<'a, C: Communicator + ?Sized> TransferExecutor<'a, C> {
    /// Create an executor over `comm`, packing through `scratch`.
    pub fn new(comm: &'a C, scratch: &'a mut ScratchPool, metrics: &'a mut ExchangeMetrics) -> Self {
        Self {
            comm,
            scratch,
            metrics,
        }
    }

    /// Pack `t.intersection` of `src` (laid out over `t.source_extent`)
    /// and post it to `t.dest`, tagged for array `slot`.
    pub fn send<T: Element>(
        &mut self,
        t: &GhostTransaction,
        slot: usize,
        src: &[T],
        components: usize,
    ) -> Result<SendRequest, ExchangeError> {
        let payload = self.scratch.pack_with(|buf| {
            pack_region(src, &t.source_extent, &t.intersection, components, buf)
        });
        let tag = Tag::transfer(slot, t.id);
        trace!(id = %t.id, dest = %t.dest, slot, bytes = payload.len(), "post send");
        let req = self.comm.isend(t.dest, tag, payload)?;
        self.metrics.sends_posted += 1;
        self.metrics.bytes_sent += req.len;
        self.metrics.scratch_high_water = self.scratch.high_water();
        Ok(req)
    }

    /// Post the receive matching [`send`](Self::send) on the peer.
    pub fn receive(
        &mut self,
        t: &GhostTransaction,
        slot: usize,
        kind: ElementKind,
        components: usize,
    ) -> Result<RecvRequest, ExchangeError> {
        let tag = Tag::transfer(slot, t.id);
        let len = message_len(t, kind, components);
        trace!(id = %t.id, source = %t.source, slot, bytes = len, "post receive");
        let req = self.comm.irecv(t.source, tag, len)?;
        self.metrics.receives_posted += 1;
        Ok(req)
    }

    /// Block until every posted send and receive completes, returning
    /// the received payloads in the order of `recvs`.
    pub fn wait_all(
        &mut self,
        sends: Vec<SendRequest>,
        recvs: Vec<RecvRequest>,
    ) -> Result<Vec<Vec<u8>>, ExchangeError> {
        let done = self.comm.wait_all(sends, recvs)?;
        self.metrics.sends_completed += done.sends;
        Ok(done.payloads)
    }

    /// Unpack a completed receive into `t.intersection` of `dst` (laid
    /// out over `t.dest_extent`).
    pub fn complete<T: Element>(
        &mut self,
        t: &GhostTransaction,
        payload: &[u8],
        dst: &mut [T],
        components: usize,
    ) {
        unpack_region(payload, dst, &t.dest_extent, &t.intersection, components);
        self.metrics.bytes_received += payload.len();
    }
}
