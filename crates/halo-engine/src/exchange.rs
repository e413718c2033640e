//! The exchange orchestrator.
//!
//! One call to [`GhostExchange::exchange`] runs the whole state machine
//! `Idle → GatherExtents → Plan → Execute → WaitAll → Idle`:
//!
//! 1. every rank all-gathers its owned cell extent (the only collective),
//!    or a failure flag if its input was rejected, so a bad input on one
//!    rank fails every rank instead of stranding them in the gather,
//! 2. every rank plans the same transaction list from the gathered
//!    extents, once for all arrays,
//! 3. each selected array gets a ghost-padded output with its interior
//!    copied in, then every send is posted, then every receive,
//! 4. a single wait completes every send and receive, and the received
//!    payloads are unpacked into the outputs.
//!
//! All per-exchange state lives in an [`ExchangeContext`] created and
//! dropped inside the call. Nothing but the scratch buffer survives
//! between exchanges, so a changed decomposition needs no reset.

use std::fmt;
use std::time::Instant;

use halo_comm::{CommError, Communicator, RecvRequest, SendRequest};
use halo_core::{
    dispatch_element, ArrayData, ArrayError, DataSet, Element, ElementKind, FieldArray, FieldData,
    Rank,
};
use halo_extent::{CartesianExtent, Centering, DimensionMode, ExtentError};
use halo_plan::{plan_transactions, Fnv1a, GhostTransaction, TransactionPlan};
use tracing::{debug, error, warn};

use crate::config::{ConfigError, ExchangeConfig};
use crate::error::ExchangeError;
use crate::metrics::ExchangeMetrics;
use crate::scratch::ScratchPool;
use crate::transfer::{check_bounds, copy_region, TransferExecutor, TransferRole};

/// Bytes of one gathered extent: a status byte, then six little-endian
/// `i32` bounds.
const EXTENT_BYTES: usize = 1 + 6 * 4;

const STATUS_OK: u8 = 0;
const STATUS_FAILED: u8 = 1;

// ── Output types ───────────────────────────────────────────────────

/// An input array left out of the output because its element type
/// cannot be exchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedArray {
    /// Array name.
    pub name: String,
    /// Whether it was point or cell data.
    pub centering: Centering,
    /// Always an [`ArrayError::TypeMismatch`].
    pub reason: ArrayError,
}

/// The ghost-padded result of one exchange.
#[derive(Clone, Debug, PartialEq)]
pub struct FilledDataset {
    /// Node extent of the output: the rank's piece grown by the ghost
    /// levels and clamped to the whole extent.
    pub extent: CartesianExtent,
    /// Exchanged point arrays, laid out over `extent`.
    pub point_data: FieldData,
    /// Exchanged cell arrays, laid out over the cells of `extent`.
    pub cell_data: FieldData,
    /// Ghost layers now valid around the piece. Consumers must not read
    /// deeper than this.
    pub ghost_levels: u32,
    /// Arrays not copied because of their element type.
    pub skipped: Vec<SkippedArray>,
    /// Counters for this exchange.
    pub metrics: ExchangeMetrics,
}

impl FilledDataset {
    /// Discard the exchange bookkeeping and keep the arrays as a
    /// [`DataSet`].
    pub fn into_dataset(self) -> Result<DataSet, ExtentError> {
        let mut ds = DataSet::new(self.extent)?;
        ds.point_data = self.point_data;
        ds.cell_data = self.cell_data;
        Ok(ds)
    }
}

// ── State machine ──────────────────────────────────────────────────

/// Phase of an exchange in progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExchangePhase {
    /// No exchange running.
    Idle,
    /// All-gather of owned extents.
    GatherExtents,
    /// Transaction planning and the optional divergence check.
    Plan,
    /// Interior copies and posting of sends and receives.
    Execute,
    /// Blocked on the posted receives.
    WaitAll,
}

impl fmt::Display for ExchangePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::GatherExtents => "gather-extents",
            Self::Plan => "plan",
            Self::Execute => "execute",
            Self::WaitAll => "wait-all",
        };
        f.write_str(name)
    }
}

/// A selected input array and the wire slot it is tagged with.
struct ArrayJob<'a> {
    centering: Centering,
    source: &'a FieldArray,
    kind: ElementKind,
}

/// Output buffer being filled for one job.
struct OutputArray {
    name: String,
    components: usize,
    data: ArrayData,
}

/// A posted receive waiting for [`ExchangePhase::WaitAll`].
struct PendingReceive {
    slot: usize,
    transaction: GhostTransaction,
}

/// One centering's plan as seen from a single rank.
struct RankLayout<'p> {
    interior: CartesianExtent,
    grown: CartesianExtent,
    transactions: &'p [GhostTransaction],
}

impl<'p> RankLayout<'p> {
    fn of(plan: &'p TransactionPlan, rank: Rank) -> Result<Self, CommError> {
        let invalid = || CommError::InvalidRank {
            rank,
            size: plan.ranks(),
        };
        Ok(Self {
            interior: plan.interior(rank).ok_or_else(invalid)?,
            grown: plan.grown(rank).ok_or_else(invalid)?,
            transactions: plan.transactions(),
        })
    }
}

/// Node and cell layouts of one rank.
struct RankLayouts<'p> {
    node: RankLayout<'p>,
    cell: RankLayout<'p>,
}

impl<'p> RankLayouts<'p> {
    fn get(&self, centering: Centering) -> &RankLayout<'p> {
        match centering {
            Centering::Node => &self.node,
            Centering::Cell => &self.cell,
        }
    }
}

/// State of one exchange. Never outlives the call that built it.
struct ExchangeContext<'a> {
    rank: Rank,
    phase: ExchangePhase,
    jobs: Vec<ArrayJob<'a>>,
    skipped: Vec<SkippedArray>,
    outputs: Vec<OutputArray>,
    sends: Vec<SendRequest>,
    pending: Vec<PendingReceive>,
}

impl<'a> ExchangeContext<'a> {
    fn new(rank: Rank) -> Self {
        Self {
            rank,
            phase: ExchangePhase::Idle,
            jobs: Vec::new(),
            skipped: Vec::new(),
            outputs: Vec::new(),
            sends: Vec::new(),
            pending: Vec::new(),
        }
    }

    fn enter(&mut self, next: ExchangePhase) {
        debug!(rank = %self.rank, from = %self.phase, to = %next, "exchange phase");
        self.phase = next;
    }

    /// Sort the input arrays into jobs and skips, in point-then-cell
    /// order. Job index is the wire slot, so every rank must list the
    /// same arrays in the same order.
    fn select(
        &mut self,
        config: &ExchangeConfig,
        input: &'a DataSet,
        node_tuples: usize,
        cell_tuples: usize,
    ) -> Result<(), ArrayError> {
        let sets = [
            (Centering::Node, &input.point_data, node_tuples),
            (Centering::Cell, &input.cell_data, cell_tuples),
        ];
        for (centering, data, tuples) in sets {
            for array in data.iter() {
                if !config.selection.includes(array.name()) {
                    continue;
                }
                let Some(kind) = array.kind() else {
                    let reason = ArrayError::TypeMismatch {
                        name: array.name().to_owned(),
                        type_name: array.data().type_name().to_owned(),
                    };
                    warn!(rank = %self.rank, array = array.name(), %centering, %reason, "skipping array");
                    self.skipped.push(SkippedArray {
                        name: array.name().to_owned(),
                        centering,
                        reason,
                    });
                    continue;
                };
                array.expect_tuples(tuples)?;
                self.jobs.push(ArrayJob {
                    centering,
                    source: array,
                    kind,
                });
            }
        }
        Ok(())
    }

    /// Allocate and preflight every output, then post every send and
    /// every receive. Nothing is posted unless all transactions fit
    /// their buffers.
    fn post<C: Communicator + ?Sized>(
        &mut self,
        exec: &mut TransferExecutor<'_, C>,
        layouts: &RankLayouts<'_>,
    ) -> Result<Vec<RecvRequest>, ExchangeError> {
        for job in &self.jobs {
            let layout = layouts.get(job.centering);
            let output = allocate(job, &layout.interior, &layout.grown)?;
            preflight(job, &output, layout.transactions, self.rank)?;
            self.outputs.push(output);
        }

        // One walk over the global list per array: sends go out at once,
        // receives are queued and posted only after every send.
        for (slot, job) in self.jobs.iter().enumerate() {
            let components = job.source.components();
            for t in layouts.get(job.centering).transactions {
                match TransferRole::of(t, self.rank) {
                    TransferRole::Send => dispatch_element!(job.kind, T => {
                        let src = typed::<T>(job.source)?;
                        self.sends.push(exec.send::<T>(t, slot, src, components)?);
                    }),
                    TransferRole::Receive => self.pending.push(PendingReceive {
                        slot,
                        transaction: *t,
                    }),
                    TransferRole::Neither => {}
                }
            }
        }
        let mut requests = Vec::with_capacity(self.pending.len());
        for pending in &self.pending {
            let job = &self.jobs[pending.slot];
            requests.push(exec.receive(
                &pending.transaction,
                pending.slot,
                job.kind,
                job.source.components(),
            )?);
        }
        Ok(requests)
    }
}

// ── GhostExchange ──────────────────────────────────────────────────

/// Fills ghost layers of a decomposed structured dataset.
///
/// Holds the validated configuration and a scratch buffer reused across
/// exchanges. Every rank of the communicator must call
/// [`exchange`](Self::exchange) with the same configuration and the same
/// array names, types, and component counts.
///
/// # Examples
///
/// ```
/// use halo_comm::SerialComm;
/// use halo_core::{DataSet, FieldArray};
/// use halo_engine::{ExchangeConfig, GhostExchange};
/// use halo_extent::CartesianExtent;
///
/// let whole = CartesianExtent::node([0, 3, 0, 3, 0, 0]);
/// let mut input = DataSet::new(whole).unwrap();
/// input
///     .point_data
///     .insert(FieldArray::from_values("rho", 1, vec![1.0f32; 16]).unwrap());
///
/// let mut exchange = GhostExchange::new(ExchangeConfig::new(whole, 1)).unwrap();
/// let out = exchange.exchange(&SerialComm::new(), &input).unwrap();
/// assert_eq!(out.extent, whole);
/// assert_eq!(out.point_data.get("rho").unwrap().tuples(), 16);
/// ```
#[derive(Debug)]
pub struct GhostExchange {
    config: ExchangeConfig,
    mode: DimensionMode,
    scratch: ScratchPool,
}

impl GhostExchange {
    /// Validate `config` and create an exchange for it.
    pub fn new(config: ExchangeConfig) -> Result<Self, ConfigError> {
        let mode = config.validate()?;
        Ok(Self {
            config,
            mode,
            scratch: ScratchPool::default(),
        })
    }

    /// Use `scratch` as the pack buffer, typically one returned by
    /// [`into_scratch`](Self::into_scratch) of an earlier exchange.
    pub fn with_scratch(mut self, scratch: ScratchPool) -> Self {
        self.scratch = scratch;
        self
    }

    /// Give back the pack buffer for reuse.
    pub fn into_scratch(self) -> ScratchPool {
        self.scratch
    }

    /// The validated configuration.
    pub fn config(&self) -> &ExchangeConfig {
        &self.config
    }

    /// Dimension mode derived from the whole extent.
    pub fn mode(&self) -> DimensionMode {
        self.mode
    }

    /// Run one exchange. `input` covers this rank's owned node extent;
    /// it is only read.
    ///
    /// Collective: every rank of `comm` must call this. On error no
    /// output is produced.
    ///
    /// An input rejected on one rank fails the exchange on every rank:
    /// the rejecting rank gets its own error, the others get
    /// [`ExchangeError::PeerFailed`].
    pub fn exchange<C: Communicator + ?Sized>(
        &mut self,
        comm: &C,
        input: &DataSet,
    ) -> Result<FilledDataset, ExchangeError> {
        self.exchange_checked(comm, input, Ok(()))
    }

    /// [`exchange`](Self::exchange) with a caller's own input check
    /// folded into the collective failure reporting.
    pub(crate) fn exchange_checked<C: Communicator + ?Sized>(
        &mut self,
        comm: &C,
        input: &DataSet,
        precheck: Result<(), ExchangeError>,
    ) -> Result<FilledDataset, ExchangeError> {
        let started = Instant::now();
        let mut ctx = ExchangeContext::new(comm.rank());
        let result = self.run(comm, input, precheck, &mut ctx, started);
        let phase = ctx.phase;
        ctx.enter(ExchangePhase::Idle);
        if let Err(e) = &result {
            error!(rank = %ctx.rank, %phase, error = %e, "ghost exchange failed");
        }
        result
    }

    /// Validate `input` and select its arrays. Returns the owned cell
    /// extent.
    fn prepare<'a>(
        &self,
        input: &'a DataSet,
        ctx: &mut ExchangeContext<'a>,
    ) -> Result<CartesianExtent, ExchangeError> {
        let mode = self.mode;
        let node_interior = input.extent();
        mode.check(&node_interior)
            .map_err(|_| ConfigError::DimensionMismatch {
                mode,
                extent: node_interior,
            })?;
        let cell_interior = input.cell_extent(mode)?;
        ctx.select(
            &self.config,
            input,
            node_interior.volume(),
            cell_interior.volume(),
        )?;
        Ok(cell_interior)
    }

    fn run<'a, C: Communicator + ?Sized>(
        &mut self,
        comm: &C,
        input: &'a DataSet,
        precheck: Result<(), ExchangeError>,
        ctx: &mut ExchangeContext<'a>,
        started: Instant,
    ) -> Result<FilledDataset, ExchangeError> {
        let mode = self.mode;
        let rank = ctx.rank;
        let local = match precheck {
            Ok(()) => self.prepare(input, ctx),
            Err(e) => Err(e),
        };

        let mut metrics = ExchangeMetrics::default();

        // Gather even after a local failure so no peer waits on us.
        ctx.enter(ExchangePhase::GatherExtents);
        let t = Instant::now();
        let gathered = gather_extents(comm, local.as_ref().ok())?;
        metrics.gather_us = elapsed_us(t);
        local?;
        let owned = gathered
            .into_iter()
            .enumerate()
            .map(|(r, extent)| extent.ok_or(ExchangeError::PeerFailed { rank: Rank(r) }))
            .collect::<Result<Vec<_>, _>>()?;

        ctx.enter(ExchangePhase::Plan);
        let domain = self.config.domain_cells(mode)?;
        let cell_plan = plan_transactions(&owned, &domain, self.config.ghost_width(), mode)?;
        let node_plan = cell_plan.for_centering(Centering::Node)?;
        metrics.transactions_planned = cell_plan.len();
        if self.config.verify_plan {
            verify_signature(comm, exchange_signature(&cell_plan, &ctx.jobs))?;
        }
        let layouts = RankLayouts {
            node: RankLayout::of(&node_plan, rank)?,
            cell: RankLayout::of(&cell_plan, rank)?,
        };

        ctx.enter(ExchangePhase::Execute);
        let mut exec = TransferExecutor::new(comm, &mut self.scratch, &mut metrics);
        let requests = ctx.post(&mut exec, &layouts)?;

        ctx.enter(ExchangePhase::WaitAll);
        let t = Instant::now();
        let sends = std::mem::take(&mut ctx.sends);
        let payloads = exec.wait_all(sends, requests)?;
        for (pending, payload) in ctx.pending.iter().zip(&payloads) {
            let kind = ctx.jobs[pending.slot].kind;
            let out = &mut ctx.outputs[pending.slot];
            let components = out.components;
            dispatch_element!(kind, T => {
                let dst = typed_mut::<T>(out)?;
                exec.complete::<T>(&pending.transaction, payload, dst, components);
            });
        }
        metrics.wait_us = elapsed_us(t);

        let mut point_data = FieldData::new();
        let mut cell_data = FieldData::new();
        for (job, out) in ctx.jobs.iter().zip(ctx.outputs.drain(..)) {
            let array = FieldArray::new(out.name, out.components, out.data)?;
            match job.centering {
                Centering::Node => point_data.insert(array),
                Centering::Cell => cell_data.insert(array),
            };
        }
        metrics.arrays_exchanged = ctx.jobs.len();
        metrics.arrays_skipped = ctx.skipped.len();
        metrics.total_us = elapsed_us(started);
        debug!(
            rank = %rank,
            transactions = metrics.transactions_planned,
            sends = metrics.sends_posted,
            sends_completed = metrics.sends_completed,
            receives = metrics.receives_posted,
            bytes_sent = metrics.bytes_sent,
            bytes_received = metrics.bytes_received,
            total_us = metrics.total_us,
            "ghost exchange complete"
        );

        Ok(FilledDataset {
            extent: layouts.node.grown,
            point_data,
            cell_data,
            ghost_levels: self.config.ghost_width(),
            skipped: std::mem::take(&mut ctx.skipped),
            metrics,
        })
    }
}

// ── Helpers ────────────────────────────────────────────────────────

fn elapsed_us(since: Instant) -> u64 {
    since.elapsed().as_micros() as u64
}

fn mismatch(name: &str, type_name: &str) -> ArrayError {
    ArrayError::TypeMismatch {
        name: name.to_owned(),
        type_name: type_name.to_owned(),
    }
}

fn typed<T: Element>(array: &FieldArray) -> Result<&[T], ArrayError> {
    array
        .values::<T>()
        .ok_or_else(|| mismatch(array.name(), array.data().type_name()))
}

fn typed_mut<T: Element>(out: &mut OutputArray) -> Result<&mut [T], ArrayError> {
    let type_name = out.data.type_name();
    T::slice_mut(&mut out.data).ok_or_else(|| mismatch(&out.name, type_name))
}

/// Zeroed ghost-padded buffer with the rank's own interior copied in.
fn allocate(
    job: &ArrayJob<'_>,
    interior: &CartesianExtent,
    grown: &CartesianExtent,
) -> Result<OutputArray, ArrayError> {
    let components = job.source.components();
    let mut out = OutputArray {
        name: job.source.name().to_owned(),
        components,
        data: ArrayData::zeroed(job.kind, grown.volume() * components),
    };
    dispatch_element!(job.kind, T => {
        let src = typed::<T>(job.source)?;
        let dst = typed_mut::<T>(&mut out)?;
        copy_region(src, interior, dst, grown, interior, components);
    });
    Ok(out)
}

/// Check every transaction this rank takes part in against the buffers
/// it will read or write, before anything is posted.
fn preflight(
    job: &ArrayJob<'_>,
    output: &OutputArray,
    transactions: &[GhostTransaction],
    rank: Rank,
) -> Result<(), ExchangeError> {
    let name = job.source.name();
    let components = job.source.components();
    for t in transactions {
        match TransferRole::of(t, rank) {
            TransferRole::Send => check_bounds(
                name,
                t,
                &t.intersection,
                &t.source_extent,
                job.source.data().len(),
                components,
            )?,
            TransferRole::Receive => check_bounds(
                name,
                t,
                &t.intersection,
                &t.dest_extent,
                output.data.len(),
                components,
            )?,
            TransferRole::Neither => {}
        }
    }
    Ok(())
}

/// All-gather every rank's owned cell extent, or `None` for a rank whose
/// input was rejected.
fn gather_extents<C: Communicator + ?Sized>(
    comm: &C,
    local: Option<&CartesianExtent>,
) -> Result<Vec<Option<CartesianExtent>>, ExchangeError> {
    let mut payload = Vec::with_capacity(EXTENT_BYTES);
    match local {
        Some(extent) => {
            payload.push(STATUS_OK);
            i32::encode(&extent.bounds(), &mut payload);
        }
        None => {
            payload.push(STATUS_FAILED);
            payload.resize(EXTENT_BYTES, 0);
        }
    }
    comm.all_gather_bytes(&payload)?
        .into_iter()
        .enumerate()
        .map(|(r, bytes)| {
            if bytes.len() != EXTENT_BYTES {
                return Err(ExchangeError::GatherMismatch {
                    rank: Rank(r),
                    len: bytes.len(),
                    expected: EXTENT_BYTES,
                });
            }
            if bytes[0] != STATUS_OK {
                return Ok(None);
            }
            let mut bounds = [0i32; 6];
            i32::decode(&bytes[1..], &mut bounds);
            Ok(Some(CartesianExtent::cell(bounds)))
        })
        .collect()
}

/// Hash of everything both parties of a transfer must agree on: the
/// plan, and the slot, kind, and width of every array.
fn exchange_signature(plan: &TransactionPlan, jobs: &[ArrayJob<'_>]) -> u64 {
    let mut h = Fnv1a::new();
    h.u64(plan.fingerprint());
    h.u64(jobs.len() as u64);
    for job in jobs {
        let name = job.source.name();
        h.u64(name.len() as u64);
        h.bytes(name.as_bytes());
        h.u64(match job.centering {
            Centering::Node => 0,
            Centering::Cell => 1,
        });
        h.bytes(job.kind.name().as_bytes());
        h.u64(job.source.components() as u64);
    }
    h.finish()
}

/// Compare `local` with every peer's signature.
fn verify_signature<C: Communicator + ?Sized>(comm: &C, local: u64) -> Result<(), ExchangeError> {
    let gathered = comm.all_gather_bytes(&local.to_le_bytes())?;
    for (r, bytes) in gathered.iter().enumerate() {
        let peer = <[u8; 8]>::try_from(bytes.as_slice())
            .map(u64::from_le_bytes)
            .map_err(|_| ExchangeError::GatherMismatch {
                rank: Rank(r),
                len: bytes.len(),
                expected: 8,
            })?;
        if peer != local {
            return Err(ExchangeError::PlanningDivergence {
                rank: Rank(r),
                local,
                peer,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_comm::{SerialComm, ThreadComm};
    use halo_core::TransactionId;
    use halo_extent::Axis;

    fn whole() -> CartesianExtent {
        CartesianExtent::node([0, 4, 0, 3, 0, 0])
    }

    fn config() -> ExchangeConfig {
        ExchangeConfig {
            verify_plan: true,
            ..ExchangeConfig::new(whole(), 2)
        }
    }

    fn input() -> DataSet {
        let mut ds = DataSet::new(whole()).unwrap();
        let nodes = whole().volume();
        ds.point_data.insert(
            FieldArray::from_values("p", 1, (0..nodes as u32).collect::<Vec<_>>()).unwrap(),
        );
        ds.cell_data
            .insert(FieldArray::from_values("c", 2, vec![0.5f64; 24]).unwrap());
        ds.cell_data.insert(
            FieldArray::new("names", 1, ArrayData::Strings(vec![String::new(); 12])).unwrap(),
        );
        ds
    }

    #[test]
    fn single_rank_output_equals_input() {
        let mut ex = GhostExchange::new(config()).unwrap();
        assert_eq!(ex.mode(), DimensionMode::TwoD { normal: Axis::Z });
        let input = input();
        let out = ex.exchange(&SerialComm::new(), &input).unwrap();
        assert_eq!(out.extent, whole());
        assert_eq!(out.ghost_levels, 2);
        assert_eq!(out.point_data.get("p"), input.point_data.get("p"));
        assert_eq!(out.cell_data.get("c"), input.cell_data.get("c"));
        assert!(out.cell_data.get("names").is_none());
        assert_eq!(out.metrics.transactions_planned, 0);
        assert_eq!(out.metrics.arrays_exchanged, 2);
        assert_eq!(out.metrics.arrays_skipped, 1);
    }

    #[test]
    fn string_array_reported_as_skipped() {
        let mut ex = GhostExchange::new(config()).unwrap();
        let out = ex.exchange(&SerialComm::new(), &input()).unwrap();
        assert_eq!(
            out.skipped,
            vec![SkippedArray {
                name: "names".into(),
                centering: Centering::Cell,
                reason: ArrayError::TypeMismatch {
                    name: "names".into(),
                    type_name: "string".into(),
                },
            }]
        );
    }

    #[test]
    fn wrong_length_aborts() {
        let mut ex = GhostExchange::new(config()).unwrap();
        let mut input = input();
        input
            .cell_data
            .insert(FieldArray::from_values("short", 1, vec![0i8; 11]).unwrap());
        let err = ex.exchange(&SerialComm::new(), &input).unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::Array(ArrayError::LengthMismatch {
                expected: 12,
                actual: 11,
                ..
            })
        ));
    }

    #[test]
    fn input_outside_mode_rejected() {
        let mut ex = GhostExchange::new(config()).unwrap();
        let input = DataSet::new(CartesianExtent::node([0, 4, 0, 3, 0, 1])).unwrap();
        assert!(matches!(
            ex.exchange(&SerialComm::new(), &input),
            Err(ExchangeError::Config(ConfigError::DimensionMismatch { .. }))
        ));
    }

    #[test]
    fn partial_input_is_a_plan_error() {
        let mut ex = GhostExchange::new(config()).unwrap();
        let input = DataSet::new(CartesianExtent::node([0, 2, 0, 3, 0, 0])).unwrap();
        assert!(matches!(
            ex.exchange(&SerialComm::new(), &input),
            Err(ExchangeError::Plan(_))
        ));
    }

    #[test]
    fn signature_tracks_array_list() {
        let domain = CartesianExtent::cell([0, 3, 0, 2, 0, 0]);
        let mode = DimensionMode::TwoD { normal: Axis::Z };
        let plan = plan_transactions(&[domain], &domain, 1, mode).unwrap();
        let input = input();
        let mut a = ExchangeContext::new(Rank(0));
        a.select(&ExchangeConfig::new(whole(), 1), &input, 20, 12).unwrap();
        let mut b = ExchangeContext::new(Rank(0));
        let only_p = ExchangeConfig {
            selection: crate::config::ArraySelection::named(["p"]),
            ..ExchangeConfig::new(whole(), 1)
        };
        b.select(&only_p, &input, 20, 12).unwrap();
        assert_eq!(a.jobs.len(), 2);
        assert_eq!(b.jobs.len(), 1);
        assert_ne!(
            exchange_signature(&plan, &a.jobs),
            exchange_signature(&plan, &b.jobs)
        );
        assert_eq!(
            exchange_signature(&plan, &a.jobs),
            exchange_signature(&plan, &a.jobs)
        );
    }

    #[test]
    fn filled_dataset_converts_back() {
        let mut ex = GhostExchange::new(config()).unwrap();
        let out = ex.exchange(&SerialComm::new(), &input()).unwrap();
        let ds = out.into_dataset().unwrap();
        assert_eq!(ds.extent(), whole());
        assert_eq!(ds.point_data.len(), 1);
        assert_eq!(ds.cell_data.len(), 1);
    }

    #[test]
    fn overrunning_transaction_posts_nothing() {
        let comm = ThreadComm::world(1).remove(0);
        let input = input();
        let mut ctx = ExchangeContext::new(Rank(0));
        let only_c = ExchangeConfig {
            selection: crate::config::ArraySelection::named(["c"]),
            ..ExchangeConfig::new(whole(), 1)
        };
        ctx.select(&only_c, &input, 20, 12).unwrap();

        let cells = CartesianExtent::cell([0, 3, 0, 2, 0, 0]);
        let transactions = [
            // A valid send, listed first so it would go out if the
            // checks ran interleaved with posting.
            GhostTransaction {
                id: TransactionId(1),
                source: Rank(0),
                source_extent: cells,
                dest: Rank(0),
                dest_extent: cells,
                intersection: CartesianExtent::cell([0, 0, 0, 2, 0, 0]),
            },
            // Writes column x=4 into a buffer that ends at x=3.
            GhostTransaction {
                id: TransactionId(2),
                source: Rank(1),
                source_extent: CartesianExtent::cell([4, 5, 0, 2, 0, 0]),
                dest: Rank(0),
                dest_extent: cells,
                intersection: CartesianExtent::cell([4, 4, 0, 2, 0, 0]),
            },
        ];
        let layouts = RankLayouts {
            node: RankLayout {
                interior: whole(),
                grown: whole(),
                transactions: &[],
            },
            cell: RankLayout {
                interior: cells,
                grown: cells,
                transactions: &transactions,
            },
        };

        let mut scratch = ScratchPool::default();
        let mut metrics = ExchangeMetrics::default();
        let mut exec = TransferExecutor::new(&comm, &mut scratch, &mut metrics);
        let err = ctx.post(&mut exec, &layouts).unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::BoundsViolation {
                transaction: TransactionId(2),
                ..
            }
        ));
        assert!(ctx.sends.is_empty());
        assert!(ctx.pending.is_empty());
        assert_eq!(metrics.sends_posted + metrics.receives_posted, 0);
        assert_eq!(comm.pending_messages(), 0);
    }

    #[test]
    fn phase_names() {
        assert_eq!(ExchangePhase::GatherExtents.to_string(), "gather-extents");
        assert_eq!(ExchangePhase::WaitAll.to_string(), "wait-all");
    }
}
