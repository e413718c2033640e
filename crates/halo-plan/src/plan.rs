//! The planner and the plan it produces.

use halo_core::{Rank, TransactionId};
use halo_extent::{CartesianExtent, Centering, DimensionMode};
use smallvec::SmallVec;
use tracing::debug;

use crate::error::PlanError;
use crate::hash::Fnv1a;
use crate::transaction::GhostTransaction;

/// Transaction indices touching one rank. A structured decomposition
/// usually has at most 26 neighbours; most ranks see far fewer.
type RankIndex = SmallVec<[usize; 8]>;

/// The complete, rank-independent list of ghost transfers for one
/// decomposition, plus per-rank lookup tables.
///
/// Transactions are ordered by `(dest, source)`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct TransactionPlan {
    domain: CartesianExtent,
    mode: DimensionMode,
    ghost_width: u32,
    owned: Vec<CartesianExtent>,
    grown: Vec<CartesianExtent>,
    transactions: Vec<GhostTransaction>,
    incoming: Vec<RankIndex>,
    outgoing: Vec<RankIndex>,
}

// ── Planning ───────────────────────────────────────────────────────

/// Plan the transfers that fill every rank's ghost region.
///
/// `owned[r]` is the extent rank `r` owns. All extents and the domain
/// must share a centering; owned extents must lie inside the domain, be
/// pairwise disjoint, and tile it exactly. Empty owned extents are
/// allowed and mark idle ranks.
///
/// For each destination `i` the needed region is `owned[i]` grown by
/// `ghost_width` and clamped to the domain. Every other rank `j` whose
/// owned extent overlaps that region contributes one transaction. A
/// rank's own interior never appears in the list.
///
/// # Examples
///
/// ```
/// use halo_extent::{Axis, CartesianExtent, DimensionMode};
/// use halo_plan::plan_transactions;
///
/// let domain = CartesianExtent::cell([0, 9, 0, 9, 0, 9]);
/// let owned = domain.split(Axis::X, 2);
/// let plan = plan_transactions(&owned, &domain, 1, DimensionMode::ThreeD).unwrap();
///
/// assert_eq!(plan.len(), 2);
/// let t = &plan.transactions()[0];
/// assert_eq!((t.dest.0, t.source.0), (0, 1));
/// assert_eq!(t.intersection.bounds(), [5, 5, 0, 9, 0, 9]);
/// ```
pub fn plan_transactions(
    owned: &[CartesianExtent],
    domain: &CartesianExtent,
    ghost_width: u32,
    mode: DimensionMode,
) -> Result<TransactionPlan, PlanError> {
    validate(owned, domain, mode)?;

    let size = owned.len();
    let grown: Vec<CartesianExtent> = owned
        .iter()
        .map(|e| e.grow(domain, ghost_width, mode))
        .collect();

    let mut transactions = Vec::new();
    for (i, dest_extent) in grown.iter().enumerate() {
        if dest_extent.is_empty() {
            continue;
        }
        for (j, source_extent) in owned.iter().enumerate() {
            if i == j {
                continue;
            }
            let intersection = *source_extent & *dest_extent;
            if intersection.is_empty() {
                continue;
            }
            transactions.push(GhostTransaction {
                id: TransactionId::for_pair(Rank(i), Rank(j), size),
                source: Rank(j),
                source_extent: *source_extent,
                dest: Rank(i),
                dest_extent: *dest_extent,
                intersection,
            });
        }
    }

    let plan = TransactionPlan::assemble(
        *domain,
        mode,
        ghost_width,
        owned.to_vec(),
        grown,
        transactions,
    );
    debug!(
        ranks = size,
        ghost_width,
        %mode,
        transactions = plan.len(),
        "planned ghost transactions"
    );
    Ok(plan)
}

fn validate(
    owned: &[CartesianExtent],
    domain: &CartesianExtent,
    mode: DimensionMode,
) -> Result<(), PlanError> {
    if domain.is_empty() {
        return Err(PlanError::EmptyDomain { domain: *domain });
    }
    mode.check(domain).map_err(|_| PlanError::DimensionMismatch {
        rank: None,
        mode,
        extent: *domain,
    })?;

    let mut covered = 0usize;
    for (r, e) in owned.iter().enumerate() {
        let rank = Rank(r);
        if e.centering() != domain.centering() {
            return Err(PlanError::CenteringMismatch {
                rank,
                expected: domain.centering(),
                found: e.centering(),
            });
        }
        if e.is_empty() {
            continue;
        }
        if !domain.contains(e) {
            return Err(PlanError::OutsideDomain {
                rank,
                extent: *e,
                domain: *domain,
            });
        }
        mode.check(e).map_err(|_| PlanError::DimensionMismatch {
            rank: Some(rank),
            mode,
            extent: *e,
        })?;
        covered += e.volume();
    }

    for a in 0..owned.len() {
        for b in a + 1..owned.len() {
            let region = owned[a] & owned[b];
            if !region.is_empty() {
                return Err(PlanError::Overlap {
                    a: Rank(a),
                    b: Rank(b),
                    region,
                });
            }
        }
    }

    // Disjoint and contained: equal volume means exact tiling.
    if covered != domain.volume() {
        return Err(PlanError::IncompleteCover {
            covered,
            expected: domain.volume(),
        });
    }
    Ok(())
}

// ── Queries ────────────────────────────────────────────────────────

impl TransactionPlan {
    fn assemble(
        domain: CartesianExtent,
        mode: DimensionMode,
        ghost_width: u32,
        owned: Vec<CartesianExtent>,
        grown: Vec<CartesianExtent>,
        transactions: Vec<GhostTransaction>,
    ) -> Self {
        let mut incoming = vec![RankIndex::new(); owned.len()];
        let mut outgoing = vec![RankIndex::new(); owned.len()];
        for (idx, t) in transactions.iter().enumerate() {
            incoming[t.dest.0].push(idx);
            outgoing[t.source.0].push(idx);
        }
        Self {
            domain,
            mode,
            ghost_width,
            owned,
            grown,
            transactions,
            incoming,
            outgoing,
        }
    }

    /// Number of transactions.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether no transfers are needed.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Number of ranks the plan was built for.
    pub fn ranks(&self) -> usize {
        self.owned.len()
    }

    /// The problem domain.
    pub fn domain(&self) -> CartesianExtent {
        self.domain
    }

    /// Dimension mode the plan was built under.
    pub fn mode(&self) -> DimensionMode {
        self.mode
    }

    /// Ghost width the plan was built for.
    pub fn ghost_width(&self) -> u32 {
        self.ghost_width
    }

    /// Centering of every extent in the plan.
    pub fn centering(&self) -> Centering {
        self.domain.centering()
    }

    /// All transactions in `(dest, source)` order.
    pub fn transactions(&self) -> &[GhostTransaction] {
        &self.transactions
    }

    /// Extent owned by `rank`: the interior it fills from its own data.
    pub fn interior(&self, rank: Rank) -> Option<CartesianExtent> {
        self.owned.get(rank.0).copied()
    }

    /// Ghost-padded extent `rank` ends up holding.
    pub fn grown(&self, rank: Rank) -> Option<CartesianExtent> {
        self.grown.get(rank.0).copied()
    }

    /// Transactions `rank` receives, in plan order.
    pub fn incoming(&self, rank: Rank) -> impl Iterator<Item = &GhostTransaction> + '_ {
        self.index_for(&self.incoming, rank)
    }

    /// Transactions `rank` sends, in plan order.
    pub fn outgoing(&self, rank: Rank) -> impl Iterator<Item = &GhostTransaction> + '_ {
        self.index_for(&self.outgoing, rank)
    }

    fn index_for<'a>(
        &'a self,
        table: &'a [RankIndex],
        rank: Rank,
    ) -> impl Iterator<Item = &'a GhostTransaction> + 'a {
        table
            .get(rank.0)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.transactions[idx])
    }

    /// Size in indices of the largest single transaction.
    pub fn max_transaction_volume(&self) -> usize {
        self.transactions
            .iter()
            .map(GhostTransaction::volume)
            .max()
            .unwrap_or(0)
    }

    /// Order-sensitive FNV-1a hash of the full transaction list.
    ///
    /// Two ranks holding plans with equal fingerprints will post matching
    /// sends and receives.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a::new();
        h.u64(self.transactions.len() as u64);
        h.u64(u64::from(self.ghost_width));
        h.extent(&self.domain);
        for t in &self.transactions {
            h.u64(t.id.0);
            h.u64(t.source.0 as u64);
            h.u64(t.dest.0 as u64);
            h.extent(&t.source_extent);
            h.extent(&t.dest_extent);
            h.extent(&t.intersection);
        }
        h.finish()
    }

    /// The same plan with every extent expressed in `centering`.
    ///
    /// Planning happens in cell space; point data is moved with the node
    /// view. Cell-to-node growth is monotone, so each converted
    /// intersection still lies inside both converted rank extents.
    pub fn for_centering(&self, centering: Centering) -> Result<TransactionPlan, PlanError> {
        if centering == self.centering() {
            return Ok(self.clone());
        }
        let mode = self.mode;
        let convert = |e: &CartesianExtent| match centering {
            Centering::Node => e.cell_to_node(mode),
            Centering::Cell => e.node_to_cell(mode),
        };
        let owned = self.owned.iter().map(convert).collect::<Result<Vec<_>, _>>()?;
        let grown = self.grown.iter().map(convert).collect::<Result<Vec<_>, _>>()?;
        let transactions = self
            .transactions
            .iter()
            .map(|t| {
                Ok(GhostTransaction {
                    source_extent: convert(&t.source_extent)?,
                    dest_extent: convert(&t.dest_extent)?,
                    intersection: convert(&t.intersection)?,
                    ..*t
                })
            })
            .collect::<Result<Vec<_>, PlanError>>()?;
        Ok(TransactionPlan::assemble(
            convert(&self.domain)?,
            mode,
            self.ghost_width,
            owned,
            grown,
            transactions,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use halo_extent::Axis;
    use proptest::prelude::*;

    const MODE_3D: DimensionMode = DimensionMode::ThreeD;

    fn cube(n: i32) -> CartesianExtent {
        CartesianExtent::cell([0, n - 1, 0, n - 1, 0, n - 1])
    }

    #[test]
    fn two_slabs_exchange_one_column_each() {
        let domain = cube(10);
        let owned = domain.split(Axis::X, 2);
        let plan = plan_transactions(&owned, &domain, 1, MODE_3D).unwrap();
        assert_eq!(plan.len(), 2);
        let into_0: Vec<_> = plan.incoming(Rank(0)).collect();
        assert_eq!(into_0.len(), 1);
        assert_eq!(into_0[0].source, Rank(1));
        assert_eq!(into_0[0].intersection.bounds(), [5, 5, 0, 9, 0, 9]);
        assert_eq!(into_0[0].dest_extent.bounds(), [0, 5, 0, 9, 0, 9]);
        let into_1: Vec<_> = plan.incoming(Rank(1)).collect();
        assert_eq!(into_1[0].intersection.bounds(), [4, 4, 0, 9, 0, 9]);
        assert_eq!(into_1[0].id, TransactionId::for_pair(Rank(1), Rank(0), 2));
    }

    #[test]
    fn single_rank_needs_nothing() {
        let domain = cube(4);
        let plan = plan_transactions(&[domain], &domain, 2, MODE_3D).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.grown(Rank(0)), Some(domain));
    }

    #[test]
    fn zero_ghost_width_plans_nothing() {
        let domain = cube(8);
        let owned = domain.split(Axis::Y, 4);
        let plan = plan_transactions(&owned, &domain, 0, MODE_3D).unwrap();
        assert!(plan.is_empty());
    }

    #[test]
    fn corner_neighbours_are_included() {
        let domain = cube(4);
        let mut owned = Vec::new();
        for half_z in domain.split(Axis::Z, 2) {
            for half_y in half_z.split(Axis::Y, 2) {
                owned.extend(half_y.split(Axis::X, 2));
            }
        }
        let plan = plan_transactions(&owned, &domain, 1, MODE_3D).unwrap();
        // Every octant touches all seven others.
        assert_eq!(plan.len(), 8 * 7);
        let diagonal = plan
            .incoming(Rank(0))
            .find(|t| t.source == Rank(7))
            .unwrap();
        assert_eq!(diagonal.intersection.volume(), 1);
    }

    #[test]
    fn idle_rank_takes_no_part() {
        let domain = cube(6);
        let mut owned = domain.split(Axis::X, 2);
        owned.insert(1, CartesianExtent::empty(Centering::Cell));
        let plan = plan_transactions(&owned, &domain, 1, MODE_3D).unwrap();
        assert_eq!(plan.ranks(), 3);
        assert_eq!(plan.incoming(Rank(1)).count(), 0);
        assert_eq!(plan.outgoing(Rank(1)).count(), 0);
        assert_eq!(plan.len(), 2);
    }

    #[test]
    fn rejects_overlap() {
        let domain = cube(6);
        let owned = [
            CartesianExtent::cell([0, 3, 0, 5, 0, 5]),
            CartesianExtent::cell([3, 5, 0, 5, 0, 5]),
        ];
        assert!(matches!(
            plan_transactions(&owned, &domain, 1, MODE_3D),
            Err(PlanError::Overlap { a: Rank(0), b: Rank(1), .. })
        ));
    }

    #[test]
    fn rejects_gap() {
        let domain = cube(6);
        let owned = [
            CartesianExtent::cell([0, 2, 0, 5, 0, 5]),
            CartesianExtent::cell([4, 5, 0, 5, 0, 5]),
        ];
        assert!(matches!(
            plan_transactions(&owned, &domain, 1, MODE_3D),
            Err(PlanError::IncompleteCover { covered: 180, expected: 216 })
        ));
    }

    #[test]
    fn rejects_outside_and_miscentered() {
        let domain = cube(6);
        let outside = [CartesianExtent::cell([0, 6, 0, 5, 0, 5])];
        assert!(matches!(
            plan_transactions(&outside, &domain, 1, MODE_3D),
            Err(PlanError::OutsideDomain { .. })
        ));
        let nodes = [CartesianExtent::node([0, 5, 0, 5, 0, 5])];
        assert!(matches!(
            plan_transactions(&nodes, &domain, 1, MODE_3D),
            Err(PlanError::CenteringMismatch { .. })
        ));
        assert!(matches!(
            plan_transactions(&[], &CartesianExtent::empty(Centering::Cell), 1, MODE_3D),
            Err(PlanError::EmptyDomain { .. })
        ));
    }

    #[test]
    fn planar_mode_rejects_thick_extent() {
        let mode = DimensionMode::TwoD { normal: Axis::Z };
        let domain = CartesianExtent::cell([0, 9, 0, 9, 0, 1]);
        assert!(matches!(
            plan_transactions(&[domain], &domain, 1, mode),
            Err(PlanError::DimensionMismatch { rank: None, .. })
        ));
    }

    #[test]
    fn node_view_covers_shared_faces() {
        let domain = cube(10);
        let owned = domain.split(Axis::X, 2);
        let plan = plan_transactions(&owned, &domain, 1, MODE_3D).unwrap();
        let nodes = plan.for_centering(Centering::Node).unwrap();
        assert_eq!(nodes.centering(), Centering::Node);
        assert_eq!(nodes.domain().bounds(), [0, 10, 0, 10, 0, 10]);
        let t = nodes.incoming(Rank(0)).next().unwrap();
        assert_eq!(t.intersection.bounds(), [5, 6, 0, 10, 0, 10]);
        assert!(t.source_extent.contains(&t.intersection));
        assert!(t.dest_extent.contains(&t.intersection));
        // Same ids and order, so sends still match receives.
        let ids = |p: &TransactionPlan| p.transactions().iter().map(|t| t.id).collect::<Vec<_>>();
        assert_eq!(ids(&plan), ids(&nodes));
    }

    #[test]
    fn fingerprint_tracks_content() {
        let domain = cube(8);
        let a = plan_transactions(&domain.split(Axis::X, 4), &domain, 1, MODE_3D).unwrap();
        let b = plan_transactions(&domain.split(Axis::X, 4), &domain, 1, MODE_3D).unwrap();
        let c = plan_transactions(&domain.split(Axis::X, 4), &domain, 2, MODE_3D).unwrap();
        let d = plan_transactions(&domain.split(Axis::Y, 4), &domain, 1, MODE_3D).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_ne!(a.fingerprint(), d.fingerprint());
    }

    /// Random block decomposition: cut each axis at a random subset of
    /// interior positions.
    fn arb_blocks() -> impl Strategy<Value = (CartesianExtent, Vec<CartesianExtent>)> {
        let axis_cuts = (2i32..12).prop_flat_map(|len| {
            (Just(len), prop::collection::btree_set(1..len, 0..3))
        });
        prop::array::uniform3(axis_cuts).prop_map(|axes| {
            let domain = CartesianExtent::cell([
                0,
                axes[0].0 - 1,
                0,
                axes[1].0 - 1,
                0,
                axes[2].0 - 1,
            ]);
            let ranges = |(len, cuts): &(i32, std::collections::BTreeSet<i32>)| {
                let mut starts: Vec<i32> = std::iter::once(0).chain(cuts.iter().copied()).collect();
                starts.push(*len);
                starts.windows(2).map(|w| (w[0], w[1] - 1)).collect::<Vec<_>>()
            };
            let (xs, ys, zs) = (ranges(&axes[0]), ranges(&axes[1]), ranges(&axes[2]));
            let mut owned = Vec::new();
            for &(zl, zh) in &zs {
                for &(yl, yh) in &ys {
                    for &(xl, xh) in &xs {
                        owned.push(CartesianExtent::cell([xl, xh, yl, yh, zl, zh]));
                    }
                }
            }
            (domain, owned)
        })
    }

    proptest! {
        #[test]
        fn planning_is_deterministic((domain, owned) in arb_blocks(), w in 0u32..3) {
            let a = plan_transactions(&owned, &domain, w, MODE_3D).unwrap();
            let b = plan_transactions(&owned, &domain, w, MODE_3D).unwrap();
            prop_assert_eq!(a.fingerprint(), b.fingerprint());
            prop_assert_eq!(a, b);
        }

        #[test]
        fn no_self_transactions_and_unique_ids((domain, owned) in arb_blocks(), w in 0u32..3) {
            let plan = plan_transactions(&owned, &domain, w, MODE_3D).unwrap();
            let mut ids = std::collections::HashSet::new();
            for t in plan.transactions() {
                prop_assert_ne!(t.source, t.dest);
                prop_assert!(ids.insert(t.id));
            }
        }

        #[test]
        fn incoming_plus_interior_covers_grown((domain, owned) in arb_blocks(), w in 0u32..3) {
            let plan = plan_transactions(&owned, &domain, w, MODE_3D).unwrap();
            for r in 0..owned.len() {
                let rank = Rank(r);
                let grown = plan.grown(rank).unwrap();
                let interior = plan.interior(rank).unwrap();
                let mut pieces = vec![interior];
                pieces.extend(plan.incoming(rank).map(|t| t.intersection));
                // Each grown index is covered exactly once.
                for p in grown.iter_points() {
                    let hits = pieces.iter().filter(|e| e.contains_point(p)).count();
                    prop_assert_eq!(hits, 1, "rank {} point {:?}", r, p);
                }
                for e in &pieces {
                    prop_assert!(grown.contains(e));
                }
            }
        }
    }
}
