//! The [`CartesianExtent`] value type.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign};

use crate::error::ExtentError;
use crate::mode::{Axis, DimensionMode};

/// Whether an extent indexes grid vertices or the cells between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Centering {
    /// Point (vertex) indices.
    Node,
    /// Cell indices; one fewer than the node count on each active axis.
    Cell,
}

impl fmt::Display for Centering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node => write!(f, "node"),
            Self::Cell => write!(f, "cell"),
        }
    }
}

/// An inclusive, axis-aligned index range `[xlo, xhi, ylo, yhi, zlo, zhi]`.
///
/// An extent is empty when `hi < lo` on any axis. Degenerate axes
/// (`lo == hi`) hold exactly one index and mark planar or linear data.
///
/// # Examples
///
/// ```
/// use halo_extent::{CartesianExtent, DimensionMode};
///
/// let domain = CartesianExtent::cell([0, 9, 0, 9, 0, 9]);
/// let mode = DimensionMode::ThreeD;
/// let owned = CartesianExtent::cell([0, 4, 0, 9, 0, 9]);
///
/// let grown = owned.grow(&domain, 1, mode);
/// assert_eq!(grown.bounds(), [0, 5, 0, 9, 0, 9]);
/// assert!(domain.contains(&grown));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CartesianExtent {
    bounds: [i32; 6],
    centering: Centering,
}

impl CartesianExtent {
    /// Create an extent from raw bounds.
    pub const fn new(bounds: [i32; 6], centering: Centering) -> Self {
        Self { bounds, centering }
    }

    /// Create a node-centered extent.
    pub const fn node(bounds: [i32; 6]) -> Self {
        Self::new(bounds, Centering::Node)
    }

    /// Create a cell-centered extent.
    pub const fn cell(bounds: [i32; 6]) -> Self {
        Self::new(bounds, Centering::Cell)
    }

    /// The canonical empty extent.
    pub const fn empty(centering: Centering) -> Self {
        Self::new([0, -1, 0, -1, 0, -1], centering)
    }

    /// Raw bounds in `[xlo, xhi, ylo, yhi, zlo, zhi]` order.
    pub fn bounds(&self) -> [i32; 6] {
        self.bounds
    }

    /// Node or cell centering.
    pub fn centering(&self) -> Centering {
        self.centering
    }

    /// Lower bound on `axis`.
    pub fn lo(&self, axis: Axis) -> i32 {
        self.bounds[2 * axis.index()]
    }

    /// Upper bound on `axis` (inclusive).
    pub fn hi(&self, axis: Axis) -> i32 {
        self.bounds[2 * axis.index() + 1]
    }

    fn set(&mut self, axis: Axis, lo: i32, hi: i32) {
        self.bounds[2 * axis.index()] = lo;
        self.bounds[2 * axis.index() + 1] = hi;
    }

    /// Returns `true` if `hi < lo` on any axis.
    pub fn is_empty(&self) -> bool {
        Axis::ALL.into_iter().any(|a| self.hi(a) < self.lo(a))
    }

    /// Number of indices along each axis. All zero for an empty extent.
    pub fn size(&self) -> [usize; 3] {
        if self.is_empty() {
            return [0; 3];
        }
        Axis::ALL.map(|a| (self.hi(a) as i64 - self.lo(a) as i64 + 1) as usize)
    }

    /// Total number of indices covered.
    pub fn volume(&self) -> usize {
        self.size().iter().product()
    }

    /// Whether `other` lies entirely inside `self`.
    ///
    /// An empty `other` is contained in everything of the same centering.
    pub fn contains(&self, other: &CartesianExtent) -> bool {
        if self.centering != other.centering {
            return false;
        }
        if other.is_empty() {
            return true;
        }
        if self.is_empty() {
            return false;
        }
        Axis::ALL
            .into_iter()
            .all(|a| self.lo(a) <= other.lo(a) && other.hi(a) <= self.hi(a))
    }

    /// Whether the index `(i, j, k)` lies inside the extent.
    pub fn contains_point(&self, ijk: [i32; 3]) -> bool {
        Axis::ALL
            .into_iter()
            .all(|a| self.lo(a) <= ijk[a.index()] && ijk[a.index()] <= self.hi(a))
    }

    /// Overlap of two extents. The result may be empty.
    pub fn intersection(&self, other: &CartesianExtent) -> CartesianExtent {
        debug_assert_eq!(
            self.centering, other.centering,
            "intersecting extents of different centering"
        );
        let mut out = *self;
        for a in Axis::ALL {
            out.set(a, self.lo(a).max(other.lo(a)), self.hi(a).min(other.hi(a)));
        }
        out
    }

    /// Expand every active axis by `n` on both sides, clamped to `domain`.
    ///
    /// Inactive axes are left untouched, and an empty extent stays empty.
    pub fn grow(&self, domain: &CartesianExtent, n: u32, mode: DimensionMode) -> CartesianExtent {
        if self.is_empty() {
            return *self;
        }
        let n = n as i64;
        let mut out = *self;
        for a in mode.active_axes() {
            let lo = (self.lo(a) as i64 - n).max(domain.lo(a) as i64);
            let hi = (self.hi(a) as i64 + n).min(domain.hi(a) as i64);
            out.set(a, lo as i32, hi as i32);
        }
        out
    }

    /// Inverse of [`grow`](Self::grow).
    ///
    /// Each active face moves inward by `n`, except faces lying on the
    /// domain boundary: growth never extended those, so they stay put.
    /// `shrink(grow(e)) == e` whenever growth did not reach the boundary.
    ///
    /// Returns [`ExtentError::Collapsed`] if an active axis ends with
    /// `hi < lo`.
    pub fn shrink(
        &self,
        domain: &CartesianExtent,
        n: u32,
        mode: DimensionMode,
    ) -> Result<CartesianExtent, ExtentError> {
        if self.is_empty() {
            return Ok(*self);
        }
        let n = n as i64;
        let mut out = *self;
        for a in mode.active_axes() {
            let mut lo = self.lo(a) as i64;
            let mut hi = self.hi(a) as i64;
            if lo > domain.lo(a) as i64 {
                lo += n;
            }
            if hi < domain.hi(a) as i64 {
                hi -= n;
            }
            if hi < lo {
                return Err(ExtentError::Collapsed {
                    axis: a,
                    extent: *self,
                });
            }
            out.set(a, lo as i32, hi as i32);
        }
        Ok(out)
    }

    /// Convert a node extent to the cells between its nodes.
    ///
    /// Subtracts one from `hi` on every active axis. Fails on an extent
    /// that is already cell-centered, and on an active axis holding a
    /// single node (no cells between).
    pub fn node_to_cell(&self, mode: DimensionMode) -> Result<CartesianExtent, ExtentError> {
        if self.centering == Centering::Cell {
            return Err(ExtentError::AlreadyCellCentered { extent: *self });
        }
        let mut out = CartesianExtent::new(self.bounds, Centering::Cell);
        if self.is_empty() {
            return Ok(out);
        }
        for a in mode.active_axes() {
            if self.hi(a) <= self.lo(a) {
                return Err(ExtentError::Collapsed {
                    axis: a,
                    extent: *self,
                });
            }
            out.set(a, self.lo(a), self.hi(a) - 1);
        }
        Ok(out)
    }

    /// Convert a cell extent to the nodes bounding its cells.
    pub fn cell_to_node(&self, mode: DimensionMode) -> Result<CartesianExtent, ExtentError> {
        if self.centering == Centering::Node {
            return Err(ExtentError::AlreadyNodeCentered { extent: *self });
        }
        let mut out = CartesianExtent::new(self.bounds, Centering::Node);
        if self.is_empty() {
            return Ok(out);
        }
        for a in mode.active_axes() {
            out.set(a, self.lo(a), self.hi(a) + 1);
        }
        Ok(out)
    }

    /// Element strides for x-fastest layout: `[1, nx, nx * ny]`.
    pub fn strides(&self) -> [usize; 3] {
        let [nx, ny, _] = self.size();
        [1, nx, nx * ny]
    }

    /// Flat offset of global index `(i, j, k)` within this extent's layout.
    ///
    /// Returns `None` if the index lies outside the extent.
    pub fn linear_index(&self, ijk: [i32; 3]) -> Option<usize> {
        if !self.contains_point(ijk) {
            return None;
        }
        let s = self.strides();
        let mut idx = 0usize;
        for a in Axis::ALL {
            idx += (ijk[a.index()] - self.lo(a)) as usize * s[a.index()];
        }
        Some(idx)
    }

    /// Every index of the extent in layout order (x fastest).
    pub fn iter_points(&self) -> impl Iterator<Item = [i32; 3]> {
        let e = *self;
        (e.lo(Axis::Z)..=e.hi(Axis::Z)).flat_map(move |k| {
            (e.lo(Axis::Y)..=e.hi(Axis::Y))
                .flat_map(move |j| (e.lo(Axis::X)..=e.hi(Axis::X)).map(move |i| [i, j, k]))
        })
    }

    /// Split along `axis` into `pieces` contiguous, nearly equal parts.
    ///
    /// Earlier pieces receive the remainder. When there are more pieces
    /// than indices, trailing pieces are empty.
    pub fn split(&self, axis: Axis, pieces: usize) -> Vec<CartesianExtent> {
        if pieces == 0 {
            return Vec::new();
        }
        let len = self.size()[axis.index()];
        let base = len / pieces;
        let extra = len % pieces;
        let mut out = Vec::with_capacity(pieces);
        let mut start = self.lo(axis) as i64;
        for p in 0..pieces {
            let count = (base + usize::from(p < extra)) as i64;
            let mut piece = *self;
            if count == 0 {
                piece = CartesianExtent::empty(self.centering);
            } else {
                piece.set(axis, start as i32, (start + count - 1) as i32);
            }
            start += count;
            out.push(piece);
        }
        out
    }
}

impl BitAnd for CartesianExtent {
    type Output = CartesianExtent;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.intersection(&rhs)
    }
}

impl BitAndAssign for CartesianExtent {
    fn bitand_assign(&mut self, rhs: Self) {
        *self = self.intersection(&rhs);
    }
}

impl fmt::Display for CartesianExtent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.bounds;
        write!(
            f,
            "[{}, {}, {}, {}, {}, {}]",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MODE_3D: DimensionMode = DimensionMode::ThreeD;

    #[test]
    fn size_and_volume() {
        let e = CartesianExtent::cell([0, 4, 2, 3, 7, 7]);
        assert_eq!(e.size(), [5, 2, 1]);
        assert_eq!(e.volume(), 10);
        assert_eq!(CartesianExtent::empty(Centering::Cell).volume(), 0);
    }

    #[test]
    fn grow_clamps_to_domain() {
        let domain = CartesianExtent::cell([0, 9, 0, 9, 0, 9]);
        let e = CartesianExtent::cell([0, 4, 3, 6, 8, 9]);
        assert_eq!(e.grow(&domain, 2, MODE_3D).bounds(), [0, 6, 1, 8, 6, 9]);
    }

    #[test]
    fn grow_skips_inactive_axis() {
        let mode = DimensionMode::TwoD { normal: Axis::Z };
        let domain = CartesianExtent::cell([0, 9, 0, 9, 0, 0]);
        let e = CartesianExtent::cell([2, 4, 2, 4, 0, 0]);
        assert_eq!(e.grow(&domain, 1, mode).bounds(), [1, 5, 1, 5, 0, 0]);
    }

    #[test]
    fn shrink_keeps_boundary_faces() {
        let domain = CartesianExtent::cell([0, 9, 0, 9, 0, 9]);
        let e = CartesianExtent::cell([0, 5, 3, 9, 2, 7]);
        let s = e.shrink(&domain, 1, MODE_3D).unwrap();
        assert_eq!(s.bounds(), [0, 4, 4, 9, 3, 6]);
    }

    #[test]
    fn shrink_reports_collapse() {
        let domain = CartesianExtent::cell([0, 9, 0, 9, 0, 9]);
        let e = CartesianExtent::cell([3, 4, 0, 9, 0, 9]);
        assert!(matches!(
            e.shrink(&domain, 1, MODE_3D),
            Err(ExtentError::Collapsed { axis: Axis::X, .. })
        ));
    }

    #[test]
    fn node_cell_round_trip() {
        let mode = DimensionMode::TwoD { normal: Axis::Z };
        let nodes = CartesianExtent::node([0, 10, 0, 10, 0, 0]);
        let cells = nodes.node_to_cell(mode).unwrap();
        assert_eq!(cells.bounds(), [0, 9, 0, 9, 0, 0]);
        assert_eq!(cells.centering(), Centering::Cell);
        assert_eq!(cells.cell_to_node(mode).unwrap(), nodes);
    }

    #[test]
    fn double_conversion_fails_loudly() {
        let nodes = CartesianExtent::node([0, 10, 0, 10, 0, 10]);
        let cells = nodes.node_to_cell(MODE_3D).unwrap();
        assert!(matches!(
            cells.node_to_cell(MODE_3D),
            Err(ExtentError::AlreadyCellCentered { .. })
        ));
        assert!(matches!(
            nodes.cell_to_node(MODE_3D),
            Err(ExtentError::AlreadyNodeCentered { .. })
        ));
    }

    #[test]
    fn node_to_cell_rejects_single_node_axis() {
        let nodes = CartesianExtent::node([0, 10, 4, 4, 0, 10]);
        assert!(matches!(
            nodes.node_to_cell(MODE_3D),
            Err(ExtentError::Collapsed { axis: Axis::Y, .. })
        ));
    }

    #[test]
    fn intersection_operators() {
        let a = CartesianExtent::cell([0, 5, 0, 9, 0, 9]);
        let b = CartesianExtent::cell([5, 9, 2, 3, 0, 9]);
        let mut c = a;
        c &= b;
        assert_eq!(c.bounds(), [5, 5, 2, 3, 0, 9]);
        assert_eq!(a & b, c);
        let far = CartesianExtent::cell([7, 9, 0, 9, 0, 9]);
        assert!((CartesianExtent::cell([0, 4, 0, 9, 0, 9]) & far).is_empty());
    }

    #[test]
    fn linear_index_is_x_fastest() {
        let e = CartesianExtent::cell([2, 4, 1, 2, 0, 1]);
        assert_eq!(e.strides(), [1, 3, 6]);
        assert_eq!(e.linear_index([2, 1, 0]), Some(0));
        assert_eq!(e.linear_index([3, 1, 0]), Some(1));
        assert_eq!(e.linear_index([2, 2, 0]), Some(3));
        assert_eq!(e.linear_index([4, 2, 1]), Some(11));
        assert_eq!(e.linear_index([5, 2, 1]), None);
    }

    #[test]
    fn iter_points_follows_linear_index() {
        let e = CartesianExtent::node([1, 3, -1, 0, 4, 5]);
        let points: Vec<_> = e.iter_points().collect();
        assert_eq!(points.len(), e.volume());
        for (n, p) in points.iter().enumerate() {
            assert_eq!(e.linear_index(*p), Some(n));
        }
        assert_eq!(CartesianExtent::empty(Centering::Node).iter_points().count(), 0);
    }

    #[test]
    fn split_distributes_remainder() {
        let e = CartesianExtent::cell([0, 9, 0, 0, 0, 0]);
        let parts = e.split(Axis::X, 3);
        let bounds: Vec<_> = parts.iter().map(|p| (p.lo(Axis::X), p.hi(Axis::X))).collect();
        assert_eq!(bounds, vec![(0, 3), (4, 6), (7, 9)]);
        let too_many = CartesianExtent::cell([0, 1, 0, 0, 0, 0]).split(Axis::X, 3);
        assert!(too_many[2].is_empty());
    }

    #[test]
    fn display_lists_bounds() {
        let e = CartesianExtent::node([0, 1, 2, 3, 4, 5]);
        assert_eq!(e.to_string(), "[0, 1, 2, 3, 4, 5]");
    }

    fn arb_cell_extent() -> impl Strategy<Value = CartesianExtent> {
        prop::array::uniform3((-20i32..20, 0i32..12)).prop_map(|axes| {
            let mut b = [0; 6];
            for (i, (lo, len)) in axes.into_iter().enumerate() {
                b[2 * i] = lo;
                b[2 * i + 1] = lo + len;
            }
            CartesianExtent::cell(b)
        })
    }

    proptest! {
        #[test]
        fn intersection_commutative(a in arb_cell_extent(), b in arb_cell_extent()) {
            let ab = a & b;
            let ba = b & a;
            prop_assert_eq!(ab.is_empty(), ba.is_empty());
            if !ab.is_empty() {
                prop_assert_eq!(ab, ba);
            }
        }

        #[test]
        fn intersection_contained_in_both(a in arb_cell_extent(), b in arb_cell_extent()) {
            let ab = a & b;
            prop_assert!(a.contains(&ab));
            prop_assert!(b.contains(&ab));
        }

        #[test]
        fn grow_stays_inside_domain(e in arb_cell_extent(), n in 0u32..6) {
            let domain = CartesianExtent::cell([-20, 40, -20, 40, -20, 40]);
            let grown = e.grow(&domain, n, MODE_3D);
            prop_assert!(domain.contains(&grown));
            prop_assert!(grown.contains(&e));
        }

        #[test]
        fn volume_matches_size(e in arb_cell_extent()) {
            let s = e.size();
            prop_assert_eq!(e.volume(), s[0] * s[1] * s[2]);
        }
    }
}
