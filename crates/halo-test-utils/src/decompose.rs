//! Domain decompositions for tests and benches.
//!
//! All functions return owned extents indexed by rank, with the same
//! centering as the input domain.

use std::collections::BTreeSet;

use halo_extent::{Axis, CartesianExtent, DimensionMode};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// `pieces` slabs stacked along `axis`.
pub fn slabs(domain: &CartesianExtent, axis: Axis, pieces: usize) -> Vec<CartesianExtent> {
    domain.split(axis, pieces)
}

/// A `px × py × pz` block grid, ranks numbered x fastest.
pub fn blocks(domain: &CartesianExtent, pieces: [usize; 3]) -> Vec<CartesianExtent> {
    let mut out = Vec::with_capacity(pieces.iter().product());
    for zslab in domain.split(Axis::Z, pieces[2]) {
        for yslab in zslab.split(Axis::Y, pieces[1]) {
            out.extend(yslab.split(Axis::X, pieces[0]));
        }
    }
    out
}

/// A block grid with up to `max_cuts` cuts at random positions on each
/// active axis of `mode`. The same seed always gives the same result.
pub fn random_blocks(
    domain: &CartesianExtent,
    mode: DimensionMode,
    seed: u64,
    max_cuts: usize,
) -> Vec<CartesianExtent> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut per_axis: Vec<Vec<(i32, i32)>> = Vec::with_capacity(3);
    for axis in Axis::ALL {
        let (lo, hi) = (domain.lo(axis), domain.hi(axis));
        let len = (hi - lo + 1).max(0) as u64;
        let mut cuts = BTreeSet::new();
        if mode.is_active(axis) && len > 1 {
            let wanted = (rng.next_u64() % (max_cuts as u64 + 1)).min(len - 1);
            while (cuts.len() as u64) < wanted {
                cuts.insert(lo + 1 + (rng.next_u64() % (len - 1)) as i32);
            }
        }
        let mut starts: Vec<i32> = std::iter::once(lo).chain(cuts).collect();
        starts.push(hi + 1);
        per_axis.push(starts.windows(2).map(|w| (w[0], w[1] - 1)).collect());
    }

    let mut out = Vec::new();
    for &(zl, zh) in &per_axis[2] {
        for &(yl, yh) in &per_axis[1] {
            for &(xl, xh) in &per_axis[0] {
                out.push(CartesianExtent::new(
                    [xl, xh, yl, yh, zl, zh],
                    domain.centering(),
                ));
            }
        }
    }
    out
}
