//! Planner properties over seeded random decompositions in every
//! dimension mode.

use halo_core::Rank;
use halo_extent::{Axis, CartesianExtent, DimensionMode};
use halo_plan::plan_transactions;
use halo_test_utils::{blocks, random_blocks};

fn assert_exact_cover(
    owned: &[CartesianExtent],
    domain: &CartesianExtent,
    w: u32,
    mode: DimensionMode,
) {
    let plan = plan_transactions(owned, domain, w, mode).unwrap();
    for r in 0..owned.len() {
        let rank = Rank(r);
        let grown = plan.grown(rank).unwrap();
        let incoming: usize = plan.incoming(rank).map(|t| t.volume()).sum();
        assert_eq!(
            incoming + owned[r].volume(),
            grown.volume(),
            "rank {r} in {mode} with width {w}"
        );
        for t in plan.incoming(rank) {
            assert!(grown.contains(&t.intersection));
            assert!(owned[t.source.0].contains(&t.intersection));
            assert!((t.intersection & owned[r]).is_empty());
        }
    }
}

#[test]
fn random_volumes_cover_exactly() {
    let domain = CartesianExtent::cell([0, 15, 0, 11, 0, 7]);
    for seed in 0..24 {
        let owned = random_blocks(&domain, DimensionMode::ThreeD, seed, 3);
        for w in 0..3 {
            assert_exact_cover(&owned, &domain, w, DimensionMode::ThreeD);
        }
    }
}

#[test]
fn planar_and_linear_modes_cover_exactly() {
    let planar = CartesianExtent::cell([0, 19, 4, 4, 0, 13]);
    let mode = DimensionMode::TwoD { normal: Axis::Y };
    for seed in 0..16 {
        let owned = random_blocks(&planar, mode, seed, 4);
        assert_exact_cover(&owned, &planar, 2, mode);
    }

    let line = CartesianExtent::cell([0, 0, 0, 0, -10, 30]);
    let mode = DimensionMode::OneD(Axis::Z);
    for seed in 0..16 {
        let owned = random_blocks(&line, mode, seed, 5);
        assert_exact_cover(&owned, &line, 3, mode);
    }
}

#[test]
fn planar_plan_never_grows_the_normal_axis() {
    let domain = CartesianExtent::cell([0, 9, 0, 9, 2, 2]);
    let mode = DimensionMode::TwoD { normal: Axis::Z };
    let owned = blocks(&domain, [2, 2, 1]);
    let plan = plan_transactions(&owned, &domain, 2, mode).unwrap();
    // Four quadrants, each touching the other three.
    assert_eq!(plan.len(), 12);
    for t in plan.transactions() {
        assert_eq!((t.dest_extent.lo(Axis::Z), t.dest_extent.hi(Axis::Z)), (2, 2));
    }
}

#[test]
fn rank_views_agree_on_every_transaction() {
    let domain = CartesianExtent::cell([0, 11, 0, 11, 0, 11]);
    let owned = blocks(&domain, [3, 2, 2]);
    // Each "rank" plans independently and the sender's outgoing list
    // mirrors the receivers' incoming lists.
    let plans: Vec<_> = (0..owned.len())
        .map(|_| plan_transactions(&owned, &domain, 1, DimensionMode::ThreeD).unwrap())
        .collect();
    for (r, plan) in plans.iter().enumerate() {
        for out in plan.outgoing(Rank(r)) {
            let peer = &plans[out.dest.0];
            assert!(peer.incoming(out.dest).any(|inc| inc == out));
        }
    }
}
