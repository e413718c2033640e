//! Benchmark profiles for the Halo ghost-cell exchange engine.
//!
//! - [`cube_profile`]: a cubic cell domain cut into a regular block grid
//! - [`random_profile`]: the same domain cut at seeded random positions
//! - [`indexed_piece`]: the indexed fixture for one rank of a profile

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use halo_core::DataSet;
use halo_extent::{CartesianExtent, DimensionMode};
use halo_test_utils::{blocks, indexed_dataset, random_blocks};

/// A decomposed domain ready to plan.
#[derive(Clone, Debug)]
pub struct BenchProfile {
    /// Cell extent of the whole domain.
    pub domain: CartesianExtent,
    /// Owned cell extent per rank.
    pub owned: Vec<CartesianExtent>,
    /// Dimension mode of the domain.
    pub mode: DimensionMode,
}

impl BenchProfile {
    /// Node extent of the whole domain.
    pub fn whole_nodes(&self) -> CartesianExtent {
        self.domain
            .cell_to_node(self.mode)
            .expect("profile domain is a valid cell extent")
    }
}

/// `n³` cells split into a `p × p × p` block grid.
pub fn cube_profile(n: i32, p: usize) -> BenchProfile {
    let domain = CartesianExtent::cell([0, n - 1, 0, n - 1, 0, n - 1]);
    BenchProfile {
        domain,
        owned: blocks(&domain, [p, p, p]),
        mode: DimensionMode::ThreeD,
    }
}

/// `n³` cells with up to `max_cuts` random cuts per axis.
pub fn random_profile(n: i32, seed: u64, max_cuts: usize) -> BenchProfile {
    let domain = CartesianExtent::cell([0, n - 1, 0, n - 1, 0, n - 1]);
    let mode = DimensionMode::ThreeD;
    BenchProfile {
        domain,
        owned: random_blocks(&domain, mode, seed, max_cuts),
        mode,
    }
}

/// Indexed dataset for `rank` of `profile`.
pub fn indexed_piece(profile: &BenchProfile, rank: usize) -> DataSet {
    let piece = profile.owned[rank]
        .cell_to_node(profile.mode)
        .expect("decomposed pieces are valid cell extents");
    indexed_dataset(&profile.whole_nodes(), &piece, profile.mode)
}
