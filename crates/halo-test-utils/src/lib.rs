//! Test utilities for Halo development.
//!
//! - [`decompose`]: slab, block, and seeded random block decompositions.
//! - [`harness`]: run one closure per rank on OS threads joined by
//!   [`ThreadComm`](halo_comm::ThreadComm).
//! - [`fixtures`]: datasets whose values encode the global index of every
//!   node and cell, plus a checker for ghost-padded results.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod decompose;
pub mod fixtures;
pub mod harness;

pub use decompose::{blocks, random_blocks, slabs};
pub use fixtures::{assert_indexed, indexed_dataset};
pub use harness::run_ranks;
