//! Cartesian extent algebra for Halo.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! value types every other crate uses to describe sub-domains of a
//! structured grid: [`CartesianExtent`] (six inclusive index bounds tagged
//! with a [`Centering`]), [`Axis`], and [`DimensionMode`].
//!
//! All operations are pure. Growth and shrinkage are clamped to a problem
//! domain and skip degenerate axes, so 2D data never acquires spurious
//! depth. Node/cell conversion is tracked in the type: converting twice is
//! an error rather than a silent off-by-one.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod extent;
pub mod layout;
pub mod mode;

pub use error::ExtentError;
pub use extent::{CartesianExtent, Centering};
pub use layout::{row_offsets, RowOffsets};
pub use mode::{Axis, DimensionMode};
