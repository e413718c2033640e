//! Halo: ghost-cell exchange for domain-decomposed structured grids.
//!
//! This is the top-level facade crate that re-exports the public API of
//! the Halo sub-crates. Most users only need this one dependency.
//!
//! # Quick start
//!
//! ```rust
//! use halo::prelude::*;
//!
//! // A 16×16 node domain held entirely by one rank.
//! let whole = CartesianExtent::node([0, 15, 0, 15, 0, 0]);
//! let mut pipeline = GhostPipeline::new();
//! let info = pipeline
//!     .request_information(ExchangeConfig::new(whole, 1))
//!     .unwrap();
//! let upstream = pipeline.request_update_extent(&info, whole).unwrap();
//!
//! let mut input = DataSet::new(upstream.extent()).unwrap();
//! input
//!     .point_data
//!     .insert(FieldArray::from_values("heat", 1, vec![0.0f32; 256]).unwrap());
//!
//! let out = pipeline.execute(&SerialComm::new(), &upstream, &input).unwrap();
//! assert_eq!(out.extent, whole);
//! assert_eq!(out.ghost_levels, 1);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`extent`] | `halo-extent` | Extent algebra, centering, dimension modes |
//! | [`types`] | `halo-core` | Ids, element kinds, field arrays, datasets |
//! | [`comm`] | `halo-comm` | Communicator trait and in-process backends |
//! | [`plan`] | `halo-plan` | Transaction planning |
//! | [`engine`] | `halo-engine` | Transfer executor, exchange, pipeline adapter |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Cartesian extent algebra (`halo-extent`).
pub use halo_extent as extent;

/// Ids, numeric element kinds, field arrays, and datasets (`halo-core`).
pub use halo_core as types;

/// Message passing between ranks (`halo-comm`).
///
/// [`comm::ThreadComm`] runs a whole world inside one process, one thread
/// per rank.
pub use halo_comm as comm;

/// Ghost transaction planning (`halo-plan`).
pub use halo_plan as plan;

/// The exchange orchestrator and pipeline adapter (`halo-engine`).
pub use halo_engine as engine;

/// Common imports for typical Halo usage.
///
/// ```rust
/// use halo::prelude::*;
/// ```
pub mod prelude {
    // Extents
    pub use halo_extent::{Axis, CartesianExtent, Centering, DimensionMode, ExtentError};

    // Data model
    pub use halo_core::{ArrayData, ArrayError, DataSet, ElementKind, FieldArray, FieldData, Rank};

    // Communication
    pub use halo_comm::{CommError, Communicator, SerialComm, ThreadComm};

    // Planning
    pub use halo_plan::{plan_transactions, GhostTransaction, PlanError, TransactionPlan};

    // Engine
    pub use halo_engine::{
        ArraySelection, ConfigError, ExchangeConfig, ExchangeError, ExchangeMetrics,
        FilledDataset, GhostExchange, GhostPipeline, SkippedArray,
    };
}
