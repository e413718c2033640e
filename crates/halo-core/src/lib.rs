//! Core types for the Halo ghost-cell exchange engine.
//!
//! Defines the vocabulary shared by the planner, the communicator layer,
//! and the exchange engine: rank and transaction identifiers, the closed
//! set of numeric [`Element`] types, caller-owned [`FieldArray`]s grouped
//! into [`FieldData`], and the [`DataSet`] a pipeline hands to the engine.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod array;
pub mod dataset;
pub mod element;
pub mod error;
pub mod id;

pub use array::{ArrayData, FieldArray, FieldData};
pub use dataset::DataSet;
pub use element::{Element, ElementKind};
pub use error::ArrayError;
pub use id::{Rank, TransactionId};
