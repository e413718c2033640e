//! Error types for extent operations.

use std::error::Error;
use std::fmt;

use crate::extent::CartesianExtent;
use crate::mode::{Axis, DimensionMode};

/// Errors arising from extent conversion, shrinkage, or mode checks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtentError {
    /// `node_to_cell` was called on an extent that is already cell-centered.
    AlreadyCellCentered {
        /// The offending extent.
        extent: CartesianExtent,
    },
    /// `cell_to_node` was called on an extent that is already node-centered.
    AlreadyNodeCentered {
        /// The offending extent.
        extent: CartesianExtent,
    },
    /// An active axis would end up with `hi < lo`.
    Collapsed {
        /// The axis that collapsed.
        axis: Axis,
        /// The extent before the operation.
        extent: CartesianExtent,
    },
    /// The extent spans an axis the dimension mode declares inactive.
    DimensionMismatch {
        /// The mode the extent was checked against.
        mode: DimensionMode,
        /// The offending extent.
        extent: CartesianExtent,
    },
    /// A domain extent has no elements.
    EmptyDomain {
        /// The offending extent.
        extent: CartesianExtent,
    },
    /// A domain extent is degenerate on every axis (a single point).
    PointDomain {
        /// The offending extent.
        extent: CartesianExtent,
    },
}

impl fmt::Display for ExtentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyCellCentered { extent } => {
                write!(f, "extent {extent} is already cell-centered")
            }
            Self::AlreadyNodeCentered { extent } => {
                write!(f, "extent {extent} is already node-centered")
            }
            Self::Collapsed { axis, extent } => {
                write!(f, "extent {extent} collapses on axis {axis}")
            }
            Self::DimensionMismatch { mode, extent } => {
                write!(f, "extent {extent} does not match dimension mode {mode}")
            }
            Self::EmptyDomain { extent } => write!(f, "domain {extent} is empty"),
            Self::PointDomain { extent } => {
                write!(f, "domain {extent} is degenerate on every axis")
            }
        }
    }
}

impl Error for ExtentError {}
