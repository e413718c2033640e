//! Planner error types.

use std::error::Error;
use std::fmt;

use halo_core::Rank;
use halo_extent::{CartesianExtent, Centering, DimensionMode, ExtentError};

/// Reasons a set of owned extents cannot be planned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlanError {
    /// The domain has no cells.
    EmptyDomain {
        /// The offending domain.
        domain: CartesianExtent,
    },
    /// An extent is not degenerate on an axis the mode treats as inactive.
    DimensionMismatch {
        /// Owning rank, or `None` for the domain itself.
        rank: Option<Rank>,
        /// Dimension mode in force.
        mode: DimensionMode,
        /// The offending extent.
        extent: CartesianExtent,
    },
    /// An owned extent has a different centering from the domain.
    CenteringMismatch {
        /// Owning rank.
        rank: Rank,
        /// Domain centering.
        expected: Centering,
        /// Extent centering.
        found: Centering,
    },
    /// An owned extent reaches outside the domain.
    OutsideDomain {
        /// Owning rank.
        rank: Rank,
        /// The offending extent.
        extent: CartesianExtent,
        /// The domain.
        domain: CartesianExtent,
    },
    /// Two ranks claim the same indices.
    Overlap {
        /// First rank.
        a: Rank,
        /// Second rank.
        b: Rank,
        /// Indices owned by both.
        region: CartesianExtent,
    },
    /// Owned extents leave part of the domain unowned.
    IncompleteCover {
        /// Indices owned by some rank.
        covered: usize,
        /// Indices in the domain.
        expected: usize,
    },
    /// Converting the plan between node and cell space failed.
    Conversion(ExtentError),
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDomain { domain } => write!(f, "domain {domain} is empty"),
            Self::DimensionMismatch {
                rank: Some(rank),
                mode,
                extent,
            } => write!(f, "rank {rank} extent {extent} does not fit {mode} mode"),
            Self::DimensionMismatch {
                rank: None,
                mode,
                extent,
            } => write!(f, "domain {extent} does not fit {mode} mode"),
            Self::CenteringMismatch {
                rank,
                expected,
                found,
            } => write!(
                f,
                "rank {rank} extent is {found}-centered, domain is {expected}-centered"
            ),
            Self::OutsideDomain {
                rank,
                extent,
                domain,
            } => write!(f, "rank {rank} extent {extent} outside domain {domain}"),
            Self::Overlap { a, b, region } => {
                write!(f, "ranks {a} and {b} both own {region}")
            }
            Self::IncompleteCover { covered, expected } => write!(
                f,
                "owned extents cover {covered} of {expected} domain indices"
            ),
            Self::Conversion(e) => write!(f, "plan conversion failed: {e}"),
        }
    }
}

impl Error for PlanError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Conversion(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ExtentError> for PlanError {
    fn from(e: ExtentError) -> Self {
        Self::Conversion(e)
    }
}
