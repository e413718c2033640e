//! Exchange configuration, validation, and error types.
//!
//! [`ExchangeConfig`] is the per-exchange input the pipeline hands over.
//! [`validate()`](ExchangeConfig::validate) checks it once, before any
//! communication, and yields the [`DimensionMode`] every later phase uses.

use std::error::Error;
use std::fmt;

use halo_extent::{Axis, CartesianExtent, Centering, DimensionMode, ExtentError};
use indexmap::IndexSet;

// ── ArraySelection ─────────────────────────────────────────────────

/// Which arrays an exchange copies into its output.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ArraySelection {
    /// Every array of the input.
    #[default]
    All,
    /// Only arrays with one of these names. The rest are dropped.
    Named(IndexSet<String>),
}

impl ArraySelection {
    /// Select arrays by name.
    pub fn named<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Named(names.into_iter().map(Into::into).collect())
    }

    /// Whether the array called `name` is copied.
    pub fn includes(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(names) => names.contains(name),
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Configuration problems, all detected before any message is posted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The whole extent has no nodes.
    EmptyDomain {
        /// The configured whole extent.
        extent: CartesianExtent,
    },
    /// The whole extent is cell-centered; it must index nodes.
    CellCenteredDomain {
        /// The configured whole extent.
        extent: CartesianExtent,
    },
    /// Ghost levels below zero.
    NegativeGhostLevels {
        /// The configured value.
        value: i32,
    },
    /// More ghost levels than the domain has cells along its longest
    /// active axis.
    GhostLevelsTooLarge {
        /// The configured value.
        value: i32,
        /// Largest meaningful value for this domain.
        max: i32,
    },
    /// Periodic wrap was requested on an axis.
    PeriodicUnsupported {
        /// First axis with a periodic flag set.
        axis: Axis,
    },
    /// A named selection with no names.
    EmptySelection,
    /// A dataset or request extent does not fit the domain's mode.
    DimensionMismatch {
        /// Mode derived from the whole extent.
        mode: DimensionMode,
        /// The offending extent.
        extent: CartesianExtent,
    },
    /// The input dataset does not cover the extent requested upstream.
    UnexpectedInput {
        /// Extent the upstream request asked for.
        expected: CartesianExtent,
        /// Extent the input dataset covers.
        found: CartesianExtent,
    },
    /// An extent operation on configured or requested extents failed.
    Extent(ExtentError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDomain { extent } => write!(f, "whole extent {extent} is empty"),
            Self::CellCenteredDomain { extent } => {
                write!(f, "whole extent {extent} must be node-centered")
            }
            Self::NegativeGhostLevels { value } => {
                write!(f, "ghost_levels must be non-negative, got {value}")
            }
            Self::GhostLevelsTooLarge { value, max } => {
                write!(f, "ghost_levels {value} exceeds domain maximum {max}")
            }
            Self::PeriodicUnsupported { axis } => {
                write!(f, "periodic boundaries are not supported (axis {axis})")
            }
            Self::EmptySelection => write!(f, "array selection names no arrays"),
            Self::DimensionMismatch { mode, extent } => {
                write!(f, "extent {extent} does not fit {mode} domain")
            }
            Self::UnexpectedInput { expected, found } => {
                write!(f, "input covers {found}, upstream request was {expected}")
            }
            Self::Extent(e) => write!(f, "extent: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Extent(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ExtentError> for ConfigError {
    fn from(e: ExtentError) -> Self {
        Self::Extent(e)
    }
}

// ── ExchangeConfig ─────────────────────────────────────────────────

/// Parameters of one ghost exchange, identical on every rank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExchangeConfig {
    /// Node extent of the whole, undecomposed domain.
    pub whole_extent: CartesianExtent,
    /// Ghost layers to fill around each rank's piece. Default: 1.
    pub ghost_levels: i32,
    /// Per-axis periodic boundary flags. Default: none.
    pub periodic: [bool; 3],
    /// Arrays to copy. Default: all.
    pub selection: ArraySelection,
    /// Cross-check plan fingerprints across ranks before posting any
    /// transfer. Default: on in debug builds.
    pub verify_plan: bool,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            whole_extent: CartesianExtent::empty(Centering::Node),
            ghost_levels: 1,
            periodic: [false; 3],
            selection: ArraySelection::All,
            verify_plan: cfg!(debug_assertions),
        }
    }
}

impl ExchangeConfig {
    /// Configuration for `whole_extent` with `ghost_levels` layers and
    /// defaults elsewhere.
    pub fn new(whole_extent: CartesianExtent, ghost_levels: i32) -> Self {
        Self {
            whole_extent,
            ghost_levels,
            ..Self::default()
        }
    }

    /// Check structural invariants and derive the dimension mode.
    pub fn validate(&self) -> Result<DimensionMode, ConfigError> {
        let extent = self.whole_extent;
        if extent.centering() != Centering::Node {
            return Err(ConfigError::CellCenteredDomain { extent });
        }
        if extent.is_empty() {
            return Err(ConfigError::EmptyDomain { extent });
        }
        let mode = DimensionMode::from_domain(&extent)?;

        if self.ghost_levels < 0 {
            return Err(ConfigError::NegativeGhostLevels {
                value: self.ghost_levels,
            });
        }
        let max = mode
            .active_axes()
            .into_iter()
            .map(|a| extent.hi(a) - extent.lo(a))
            .max()
            .unwrap_or(0);
        if self.ghost_levels > max {
            return Err(ConfigError::GhostLevelsTooLarge {
                value: self.ghost_levels,
                max,
            });
        }

        if let Some(axis) = Axis::ALL.into_iter().find(|a| self.periodic[a.index()]) {
            return Err(ConfigError::PeriodicUnsupported { axis });
        }
        if matches!(&self.selection, ArraySelection::Named(names) if names.is_empty()) {
            return Err(ConfigError::EmptySelection);
        }
        Ok(mode)
    }

    /// Ghost width as an unsigned count. Only meaningful after
    /// [`validate`](Self::validate) succeeds.
    pub(crate) fn ghost_width(&self) -> u32 {
        self.ghost_levels.max(0) as u32
    }

    /// Cell extent of the whole domain under `mode`.
    pub(crate) fn domain_cells(&self, mode: DimensionMode) -> Result<CartesianExtent, ConfigError> {
        Ok(self.whole_extent.node_to_cell(mode)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube() -> CartesianExtent {
        CartesianExtent::node([0, 10, 0, 10, 0, 10])
    }

    #[test]
    fn default_config_needs_a_domain() {
        assert!(matches!(
            ExchangeConfig::default().validate(),
            Err(ConfigError::EmptyDomain { .. })
        ));
    }

    #[test]
    fn valid_config_derives_mode() {
        let cfg = ExchangeConfig::new(CartesianExtent::node([0, 8, 0, 8, 3, 3]), 2);
        assert_eq!(
            cfg.validate(),
            Ok(DimensionMode::TwoD { normal: Axis::Z })
        );
    }

    #[test]
    fn negative_ghost_levels_rejected() {
        let cfg = ExchangeConfig::new(cube(), -1);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::NegativeGhostLevels { value: -1 })
        );
    }

    #[test]
    fn oversized_ghost_levels_rejected() {
        let cfg = ExchangeConfig::new(CartesianExtent::node([0, 4, 0, 2, 0, 0]), 5);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::GhostLevelsTooLarge { value: 5, max: 4 })
        );
    }

    #[test]
    fn periodic_flags_rejected() {
        let cfg = ExchangeConfig {
            periodic: [false, true, true],
            ..ExchangeConfig::new(cube(), 1)
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::PeriodicUnsupported { axis: Axis::Y })
        );
    }

    #[test]
    fn cell_domain_and_empty_selection_rejected() {
        let cfg = ExchangeConfig::new(CartesianExtent::cell([0, 3, 0, 3, 0, 3]), 1);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::CellCenteredDomain { .. })
        ));
        let cfg = ExchangeConfig {
            selection: ArraySelection::named(Vec::<String>::new()),
            ..ExchangeConfig::new(cube(), 1)
        };
        assert_eq!(cfg.validate(), Err(ConfigError::EmptySelection));
    }

    #[test]
    fn point_domain_is_an_extent_error() {
        let cfg = ExchangeConfig::new(CartesianExtent::node([2, 2, 2, 2, 2, 2]), 0);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Extent(ExtentError::PointDomain { .. }))
        ));
    }

    #[test]
    fn selection_membership() {
        let sel = ArraySelection::named(["rho", "velocity"]);
        assert!(sel.includes("rho"));
        assert!(!sel.includes("pressure"));
        assert!(ArraySelection::All.includes("anything"));
    }
}
