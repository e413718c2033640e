//! Axes and dimension modes.

use smallvec::SmallVec;
use std::fmt;

use crate::error::ExtentError;
use crate::extent::CartesianExtent;

/// One of the three Cartesian axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// The x axis (fastest-varying in memory).
    X,
    /// The y axis.
    Y,
    /// The z axis (slowest-varying in memory).
    Z,
}

impl Axis {
    /// All axes in layout order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Position of this axis in `[x, y, z]` order.
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "x"),
            Self::Y => write!(f, "y"),
            Self::Z => write!(f, "z"),
        }
    }
}

/// Which axes of a problem domain carry data.
///
/// Derived from the node-centered whole extent: an axis whose bounds are
/// equal (`lo == hi`) is degenerate and inactive. Growth, shrinkage, and
/// node/cell conversion only touch active axes.
///
/// Derive the mode from the *node* domain. A node axis with two points
/// becomes a single cell, which would look degenerate in cell space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DimensionMode {
    /// Data along a single axis.
    OneD(Axis),
    /// Planar data; `normal` is the single degenerate axis.
    TwoD {
        /// The inactive axis.
        normal: Axis,
    },
    /// Volumetric data.
    ThreeD,
}

impl DimensionMode {
    /// Derive the dimension mode from a domain extent.
    ///
    /// Returns [`ExtentError::EmptyDomain`] if any axis has `hi < lo`, and
    /// [`ExtentError::PointDomain`] if every axis is degenerate.
    pub fn from_domain(domain: &CartesianExtent) -> Result<Self, ExtentError> {
        if domain.is_empty() {
            return Err(ExtentError::EmptyDomain { extent: *domain });
        }
        let active: SmallVec<[Axis; 3]> = Axis::ALL
            .into_iter()
            .filter(|&a| domain.hi(a) > domain.lo(a))
            .collect();
        match active.as_slice() {
            [] => Err(ExtentError::PointDomain { extent: *domain }),
            [a] => Ok(Self::OneD(*a)),
            [a, b] => {
                let normal = Axis::ALL
                    .into_iter()
                    .find(|n| n != a && n != b)
                    .unwrap_or(Axis::Z);
                Ok(Self::TwoD { normal })
            }
            _ => Ok(Self::ThreeD),
        }
    }

    /// Whether `axis` carries data in this mode.
    pub fn is_active(self, axis: Axis) -> bool {
        match self {
            Self::OneD(a) => a == axis,
            Self::TwoD { normal } => normal != axis,
            Self::ThreeD => true,
        }
    }

    /// Active axes in layout order.
    pub fn active_axes(self) -> SmallVec<[Axis; 3]> {
        Axis::ALL
            .into_iter()
            .filter(|&a| self.is_active(a))
            .collect()
    }

    /// Number of active axes.
    pub fn ndim(self) -> usize {
        match self {
            Self::OneD(_) => 1,
            Self::TwoD { .. } => 2,
            Self::ThreeD => 3,
        }
    }

    /// Check that `extent` is degenerate on every inactive axis.
    ///
    /// Empty extents pass: they carry no data on any axis.
    pub fn check(self, extent: &CartesianExtent) -> Result<(), ExtentError> {
        if extent.is_empty() {
            return Ok(());
        }
        for axis in Axis::ALL {
            if !self.is_active(axis) && extent.hi(axis) != extent.lo(axis) {
                return Err(ExtentError::DimensionMismatch {
                    mode: self,
                    extent: *extent,
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for DimensionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneD(a) => write!(f, "1D({a})"),
            Self::TwoD { normal } => match normal {
                Axis::X => write!(f, "2D(yz)"),
                Axis::Y => write!(f, "2D(xz)"),
                Axis::Z => write!(f, "2D(xy)"),
            },
            Self::ThreeD => write!(f, "3D"),
        }
    }
}
