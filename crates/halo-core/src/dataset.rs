//! The structured-grid dataset a pipeline hands to the exchange.

use halo_extent::{CartesianExtent, Centering, DimensionMode, ExtentError};

use crate::array::FieldData;
use crate::error::ArrayError;

/// A structured-grid piece: the node extent it covers plus point and
/// cell arrays laid out x-fastest over that extent.
///
/// Point arrays hold one tuple per node of `extent`; cell arrays hold one
/// tuple per cell of `extent.node_to_cell(mode)`.
#[derive(Clone, Debug, PartialEq)]
pub struct DataSet {
    extent: CartesianExtent,
    /// Arrays attached to grid nodes.
    pub point_data: FieldData,
    /// Arrays attached to grid cells.
    pub cell_data: FieldData,
}

impl DataSet {
    /// Create an empty dataset over a node-centered extent.
    ///
    /// Returns [`ExtentError::AlreadyCellCentered`] for a cell extent.
    pub fn new(extent: CartesianExtent) -> Result<Self, ExtentError> {
        if extent.centering() != Centering::Node {
            return Err(ExtentError::AlreadyCellCentered { extent });
        }
        Ok(Self {
            extent,
            point_data: FieldData::new(),
            cell_data: FieldData::new(),
        })
    }

    /// Node extent covered by this dataset.
    pub fn extent(&self) -> CartesianExtent {
        self.extent
    }

    /// Cell extent covered by this dataset under `mode`.
    pub fn cell_extent(&self, mode: DimensionMode) -> Result<CartesianExtent, ExtentError> {
        self.extent.node_to_cell(mode)
    }

    /// Check that every numeric array has one tuple per node or cell.
    ///
    /// Non-numeric arrays are not checked; the exchange skips them.
    pub fn validate_lengths(&self, mode: DimensionMode) -> Result<(), ArrayError> {
        let nodes = self.extent.volume();
        let cells = match self.cell_extent(mode) {
            Ok(c) => c.volume(),
            Err(_) => 0,
        };
        for (data, tuples) in [(&self.point_data, nodes), (&self.cell_data, cells)] {
            for array in data.iter().filter(|a| a.kind().is_some()) {
                array.expect_tuples(tuples)?;
            }
        }
        Ok(())
    }
}
