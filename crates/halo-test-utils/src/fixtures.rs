//! Datasets whose values identify their own global position.
//!
//! Every value is derived from the global linear index of its node or
//! cell within the whole domain, so after an exchange any ghost value can
//! be checked without knowing which rank sent it.

use halo_core::{ArrayData, DataSet, FieldArray, FieldData};
use halo_extent::{CartesianExtent, DimensionMode};

/// Scalar `f64` point array: the node's global index.
pub const POINT_INDEX: &str = "point_index";
/// Scalar `u8` point array: the node's global index modulo 251.
pub const POINT_MASK: &str = "point_mask";
/// String point array. Not exchangeable.
pub const POINT_LABELS: &str = "labels";
/// Scalar `f32` cell array: the cell's global index.
pub const CELL_INDEX: &str = "cell_index";
/// 3-component `f32` cell array: `3 * index + c`.
pub const CELL_VECTOR: &str = "velocity";
/// 9-component `i64` cell array: `9 * index + c`.
pub const CELL_TENSOR: &str = "stress";

fn global_index(domain: &CartesianExtent, ijk: [i32; 3]) -> usize {
    domain
        .linear_index(ijk)
        .unwrap_or_else(|| panic!("{ijk:?} outside domain {domain}"))
}

/// Build the indexed dataset for one rank's piece.
///
/// `domain_nodes` is the whole node extent, `piece_nodes` the node extent
/// this rank owns. An empty piece yields empty arrays.
pub fn indexed_dataset(
    domain_nodes: &CartesianExtent,
    piece_nodes: &CartesianExtent,
    mode: DimensionMode,
) -> DataSet {
    let domain_cells = domain_nodes.node_to_cell(mode).unwrap();
    let mut ds = DataSet::new(*piece_nodes).unwrap();
    let cells = ds.cell_extent(mode).unwrap();

    let nodes: Vec<usize> = piece_nodes
        .iter_points()
        .map(|p| global_index(domain_nodes, p))
        .collect();
    let cell_ids: Vec<usize> = cells
        .iter_points()
        .map(|p| global_index(&domain_cells, p))
        .collect();

    let point_index = nodes.iter().map(|&n| n as f64).collect();
    let point_mask = nodes.iter().map(|&n| (n % 251) as u8).collect();
    let labels = nodes.iter().map(|n| format!("n{n}")).collect();
    ds.point_data
        .insert(FieldArray::from_values::<f64>(POINT_INDEX, 1, point_index).unwrap());
    ds.point_data
        .insert(FieldArray::new(POINT_LABELS, 1, ArrayData::Strings(labels)).unwrap());
    ds.point_data
        .insert(FieldArray::from_values::<u8>(POINT_MASK, 1, point_mask).unwrap());

    let cell_index = cell_ids.iter().map(|&c| c as f32).collect();
    let vector = cell_ids
        .iter()
        .flat_map(|&c| (0..3).map(move |k| (3 * c + k) as f32))
        .collect();
    let tensor = cell_ids
        .iter()
        .flat_map(|&c| (0..9).map(move |k| (9 * c + k) as i64))
        .collect();
    ds.cell_data
        .insert(FieldArray::from_values::<f32>(CELL_INDEX, 1, cell_index).unwrap());
    ds.cell_data
        .insert(FieldArray::from_values::<f32>(CELL_VECTOR, 3, vector).unwrap());
    ds.cell_data
        .insert(FieldArray::from_values::<i64>(CELL_TENSOR, 9, tensor).unwrap());
    ds
}

fn check_values<T, F>(array: &FieldArray, extent: &CartesianExtent, expected: F)
where
    T: halo_core::Element,
    F: Fn([i32; 3], usize) -> T,
{
    let values = array
        .values::<T>()
        .unwrap_or_else(|| panic!("array '{}' has type {}", array.name(), array.data().type_name()));
    let comps = array.components();
    assert_eq!(
        values.len(),
        extent.volume() * comps,
        "array '{}' sized for the wrong extent",
        array.name()
    );
    for (n, p) in extent.iter_points().enumerate() {
        for c in 0..comps {
            assert_eq!(
                values[n * comps + c],
                expected(p, c),
                "array '{}' at {p:?} component {c}",
                array.name()
            );
        }
    }
}

/// Check every indexed array present in `point_data` / `cell_data` over
/// the ghost-padded node extent `extent`.
///
/// Panics on the first wrong value.
pub fn assert_indexed(
    extent: &CartesianExtent,
    point_data: &FieldData,
    cell_data: &FieldData,
    domain_nodes: &CartesianExtent,
    mode: DimensionMode,
) {
    let domain_cells = domain_nodes.node_to_cell(mode).unwrap();
    let cells = extent.node_to_cell(mode).unwrap();

    if let Some(a) = point_data.get(POINT_INDEX) {
        check_values(a, extent, |p, _| global_index(domain_nodes, p) as f64);
    }
    if let Some(a) = point_data.get(POINT_MASK) {
        check_values(a, extent, |p, _| (global_index(domain_nodes, p) % 251) as u8);
    }
    if let Some(a) = cell_data.get(CELL_INDEX) {
        check_values(a, &cells, |p, _| global_index(&domain_cells, p) as f32);
    }
    if let Some(a) = cell_data.get(CELL_VECTOR) {
        check_values(a, &cells, |p, c| (3 * global_index(&domain_cells, p) + c) as f32);
    }
    if let Some(a) = cell_data.get(CELL_TENSOR) {
        check_values(a, &cells, |p, c| (9 * global_index(&domain_cells, p) + c) as i64);
    }
}
