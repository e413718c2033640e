//! Strided row iteration over a sub-region of a larger extent.
//!
//! Arrays are stored x-fastest. A sub-region is therefore a sequence of
//! contiguous x-rows, one per `(j, k)` pair, separated by the outer
//! extent's row and plane strides. Pack, unpack, and local copies all walk
//! the same row sequence, so a region packed on one rank unpacks in the
//! same order on another.

use crate::extent::CartesianExtent;
use crate::mode::Axis;

/// Iterator over the element offset of each x-row of `region` within the
/// layout of `outer`, in `(k, j)` order.
///
/// Created by [`row_offsets`].
#[derive(Clone, Debug)]
pub struct RowOffsets {
    base: usize,
    row_stride: usize,
    plane_stride: usize,
    ny: usize,
    nz: usize,
    j: usize,
    k: usize,
}

impl Iterator for RowOffsets {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.k >= self.nz {
            return None;
        }
        let offset = self.base + self.j * self.row_stride + self.k * self.plane_stride;
        self.j += 1;
        if self.j == self.ny {
            self.j = 0;
            self.k += 1;
        }
        Some(offset)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.k >= self.nz {
            0
        } else {
            (self.nz - self.k) * self.ny - self.j
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RowOffsets {}

/// Row start offsets of `region` inside `outer`'s x-fastest layout.
///
/// Each row is `region.size()[0]` elements long. Returns an empty
/// iterator when `region` is empty or not contained in `outer`; callers
/// that need to distinguish those cases check containment first.
pub fn row_offsets(outer: &CartesianExtent, region: &CartesianExtent) -> RowOffsets {
    let [_, ny, nz] = region.size();
    let strides = outer.strides();
    let base = if region.is_empty() || !outer.contains(region) {
        None
    } else {
        outer.linear_index([
            region.lo(Axis::X),
            region.lo(Axis::Y),
            region.lo(Axis::Z),
        ])
    };
    match base {
        Some(base) => RowOffsets {
            base,
            row_stride: strides[1],
            plane_stride: strides[2],
            ny,
            nz,
            j: 0,
            k: 0,
        },
        None => RowOffsets {
            base: 0,
            row_stride: 0,
            plane_stride: 0,
            ny: 0,
            nz: 0,
            j: 0,
            k: 0,
        },
    }
}
