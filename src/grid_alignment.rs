//! # Grid alignment
//!
//! Places a grid of angular cells over a bounding box so that the grid origin always falls
//! on an exact multiple of the cell size.
//!
//! Two aggregation backends that only share the cell size and the data will then agree on
//! every cell boundary, whatever the quadrant of the data. To keep the alignment uniform
//! across the whole coordinate range, coordinates are first moved into a non-negative
//! domain (`lat + 90`, `lng + 180`), aligned there, and shifted back:
//!
//! ```text
//! origin_y = align_to_cell(lat_min + 90,  y_offset) - 90
//! origin_x = align_to_cell(lng_min + 180, x_offset) - 180
//! ```
//!
//! The grid extent is padded by one cell so that the maximum coordinate lands strictly
//! inside the last column/row:
//!
//! ```text
//! width  = (lng_max - lng_min) + x_offset
//! height = (lat_max - lat_min) + y_offset
//! ```
use nalgebra::{Matrix4, Point3, Vector3};

use crate::cell_size::AngularCellOffset;
use crate::constants::{Degree, LAT_SHIFT, LNG_SHIFT};
use crate::point_set::BoundingBox;

/// Snap `value` down to the multiple of `cell_size` lying at or below it.
///
/// For `value >= 0` the result is exactly `(value / cell_size).floor() * cell_size`, bit for
/// bit, which is the formula every aggregation backend evaluates on the shifted coordinates.
/// Any two implementations agree on the grid origin as long as they keep to it.
///
/// Negative values use the same floor semantics, with a one-cell correction when the
/// rounded quotient lands on the wrong side of a boundary.
///
/// Properties, for finite `value` and `cell_size > 0`:
/// * `align_to_cell(v, c) <= v < align_to_cell(v, c) + c`, when `v / c` is computed exactly
/// * monotonic: `v1 <= v2` implies `align_to_cell(v1, c) <= align_to_cell(v2, c)`
/// * `align_to_cell(0.0, c) == 0.0`
///
/// When `v` is a multiple `k · c` whose quotient rounds to just below `k`, a non-negative
/// `v` snaps to `(k - 1) · c`. Idempotence therefore only holds when the quotients are exact.
///
/// Arguments
/// ---------
/// * `value`: the coordinate to align.
/// * `cell_size`: strictly positive cell size, in the same unit as `value`.
///
/// Return
/// ------
/// * `k · cell_size` where `k` is the floored quotient `value / cell_size`.
pub fn align_to_cell(value: f64, cell_size: f64) -> f64 {
    let mut k = (value / cell_size).floor();

    // `+ 0.0` keeps `align_to_cell(-0.0, c)` at +0.0
    if value >= 0.0 {
        return k * cell_size + 0.0;
    }

    if k * cell_size > value {
        k -= 1.0;
    } else if (k + 1.0) * cell_size <= value {
        k += 1.0;
    }

    k * cell_size
}

/// Geometry of an aligned grid, in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPlacement {
    /// `[origin_x, origin_y]`, the south-west corner of cell `(0, 0)`
    pub origin: [Degree; 2],
    /// `[x_offset, y_offset]`
    pub cell_size: [Degree; 2],
    pub width: Degree,
    pub height: Degree,
    /// Translation by `(-origin_x, -origin_y, 0)`
    pub transform: Matrix4<f64>,
}

impl GridPlacement {
    /// Number of `[columns, rows]` covering `width × height`.
    ///
    /// The float-to-integer conversion saturates. An empty bounding box (`NaN` width, `-∞`
    /// height) yields `[0, 0]`, and a dimension needing more than `u32::MAX` cells is
    /// clamped to `u32::MAX`; [`GridPlacement::is_saturated`] reports the latter.
    pub fn grid_size(&self) -> [u32; 2] {
        self.cell_spans().map(|span| span as u32)
    }

    /// `true` when a dimension needs more cells than a `u32` can count, in which case
    /// [`GridPlacement::grid_size`] under-reports it.
    pub fn is_saturated(&self) -> bool {
        self.cell_spans().iter().any(|&span| span > u32::MAX as f64)
    }

    /// `true` when the placement cannot describe a usable grid: some geometry is not
    /// finite, the grid has no cell, or its size does not fit in `u32`.
    pub fn is_degenerate(&self) -> bool {
        let finite = self
            .origin
            .iter()
            .chain(self.cell_size.iter())
            .chain([self.width, self.height].iter())
            .all(|v| v.is_finite());
        let [columns, rows] = self.grid_size();
        !finite || columns == 0 || rows == 0 || self.is_saturated()
    }

    fn cell_spans(&self) -> [f64; 2] {
        [
            (self.width / self.cell_size[0]).ceil(),
            (self.height / self.cell_size[1]).ceil(),
        ]
    }

    /// Map a coordinate into grid space (degrees from the origin).
    pub fn to_grid_space(&self, lng: Degree, lat: Degree) -> Point3<f64> {
        self.transform.transform_point(&Point3::new(lng, lat, 0.0))
    }

    /// `(column, row)` of the cell containing `(lng, lat)`, or `None` when the coordinate
    /// is outside the grid or not finite.
    pub fn cell_index(&self, lng: Degree, lat: Degree) -> Option<(u32, u32)> {
        locate_cell(
            &self.transform,
            self.cell_size,
            self.grid_size(),
            lng,
            lat,
        )
    }
}

/// Cell lookup shared by [`GridPlacement::cell_index`] and the CPU aggregator, which only
/// sees the flattened request fields.
pub(crate) fn locate_cell(
    transform: &Matrix4<f64>,
    cell_size: [Degree; 2],
    grid_size: [u32; 2],
    lng: Degree,
    lat: Degree,
) -> Option<(u32, u32)> {
    let p = transform.transform_point(&Point3::new(lng, lat, 0.0));
    let column = (p.x / cell_size[0]).floor();
    let row = (p.y / cell_size[1]).floor();
    let [columns, rows] = grid_size;

    // NaN fails both comparisons
    let inside = column >= 0.0 && column < columns as f64 && row >= 0.0 && row < rows as f64;
    inside.then(|| (column as u32, row as u32))
}

/// Align a grid of `offset`-sized cells over `bounds`.
///
/// See the [module documentation](self) for the formulas. No check is made on the inputs:
/// an empty box or a polar offset produce non-finite geometry that callers can detect with
/// [`GridPlacement::is_degenerate`].
pub fn place_grid(bounds: &BoundingBox, offset: &AngularCellOffset) -> GridPlacement {
    let AngularCellOffset { x_offset, y_offset } = *offset;

    let origin_x = align_to_cell(bounds.lng_min + LNG_SHIFT, x_offset) - LNG_SHIFT;
    let origin_y = align_to_cell(bounds.lat_min + LAT_SHIFT, y_offset) - LAT_SHIFT;

    let width = bounds.lng_max - bounds.lng_min + x_offset;
    let height = bounds.lat_max - bounds.lat_min + y_offset;

    GridPlacement {
        origin: [origin_x, origin_y],
        cell_size: [x_offset, y_offset],
        width,
        height,
        transform: Matrix4::new_translation(&Vector3::new(-origin_x, -origin_y, 0.0)),
    }
}
