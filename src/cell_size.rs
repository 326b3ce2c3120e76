//! # Cell size conversion
//!
//! Converts a physical cell size (meters) into the angular deltas of an equirectangular
//! grid at a given latitude, under a spherical Earth of radius [`R_EARTH`].
//!
//! * The latitude delta only depends on the cell size: a meridian arc of fixed length always
//!   subtends the same angle.
//! * The longitude delta is divided by `cos(latitude)` to account for meridian convergence.
//!   It grows without bound as the latitude approaches ±90°; this is a known limit of the
//!   approximation and is not guarded.
//!
//! Both formulas are small-angle approximations meant for regional grids, not for grids
//! spanning a pole.
use serde::{Deserialize, Serialize};

use crate::constants::{Degree, Meter, DEGRAD, RADEG, R_EARTH};
use crate::point_set::BoundingBox;

/// Angular size of a grid cell, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngularCellOffset {
    /// Longitude delta (latitude corrected)
    pub x_offset: Degree,
    /// Latitude delta
    pub y_offset: Degree,
}

impl AngularCellOffset {
    /// `[x_offset, y_offset]`, the layout the aggregation engine expects.
    pub fn as_array(&self) -> [Degree; 2] {
        [self.x_offset, self.y_offset]
    }
}

/// Latitude delta matching `cell_size` meters along a meridian.
///
/// ```text
/// Δlat = (cell_size / R_EARTH) · 180 / π
/// ```
#[inline]
pub fn lat_offset(cell_size: Meter) -> Degree {
    (cell_size / R_EARTH) * DEGRAD
}

/// Longitude delta matching `cell_size` meters along the parallel at `latitude` degrees.
///
/// ```text
/// Δlon = Δlat / cos(latitude)
/// ```
///
/// At the equator this is exactly [`lat_offset`].
#[inline]
pub fn lon_offset(latitude: Degree, cell_size: Meter) -> Degree {
    lat_offset(cell_size) / (latitude * RADEG).cos()
}

/// Angular cell size for `cell_size` meters around `latitude`.
pub fn grid_lat_lon_offset(cell_size: Meter, latitude: Degree) -> AngularCellOffset {
    AngularCellOffset {
        x_offset: lon_offset(latitude, cell_size),
        y_offset: lat_offset(cell_size),
    }
}

/// Angular cell size for `cell_size` meters, evaluated at the center latitude of `bounds`.
///
/// An empty box has a `NaN` center latitude, which propagates into `x_offset`.
pub fn grid_offset(bounds: &BoundingBox, cell_size: Meter) -> AngularCellOffset {
    grid_lat_lon_offset(cell_size, bounds.center_lat())
}
