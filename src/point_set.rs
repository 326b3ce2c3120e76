//! # Point set scanning
//!
//! Single-pass extraction of flat position/weight buffers and of the bounding box of the
//! finite coordinates of a point collection.
//!
//! The caller's points are opaque: they are only read through an accessor returning
//! `[longitude, latitude]` in degrees. Every point occupies one slot in the output buffers,
//! finite or not, so that buffer index `i` always refers to input point `i`.
//!
//! ```rust
//! use geogrid::point_set::scan_points;
//!
//! struct Sighting {
//!     lng: f64,
//!     lat: f64,
//! }
//!
//! let sightings = vec![
//!     Sighting { lng: 2.35, lat: 48.85 },
//!     Sighting { lng: 2.29, lat: 48.86 },
//! ];
//!
//! let parsed = scan_points(&sightings, |s| [s.lng, s.lat]);
//! assert_eq!(parsed.positions.len(), 4);
//! assert_eq!(parsed.bounds.lng_min, 2.29);
//! ```
use serde::{Deserialize, Serialize};

use crate::constants::Degree;

/// Bounding box of the finite coordinates seen by the scanner.
///
/// An empty box keeps its `+∞ / −∞` sentinels: `lat_min = +∞`, `lat_max = −∞`, and the same
/// for longitude. These sentinels flow unchanged through the rest of the pipeline and end up
/// as a `0 × 0` grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lat_min: Degree,
    pub lat_max: Degree,
    pub lng_min: Degree,
    pub lng_max: Degree,
}

impl BoundingBox {
    /// A box that contains nothing yet.
    pub fn empty() -> Self {
        BoundingBox {
            lat_min: f64::INFINITY,
            lat_max: f64::NEG_INFINITY,
            lng_min: f64::INFINITY,
            lng_max: f64::NEG_INFINITY,
        }
    }

    /// Grow the box to include `(lng, lat)`.
    ///
    /// Callers are expected to pass finite values only; see [`scan_points_weighted`].
    pub fn extend(&mut self, lng: Degree, lat: Degree) {
        self.lat_min = self.lat_min.min(lat);
        self.lat_max = self.lat_max.max(lat);
        self.lng_min = self.lng_min.min(lng);
        self.lng_max = self.lng_max.max(lng);
    }

    /// `true` while no finite point has been added.
    pub fn is_empty(&self) -> bool {
        !(self.lat_min <= self.lat_max && self.lng_min <= self.lng_max)
    }

    /// Latitude at the middle of the box, used as the representative latitude of the set.
    pub fn center_lat(&self) -> Degree {
        (self.lat_min + self.lat_max) / 2.0
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

/// Flat buffers produced by a single scan over the input points.
///
/// Invariants
/// ----------
/// * `positions.len() == 2 * n == positions_low.len()`
/// * `weights.len() == n`
///
/// where `n` is the number of scanned points, finite or not.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedPointSet {
    /// Interleaved `[lng0, lat0, lng1, lat1, ...]`
    pub positions: Vec<f64>,
    /// Low-order residuals of `positions`, see [`fp64_low_part`]
    pub positions_low: Vec<f32>,
    pub weights: Vec<f32>,
    pub bounds: BoundingBox,
    /// Number of points that were kept in the buffers but did not extend `bounds`
    pub non_finite_count: usize,
}

impl ParsedPointSet {
    /// Number of scanned points.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Residual lost when `x` is narrowed to single precision.
///
/// `x as f32 + fp64_low_part(x)` reconstructs `x` with roughly twice the precision of an
/// `f32`, which is what GPU pipelines emulating 64-bit positions consume.
#[inline]
pub fn fp64_low_part(x: f64) -> f32 {
    (x - (x as f32) as f64) as f32
}

/// Scan `points` with a unit weight for each point.
///
/// Equivalent to [`scan_points_weighted`] with `get_weight = |_| 1.0`.
pub fn scan_points<T, P>(points: &[T], get_position: P) -> ParsedPointSet
where
    P: Fn(&T) -> [f64; 2],
{
    scan_points_weighted(points, get_position, |_| 1.0)
}

/// Scan `points` once, filling the position, low-precision and weight buffers and computing
/// the bounding box.
///
/// Arguments
/// ---------
/// * `points`: the caller's records, in the order the buffers must follow.
/// * `get_position`: returns `[longitude, latitude]` in degrees.
/// * `get_weight`: returns the weight contributed by the point to its cell.
///
/// Return
/// ------
/// * A [`ParsedPointSet`]. Non-finite coordinates are appended like any other (the slot
///   must exist to keep indices aligned with `points`) but a point only extends the bounds
///   when both of its components are finite.
///
/// Empty or fully non-finite input is not an error: the bounds keep their sentinels.
pub fn scan_points_weighted<T, P, W>(
    points: &[T],
    get_position: P,
    get_weight: W,
) -> ParsedPointSet
where
    P: Fn(&T) -> [f64; 2],
    W: Fn(&T) -> f32,
{
    let n = points.len();
    let mut positions = Vec::with_capacity(2 * n);
    let mut positions_low = Vec::with_capacity(2 * n);
    let mut weights = Vec::with_capacity(n);
    let mut bounds = BoundingBox::empty();
    let mut non_finite_count = 0;

    for point in points {
        let [lng, lat] = get_position(point);

        positions.push(lng);
        positions.push(lat);
        positions_low.push(fp64_low_part(lng));
        positions_low.push(fp64_low_part(lat));
        weights.push(get_weight(point));

        if lng.is_finite() && lat.is_finite() {
            bounds.extend(lng, lat);
        } else {
            non_finite_count += 1;
        }
    }

    if non_finite_count > 0 {
        log::warn!(
            "{non_finite_count} of {n} points have a non-finite coordinate; they are kept in the buffers but excluded from the bounds"
        );
    }

    ParsedPointSet {
        positions,
        positions_low,
        weights,
        bounds,
        non_finite_count,
    }
}
