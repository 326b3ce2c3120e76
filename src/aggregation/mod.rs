//! # Density grid aggregation
//!
//! This module assembles the request handed to an aggregation engine and repackages the
//! engine response with the grid geometry. It also defines the [`GridParams`] configuration
//! struct and its validating builder.
//!
//! ## Pipeline overview
//!
//! 1. **Scan** – [`scan_points`](crate::point_set::scan_points) flattens the caller's points
//!    into position/weight buffers and computes the bounding box of finite coordinates.
//! 2. **Cell size** – [`grid_offset`](crate::cell_size::grid_offset) converts
//!    `cell_size_meters` into degrees at the center latitude of the box.
//! 3. **Placement** – [`place_grid`](crate::grid_alignment::place_grid) aligns the origin on
//!    a multiple of the cell size and computes the padded extent.
//! 4. **Request** – [`build_aggregation_request`] packs everything into an
//!    [`AggregationRequest`], runs a [`GridAggregator`], and returns a [`DensityGridData`].
//!
//! ## Example
//!
//! ```rust
//! use geogrid::aggregation::{point_to_density_grid_data, CpuGridAggregator, GridParams};
//!
//! let points = vec![[2.35, 48.85], [2.36, 48.86], [2.35, 48.851]];
//!
//! let params = GridParams::builder()
//!     .cell_size_meters(500.0)
//!     .build()
//!     .unwrap();
//!
//! let mut engine = CpuGridAggregator::new();
//! let grid = point_to_density_grid_data(&points, |p| *p, &params, &mut engine).unwrap();
//!
//! let [columns, rows] = grid.grid_size;
//! assert_eq!(grid.counts_buffer.len(), (columns * rows) as usize);
//! ```
//!
//! ## See also
//!
//! * [`GridAggregator`] – the engine seam (CPU or GPU).
//! * [`CpuGridAggregator`] – reference CPU engine.
use crate::constants::{Meter, DEFAULT_CELL_SIZE_METERS};
use crate::geogrid_errors::GeoGridError;
use std::cmp::Ordering::Greater;
use std::fmt;

pub mod cpu;
pub mod request;

pub use cpu::CpuGridAggregator;
pub use request::{
    build_aggregation_request, density_grid_from_point_set, point_to_density_grid_data,
    AggregationRequest, AggregationResult, DensityGridData, GridAggregator, GridDescriptor,
};

/// Configuration of a density grid run.
///
/// Fields
/// -----------------
/// * `cell_size_meters` – physical size of a cell side. Must be finite and strictly positive.
/// * `fp64` – ask the engine to rebuild positions from their high and low parts.
/// * `gpu_aggregation` – execution preference forwarded to the engine as `use_gpu`.
///
/// Defaults
/// -----------------
/// * `cell_size_meters`: 1000.0
/// * `fp64`: false
/// * `gpu_aggregation`: false
#[derive(Debug, Clone, PartialEq)]
pub struct GridParams {
    pub cell_size_meters: Meter,
    pub fp64: bool,
    pub gpu_aggregation: bool,
}

impl GridParams {
    /// Equivalent to [`GridParams::default()`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a [`GridParamsBuilder`] initialized with the defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use geogrid::aggregation::GridParams;
    ///
    /// let params = GridParams::builder()
    ///     .cell_size_meters(250.0)
    ///     .fp64(true)
    ///     .gpu_aggregation(true)
    ///     .build()
    ///     .unwrap();
    /// assert!(params.fp64);
    /// ```
    pub fn builder() -> GridParamsBuilder {
        GridParamsBuilder::new()
    }
}

impl Default for GridParams {
    fn default() -> Self {
        GridParams {
            cell_size_meters: DEFAULT_CELL_SIZE_METERS,
            fp64: false,
            gpu_aggregation: false,
        }
    }
}

/// Builder for [`GridParams`], with validation.
#[derive(Debug, Clone)]
pub struct GridParamsBuilder {
    params: GridParams,
}

impl Default for GridParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GridParamsBuilder {
    /// Create a new builder initialized with default values.
    pub fn new() -> Self {
        Self {
            params: GridParams::default(),
        }
    }

    pub fn cell_size_meters(mut self, v: Meter) -> Self {
        self.params.cell_size_meters = v;
        self
    }
    pub fn fp64(mut self, v: bool) -> Self {
        self.params.fp64 = v;
        self
    }
    pub fn gpu_aggregation(mut self, v: bool) -> Self {
        self.params.gpu_aggregation = v;
        self
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `cell_size_meters` must be finite and `> 0.0` (NaN is rejected). The grid math
    ///   itself does not check it: a zero cell size makes every column/row division blow up.
    ///
    /// Returns
    /// -----------------
    /// * `Ok(GridParams)` when valid, `Err(GeoGridError::InvalidGridParameter)` otherwise.
    pub fn build(self) -> Result<GridParams, GeoGridError> {
        let p = &self.params;

        if p.cell_size_meters.partial_cmp(&0.0) != Some(Greater) {
            return Err(GeoGridError::InvalidGridParameter(
                "cell_size_meters must be > 0".into(),
            ));
        }
        if !p.cell_size_meters.is_finite() {
            return Err(GeoGridError::InvalidGridParameter(
                "cell_size_meters must be finite".into(),
            ));
        }

        Ok(self.params)
    }
}

impl fmt::Display for GridParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Density Grid Parameters")?;
            writeln!(f, "-----------------------")?;
            writeln!(f, "  cell_size_meters = {:.3} m", self.cell_size_meters)?;
            writeln!(f, "  fp64             = {}", self.fp64)?;
            write!(f, "  gpu_aggregation  = {}", self.gpu_aggregation)
        } else {
            write!(
                f,
                "GridParams(cell={:.3} m, fp64={}, gpu={})",
                self.cell_size_meters, self.fp64, self.gpu_aggregation
            )
        }
    }
}

#[cfg(test)]
mod grid_params_tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = GridParams::new();
        assert_eq!(params.cell_size_meters, 1000.0);
        assert!(!params.fp64);
        assert!(!params.gpu_aggregation);
        assert_eq!(GridParams::builder().build().unwrap(), params);
    }

    #[test]
    fn test_builder_sets_fields() {
        let params = GridParams::builder()
            .cell_size_meters(42.0)
            .fp64(true)
            .gpu_aggregation(true)
            .build()
            .unwrap();

        assert_eq!(
            params,
            GridParams {
                cell_size_meters: 42.0,
                fp64: true,
                gpu_aggregation: true,
            }
        );
    }

    #[test]
    fn test_builder_rejects_bad_cell_size() {
        for bad in [0.0, -10.0, f64::NAN] {
            let err = GridParams::builder().cell_size_meters(bad).build();
            assert_eq!(
                err,
                Err(GeoGridError::InvalidGridParameter(
                    "cell_size_meters must be > 0".into()
                ))
            );
        }

        let err = GridParams::builder()
            .cell_size_meters(f64::INFINITY)
            .build();
        assert_eq!(
            err,
            Err(GeoGridError::InvalidGridParameter(
                "cell_size_meters must be finite".into()
            ))
        );
    }

    #[test]
    fn test_display() {
        let params = GridParams::default();
        assert_eq!(
            format!("{params}"),
            "GridParams(cell=1000.000 m, fp64=false, gpu=false)"
        );

        let pretty = format!("{params:#}");
        assert!(pretty.starts_with("Density Grid Parameters"));
        assert!(pretty.contains("cell_size_meters = 1000.000 m"));
    }
}
