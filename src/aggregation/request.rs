//! Aggregation request/response shapes and the end-to-end density grid pipeline.
use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};

use super::GridParams;
use crate::cell_size::{grid_offset, AngularCellOffset};
use crate::constants::Degree;
use crate::geogrid_errors::GeoGridError;
use crate::grid_alignment::{locate_cell, place_grid, GridPlacement};
use crate::point_set::{scan_points, ParsedPointSet};

/// Everything an aggregation engine needs to bin the points of one run.
///
/// This is the only object crossing into the engine. Buffers follow the layout of
/// [`ParsedPointSet`]; geometry follows [`GridPlacement`].
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationRequest {
    /// Interleaved `[lng, lat]` pairs
    pub positions: Vec<f64>,
    /// Low-order parts of `positions`, consumed when `fp64` is set
    pub positions_low: Vec<f32>,
    pub weights: Vec<f32>,
    /// `[x_offset, y_offset]` in degrees
    pub cell_size: [Degree; 2],
    pub width: Degree,
    pub height: Degree,
    /// `[columns, rows]` the engine must allocate
    pub grid_size: [u32; 2],
    /// Translation moving the grid origin to `(0, 0)`
    pub grid_transform_matrix: Matrix4<f64>,
    pub use_gpu: bool,
    pub fp64: bool,
}

impl AggregationRequest {
    /// Number of points carried by the request.
    pub fn point_count(&self) -> usize {
        self.weights.len()
    }

    /// Number of cells in the grid, or `None` if it does not fit in a `usize`.
    pub fn cell_count(&self) -> Option<usize> {
        let [columns, rows] = self.grid_size;
        (columns as usize).checked_mul(rows as usize)
    }

    /// `(column, row)` of the cell containing `(lng, lat)`, if any.
    pub fn cell_index(&self, lng: Degree, lat: Degree) -> Option<(u32, u32)> {
        locate_cell(
            &self.grid_transform_matrix,
            self.cell_size,
            self.grid_size,
            lng,
            lat,
        )
    }
}

/// Opaque buffers returned by an engine.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationResult<B> {
    /// Per-cell counts, row-major
    pub counts_buffer: B,
    /// Maximum count over all cells
    pub max_count_buffer: B,
}

/// An engine able to bin the points of an [`AggregationRequest`] into its grid.
///
/// Implementations may run on the CPU or dispatch a GPU pass; `use_gpu` is only a
/// preference. The pipeline does not look into the returned buffers.
pub trait GridAggregator {
    type Buffer;

    fn run(
        &mut self,
        request: &AggregationRequest,
    ) -> Result<AggregationResult<Self::Buffer>, GeoGridError>;
}

/// Output of [`point_to_density_grid_data`].
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGridData<B> {
    pub counts_buffer: B,
    pub max_count_buffer: B,
    /// `[columns, rows]`
    pub grid_size: [u32; 2],
    /// `[origin_x, origin_y]` in degrees
    pub grid_origin: [Degree; 2],
    pub grid_offset: AngularCellOffset,
}

impl<B> DensityGridData<B> {
    /// Geometry of the grid, without the engine buffers.
    pub fn descriptor(&self) -> GridDescriptor {
        GridDescriptor {
            grid_size: self.grid_size,
            grid_origin: self.grid_origin,
            grid_offset: self.grid_offset,
        }
    }
}

/// Geometry of a density grid.
///
/// Two backends fed with the same points and cell size must produce equal descriptors,
/// bit for bit. Serializable so that descriptors from different processes can be compared.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridDescriptor {
    pub grid_size: [u32; 2],
    pub grid_origin: [Degree; 2],
    pub grid_offset: AngularCellOffset,
}

/// Pack a scanned point set and its grid placement into an [`AggregationRequest`].
///
/// The point buffers are moved, not copied. `grid_size` is derived from the placement
/// (`⌈width / x_offset⌉ × ⌈height / y_offset⌉`).
pub fn build_aggregation_request(
    point_set: ParsedPointSet,
    placement: &GridPlacement,
    params: &GridParams,
) -> AggregationRequest {
    let ParsedPointSet {
        positions,
        positions_low,
        weights,
        ..
    } = point_set;

    AggregationRequest {
        positions,
        positions_low,
        weights,
        cell_size: placement.cell_size,
        width: placement.width,
        height: placement.height,
        grid_size: placement.grid_size(),
        grid_transform_matrix: placement.transform,
        use_gpu: params.gpu_aggregation,
        fp64: params.fp64,
    }
}

/// Run the grid pipeline on an already scanned point set.
///
/// Use this entry point together with
/// [`scan_points_weighted`](crate::point_set::scan_points_weighted) when points carry their
/// own weight.
///
/// Arguments
/// ---------
/// * `point_set`: output of the scanner, consumed.
/// * `params`: validated configuration.
/// * `aggregator`: the engine that bins the points.
///
/// Return
/// ------
/// * The engine buffers, unchanged, together with the grid size, origin and cell offset.
///   An empty or fully non-finite point set is not an error; it produces a `0 × 0` grid.
/// * Any error reported by the engine.
pub fn density_grid_from_point_set<A>(
    point_set: ParsedPointSet,
    params: &GridParams,
    aggregator: &mut A,
) -> Result<DensityGridData<A::Buffer>, GeoGridError>
where
    A: GridAggregator + ?Sized,
{
    let bounds = point_set.bounds;
    if bounds.is_empty() {
        log::warn!(
            "no finite coordinate among {} points, the grid will be empty",
            point_set.len()
        );
    }

    let offset = grid_offset(&bounds, params.cell_size_meters);
    let placement = place_grid(&bounds, &offset);

    log::debug!(
        "bounds lat [{}, {}] lng [{}, {}], cell {} m -> offset ({}, {}) deg",
        bounds.lat_min,
        bounds.lat_max,
        bounds.lng_min,
        bounds.lng_max,
        params.cell_size_meters,
        offset.x_offset,
        offset.y_offset
    );

    if placement.is_saturated() {
        log::warn!(
            "a {} x {} deg extent needs more than u32::MAX cells of ({}, {}) deg, grid size is clamped",
            placement.width,
            placement.height,
            offset.x_offset,
            offset.y_offset
        );
    }

    let request = build_aggregation_request(point_set, &placement, params);

    log::debug!(
        "grid origin {:?}, size {:?}, {} points, use_gpu={}, fp64={}",
        placement.origin,
        request.grid_size,
        request.point_count(),
        request.use_gpu,
        request.fp64
    );

    let AggregationResult {
        counts_buffer,
        max_count_buffer,
    } = aggregator.run(&request)?;

    Ok(DensityGridData {
        counts_buffer,
        max_count_buffer,
        grid_size: request.grid_size,
        grid_origin: placement.origin,
        grid_offset: offset,
    })
}

/// Aggregate `points` into a density grid of `params.cell_size_meters` cells.
///
/// Every point weighs `1.0`. See [`density_grid_from_point_set`] for the pipeline.
///
/// # Example
///
/// ```rust
/// use geogrid::aggregation::{point_to_density_grid_data, CpuGridAggregator, GridParams};
///
/// let points = vec![(0.0, 0.0), (0.01, 0.01), (-0.01, -0.01)];
/// let grid = point_to_density_grid_data(
///     &points,
///     |&(lng, lat)| [lng, lat],
///     &GridParams::default(),
///     &mut CpuGridAggregator::new(),
/// )
/// .unwrap();
///
/// assert_eq!(grid.max_count_buffer, vec![1.0]);
/// ```
pub fn point_to_density_grid_data<T, P, A>(
    points: &[T],
    get_position: P,
    params: &GridParams,
    aggregator: &mut A,
) -> Result<DensityGridData<A::Buffer>, GeoGridError>
where
    P: Fn(&T) -> [f64; 2],
    A: GridAggregator + ?Sized,
{
    density_grid_from_point_set(scan_points(points, get_position), params, aggregator)
}
