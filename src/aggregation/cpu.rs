//! Reference CPU aggregation engine.
//!
//! Bins every position of an [`AggregationRequest`] into the grid it describes and sums the
//! point weights per cell. It is the parity reference for GPU engines: both only rely on the
//! request's transform and cell size, so they agree on every cell boundary.
use itertools::Itertools;

use super::request::{AggregationRequest, AggregationResult, GridAggregator};
use crate::geogrid_errors::GeoGridError;

/// Single-threaded aggregation over a flat row-major `Vec<f32>`.
///
/// * `counts_buffer[row * columns + column]` holds the summed weight of the cell.
/// * `max_count_buffer` holds one value, the largest cell total (0 for an empty grid).
///
/// Positions outside the grid, including non-finite ones, are skipped.
#[derive(Debug, Clone, Copy)]
pub struct CpuGridAggregator {
    max_cells: usize,
}

/// Upper bound on the number of cells allocated by default (1 GiB of `f32` counts)
pub const DEFAULT_MAX_CELLS: usize = 1 << 28;

impl CpuGridAggregator {
    pub fn new() -> Self {
        Self::with_max_cells(DEFAULT_MAX_CELLS)
    }

    /// Engine refusing grids of more than `max_cells` cells with
    /// [`GeoGridError::GridTooLarge`].
    pub fn with_max_cells(max_cells: usize) -> Self {
        CpuGridAggregator { max_cells }
    }
}

impl Default for CpuGridAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl GridAggregator for CpuGridAggregator {
    type Buffer = Vec<f32>;

    fn run(
        &mut self,
        request: &AggregationRequest,
    ) -> Result<AggregationResult<Vec<f32>>, GeoGridError> {
        let [columns, rows] = request.grid_size;
        let cell_count = request
            .cell_count()
            .filter(|&n| n <= self.max_cells)
            .ok_or(GeoGridError::GridTooLarge { columns, rows })?;

        if request.use_gpu {
            log::debug!("GPU aggregation requested, running on the CPU instead");
        }

        let mut counts = vec![0.0_f32; cell_count];
        let mut skipped = 0_usize;

        for ((&lng, &lat), &weight) in request
            .positions
            .iter()
            .tuples::<(_, _)>()
            .zip(request.weights.iter())
        {
            match request.cell_index(lng, lat) {
                Some((column, row)) => {
                    counts[row as usize * columns as usize + column as usize] += weight;
                }
                None => skipped += 1,
            }
        }

        let max_count = counts.iter().copied().fold(0.0_f32, f32::max);

        log::trace!(
            "CPU aggregation: {columns} x {rows} cells, {} points, {skipped} outside the grid, max {max_count}",
            request.point_count()
        );

        Ok(AggregationResult {
            counts_buffer: counts,
            max_count_buffer: vec![max_count],
        })
    }
}

#[cfg(test)]
mod cpu_aggregator_tests {
    use super::*;
    use crate::aggregation::{build_aggregation_request, GridParams};
    use crate::cell_size::AngularCellOffset;
    use crate::grid_alignment::place_grid;
    use crate::point_set::{scan_points, scan_points_weighted};

    fn request_for(points: &[[f64; 2]]) -> AggregationRequest {
        let point_set = scan_points(points, |p| *p);
        let offset = AngularCellOffset {
            x_offset: 0.5,
            y_offset: 0.5,
        };
        let placement = place_grid(&point_set.bounds, &offset);
        build_aggregation_request(point_set, &placement, &GridParams::default())
    }

    #[test]
    fn test_counts_per_cell() {
        let points = [[0.1, 0.1], [0.2, 0.3], [0.6, 0.1], [1.1, 0.9], [0.15, 0.4]];
        let request = request_for(&points);
        assert_eq!(request.grid_size, [3, 3]);

        let result = CpuGridAggregator::new().run(&request).unwrap();

        #[rustfmt::skip]
        let expected = vec![
            3.0, 1.0, 0.0,
            0.0, 0.0, 1.0,
            0.0, 0.0, 0.0,
        ];
        assert_eq!(result.counts_buffer, expected);
        assert_eq!(result.max_count_buffer, vec![3.0]);
    }

    #[test]
    fn test_non_finite_points_are_skipped() {
        let points = [[0.1, 0.1], [f64::NAN, 0.2], [0.3, f64::NEG_INFINITY], [0.9, 0.9]];
        let request = request_for(&points);
        let result = CpuGridAggregator::new().run(&request).unwrap();

        assert_eq!(result.counts_buffer.iter().sum::<f32>(), 2.0);
        assert_eq!(result.max_count_buffer, vec![1.0]);
    }

    #[test]
    fn test_empty_request() {
        let request = request_for(&[]);
        let result = CpuGridAggregator::new().run(&request).unwrap();

        assert!(result.counts_buffer.is_empty());
        assert_eq!(result.max_count_buffer, vec![0.0]);
    }

    #[test]
    fn test_weights_are_summed() {
        let points = [([0.1, 0.1], 2.0_f32), ([0.2, 0.2], 0.5_f32)];
        let point_set = scan_points_weighted(&points, |p| p.0, |p| p.1);
        let placement = place_grid(
            &point_set.bounds,
            &AngularCellOffset {
                x_offset: 1.0,
                y_offset: 1.0,
            },
        );
        let request = build_aggregation_request(point_set, &placement, &GridParams::default());

        assert_eq!(request.grid_size, [2, 2]);

        let result = CpuGridAggregator::new().run(&request).unwrap();
        assert_eq!(result.counts_buffer, vec![2.5, 0.0, 0.0, 0.0]);
        assert_eq!(result.max_count_buffer, vec![2.5]);
    }

    #[test]
    fn test_grid_too_large() {
        let request = request_for(&[[0.1, 0.1], [0.9, 0.9]]);
        assert_eq!(request.grid_size, [3, 3]);

        assert_eq!(
            CpuGridAggregator::with_max_cells(8).run(&request),
            Err(GeoGridError::GridTooLarge {
                columns: 3,
                rows: 3
            })
        );
        assert!(CpuGridAggregator::with_max_cells(9).run(&request).is_ok());
    }

    #[test]
    fn test_clamped_grid_is_refused() {
        let point_set = scan_points(&[[-20.0, -30.0], [50.0, 30.0]], |p| *p);
        let offset = AngularCellOffset {
            x_offset: 1e-9,
            y_offset: 1e-3,
        };
        let placement = place_grid(&point_set.bounds, &offset);
        assert!(placement.is_saturated());

        let request = build_aggregation_request(point_set, &placement, &GridParams::default());
        assert!(matches!(
            CpuGridAggregator::new().run(&request),
            Err(GeoGridError::GridTooLarge {
                columns: u32::MAX,
                ..
            })
        ));
    }
}
