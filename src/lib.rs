//! # geogrid
//!
//! Metric, degree-aligned density grids over geographic points.
//!
//! The crate turns a point collection and a cell size in meters into the description of an
//! equirectangular grid (origin, cell size in degrees, number of cells, placement
//! transform) plus flat position/weight buffers, and hands them to an aggregation engine
//! that counts points per cell.
//!
//! Cell boundaries only depend on the data and the cell size, so a CPU engine and a GPU
//! engine fed with the same input produce the same grid, bit for bit.
//!
//! ## Modules
//!
//! * [`point_set`] – single-pass scan into position buffers and bounding box.
//! * [`cell_size`] – meters → degrees at a given latitude.
//! * [`grid_alignment`] – origin alignment, grid extent and placement transform.
//! * [`aggregation`] – request assembly, engine seam, reference CPU engine, configuration.
//! * [`geogrid_errors`] – error type.
pub mod aggregation;
pub mod cell_size;
pub mod constants;
pub mod geogrid_errors;
pub mod grid_alignment;
pub mod point_set;
