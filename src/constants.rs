//! # Constants and type definitions for geogrid
//!
//! This module centralizes the **geophysical constants**, **coordinate shifts**, and **type
//! aliases** shared by the grid pipeline.
//!
//! ## Overview
//!
//! - Mean spherical Earth radius used to turn meters into degrees
//! - Degree ↔ radian conversion
//! - Shifts that move latitude/longitude into a non-negative domain before alignment
//! - Unit aliases used in signatures across the crate

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// Mean Earth radius in meters (spherical model).
///
/// Every aggregation backend must use this exact value, otherwise the cell sizes in degrees
/// (and therefore the cell boundaries) drift apart.
pub const R_EARTH: Meter = 6_378_000.0;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Radians → degrees
pub const DEGRAD: f64 = 180.0 / std::f64::consts::PI;

/// Shift applied to latitudes so that the whole `[-90, 90]` range becomes non-negative
pub const LAT_SHIFT: Degree = 90.0;

/// Shift applied to longitudes so that the whole `[-180, 180]` range becomes non-negative
pub const LNG_SHIFT: Degree = 180.0;

/// Cell size used when none is configured (1 km)
pub const DEFAULT_CELL_SIZE_METERS: Meter = 1000.0;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in meters
pub type Meter = f64;
