use thiserror::Error;

/// Errors raised while configuring a grid or running an aggregation engine.
#[derive(Error, Debug)]
pub enum GeoGridError {
    /// A [`crate::aggregation::GridParams`] value was rejected by its builder
    #[error("Invalid grid parameter: {0}")]
    InvalidGridParameter(String),

    /// The grid needs more cells than the engine accepts to allocate
    #[error("Grid of {columns} x {rows} cells cannot be allocated")]
    GridTooLarge { columns: u32, rows: u32 },

    /// The aggregation engine reported a backend-specific failure
    #[error("Aggregation engine failed: {0}")]
    AggregationFailed(String),
}

impl PartialEq for GeoGridError {
    fn eq(&self, other: &Self) -> bool {
        use GeoGridError::*;
        match (self, other) {
            (InvalidGridParameter(a), InvalidGridParameter(b)) => a == b,
            (
                GridTooLarge {
                    columns: c1,
                    rows: r1,
                },
                GridTooLarge {
                    columns: c2,
                    rows: r2,
                },
            ) => c1 == c2 && r1 == r2,

            // Engine messages are backend specific: same variant is enough
            (AggregationFailed(_), AggregationFailed(_)) => true,

            _ => false,
        }
    }
}
