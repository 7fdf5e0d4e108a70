//! Typed failures surfaced by the simulation core.

use thiserror::Error;

use crate::StreamerId;

/// Failures returned to callers of the simulation.
///
/// Population transfers never fail: they clamp. Only requests that name
/// something that does not exist are rejected.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SimulationError {
    /// A coordinate lies outside the grid.
    #[error("cell ({column}, {row}) lies outside the {width}x{height} grid")]
    OutOfBounds {
        /// Requested column.
        column: i64,
        /// Requested row.
        row: i64,
        /// Grid width in cells.
        width: u32,
        /// Grid height in cells.
        height: u32,
    },
    /// A flat cell index exceeds the grid.
    #[error("cell index {index} exceeds grid of {len} cells")]
    IndexOutOfRange {
        /// Requested index.
        index: u32,
        /// Number of cells in the grid.
        len: usize,
    },
    /// A noise field does not hold one sample per cell.
    #[error("noise field of {width}x{height} expects {expected} samples, got {actual}")]
    NoiseDimensionMismatch {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
        /// Number of samples required.
        expected: usize,
        /// Number of samples supplied.
        actual: usize,
    },
    /// A release was requested for a streamer that is not waiting for one.
    #[error("streamer {} is not awaiting release", streamer.get())]
    StreamerNotAwaitingRelease {
        /// Streamer named by the request.
        streamer: StreamerId,
    },
    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Reasons a [`crate::SimulationConfig`] is rejected.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A value that must be strictly positive is not.
    #[error("{field} must be finite and positive, got {value}")]
    NotPositive {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Supplied value.
        value: f64,
    },
    /// A rate or constant is negative.
    #[error("{field} must be finite and non-negative, got {value}")]
    Negative {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Supplied value.
        value: f64,
    },
    /// A probability or fraction lies outside the unit interval.
    #[error("{field} must lie within [0, 1], got {value}")]
    OutsideUnitInterval {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Supplied value.
        value: f64,
    },
    /// The seed threshold leaves no noise range to scale population over.
    #[error("seed threshold must be below 1, got {value}")]
    SeedThresholdTooHigh {
        /// Supplied threshold.
        value: f64,
    },
    /// The center threshold is looser than the seed threshold.
    #[error("center threshold {center} must not be below seed threshold {seed}")]
    ThresholdOrder {
        /// Seed threshold.
        seed: f64,
        /// Center threshold.
        center: f64,
    },
    /// A time span cannot be represented as a duration.
    #[error("{field} of {value} seconds does not fit a duration")]
    NotADuration {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Supplied value.
        value: f64,
    },
    /// A count exceeds the largest supported value.
    #[error("{field} must not exceed {max}, got {value}")]
    TooLarge {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Supplied value.
        value: usize,
        /// Largest accepted value.
        max: usize,
    },
    /// A count that must be at least one is zero.
    #[error("{field} must be at least one")]
    Zero {
        /// Dotted path of the offending field.
        field: &'static str,
    },
}
