//! Error types for chart input.
//!
//! Rendering itself never fails: empty data, degenerate domains and stale timers
//! all fall back to a defined visual or a no-op. Errors only exist where
//! untrusted input (spec files, colour strings) enters the crate.

use thiserror::Error;

/// Result alias for spec parsing and validation.
pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Error, Debug)]
pub enum ChartError {
    /// The spec text is not valid JSON/JSON5 or does not match the spec shape.
    #[error("invalid chart spec: {0}")]
    Parse(String),

    /// A data value is NaN or infinite.
    #[error("non-finite value {value} in {location}")]
    NonFinite { location: String, value: f64 },

    /// A palette entry is not a colour we can paint with.
    #[error("invalid color: {0:?}")]
    InvalidColor(String),
}

impl From<json5::Error> for ChartError {
    fn from(err: json5::Error) -> Self {
        ChartError::Parse(err.to_string())
    }
}
