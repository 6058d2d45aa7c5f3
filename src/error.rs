//! Error types for the gait kinetics library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid scalar parameter (mass, sex, sample interval, derivative order)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Too few samples or events to compute a metric
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Co-indexed series of different lengths
    #[error("Shape mismatch: {what} has {actual} samples, expected {expected}")]
    ShapeMismatch {
        /// Name of the offending series
        what: String,
        /// Length of the reference series
        expected: usize,
        /// Length actually supplied
        actual: usize,
    },

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed table content
    #[error("Parse error: {0}")]
    Parse(String),

    /// Required column absent from an input table
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl Error {
    /// Build a [`Error::ShapeMismatch`] for the named series
    pub fn shape_mismatch(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
