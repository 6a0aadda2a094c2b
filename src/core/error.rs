//! Error handling for bin stores.
//!
//! The read path (lookup, histogram construction, split routing) works on
//! precondition contracts and never returns errors. Everything that touches
//! external input (persisted buffers, configuration files, cross-store copies)
//! reports failures through [`BinError`].

use std::io;
use thiserror::Error;

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum BinError {
    /// Configuration and validation errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Persisted buffer is malformed or truncated
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Bin store used in a way its contract does not allow
    #[error("Invalid bin operation: {message}")]
    InvalidOperation { message: String },

    /// File I/O errors
    #[error("I/O error: {source}")]
    IO {
        #[from]
        source: io::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },

    /// Dimension mismatch errors
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    /// Out of bounds access
    #[error("Index out of bounds: index {index}, length {length}")]
    IndexOutOfBounds { index: usize, length: usize },
}

/// Type alias for Results using BinError
pub type Result<T> = std::result::Result<T, BinError>;

impl BinError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        BinError::Config {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        BinError::Serialization {
            message: message.into(),
        }
    }

    /// Create an invalid operation error
    pub fn invalid_operation<S: Into<String>>(message: S) -> Self {
        BinError::InvalidOperation {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        BinError::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch<E, A>(expected: E, actual: A) -> Self
    where
        E: Into<String>,
        A: Into<String>,
    {
        BinError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an index out of bounds error
    pub fn index_out_of_bounds(index: usize, length: usize) -> Self {
        BinError::IndexOutOfBounds { index, length }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            BinError::Config { .. } => "config",
            BinError::Serialization { .. } => "serialization",
            BinError::InvalidOperation { .. } => "invalid_operation",
            BinError::IO { .. } => "io",
            BinError::Json { .. } => "json",
            BinError::InvalidParameter { .. } => "invalid_parameter",
            BinError::DimensionMismatch { .. } => "dimension_mismatch",
            BinError::IndexOutOfBounds { .. } => "index_out_of_bounds",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = BinError::serialization("truncated buffer");
        assert_eq!(err.category(), "serialization");
        assert!(err.to_string().contains("truncated buffer"));

        let err = BinError::dimension_mismatch("10 rows", "12 rows");
        assert_eq!(
            err.to_string(),
            "Dimension mismatch: expected 10 rows, got 12 rows"
        );

        let err = BinError::index_out_of_bounds(7, 5);
        assert_eq!(err.category(), "index_out_of_bounds");
    }

    #[test]
    fn test_io_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: BinError = io_err.into();
        assert_eq!(err.category(), "io");
    }
}
