//! Error types for projection operations.

use geo_common::CommonError;
use thiserror::Error;

/// Result type for projection operations.
pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Error types for projection handling.
#[derive(Error, Debug)]
pub enum ProjectionError {
    /// A required CF parameter is absent.
    #[error("Missing projection parameter: {0}")]
    MissingParameter(String),

    /// A parameter is present but unusable.
    #[error("Invalid projection parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    /// The variable's grid mapping is not the one requested.
    #[error("Grid mapping mismatch: expected '{expected}', found '{found}'")]
    GridMappingMismatch { expected: String, found: String },

    /// The point cannot be represented in the target system.
    #[error("Point outside projection domain: ({x}, {y})")]
    OutOfDomain { x: f64, y: f64 },

    /// Metadata lookup failed.
    #[error(transparent)]
    Metadata(#[from] CommonError),
}

impl ProjectionError {
    /// Create an InvalidParameter error.
    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }
}
