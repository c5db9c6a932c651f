//! Error types shared by the climslice crates.

use thiserror::Error;

/// Result type alias using CommonError.
pub type CommonResult<T> = Result<T, CommonError>;

/// Errors raised by the common value types.
#[derive(Debug, Error)]
pub enum CommonError {
    #[error("Variable not found in dataset metadata: {0}")]
    VariableNotFound(String),

    #[error("Missing attribute '{attribute}' on variable '{variable}'")]
    MissingAttribute { variable: String, attribute: String },

    #[error("Attribute '{attribute}' on variable '{variable}' has an unexpected type")]
    AttributeType { variable: String, attribute: String },

    #[error("Invalid time units: {0}")]
    InvalidTimeUnits(String),

    #[error("Invalid calendar part: {0}")]
    InvalidCalendarPart(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CommonError {
    /// Create a MissingAttribute error.
    pub fn missing_attribute(variable: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            variable: variable.into(),
            attribute: attribute.into(),
        }
    }

    /// Create an AttributeType error.
    pub fn attribute_type(variable: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::AttributeType {
            variable: variable.into(),
            attribute: attribute.into(),
        }
    }
}

impl From<serde_json::Error> for CommonError {
    fn from(err: serde_json::Error) -> Self {
        CommonError::InvalidConfig(format!("JSON error: {}", err))
    }
}
