//! Error types for dimension operations.

use geo_common::CommonError;
use projection::ProjectionError;
use thiserror::Error;

/// Errors that can occur while building or querying dimensions.
#[derive(Error, Debug)]
pub enum DimensionError {
    /// Neither values nor source indices were provided, or the values are empty.
    #[error("dimension has no values and no source indices")]
    Empty,

    /// Bounds were given without values.
    #[error("bounds require values")]
    BoundsWithoutValue,

    /// Two collections that must align have different lengths.
    #[error("length mismatch for {what}: expected {expected}, found {found}")]
    LengthMismatch {
        what: String,
        expected: usize,
        found: usize,
    },

    /// A single element without bounds has no spacing.
    #[error("resolution is undefined for a single element without bounds")]
    ResolutionUndefined,

    /// A subset operation selected nothing.
    #[error("empty subset: {0}")]
    EmptySubset(String),

    /// Values are deferred and no loader is attached.
    #[error("dimension values are not loaded and no loader is attached")]
    NotLoaded,

    #[error("a loader is already attached to this dimension")]
    LoaderAlreadyAttached,

    /// Values were requested while the loader was running.
    #[error("dimension values are being loaded")]
    LoadInProgress,

    /// Longitude wrapping is not possible in the current state.
    #[error("spatial wrapping error: {0}")]
    SpatialWrapping(String),

    /// Record output needs a dimension name.
    #[error("a dimension name is required")]
    NameRequired,

    #[error("dimension has no bounds")]
    NoBounds,

    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// The grouping definition is not usable.
    #[error("invalid grouping: {0}")]
    InvalidGrouping(String),

    /// Geometry type not supported by the operation.
    #[error("unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    /// The upstream dataset failed.
    #[error("source error: {0}")]
    Source(String),

    /// Projection error.
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// Metadata, time units or configuration error.
    #[error(transparent)]
    Common(#[from] CommonError),
}

impl DimensionError {
    /// Create an EmptySubset error.
    pub fn empty_subset(msg: impl Into<String>) -> Self {
        Self::EmptySubset(msg.into())
    }

    /// Create a LengthMismatch error.
    pub fn length_mismatch(what: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::LengthMismatch {
            what: what.into(),
            expected,
            found,
        }
    }

    /// Create a SpatialWrapping error.
    pub fn spatial_wrapping(msg: impl Into<String>) -> Self {
        Self::SpatialWrapping(msg.into())
    }

    /// Create an InvalidGrouping error.
    pub fn invalid_grouping(msg: impl Into<String>) -> Self {
        Self::InvalidGrouping(msg.into())
    }

    /// Create a Source error.
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }
}

/// Result type for dimension operations.
pub type Result<T> = std::result::Result<T, DimensionError>;
