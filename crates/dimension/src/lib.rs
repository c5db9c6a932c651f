//! Dimensional Data Model for Gridded Climate Data
//!
//! This crate describes the axes of a climate dataset (time, level, row and
//! column) and the operations run over them before any variable data is
//! touched. It enables:
//!
//! - **Deferred reads**: coordinate values load from the dataset on first access
//! - **Shared views**: slices share one store, so uids stay stable through subsets
//! - **Spatial selection**: intersect or clip a grid with a polygon, with cell weights
//! - **Temporal grouping**: calendar parts or seasons, with representative dates
//!
//! # Architecture
//!
//! ```text
//! DatasetSource (metadata + 1D variables)
//!      │
//!      ├─► lazy_dimension() ──► VectorDimension<T>
//!      │                             │
//!      │                             ├─► TemporalDimension
//!      │                             │        │
//!      │                             │        ├─► get_between / get_time_region
//!      │                             │        └─► get_grouping ──► TemporalGroupDimension
//!      │                             │
//!      │                             └─► SpatialGridDimension (row × col)
//!      │                                      │
//!      └─► CoordinateReferenceSystem ─────────┤
//!                                             ▼
//!                                      SpatialDimension
//!                                             │
//!                                             ├─► point() / polygon()
//!                                             ├─► get_intersects / get_clip
//!                                             ├─► wrap / unwrap (WGS84 only)
//!                                             └─► union ──► Aggregation
//! ```
//!
//! # Example
//!
//! ```ignore
//! use dimension::{SpatialDimension, VectorDimension, CoordinateReferenceSystem};
//!
//! let row = VectorDimension::builder().name("lat").values(lats).bounds(lat_bnds).build()?;
//! let col = VectorDimension::builder().name("lon").values(lons).bounds(lon_bnds).build()?;
//! let sdim = SpatialDimension::from_dimensions(row, col, CoordinateReferenceSystem::Wgs84)?;
//!
//! let clipped = sdim.get_clip(&selection)?;
//! let aggregated = dimension::union(&clipped, Some(&cube), &config)?;
//! ```

pub mod coordinate;
pub mod crs;
pub mod error;
pub mod source;
pub mod spatial;
pub mod temporal;
pub mod union;
pub mod vector;

// Re-export commonly used types at crate root
pub use coordinate::{Coordinate, FieldValue, Record};
pub use crs::{CoordinateReferenceSystem, CrsOps};
pub use error::{DimensionError, Result};
pub use source::{lazy_dimension, DatasetSource, InMemoryDataset, SourceLoader};
pub use spatial::{
    GridCoordinates, MaskedGrid, SpatialDimension, SpatialGridDimension, SpatialPointDimension,
    SpatialPolygonDimension, SpatialSubset,
};
pub use temporal::{
    GroupKey, Grouping, GroupingItem, TemporalDimension, TemporalGroupDimension, TimeRegion,
};
pub use union::{union, union_records, Aggregation, GeometryRecord, ValueCube};
pub use vector::{DimensionLoader, Loaded, VectorDimension, VectorDimensionBuilder};
