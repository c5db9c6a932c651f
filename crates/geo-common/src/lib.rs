//! Common types and utilities shared across the climslice crates.

pub mod bbox;
pub mod config;
pub mod error;
pub mod metadata;
pub mod time;

pub use bbox::BoundingBox;
pub use config::AnalysisConfig;
pub use error::{CommonError, CommonResult};
pub use metadata::{AttrValue, DatasetMetadata, VariableMetadata};
pub use time::{date_range, CalendarPart, DateParts, TimeUnit, TimeUnits};
