//! Coordinate types a dimension can hold and the record values they produce.

use std::collections::BTreeMap;
use std::fmt::Debug;

use chrono::NaiveDateTime;
use serde::Serialize;

const MILLISECONDS_PER_DAY: f64 = 86_400_000.0;

/// A value usable as a dimension coordinate.
pub trait Coordinate: Copy + PartialOrd + Debug + 'static {
    /// Absolute distance between two coordinates. Time distances are in days.
    fn spacing(a: Self, b: Self) -> f64;

    /// Record representation of the coordinate.
    fn to_field(self) -> FieldValue;

    /// The two ascending parts of a bound interval that crosses the
    /// longitude seam, or `None` when the interval is contiguous.
    fn seam_parts(lower: Self, upper: Self) -> Option<((Self, Self), (Self, Self))> {
        let _ = (lower, upper);
        None
    }
}

impl Coordinate for f64 {
    fn spacing(a: Self, b: Self) -> f64 {
        (b - a).abs()
    }

    fn to_field(self) -> FieldValue {
        FieldValue::Float(self)
    }

    fn seam_parts(lower: Self, upper: Self) -> Option<((Self, Self), (Self, Self))> {
        projection::wrap::seam_parts(lower, upper)
    }
}

impl Coordinate for NaiveDateTime {
    fn spacing(a: Self, b: Self) -> f64 {
        (b - a).num_milliseconds().abs() as f64 / MILLISECONDS_PER_DAY
    }

    fn to_field(self) -> FieldValue {
        FieldValue::DateTime(self)
    }
}

/// A single value in an output record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    DateTime(NaiveDateTime),
    Null,
}

/// One flat output row keyed by field name.
pub type Record = BTreeMap<String, FieldValue>;
