//! Time handling utilities for climate data.
//!
//! Climate datasets store time as numbers relative to a reference date
//! (CF `units = "days since 1800-01-01"`). This module decodes those values
//! into calendar datetimes and extracts the calendar parts used for grouping.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::CommonError;

/// Unit of a CF time offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    fn milliseconds(&self) -> f64 {
        match self {
            TimeUnit::Seconds => 1_000.0,
            TimeUnit::Minutes => 60_000.0,
            TimeUnit::Hours => 3_600_000.0,
            TimeUnit::Days => 86_400_000.0,
        }
    }
}

impl FromStr for TimeUnit {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Ok(TimeUnit::Seconds),
            "min" | "mins" | "minute" | "minutes" => Ok(TimeUnit::Minutes),
            "h" | "hr" | "hrs" | "hour" | "hours" => Ok(TimeUnit::Hours),
            "d" | "day" | "days" => Ok(TimeUnit::Days),
            _ => Err(TimeParseError::UnknownUnit(s.to_string())),
        }
    }
}

/// Parsed CF time units: an offset unit and a reference datetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeUnits {
    pub unit: TimeUnit,
    pub reference: NaiveDateTime,
}

impl TimeUnits {
    /// Parse a CF units string such as `"hours since 1950-01-01 00:00:00"`.
    pub fn parse(s: &str) -> Result<Self, TimeParseError> {
        let lowered = s.to_lowercase();
        let (unit, reference) = lowered
            .split_once(" since ")
            .ok_or_else(|| TimeParseError::InvalidFormat(s.to_string()))?;

        Ok(Self {
            unit: unit.parse()?,
            reference: parse_datetime(reference)?,
        })
    }

    /// Decode a numeric offset into a datetime, rounded to the millisecond.
    pub fn to_datetime(&self, value: f64) -> Option<NaiveDateTime> {
        if !value.is_finite() {
            return None;
        }
        let millis = (value * self.unit.milliseconds()).round();
        if millis.abs() >= i64::MAX as f64 {
            return None;
        }
        Duration::try_milliseconds(millis as i64)
            .and_then(|offset| self.reference.checked_add_signed(offset))
    }

    /// Encode a datetime as a numeric offset in these units.
    pub fn to_numeric(&self, dt: &NaiveDateTime) -> f64 {
        let delta = *dt - self.reference;
        delta.num_milliseconds() as f64 / self.unit.milliseconds()
    }
}

impl fmt::Display for TimeUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            TimeUnit::Seconds => "seconds",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Hours => "hours",
            TimeUnit::Days => "days",
        };
        write!(f, "{} since {}", unit, self.reference.format("%Y-%m-%d %H:%M:%S"))
    }
}

/// Parse a reference datetime in the loose forms CF files use.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime, TimeParseError> {
    let trimmed = s
        .trim()
        .trim_end_matches(" utc")
        .trim_end_matches('z')
        .trim_end_matches('Z');

    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(dt);
        }
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| TimeParseError::InvalidFormat(s.to_string()))
}

/// Every `step_days` from `start` up to and including `end`.
pub fn date_range(start: NaiveDateTime, end: NaiveDateTime, step_days: i64) -> Vec<NaiveDateTime> {
    let mut dates = Vec::new();
    let step = match Duration::try_days(step_days) {
        Some(step) if step_days > 0 => step,
        _ => return dates,
    };
    let mut current = Some(start);
    while let Some(dt) = current.filter(|dt| *dt <= end) {
        dates.push(dt);
        current = dt.checked_add_signed(step);
    }
    dates
}

/// A calendar component usable as a grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarPart {
    Year,
    Month,
    Day,
}

impl FromStr for CalendarPart {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "year" => Ok(CalendarPart::Year),
            "month" => Ok(CalendarPart::Month),
            "day" => Ok(CalendarPart::Day),
            _ => Err(CommonError::InvalidCalendarPart(s.to_string())),
        }
    }
}

impl fmt::Display for CalendarPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CalendarPart::Year => "year",
            CalendarPart::Month => "month",
            CalendarPart::Day => "day",
        };
        write!(f, "{}", name)
    }
}

/// The selected calendar parts of a datetime; unselected parts are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct DateParts {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl DateParts {
    pub fn from_datetime(dt: &NaiveDateTime, parts: &[CalendarPart]) -> Self {
        let mut out = DateParts::default();
        for part in parts {
            match part {
                CalendarPart::Year => out.year = Some(dt.year()),
                CalendarPart::Month => out.month = Some(dt.month()),
                CalendarPart::Day => out.day = Some(dt.day()),
            }
        }
        out
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TimeParseError {
    #[error("Invalid time format: {0}")]
    InvalidFormat(String),

    #[error("Unknown time unit: {0}")]
    UnknownUnit(String),
}

impl From<TimeParseError> for CommonError {
    fn from(err: TimeParseError) -> Self {
        CommonError::InvalidTimeUnits(err.to_string())
    }
}
