//! Test data generators for coordinate axes, time series and value grids.
//!
//! These generators create predictable, verifiable test data patterns
//! that can be used across the test suite.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use geo_common::date_range;

/// Creates a regular coordinate axis with contiguous cell bounds.
///
/// Returns `n` cell centers starting at `start + step / 2` and the matching
/// `(lower, upper)` bounds. A negative `step` gives a descending axis.
///
/// # Example
///
/// ```
/// use test_utils::regular_axis;
///
/// let (values, bounds) = regular_axis(0.0, 1.0, 3);
/// assert_eq!(values, vec![0.5, 1.5, 2.5]);
/// assert_eq!(bounds[2], (2.0, 3.0));
/// ```
pub fn regular_axis(start: f64, step: f64, n: usize) -> (Vec<f64>, Vec<(f64, f64)>) {
    let bounds: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let lower = start + step * i as f64;
            (lower, lower + step)
        })
        .collect();
    let values = bounds.iter().map(|&(a, b)| (a + b) / 2.0).collect();
    (values, bounds)
}

/// Midnight on the given date.
///
/// # Panics
///
/// Panics on an invalid calendar date.
pub fn datetime(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_else(|| panic!("invalid test date {}-{}-{}", year, month, day))
}

/// Every day from `start` through `end`, inclusive.
pub fn daily_dates(start: NaiveDateTime, end: NaiveDateTime) -> Vec<NaiveDateTime> {
    date_range(start, end, 1)
}

/// Daily values at noon with one-day bounds, from `start` through `end`.
///
/// Matches the usual layout of daily model output: each value sits in the
/// middle of its day.
pub fn daily_series(
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> (Vec<NaiveDateTime>, Vec<(NaiveDateTime, NaiveDateTime)>) {
    let days = daily_dates(start, end);
    let values = days
        .iter()
        .map(|d| *d + chrono::Duration::hours(12))
        .collect();
    let bounds = days
        .iter()
        .map(|d| (*d, *d + chrono::Duration::days(1)))
        .collect();
    (values, bounds)
}

/// The first day of every month from `start_year`/`start_month` for `count` months.
pub fn monthly_dates(start_year: i32, start_month: u32, count: usize) -> Vec<NaiveDateTime> {
    let mut year = start_year;
    let mut month = start_month;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        out.push(datetime(year, month, 1));
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
    out
}

/// Months of each date, for asserting grouping membership.
pub fn months_of(dates: &[NaiveDateTime]) -> Vec<u32> {
    dates.iter().map(|d| d.month()).collect()
}

/// Creates a value cube with predictable values.
///
/// Each value is `t * 1000 + l * 100 + row * 10 + col`, ordered time, level,
/// row, column.
///
/// # Example
///
/// ```
/// use test_utils::create_test_cube;
///
/// let cube = create_test_cube(2, 1, 2, 3);
/// assert_eq!(cube.len(), 12);
/// assert_eq!(cube[4], 11.0);     // t=0, l=0, row=1, col=1
/// assert_eq!(cube[6], 1000.0);   // t=1, l=0, row=0, col=0
/// ```
pub fn create_test_cube(ntime: usize, nlevel: usize, nrow: usize, ncol: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(ntime * nlevel * nrow * ncol);
    for t in 0..ntime {
        for l in 0..nlevel {
            for row in 0..nrow {
                for col in 0..ncol {
                    data.push((t * 1000 + l * 100 + row * 10 + col) as f64);
                }
            }
        }
    }
    data
}

/// Creates a constant grid.
pub fn create_constant_grid(nrow: usize, ncol: usize, value: f64) -> Vec<f64> {
    vec![value; nrow * ncol]
}
