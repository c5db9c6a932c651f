//! Shared test utilities for the climslice workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Coordinate axis and time series generators
//! - Common geometry and metadata fixtures
//! - Approximate equality macros
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, fixtures, regular_axis};
//! ```

use std::sync::Once;

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

static TRACING: Once = Once::new();

/// Install a test tracing subscriber once per process.
///
/// Filtering follows `RUST_LOG`; output goes through the test harness writer
/// so it only shows for failing tests.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Assert two floats differ by at most `tolerance` (default `1e-9`).
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(weight_sum, 8.0);
/// assert_approx_eq!(lon, -178.5, 1e-6);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($actual:expr, $expected:expr) => {
        $crate::assert_approx_eq!($actual, $expected, 1e-9)
    };
    ($actual:expr, $expected:expr, $tolerance:expr) => {{
        let (actual, expected, tolerance): (f64, f64, f64) =
            ($actual as f64, $expected as f64, $tolerance as f64);
        assert!(
            (actual - expected).abs() <= tolerance,
            "{} = {} is not within {} of {}",
            stringify!($actual),
            actual,
            tolerance,
            expected
        );
    }};
}

/// Assert an `(x, y)` pair matches another within `tolerance`.
///
/// ```ignore
/// use test_utils::assert_coords_approx_eq;
///
/// assert_coords_approx_eq!((p.x(), p.y()), (-178.5, 40.0), 1e-12);
/// ```
#[macro_export]
macro_rules! assert_coords_approx_eq {
    (($x:expr, $y:expr), ($ex:expr, $ey:expr), $tolerance:expr) => {{
        $crate::assert_approx_eq!($x, $ex, $tolerance);
        $crate::assert_approx_eq!($y, $ey, $tolerance);
    }};
}
