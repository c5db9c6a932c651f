//! Coordinate reference system support.
//!
//! - CF-convention grid mappings (Albers Equal Area, Lambert Conformal Conic):
//!   named parameters, PROJ.4-style parameter maps and spherical transforms.
//! - Longitude convention handling for geographic data: wrapping between
//!   0..360 and -180..180, including geometries that straddle the seam.

pub mod albers;
pub mod cf;
pub mod error;
pub mod lambert;
pub mod wrap;

pub use albers::CfAlbersEqualArea;
pub use cf::{load_from_metadata, CfGridMapping, ProjParams, ProjValue};
pub use error::{ProjectionError, ProjectionResult};
pub use lambert::CfLambertConformal;
