//! Albers Equal Area conic projection.
//!
//! Used for continental climate grids (CONUS downscaled products). Areas
//! are preserved, so it is the mapping of choice for area-weighted work.
//! Transforms follow the spherical formulas (Snyder 1987, p. 100).

use crate::cf::{normalize_dlon, CfConicParameters, CfGridMapping};
use crate::error::{ProjectionError, ProjectionResult};

/// Earth radius (meters)
const EARTH_RADIUS: f64 = 6371229.0;

/// Albers Equal Area projection parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CfAlbersEqualArea {
    params: CfConicParameters,
    /// Cone constant (n)
    n: f64,
    /// C constant
    c: f64,
    /// Rho at the projection origin
    rho0: f64,
}

impl CfAlbersEqualArea {
    /// Create the projection from explicit CF parameters (degrees / meters).
    pub fn new(
        standard_parallel: &[f64],
        longitude_of_central_meridian: f64,
        latitude_of_projection_origin: f64,
        false_easting: f64,
        false_northing: f64,
    ) -> ProjectionResult<Self> {
        Self::from_conic(CfConicParameters {
            standard_parallel: standard_parallel.to_vec(),
            longitude_of_central_meridian,
            latitude_of_projection_origin,
            false_easting,
            false_northing,
            units: "m".to_string(),
            projection_x_coordinate: None,
            projection_y_coordinate: None,
        })
    }

    fn rho(&self, lat: f64) -> f64 {
        EARTH_RADIUS * (self.c - 2.0 * self.n * lat.sin()).max(0.0).sqrt() / self.n
    }
}

impl CfGridMapping for CfAlbersEqualArea {
    const GRID_MAPPING_NAME: &'static str = "albers_conical_equal_area";
    const PROJ_NAME: &'static str = "aea";

    fn from_conic(params: CfConicParameters) -> ProjectionResult<Self> {
        let (lat1_deg, lat2_deg) = params.parallels();
        let lat1 = lat1_deg.to_radians();
        let lat2 = lat2_deg.to_radians();
        let lat0 = params.latitude_of_projection_origin.to_radians();

        let n = (lat1.sin() + lat2.sin()) / 2.0;
        if n.abs() < 1e-10 {
            return Err(ProjectionError::invalid_parameter(
                "standard_parallel",
                "parallels symmetric about the equator give a degenerate cone",
            ));
        }

        let c = lat1.cos().powi(2) + 2.0 * n * lat1.sin();
        let rho0 = EARTH_RADIUS * (c - 2.0 * n * lat0.sin()).max(0.0).sqrt() / n;

        Ok(Self { params, n, c, rho0 })
    }

    fn conic(&self) -> &CfConicParameters {
        &self.params
    }

    fn forward(&self, lon: f64, lat: f64) -> ProjectionResult<(f64, f64)> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ProjectionError::OutOfDomain { x: lon, y: lat });
        }
        let dlon = normalize_dlon(
            lon.to_radians() - self.params.longitude_of_central_meridian.to_radians(),
        );

        let rho = self.rho(lat.to_radians());
        let theta = self.n * dlon;

        let x = rho * theta.sin() + self.params.false_easting;
        let y = self.rho0 - rho * theta.cos() + self.params.false_northing;

        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> ProjectionResult<(f64, f64)> {
        let dx = x - self.params.false_easting;
        let dy = self.rho0 - (y - self.params.false_northing);

        let sign = self.n.signum();
        let rho = (dx * dx + dy * dy).sqrt();
        let theta = (sign * dx).atan2(sign * dy);

        let sin_lat = (self.c - (rho * self.n / EARTH_RADIUS).powi(2)) / (2.0 * self.n);
        if sin_lat.abs() > 1.0 + 1e-10 {
            return Err(ProjectionError::OutOfDomain { x, y });
        }
        let lat = sin_lat.clamp(-1.0, 1.0).asin();
        let lon = self.params.longitude_of_central_meridian.to_radians() + theta / self.n;

        Ok((normalize_dlon(lon).to_degrees(), lat.to_degrees()))
    }
}
