//! Lambert Conformal Conic projection.
//!
//! Commonly used for regional climate model output (NARCCAP, WRF).
//! It maps a cone tangent or secant to the Earth's surface onto a flat plane.
//!
//! The CF parameters are:
//! - `standard_parallel`: one (tangent) or two (secant) latitudes
//! - `longitude_of_central_meridian`
//! - `latitude_of_projection_origin`
//! - `false_easting` / `false_northing` in projected units
//!
//! Transforms use a spherical Earth.

use std::f64::consts::PI;

use crate::cf::{normalize_dlon, CfConicParameters, CfGridMapping};
use crate::error::{ProjectionError, ProjectionResult};

/// Earth radius (meters)
const EARTH_RADIUS: f64 = 6371229.0;

/// Lambert Conformal Conic projection parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CfLambertConformal {
    params: CfConicParameters,
    /// Cone constant (n)
    n: f64,
    /// F constant
    f: f64,
    /// Rho at the projection origin
    rho0: f64,
}

impl CfLambertConformal {
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
        EARTH_RADIUS * self.f / (PI / 4.0 + lat / 2.0).tan().powf(self.n)
    }
}

impl CfGridMapping for CfLambertConformal {
    const GRID_MAPPING_NAME: &'static str = "lambert_conformal_conic";
    const PROJ_NAME: &'static str = "lcc";

    fn from_conic(params: CfConicParameters) -> ProjectionResult<Self> {
        let (latin1_deg, latin2_deg) = params.parallels();
        let latin1 = latin1_deg.to_radians();
        let latin2 = latin2_deg.to_radians();
        let lat0 = params.latitude_of_projection_origin.to_radians();

        if latin1.cos().abs() < 1e-10 || latin2.cos().abs() < 1e-10 {
            return Err(ProjectionError::invalid_parameter(
                "standard_parallel",
                "a standard parallel lies on a pole",
            ));
        }

        // Compute cone constant n
        let n = if (latin1 - latin2).abs() < 1e-10 {
            // Tangent cone (single standard parallel)
            latin1.sin()
        } else {
            // Secant cone (two standard parallels)
            let ln_ratio = (latin1.cos() / latin2.cos()).ln();
            let tan_ratio =
                ((PI / 4.0 + latin2 / 2.0).tan() / (PI / 4.0 + latin1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };

        if n.abs() < 1e-10 {
            return Err(ProjectionError::invalid_parameter(
                "standard_parallel",
                "parallels symmetric about the equator give a degenerate cone",
            ));
        }

        // Compute F constant
        let f = (latin1.cos() * (PI / 4.0 + latin1 / 2.0).tan().powf(n)) / n;

        let rho0 = EARTH_RADIUS * f / (PI / 4.0 + lat0 / 2.0).tan().powf(n);

        Ok(Self { params, n, f, rho0 })
    }

    fn conic(&self) -> &CfConicParameters {
        &self.params
    }

    fn forward(&self, lon: f64, lat: f64) -> ProjectionResult<(f64, f64)> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ProjectionError::OutOfDomain { x: lon, y: lat });
        }
        let lat_rad = lat.to_radians();
        let dlon = normalize_dlon(
            lon.to_radians() - self.params.longitude_of_central_meridian.to_radians(),
        );

        // Compute rho for this latitude
        let rho = self.rho(lat_rad);

        // Compute theta (angle from central meridian)
        let theta = self.n * dlon;

        let x = rho * theta.sin() + self.params.false_easting;
        let y = self.rho0 - rho * theta.cos() + self.params.false_northing;

        Ok((x, y))
    }

    fn inverse(&self, x: f64, y: f64) -> ProjectionResult<(f64, f64)> {
        let dx = x - self.params.false_easting;
        let dy = self.rho0 - (y - self.params.false_northing);

        // Compute rho and theta from x, y
        let sign = self.n.signum();
        let rho = sign * (dx * dx + dy * dy).sqrt();
        let theta = (sign * dx).atan2(sign * dy);

        let lat = if rho.abs() < 1e-12 {
            sign * PI / 2.0
        } else {
            2.0 * ((EARTH_RADIUS * self.f / rho).powf(1.0 / self.n)).atan() - PI / 2.0
        };

        let lon = self.params.longitude_of_central_meridian.to_radians() + theta / self.n;

        Ok((normalize_dlon(lon).to_degrees(), lat.to_degrees()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cf::ProjValue;

    fn narccap() -> CfLambertConformal {
        CfLambertConformal::new(&[30.0, 60.0], -97.0, 47.5, 3325000.0, 2700000.0).unwrap()
    }

    #[test]
    fn test_origin_maps_to_false_origin() {
        let proj = narccap();
        let (x, y) = proj.forward(-97.0, 47.5).unwrap();
        assert!((x - 3325000.0).abs() < 1e-6, "x should be false easting, got {}", x);
        assert!((y - 2700000.0).abs() < 1e-6, "y should be false northing, got {}", y);
    }

    #[test]
    fn test_roundtrip() {
        let proj = narccap();
        for (lon, lat) in [(-94.5, 39.0), (-120.0, 25.0), (-70.0, 55.0)] {
            let (x, y) = proj.forward(lon, lat).unwrap();
            let (lon2, lat2) = proj.inverse(x, y).unwrap();
            assert!((lon - lon2).abs() < 1e-8, "lon roundtrip failed: {} vs {}", lon, lon2);
            assert!((lat - lat2).abs() < 1e-8, "lat roundtrip failed: {} vs {}", lat, lat2);
        }
    }

    #[test]
    fn test_tangent_cone_roundtrip() {
        let proj = CfLambertConformal::new(&[38.5], -97.5, 38.5, 0.0, 0.0).unwrap();
        let (x, y) = proj.forward(-122.719528, 21.138123).unwrap();
        let (lon, lat) = proj.inverse(x, y).unwrap();
        assert!((lon + 122.719528).abs() < 1e-8);
        assert!((lat - 21.138123).abs() < 1e-8);
    }

    #[test]
    fn test_proj_params() {
        let params = narccap().proj_params();
        assert_eq!(params["proj"], ProjValue::Text("lcc".to_string()));
        assert_eq!(params["lat_1"], ProjValue::Number(30.0));
        assert_eq!(params["lat_2"], ProjValue::Number(60.0));
        assert_eq!(params["lon_0"], ProjValue::Number(-97.0));
        assert_eq!(params["x_0"], ProjValue::Number(3325000.0));
        assert_eq!(params["no_defs"], ProjValue::Flag(true));
    }

    #[test]
    fn test_latitude_out_of_domain() {
        assert!(narccap().forward(0.0, 95.0).is_err());
    }
}
