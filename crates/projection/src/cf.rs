//! CF-convention grid mapping parameters.
//!
//! A projected dataset names its grid mapping through the `grid_mapping`
//! attribute of a data variable. The referenced variable carries the map
//! parameters (`standard_parallel`, `longitude_of_central_meridian`, ...).
//! The conic projections supported here share one parameter set.

use std::collections::BTreeMap;

use geo_common::{AttrValue, DatasetMetadata};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProjectionError, ProjectionResult};

/// A value of a PROJ.4-style parameter map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

/// PROJ.4-style parameters (`proj`, `lat_1`, `lon_0`, ...).
pub type ProjParams = BTreeMap<String, ProjValue>;

/// Parameters shared by the CF conic grid mappings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfConicParameters {
    /// One or two standard parallels in degrees.
    pub standard_parallel: Vec<f64>,
    pub longitude_of_central_meridian: f64,
    pub latitude_of_projection_origin: f64,
    pub false_easting: f64,
    pub false_northing: f64,
    /// Projected coordinate units.
    pub units: String,
    /// Name of the dataset variable holding projected x coordinates.
    pub projection_x_coordinate: Option<String>,
    /// Name of the dataset variable holding projected y coordinates.
    pub projection_y_coordinate: Option<String>,
}

impl CfConicParameters {
    const REQUIRED: [&'static str; 5] = [
        "standard_parallel",
        "longitude_of_central_meridian",
        "latitude_of_projection_origin",
        "false_easting",
        "false_northing",
    ];

    /// Read the parameters from CF attribute values.
    ///
    /// Unrelated attributes are ignored; every required parameter must be present.
    pub fn from_parameters(params: &BTreeMap<String, AttrValue>) -> ProjectionResult<Self> {
        for name in Self::REQUIRED {
            if !params.contains_key(name) {
                return Err(ProjectionError::MissingParameter(name.to_string()));
            }
        }

        let number = |name: &str| -> ProjectionResult<f64> {
            params
                .get(name)
                .and_then(AttrValue::as_number)
                .ok_or_else(|| ProjectionError::invalid_parameter(name, "expected a number"))
        };

        let standard_parallel = params
            .get("standard_parallel")
            .and_then(AttrValue::as_numbers)
            .filter(|v| !v.is_empty() && v.len() <= 2)
            .ok_or_else(|| {
                ProjectionError::invalid_parameter("standard_parallel", "expected one or two numbers")
            })?;

        let units = match params.get("units") {
            Some(value) => value
                .as_text()
                .ok_or_else(|| ProjectionError::invalid_parameter("units", "expected text"))?
                .to_string(),
            None => "m".to_string(),
        };

        Ok(Self {
            standard_parallel,
            longitude_of_central_meridian: number("longitude_of_central_meridian")?,
            latitude_of_projection_origin: number("latitude_of_projection_origin")?,
            false_easting: number("false_easting")?,
            false_northing: number("false_northing")?,
            units,
            projection_x_coordinate: None,
            projection_y_coordinate: None,
        })
    }

    /// First and second standard parallels (equal for a tangent cone).
    pub fn parallels(&self) -> (f64, f64) {
        let first = self.standard_parallel[0];
        let second = self.standard_parallel.get(1).copied().unwrap_or(first);
        (first, second)
    }

    /// PROJ.4-style parameter map for the given `proj` name.
    pub fn proj_params(&self, proj: &str) -> ProjParams {
        let (lat_1, lat_2) = self.parallels();
        let mut out = ProjParams::new();
        out.insert("proj".to_string(), ProjValue::Text(proj.to_string()));
        out.insert("lat_1".to_string(), ProjValue::Number(lat_1));
        out.insert("lat_2".to_string(), ProjValue::Number(lat_2));
        out.insert(
            "lat_0".to_string(),
            ProjValue::Number(self.latitude_of_projection_origin),
        );
        out.insert(
            "lon_0".to_string(),
            ProjValue::Number(self.longitude_of_central_meridian),
        );
        out.insert("x_0".to_string(), ProjValue::Number(self.false_easting));
        out.insert("y_0".to_string(), ProjValue::Number(self.false_northing));
        out.insert("ellps".to_string(), ProjValue::Text("WGS84".to_string()));
        out.insert("units".to_string(), ProjValue::Text(self.units.clone()));
        out.insert("no_defs".to_string(), ProjValue::Flag(true));
        out
    }

    /// The CF-named parameter values, as read from the dataset.
    pub fn map_parameters_values(&self) -> BTreeMap<String, AttrValue> {
        let mut out = BTreeMap::new();
        out.insert(
            "standard_parallel".to_string(),
            AttrValue::Numbers(self.standard_parallel.clone()),
        );
        out.insert(
            "longitude_of_central_meridian".to_string(),
            AttrValue::Number(self.longitude_of_central_meridian),
        );
        out.insert(
            "latitude_of_projection_origin".to_string(),
            AttrValue::Number(self.latitude_of_projection_origin),
        );
        out.insert("false_easting".to_string(), AttrValue::Number(self.false_easting));
        out.insert("false_northing".to_string(), AttrValue::Number(self.false_northing));
        out.insert("units".to_string(), AttrValue::Text(self.units.clone()));
        out
    }
}

/// A CF grid mapping with forward and inverse transforms.
pub trait CfGridMapping: Sized {
    /// Value of the CF `grid_mapping_name` attribute.
    const GRID_MAPPING_NAME: &'static str;

    /// PROJ.4 `proj` identifier.
    const PROJ_NAME: &'static str;

    /// Build the mapping from its parameters.
    fn from_conic(params: CfConicParameters) -> ProjectionResult<Self>;

    fn conic(&self) -> &CfConicParameters;

    /// Geographic (lon, lat in degrees) to projected (x, y).
    fn forward(&self, lon: f64, lat: f64) -> ProjectionResult<(f64, f64)>;

    /// Projected (x, y) to geographic (lon, lat in degrees).
    fn inverse(&self, x: f64, y: f64) -> ProjectionResult<(f64, f64)>;

    /// Build the mapping from CF attribute values.
    fn from_parameters(params: &BTreeMap<String, AttrValue>) -> ProjectionResult<Self> {
        Self::from_conic(CfConicParameters::from_parameters(params)?)
    }

    fn proj_params(&self) -> ProjParams {
        self.conic().proj_params(Self::PROJ_NAME)
    }
}

/// Load a grid mapping from the metadata of the data variable `variable`.
///
/// Follows the variable's `grid_mapping` attribute, checks the mapping name,
/// and takes projected units and coordinate variable names from the variables
/// whose `standard_name` is `projection_x_coordinate` / `projection_y_coordinate`.
pub fn load_from_metadata<M: CfGridMapping>(
    variable: &str,
    meta: &DatasetMetadata,
) -> ProjectionResult<M> {
    let mapping_name = meta
        .variable(variable)?
        .attribute("grid_mapping")
        .and_then(AttrValue::as_text)
        .ok_or_else(|| ProjectionError::MissingParameter("grid_mapping".to_string()))?;

    let mapping = meta.variable(mapping_name)?;
    if let Some(found) = mapping
        .attribute("grid_mapping_name")
        .and_then(AttrValue::as_text)
    {
        if found != M::GRID_MAPPING_NAME {
            return Err(ProjectionError::GridMappingMismatch {
                expected: M::GRID_MAPPING_NAME.to_string(),
                found: found.to_string(),
            });
        }
    }

    let x_name = meta.find_by_attribute("standard_name", "projection_x_coordinate");
    let y_name = meta.find_by_attribute("standard_name", "projection_y_coordinate");

    let mut attributes = mapping.attributes.clone();
    if let Some(units) = x_name
        .and_then(|name| meta.variables.get(name))
        .and_then(|var| var.attribute("units"))
    {
        attributes.insert("units".to_string(), units.clone());
    }

    let mut params = CfConicParameters::from_parameters(&attributes)?;
    params.projection_x_coordinate = x_name.map(str::to_string);
    params.projection_y_coordinate = y_name.map(str::to_string);

    debug!(
        variable = variable,
        grid_mapping = mapping_name,
        kind = M::GRID_MAPPING_NAME,
        "Loaded grid mapping from metadata"
    );

    M::from_conic(params)
}

/// Normalize a longitude difference (radians) to [-pi, pi].
pub(crate) fn normalize_dlon(mut dlon: f64) -> f64 {
    use std::f64::consts::PI;
    while dlon > PI {
        dlon -= 2.0 * PI;
    }
    while dlon < -PI {
        dlon += 2.0 * PI;
    }
    dlon
}
