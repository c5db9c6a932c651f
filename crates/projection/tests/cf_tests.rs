//! Tests for CF grid mapping parameters and metadata loading.

use std::collections::BTreeMap;

use geo_common::{AttrValue, DatasetMetadata};
use projection::{
    load_from_metadata, CfAlbersEqualArea, CfGridMapping, CfLambertConformal, ProjValue,
    ProjectionError,
};

const NARCCAP_METADATA: &str = r#"{
    "variables": {
        "tas": {
            "dimensions": ["time", "yc", "xc"],
            "attributes": {"grid_mapping": "Lambert_Conformal", "units": "K"}
        },
        "Lambert_Conformal": {
            "attributes": {
                "grid_mapping_name": "lambert_conformal_conic",
                "standard_parallel": [30.0, 60.0],
                "longitude_of_central_meridian": -97.0,
                "latitude_of_projection_origin": 47.5,
                "false_easting": 3325000.0,
                "false_northing": 2700000.0
            }
        },
        "xc": {
            "dimensions": ["xc"],
            "attributes": {"standard_name": "projection_x_coordinate", "units": "m"}
        },
        "yc": {
            "dimensions": ["yc"],
            "attributes": {"standard_name": "projection_y_coordinate", "units": "m"}
        }
    }
}"#;

fn albers_attributes() -> BTreeMap<String, AttrValue> {
    let mut p = BTreeMap::new();
    p.insert("standard_parallel".to_string(), AttrValue::Numbers(vec![29.5, 45.5]));
    p.insert("longitude_of_central_meridian".to_string(), AttrValue::Number(-96.0));
    p.insert("latitude_of_projection_origin".to_string(), AttrValue::Number(37.5));
    p.insert("false_easting".to_string(), AttrValue::Number(0.0));
    p.insert("false_northing".to_string(), AttrValue::Number(0.0));
    p
}

fn text(s: &str) -> ProjValue {
    ProjValue::Text(s.to_string())
}

// ============================================================================
// Albers Equal Area
// ============================================================================

#[test]
fn test_albers_proj_params() {
    let crs = CfAlbersEqualArea::from_parameters(&albers_attributes()).unwrap();
    let params = crs.proj_params();

    let mut expected = BTreeMap::new();
    expected.insert("proj".to_string(), text("aea"));
    expected.insert("lat_1".to_string(), ProjValue::Number(29.5));
    expected.insert("lat_2".to_string(), ProjValue::Number(45.5));
    expected.insert("lat_0".to_string(), ProjValue::Number(37.5));
    expected.insert("lon_0".to_string(), ProjValue::Number(-96.0));
    expected.insert("x_0".to_string(), ProjValue::Number(0.0));
    expected.insert("y_0".to_string(), ProjValue::Number(0.0));
    expected.insert("ellps".to_string(), text("WGS84"));
    expected.insert("units".to_string(), text("m"));
    expected.insert("no_defs".to_string(), ProjValue::Flag(true));

    assert_eq!(params, expected);
}

#[test]
fn test_albers_empty_parameters() {
    let result = CfAlbersEqualArea::from_parameters(&BTreeMap::new());
    assert!(matches!(result, Err(ProjectionError::MissingParameter(_))));
}

#[test]
fn test_albers_misspelled_parameter() {
    let mut attrs = albers_attributes();
    attrs.remove("false_northing");
    attrs.insert("false_nothing".to_string(), AttrValue::Number(0.0));

    match CfAlbersEqualArea::from_parameters(&attrs) {
        Err(ProjectionError::MissingParameter(name)) => assert_eq!(name, "false_northing"),
        other => panic!("expected MissingParameter, got {:?}", other),
    }
}

#[test]
fn test_albers_map_parameters_values() {
    let crs = CfAlbersEqualArea::from_parameters(&albers_attributes()).unwrap();
    let values = crs.conic().map_parameters_values();
    assert_eq!(
        values["standard_parallel"],
        AttrValue::Numbers(vec![29.5, 45.5])
    );
    assert_eq!(values["units"], AttrValue::Text("m".to_string()));
}

// ============================================================================
// Lambert Conformal Conic from dataset metadata
// ============================================================================

#[test]
fn test_lambert_load_from_metadata() {
    let meta = DatasetMetadata::from_json(NARCCAP_METADATA).unwrap();
    let crs: CfLambertConformal = load_from_metadata("tas", &meta).unwrap();

    let params = crs.proj_params();
    assert_eq!(params["proj"], text("lcc"));
    assert_eq!(params["lat_1"], ProjValue::Number(30.0));
    assert_eq!(params["lat_2"], ProjValue::Number(60.0));
    assert_eq!(params["lat_0"], ProjValue::Number(47.5));
    assert_eq!(params["lon_0"], ProjValue::Number(-97.0));
    assert_eq!(params["x_0"], ProjValue::Number(3325000.0));
    assert_eq!(params["y_0"], ProjValue::Number(2700000.0));
    assert_eq!(params["units"], text("m"));

    let conic = crs.conic();
    assert_eq!(conic.projection_x_coordinate.as_deref(), Some("xc"));
    assert_eq!(conic.projection_y_coordinate.as_deref(), Some("yc"));
}

#[test]
fn test_lambert_metadata_roundtrip_transform() {
    let meta = DatasetMetadata::from_json(NARCCAP_METADATA).unwrap();
    let crs: CfLambertConformal = load_from_metadata("tas", &meta).unwrap();

    let (x, y) = crs.forward(-105.25, 40.0).unwrap();
    let (lon, lat) = crs.inverse(x, y).unwrap();
    assert!((lon + 105.25).abs() < 1e-8);
    assert!((lat - 40.0).abs() < 1e-8);
}

#[test]
fn test_wrong_grid_mapping_name() {
    let meta = DatasetMetadata::from_json(NARCCAP_METADATA).unwrap();
    let result: Result<CfAlbersEqualArea, _> = load_from_metadata("tas", &meta);
    assert!(matches!(result, Err(ProjectionError::GridMappingMismatch { .. })));
}

#[test]
fn test_variable_without_grid_mapping() {
    let meta = DatasetMetadata::from_json(NARCCAP_METADATA).unwrap();
    let result: Result<CfLambertConformal, _> = load_from_metadata("xc", &meta);
    assert!(matches!(result, Err(ProjectionError::MissingParameter(_))));
}

#[test]
fn test_unknown_variable() {
    let meta = DatasetMetadata::from_json(NARCCAP_METADATA).unwrap();
    let result: Result<CfLambertConformal, _> = load_from_metadata("pr", &meta);
    assert!(matches!(result, Err(ProjectionError::Metadata(_))));
}
