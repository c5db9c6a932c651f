//! End-to-end tests from a dataset source through subsetting and grouping.

use std::rc::Rc;

use chrono::NaiveDateTime;
use dimension::{
    lazy_dimension, CoordinateReferenceSystem, CrsOps, DatasetSource, Grouping, InMemoryDataset,
    SpatialDimension, TemporalDimension, VectorDimension,
};
use geo_common::{AnalysisConfig, DatasetMetadata};
use test_utils::{datetime, init_tracing, regular_axis, GEOGRAPHIC_METADATA};

fn dataset() -> anyhow::Result<Rc<InMemoryDataset>> {
    let meta = DatasetMetadata::from_json(GEOGRAPHIC_METADATA)?;
    let (lat, lat_bnds) = regular_axis(30.0, 10.0, 3);
    let (lon, lon_bnds) = regular_axis(170.0, 5.0, 4);
    // Daily values at noon over 2001
    let time: Vec<f64> = (0..365).map(|d| 18_628.5 + d as f64).collect();

    Ok(Rc::new(
        InMemoryDataset::new(meta)
            .with_variable("lat", lat)
            .with_bounds("lat", lat_bnds)
            .with_variable("lon", lon)
            .with_bounds("lon", lon_bnds)
            .with_variable("time", time),
    ))
}

#[test]
fn test_lazy_spatial_dimension_wraps() -> anyhow::Result<()> {
    init_tracing();
    let source = dataset()?;
    let lat: VectorDimension<f64> = lazy_dimension(Rc::clone(&source), "lat")?;
    let lon: VectorDimension<f64> = lazy_dimension(Rc::clone(&source), "lon")?;
    assert_eq!(lon.units(), Some("degrees_east"));
    assert!(!lon.is_loaded());

    let mut sdim = SpatialDimension::from_dimensions(lat, lon, CoordinateReferenceSystem::Wgs84)?;
    let crs = sdim.crs().clone();
    crs.wrap(&mut sdim)?;

    assert_eq!(
        sdim.grid().col().value()?,
        vec![172.5, 177.5, -177.5, -172.5]
    );
    // The cell on the seam's east side came from 180..185
    assert_eq!(sdim.grid().col().bounds_at(2)?, (-180.0, -175.0));
    Ok(())
}

#[test]
fn test_lazy_time_dimension_groups_by_month() -> anyhow::Result<()> {
    let source = dataset()?;
    assert_eq!(source.dimension_len("time")?, 365);

    let time: VectorDimension<NaiveDateTime> = lazy_dimension(source, "time")?;
    let tdim = TemporalDimension::new(time);
    assert_eq!(tdim.value()?[0], datetime(2001, 1, 1) + chrono::Duration::hours(12));

    let grouped = tdim.get_grouping(&Grouping::from_json(r#"["month"]"#)?, &AnalysisConfig::default())?;
    assert_eq!(grouped.len(), 12);
    assert_eq!(grouped.value()?[1], datetime(2001, 2, 16));
    Ok(())
}
