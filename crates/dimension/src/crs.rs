//! Coordinate reference systems attached to spatial dimensions.

use geo_common::{AttrValue, BoundingBox, DatasetMetadata};
use projection::wrap::{
    has_unwrapped_longitudes, unwrap_bounds, unwrap_longitude, wrap_bounds, wrap_longitude,
};
use projection::{
    load_from_metadata, CfAlbersEqualArea, CfGridMapping, CfLambertConformal, ProjParams,
    ProjValue, ProjectionError,
};
use tracing::info;

use crate::error::{DimensionError, Result};
use crate::spatial::{SpatialDimension, SpatialPointDimension, SpatialPolygonDimension};

/// Operations every coordinate system supports.
pub trait CrsOps {
    fn name(&self) -> &'static str;

    /// PROJ.4-style parameter map.
    fn parameters(&self) -> ProjParams;

    /// Move longitudes from 0..360 into -180..180.
    fn wrap(&self, sdim: &mut SpatialDimension) -> Result<()>;

    /// Move longitudes from -180..180 into 0..360.
    fn unwrap(&self, sdim: &mut SpatialDimension) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum CoordinateReferenceSystem {
    /// Geographic longitude/latitude on WGS84.
    #[default]
    Wgs84,
    AlbersEqualArea(CfAlbersEqualArea),
    LambertConformal(CfLambertConformal),
}

impl CoordinateReferenceSystem {
    /// Coordinate system of a data variable from its CF `grid_mapping`.
    ///
    /// A variable without a grid mapping is taken as WGS84.
    pub fn load_from_metadata(variable: &str, meta: &DatasetMetadata) -> Result<Self> {
        let Some(mapping) = meta
            .variable(variable)?
            .attribute("grid_mapping")
            .and_then(AttrValue::as_text)
        else {
            return Ok(CoordinateReferenceSystem::Wgs84);
        };

        let kind = meta.text(mapping, "grid_mapping_name")?;
        if kind == CfAlbersEqualArea::GRID_MAPPING_NAME {
            Ok(CoordinateReferenceSystem::AlbersEqualArea(load_from_metadata(
                variable, meta,
            )?))
        } else if kind == CfLambertConformal::GRID_MAPPING_NAME {
            Ok(CoordinateReferenceSystem::LambertConformal(load_from_metadata(
                variable, meta,
            )?))
        } else {
            Err(ProjectionError::GridMappingMismatch {
                expected: format!(
                    "{} or {}",
                    CfAlbersEqualArea::GRID_MAPPING_NAME,
                    CfLambertConformal::GRID_MAPPING_NAME
                ),
                found: kind.to_string(),
            }
            .into())
        }
    }

    pub fn is_geographic(&self) -> bool {
        matches!(self, CoordinateReferenceSystem::Wgs84)
    }

    /// Projected (x, y) to geographic (lon, lat).
    pub fn to_geographic(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        match self {
            CoordinateReferenceSystem::Wgs84 => Ok((x, y)),
            CoordinateReferenceSystem::AlbersEqualArea(p) => Ok(p.inverse(x, y)?),
            CoordinateReferenceSystem::LambertConformal(p) => Ok(p.inverse(x, y)?),
        }
    }

    /// Geographic (lon, lat) to projected (x, y).
    pub fn project(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        match self {
            CoordinateReferenceSystem::Wgs84 => Ok((lon, lat)),
            CoordinateReferenceSystem::AlbersEqualArea(p) => Ok(p.forward(lon, lat)?),
            CoordinateReferenceSystem::LambertConformal(p) => Ok(p.forward(lon, lat)?),
        }
    }

    /// Geographic extent of a projected extent, sampled along its edges.
    pub fn geographic_extent(&self, extent: &BoundingBox) -> Result<BoundingBox> {
        if self.is_geographic() {
            return Ok(*extent);
        }

        let mut samples = Vec::with_capacity(44);
        for t in 0..=10 {
            let frac = t as f64 / 10.0;
            let x = extent.min_x + frac * extent.width();
            let y = extent.min_y + frac * extent.height();
            for (px, py) in [
                (x, extent.min_y),
                (x, extent.max_y),
                (extent.min_x, y),
                (extent.max_x, y),
            ] {
                samples.push(self.to_geographic(px, py)?);
            }
        }

        BoundingBox::from_points(samples)
            .ok_or_else(|| DimensionError::empty_subset("extent has no sample points"))
    }

    fn reject_wrapping(&self) -> DimensionError {
        DimensionError::spatial_wrapping(format!(
            "{} coordinates are projected and cannot be wrapped",
            self.name()
        ))
    }
}

impl CrsOps for CoordinateReferenceSystem {
    fn name(&self) -> &'static str {
        match self {
            CoordinateReferenceSystem::Wgs84 => "WGS84",
            CoordinateReferenceSystem::AlbersEqualArea(_) => CfAlbersEqualArea::GRID_MAPPING_NAME,
            CoordinateReferenceSystem::LambertConformal(_) => CfLambertConformal::GRID_MAPPING_NAME,
        }
    }

    fn parameters(&self) -> ProjParams {
        match self {
            CoordinateReferenceSystem::Wgs84 => {
                let mut params = ProjParams::new();
                params.insert("proj".to_string(), ProjValue::Text("longlat".to_string()));
                params.insert("datum".to_string(), ProjValue::Text("WGS84".to_string()));
                params.insert("no_defs".to_string(), ProjValue::Flag(true));
                params
            }
            CoordinateReferenceSystem::AlbersEqualArea(p) => p.proj_params(),
            CoordinateReferenceSystem::LambertConformal(p) => p.proj_params(),
        }
    }

    fn wrap(&self, sdim: &mut SpatialDimension) -> Result<()> {
        if !self.is_geographic() {
            return Err(self.reject_wrapping());
        }

        let col = sdim.grid().col();
        let values = col.value()?;
        let bounds = col.bounds()?;
        let endpoints = bounds.iter().flatten().flat_map(|&(a, b)| [a, b]);
        if !has_unwrapped_longitudes(values.iter().copied().chain(endpoints)) {
            return Err(DimensionError::spatial_wrapping(
                "no longitudes greater than 180; coordinates are already wrapped",
            ));
        }

        transform_longitudes(sdim, Direction::Wrap)?;
        info!(crs = self.name(), "Wrapped longitudes to -180..180");
        Ok(())
    }

    fn unwrap(&self, sdim: &mut SpatialDimension) -> Result<()> {
        if !self.is_geographic() {
            return Err(self.reject_wrapping());
        }
        transform_longitudes(sdim, Direction::Unwrap)?;
        info!(crs = self.name(), "Unwrapped longitudes to 0..360");
        Ok(())
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Wrap,
    Unwrap,
}

impl Direction {
    fn longitude(self, x: f64) -> f64 {
        match self {
            Direction::Wrap => wrap_longitude(x),
            Direction::Unwrap => unwrap_longitude(x),
        }
    }

    fn bounds(self, (lower, upper): (f64, f64)) -> (f64, f64) {
        match self {
            Direction::Wrap => wrap_bounds(lower, upper),
            Direction::Unwrap => unwrap_bounds(lower, upper),
        }
    }
}

/// Rewrite the column values, bounds and built geometries of `sdim`.
///
/// The column is deep-copied first; `sdim` changes only when every step succeeds.
fn transform_longitudes(sdim: &mut SpatialDimension, direction: Direction) -> Result<()> {
    let col = sdim.grid().col().deep_copy()?;
    for (i, x) in col.value()?.into_iter().enumerate() {
        col.set_value(i, direction.longitude(x))?;
    }
    if let Some(bounds) = col.bounds()? {
        for (i, cell) in bounds.into_iter().enumerate() {
            col.set_bounds_at(i, direction.bounds(cell))?;
        }
    }

    let (point, polygon) = sdim.built_geometries();
    let point: Option<SpatialPointDimension> = point.map(|p| match direction {
        Direction::Wrap => p.wrap(),
        Direction::Unwrap => p.unwrap(),
    });
    let polygon: Option<Option<SpatialPolygonDimension>> = match polygon {
        Some(Some(p)) => Some(Some(match direction {
            Direction::Wrap => p.wrap()?,
            Direction::Unwrap => p.unwrap()?,
        })),
        Some(None) => Some(None),
        None => None,
    };

    sdim.replace_columns(col, point, polygon)
}
