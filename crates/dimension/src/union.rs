//! Spatial aggregation: one geometry and one weighted value from many cells.

use std::collections::BTreeMap;

use geo::{BooleanOps, Centroid, Geometry, MultiPoint, MultiPolygon, Point};
use geo_common::AnalysisConfig;
use tracing::info;

use crate::error::{DimensionError, Result};
use crate::spatial::{MaskedGrid, SpatialDimension};

/// Gridded values indexed by time, level, row and column.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueCube {
    ntime: usize,
    nlevel: usize,
    slices: Vec<MaskedGrid<f64>>,
}

impl ValueCube {
    /// A cube from data ordered time, level, row, column.
    pub fn new(ntime: usize, nlevel: usize, nrow: usize, ncol: usize, data: Vec<f64>) -> Result<Self> {
        let mask = vec![false; data.len()];
        Self::with_mask(ntime, nlevel, nrow, ncol, data, mask)
    }

    pub fn with_mask(
        ntime: usize,
        nlevel: usize,
        nrow: usize,
        ncol: usize,
        data: Vec<f64>,
        mask: Vec<bool>,
    ) -> Result<Self> {
        let cells = nrow * ncol;
        let expected = ntime * nlevel * cells;
        if data.len() != expected {
            return Err(DimensionError::length_mismatch("cube data", expected, data.len()));
        }
        if mask.len() != expected {
            return Err(DimensionError::length_mismatch("cube mask", expected, mask.len()));
        }
        let slices = data
            .chunks(cells.max(1))
            .zip(mask.chunks(cells.max(1)))
            .map(|(d, m)| MaskedGrid::with_mask(nrow, ncol, d.to_vec(), m.to_vec()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            ntime,
            nlevel,
            slices,
        })
    }

    /// `(ntime, nlevel, nrow, ncol)`
    pub fn shape(&self) -> (usize, usize, usize, usize) {
        let (nrow, ncol) = self
            .slices
            .first()
            .map(MaskedGrid::shape)
            .unwrap_or((0, 0));
        (self.ntime, self.nlevel, nrow, ncol)
    }

    pub fn slice(&self, time: usize, level: usize) -> Option<&MaskedGrid<f64>> {
        if time >= self.ntime || level >= self.nlevel {
            return None;
        }
        self.slices.get(time * self.nlevel + level)
    }
}

/// The result of unioning a spatial dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub uid: u32,
    pub geometry: Geometry<f64>,
    /// The union is one whole geometry.
    pub weight: f64,
    /// Weighted means per `[time][level]`; the fill value where nothing contributes.
    pub values: Vec<Vec<f64>>,
    /// True where `values` holds the fill value.
    pub mask: Vec<Vec<bool>>,
}

/// A vector geometry with its identifier and attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryRecord {
    pub uid: u32,
    pub geom: Geometry<f64>,
    pub properties: BTreeMap<String, serde_json::Value>,
}

/// Union the unmasked cells of `sdim` and average `values` with cell weights.
///
/// Polygons are dissolved into one multipolygon. Point-only dimensions reduce
/// to the centroid of their points.
pub fn union(
    sdim: &SpatialDimension,
    values: Option<&ValueCube>,
    config: &AnalysisConfig,
) -> Result<Aggregation> {
    let geometry = match sdim.polygon()? {
        Some(polygons) => {
            let parts: Vec<&MultiPolygon<f64>> =
                polygons.value().iter_unmasked().map(|(_, _, g)| g).collect();
            Geometry::MultiPolygon(dissolve(&parts)?)
        }
        None => {
            let points: Vec<Point<f64>> = sdim
                .point()?
                .value()
                .iter_unmasked()
                .map(|(_, _, p)| *p)
                .collect();
            let centroid = MultiPoint::new(points)
                .centroid()
                .ok_or_else(|| DimensionError::empty_subset("no unmasked points to union"))?;
            Geometry::Point(centroid)
        }
    };

    let weights = sdim.weights()?;
    let mut out_values = Vec::new();
    let mut out_mask = Vec::new();

    if let Some(cube) = values {
        let (ntime, nlevel, nrow, ncol) = cube.shape();
        if (nrow, ncol) != sdim.shape() {
            return Err(DimensionError::length_mismatch(
                "cube cells",
                weights.len(),
                nrow * ncol,
            ));
        }
        for t in 0..ntime {
            let mut level_values = Vec::with_capacity(nlevel);
            let mut level_mask = Vec::with_capacity(nlevel);
            for l in 0..nlevel {
                let mean = cube.slice(t, l).and_then(|s| s.weighted_mean(&weights));
                level_values.push(mean.unwrap_or(config.fill_value));
                level_mask.push(mean.is_none());
            }
            out_values.push(level_values);
            out_mask.push(level_mask);
        }
    }

    info!(
        cells = weights.count_unmasked(),
        slices = out_values.len(),
        "Unioned spatial dimension"
    );

    Ok(Aggregation {
        uid: 1,
        geometry,
        weight: 1.0,
        values: out_values,
        mask: out_mask,
    })
}

/// Union a collection of records.
///
/// A single record is returned unchanged. Several are dissolved into one
/// record with uid 1 and no properties.
pub fn union_records(records: &[GeometryRecord]) -> Result<GeometryRecord> {
    match records {
        [] => Err(DimensionError::empty_subset("no records to union")),
        [single] => Ok(single.clone()),
        many => {
            let geom = if many.iter().all(|r| as_points(&r.geom).is_some()) {
                let points: Vec<Point<f64>> = many
                    .iter()
                    .filter_map(|r| as_points(&r.geom))
                    .flatten()
                    .collect();
                Geometry::MultiPoint(MultiPoint::new(points))
            } else {
                let parts = many
                    .iter()
                    .map(|r| as_multipolygon(&r.geom))
                    .collect::<Result<Vec<_>>>()?;
                let refs: Vec<&MultiPolygon<f64>> = parts.iter().collect();
                Geometry::MultiPolygon(dissolve(&refs)?)
            };
            info!(records = many.len(), "Unioned geometry records");
            Ok(GeometryRecord {
                uid: 1,
                geom,
                properties: BTreeMap::new(),
            })
        }
    }
}

fn dissolve(parts: &[&MultiPolygon<f64>]) -> Result<MultiPolygon<f64>> {
    let (first, rest) = parts
        .split_first()
        .ok_or_else(|| DimensionError::empty_subset("no unmasked geometries to union"))?;
    Ok(rest
        .iter()
        .fold((*first).clone(), |acc, part| acc.union(*part)))
}

fn as_multipolygon(geom: &Geometry<f64>) -> Result<MultiPolygon<f64>> {
    match geom {
        Geometry::Polygon(p) => Ok(MultiPolygon::new(vec![p.clone()])),
        Geometry::MultiPolygon(mp) => Ok(mp.clone()),
        Geometry::Rect(r) => Ok(MultiPolygon::new(vec![r.to_polygon()])),
        _ => Err(DimensionError::UnsupportedGeometry(
            "only polygons, or only points, can be unioned".to_string(),
        )),
    }
}

fn as_points(geom: &Geometry<f64>) -> Option<Vec<Point<f64>>> {
    match geom {
        Geometry::Point(p) => Some(vec![*p]),
        Geometry::MultiPoint(mp) => Some(mp.0.clone()),
        _ => None,
    }
}
