//! Spatial dimensions: a grid, its cell geometries and a coordinate system.
//!
//! Point and polygon geometries are derived from the grid on first use.
//! Subsetting with `get_intersects` / `get_clip` produces a new dimension
//! whose geometries and weights are carried explicitly.

pub mod geometry;
pub mod grid;
pub mod masked;

use std::cell::OnceCell;

use geo::Polygon;
use geo_common::BoundingBox;
use tracing::debug;

use crate::crs::CoordinateReferenceSystem;
use crate::error::{DimensionError, Result};
use crate::vector::VectorDimension;

pub use geometry::{SpatialPointDimension, SpatialPolygonDimension};
pub use grid::{GridCoordinates, SpatialGridDimension, SpatialSubset};
pub use masked::MaskedGrid;

/// How a polygon subset treats cell geometries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpatialOperation {
    Intersects,
    Clip,
}

/// A gridded spatial dimension with lazily derived geometries.
#[derive(Debug, Clone)]
pub struct SpatialDimension {
    grid: SpatialGridDimension,
    crs: CoordinateReferenceSystem,
    point: OnceCell<SpatialPointDimension>,
    polygon: OnceCell<Option<SpatialPolygonDimension>>,
}

impl SpatialDimension {
    /// Columns of a geographic grid are treated as longitudes.
    pub fn new(mut grid: SpatialGridDimension, crs: CoordinateReferenceSystem) -> Self {
        if crs.is_geographic() {
            grid.mark_longitude();
        }
        Self {
            grid,
            crs,
            point: OnceCell::new(),
            polygon: OnceCell::new(),
        }
    }

    /// Build from row and column dimensions.
    pub fn from_dimensions(
        row: VectorDimension<f64>,
        col: VectorDimension<f64>,
        crs: CoordinateReferenceSystem,
    ) -> Result<Self> {
        Ok(Self::new(SpatialGridDimension::new(row, col)?, crs))
    }

    pub fn grid(&self) -> &SpatialGridDimension {
        &self.grid
    }

    pub fn crs(&self) -> &CoordinateReferenceSystem {
        &self.crs
    }

    pub fn shape(&self) -> (usize, usize) {
        self.grid.shape()
    }

    /// Cell center points.
    pub fn point(&self) -> Result<&SpatialPointDimension> {
        if let Some(point) = self.point.get() {
            return Ok(point);
        }
        let built = SpatialPointDimension::from_grid(&self.grid)?;
        Ok(self.point.get_or_init(|| built))
    }

    /// Cell polygons, or `None` when the grid has no bounds.
    pub fn polygon(&self) -> Result<Option<&SpatialPolygonDimension>> {
        if let Some(polygon) = self.polygon.get() {
            return Ok(polygon.as_ref());
        }
        let built = match self.grid.bounds()? {
            Some(_) => Some(SpatialPolygonDimension::from_grid(&self.grid)?),
            None => None,
        };
        Ok(self.polygon.get_or_init(|| built).as_ref())
    }

    /// Cell weights: polygon coverage fractions, or 1.0 for point-only grids.
    pub fn weights(&self) -> Result<MaskedGrid<f64>> {
        match self.polygon()? {
            Some(polygon) => Ok(polygon.weights().clone()),
            None => {
                let (nrow, ncol) = self.shape();
                MaskedGrid::with_mask(nrow, ncol, vec![1.0; nrow * ncol], self.grid.mask().to_vec())
            }
        }
    }

    /// Cells touching `polygon`, geometries kept whole.
    pub fn get_intersects(&self, polygon: &Polygon<f64>) -> Result<Self> {
        self.subset_by_polygon(polygon, SpatialOperation::Intersects)
    }

    /// Cells overlapping `polygon`, geometries cut to it.
    ///
    /// Same shape as [`get_intersects`](Self::get_intersects), but cells that
    /// only touch the polygon's boundary are masked.
    pub fn get_clip(&self, polygon: &Polygon<f64>) -> Result<Self> {
        self.subset_by_polygon(polygon, SpatialOperation::Clip)
    }

    fn subset_by_polygon(&self, polygon: &Polygon<f64>, op: SpatialOperation) -> Result<Self> {
        let selector = SpatialSubset::Polygon(polygon.clone());
        let (rows, cols) = self.grid.subset_indices(&selector)?;
        let mut grid = self.grid.select(&rows, &cols)?;

        let mut point = self.point()?.select(&rows, &cols)?;
        let polygon_dim = match self.polygon()? {
            Some(cells) => {
                let mut cells = cells.select(&rows, &cols)?;
                let mask = match op {
                    SpatialOperation::Intersects => cells.intersects(polygon)?,
                    SpatialOperation::Clip => cells.clip(polygon)?,
                };
                grid.apply_mask(&mask)?;
                Some(cells)
            }
            None => {
                let mask = point.intersects(polygon)?;
                grid.apply_mask(&mask)?;
                None
            }
        };

        // Points follow the final grid mask
        let mut masked_points = point.value().clone();
        masked_points.apply_mask(grid.mask())?;
        point = SpatialPointDimension::new(masked_points);

        let kept = grid.uid().count_unmasked();
        if kept == 0 {
            return Err(DimensionError::empty_subset(
                "no cells intersect the selection polygon",
            ));
        }
        debug!(
            operation = ?op,
            shape = ?grid.shape(),
            cells = kept,
            "Spatial subset by polygon"
        );

        Ok(Self {
            grid,
            crs: self.crs.clone(),
            point: OnceCell::from(point),
            polygon: OnceCell::from(polygon_dim),
        })
    }

    /// Grid extent in geographic coordinates.
    pub fn geographic_extent(&self) -> Result<BoundingBox> {
        let extent = self.grid.extent()?;
        self.crs.geographic_extent(&extent)
    }

    /// Geometries already built, without deriving missing ones.
    pub(crate) fn built_geometries(
        &self,
    ) -> (Option<&SpatialPointDimension>, Option<&Option<SpatialPolygonDimension>>) {
        (self.point.get(), self.polygon.get())
    }

    /// Swap in a transformed column dimension and matching geometries.
    pub(crate) fn replace_columns(
        &mut self,
        col: VectorDimension<f64>,
        point: Option<SpatialPointDimension>,
        polygon: Option<Option<SpatialPolygonDimension>>,
    ) -> Result<()> {
        self.grid.replace_col(col)?;
        self.point = point.map(OnceCell::from).unwrap_or_default();
        self.polygon = polygon.map(OnceCell::from).unwrap_or_default();
        Ok(())
    }
}
