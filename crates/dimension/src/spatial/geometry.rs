//! Per-cell point and polygon geometries of a spatial grid.

use geo::{Area, BooleanOps, Intersects, MultiPolygon, Point, Polygon};
use projection::wrap::{cell_polygon, unwrap_multipolygon, unwrap_point, wrap_multipolygon, wrap_point};

use crate::error::{DimensionError, Result};
use crate::spatial::grid::SpatialGridDimension;
use crate::spatial::masked::MaskedGrid;

/// One point per grid cell at the (column, row) center.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialPointDimension {
    value: MaskedGrid<Point<f64>>,
}

impl SpatialPointDimension {
    pub fn new(value: MaskedGrid<Point<f64>>) -> Self {
        Self { value }
    }

    pub fn from_grid(grid: &SpatialGridDimension) -> Result<Self> {
        let coords = grid.value()?;
        let points: Vec<Point<f64>> = coords
            .cols
            .data()
            .iter()
            .zip(coords.rows.data())
            .map(|(&x, &y)| Point::new(x, y))
            .collect();
        let (nrow, ncol) = grid.shape();
        Ok(Self::new(MaskedGrid::with_mask(
            nrow,
            ncol,
            points,
            grid.mask().to_vec(),
        )?))
    }

    pub fn value(&self) -> &MaskedGrid<Point<f64>> {
        &self.value
    }

    pub fn select(&self, rows: &[usize], cols: &[usize]) -> Result<Self> {
        Ok(Self::new(self.value.subgrid(rows, cols)?))
    }

    /// Mask cells whose point does not touch `polygon`. Returns the new mask.
    pub fn intersects(&mut self, polygon: &Polygon<f64>) -> Result<Vec<bool>> {
        let (nrow, ncol) = self.value.shape();
        for r in 0..nrow {
            for c in 0..ncol {
                let inside = self
                    .value
                    .get(r, c)
                    .map(|p| polygon.intersects(p))
                    .unwrap_or(false);
                if !inside {
                    self.value.set_masked(r, c, true)?;
                }
            }
        }
        Ok(self.value.mask().to_vec())
    }

    pub fn wrap(&self) -> Self {
        Self::new(self.value.map(wrap_point))
    }

    pub fn unwrap(&self) -> Self {
        Self::new(self.value.map(unwrap_point))
    }
}

/// One multipolygon per grid cell with the fraction of the cell it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialPolygonDimension {
    value: MaskedGrid<MultiPolygon<f64>>,
    weights: MaskedGrid<f64>,
}

impl SpatialPolygonDimension {
    pub fn new(value: MaskedGrid<MultiPolygon<f64>>, weights: MaskedGrid<f64>) -> Result<Self> {
        if value.shape() != weights.shape() {
            return Err(DimensionError::length_mismatch(
                "polygon weights",
                value.len(),
                weights.len(),
            ));
        }
        Ok(Self { value, weights })
    }

    /// Cell polygons from the grid's row and column bounds.
    pub fn from_grid(grid: &SpatialGridDimension) -> Result<Self> {
        let (row_bounds, col_bounds) = grid.bounds()?.ok_or(DimensionError::NoBounds)?;
        let mut cells = Vec::with_capacity(row_bounds.len() * col_bounds.len());
        for &y_bounds in &row_bounds {
            for &x_bounds in &col_bounds {
                cells.push(cell_polygon(x_bounds, y_bounds));
            }
        }
        let (nrow, ncol) = grid.shape();
        let mask = grid.mask().to_vec();
        Self::new(
            MaskedGrid::with_mask(nrow, ncol, cells, mask.clone())?,
            MaskedGrid::with_mask(nrow, ncol, vec![1.0; nrow * ncol], mask)?,
        )
    }

    pub fn value(&self) -> &MaskedGrid<MultiPolygon<f64>> {
        &self.value
    }

    pub fn weights(&self) -> &MaskedGrid<f64> {
        &self.weights
    }

    pub fn select(&self, rows: &[usize], cols: &[usize]) -> Result<Self> {
        Self::new(
            self.value.subgrid(rows, cols)?,
            self.weights.subgrid(rows, cols)?,
        )
    }

    fn mask_cell(&mut self, r: usize, c: usize) -> Result<()> {
        self.value.set_masked(r, c, true)?;
        self.weights.set_masked(r, c, true)
    }

    /// Mask cells not touching `polygon`. Geometries stay whole.
    pub fn intersects(&mut self, polygon: &Polygon<f64>) -> Result<Vec<bool>> {
        let (nrow, ncol) = self.value.shape();
        for r in 0..nrow {
            for c in 0..ncol {
                let hit = self
                    .value
                    .get(r, c)
                    .map(|geom| geom.intersects(polygon))
                    .unwrap_or(false);
                if !hit {
                    self.mask_cell(r, c)?;
                }
            }
        }
        Ok(self.value.mask().to_vec())
    }

    /// Cut each cell to `polygon`, scaling its weight by the area kept.
    ///
    /// Cells that only touch `polygon` along an edge or at a corner keep no
    /// area and are masked, unlike [`intersects`](Self::intersects), which
    /// keeps them whole at their full weight.
    pub fn clip(&mut self, polygon: &Polygon<f64>) -> Result<Vec<bool>> {
        let clipper = MultiPolygon::new(vec![polygon.clone()]);
        let (nrow, ncol) = self.value.shape();
        for r in 0..nrow {
            for c in 0..ncol {
                let Some(geom) = self.value.get(r, c).cloned() else {
                    continue;
                };
                if !geom.intersects(polygon) {
                    self.mask_cell(r, c)?;
                    continue;
                }
                let clipped = geom.intersection(&clipper);
                let kept = clipped.unsigned_area();
                let area = geom.unsigned_area();
                if clipped.0.is_empty() || kept <= 0.0 || area <= 0.0 {
                    self.mask_cell(r, c)?;
                    continue;
                }
                let weight = *self.weights.get_raw(r, c)? * kept / area;
                self.value.set(r, c, clipped)?;
                self.weights.set(r, c, weight)?;
            }
        }
        Ok(self.value.mask().to_vec())
    }

    pub fn wrap(&self) -> Result<Self> {
        Self::new(self.value.map(wrap_multipolygon), self.weights.clone())
    }

    pub fn unwrap(&self) -> Result<Self> {
        Self::new(self.value.map(unwrap_multipolygon), self.weights.clone())
    }
}
