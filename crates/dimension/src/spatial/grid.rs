//! Rectilinear grids built from a row and a column dimension.

use geo::{BoundingRect, Polygon};
use geo_common::BoundingBox;
use tracing::debug;

use crate::error::{DimensionError, Result};
use crate::spatial::masked::MaskedGrid;
use crate::vector::VectorDimension;

/// Spatial selector for subsetting. Only one kind can be given at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum SpatialSubset {
    Extent(BoundingBox),
    Polygon(Polygon<f64>),
}

impl SpatialSubset {
    /// Bounding extent of the selector.
    pub fn extent(&self) -> Result<BoundingBox> {
        match self {
            SpatialSubset::Extent(bbox) => Ok(*bbox),
            SpatialSubset::Polygon(polygon) => polygon
                .bounding_rect()
                .map(|rect| BoundingBox::from_rect(&rect))
                .ok_or_else(|| DimensionError::empty_subset("polygon has no extent")),
        }
    }
}

/// Masked row and column coordinate grids of a spatial grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCoordinates {
    pub rows: MaskedGrid<f64>,
    pub cols: MaskedGrid<f64>,
}

/// A rectilinear grid: row (`y`) and column (`x`) dimensions with a cell uid grid.
///
/// The cell mask lives on the uid grid.
#[derive(Debug, Clone)]
pub struct SpatialGridDimension {
    row: VectorDimension<f64>,
    col: VectorDimension<f64>,
    uid: MaskedGrid<u32>,
}

impl SpatialGridDimension {
    /// A grid with row-major cell uids 1..=nrow*ncol and no mask.
    pub fn new(row: VectorDimension<f64>, col: VectorDimension<f64>) -> Result<Self> {
        let (nrow, ncol) = (row.len(), col.len());
        let uid = MaskedGrid::new(nrow, ncol, (1..=(nrow * ncol) as u32).collect())?;
        Ok(Self { row, col, uid })
    }

    pub fn with_uid(
        row: VectorDimension<f64>,
        col: VectorDimension<f64>,
        uid: MaskedGrid<u32>,
    ) -> Result<Self> {
        let expected = (row.len(), col.len());
        if uid.shape() != expected {
            return Err(DimensionError::length_mismatch(
                "grid uid",
                expected.0 * expected.1,
                uid.len(),
            ));
        }
        Ok(Self { row, col, uid })
    }

    pub fn row(&self) -> &VectorDimension<f64> {
        &self.row
    }

    pub fn col(&self) -> &VectorDimension<f64> {
        &self.col
    }

    pub fn uid(&self) -> &MaskedGrid<u32> {
        &self.uid
    }

    pub fn shape(&self) -> (usize, usize) {
        self.uid.shape()
    }

    pub fn mask(&self) -> &[bool] {
        self.uid.mask()
    }

    /// Mask cells where `mask` is true. Existing masks are kept.
    pub fn apply_mask(&mut self, mask: &[bool]) -> Result<()> {
        self.uid.apply_mask(mask)
    }

    /// Row and column values broadcast to the grid shape, masked like the grid.
    pub fn value(&self) -> Result<GridCoordinates> {
        let rows = self.row.value()?;
        let cols = self.col.value()?;
        let mut row_grid = Vec::with_capacity(rows.len() * cols.len());
        let mut col_grid = Vec::with_capacity(rows.len() * cols.len());
        for &y in &rows {
            for &x in &cols {
                row_grid.push(y);
                col_grid.push(x);
            }
        }
        let mask = self.uid.mask().to_vec();
        Ok(GridCoordinates {
            rows: MaskedGrid::with_mask(rows.len(), cols.len(), row_grid, mask.clone())?,
            cols: MaskedGrid::with_mask(rows.len(), cols.len(), col_grid, mask)?,
        })
    }

    /// Row and column bounds, when both dimensions have them.
    pub fn bounds(&self) -> Result<Option<(Vec<(f64, f64)>, Vec<(f64, f64)>)>> {
        Ok(self.row.bounds()?.zip(self.col.bounds()?))
    }

    pub fn resolution(&self) -> Result<f64> {
        Ok((self.row.resolution()? + self.col.resolution()?) / 2.0)
    }

    /// Extent over cell bounds when present, otherwise over centers.
    pub fn extent(&self) -> Result<BoundingBox> {
        let (min_y, max_y) = self.row.extent()?;
        let (min_x, max_x) = self.col.extent()?;
        Ok(BoundingBox::new(min_x, min_y, max_x, max_y))
    }

    /// Row and column positions touching the selector's extent.
    pub fn subset_indices(&self, subset: &SpatialSubset) -> Result<(Vec<usize>, Vec<usize>)> {
        let bbox = subset.extent()?;
        let rows = self.row.between_indices(bbox.min_y, bbox.max_y)?;
        let cols = self.col.between_indices(bbox.min_x, bbox.max_x)?;
        Ok((rows, cols))
    }

    /// Grid limited to the given rows and columns. Uids are preserved.
    pub fn select(&self, rows: &[usize], cols: &[usize]) -> Result<Self> {
        Ok(Self {
            row: self.row.select(rows)?,
            col: self.col.select(cols)?,
            uid: self.uid.subgrid(rows, cols)?,
        })
    }

    /// Grid limited to rows and columns intersecting the selector.
    ///
    /// `None` returns the whole grid.
    pub fn subset(&self, subset: Option<&SpatialSubset>) -> Result<Self> {
        let Some(subset) = subset else {
            return Ok(self.clone());
        };
        let (rows, cols) = self.subset_indices(subset)?;
        debug!(
            rows = rows.len(),
            cols = cols.len(),
            "Subset spatial grid"
        );
        self.select(&rows, &cols)
    }

    /// Read column bounds as longitudes that may cross the seam.
    pub(crate) fn mark_longitude(&mut self) {
        if !self.col.is_longitude() {
            self.col = self.col.clone().as_longitude();
        }
    }

    pub(crate) fn replace_col(&mut self, col: VectorDimension<f64>) -> Result<()> {
        if col.len() != self.col.len() {
            return Err(DimensionError::length_mismatch("column", self.col.len(), col.len()));
        }
        self.col = col;
        Ok(())
    }
}
