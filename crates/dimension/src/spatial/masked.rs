//! Row-major 2D arrays with a cell mask.

use num_traits::{Float, NumCast};

use crate::error::{DimensionError, Result};

/// A 2D grid of values where masked cells carry no data.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedGrid<T> {
    nrow: usize,
    ncol: usize,
    data: Vec<T>,
    mask: Vec<bool>,
}

impl<T: Clone> MaskedGrid<T> {
    /// An unmasked grid from row-major data.
    pub fn new(nrow: usize, ncol: usize, data: Vec<T>) -> Result<Self> {
        let mask = vec![false; data.len()];
        Self::with_mask(nrow, ncol, data, mask)
    }

    pub fn with_mask(nrow: usize, ncol: usize, data: Vec<T>, mask: Vec<bool>) -> Result<Self> {
        if data.len() != nrow * ncol {
            return Err(DimensionError::length_mismatch("grid data", nrow * ncol, data.len()));
        }
        if mask.len() != data.len() {
            return Err(DimensionError::length_mismatch("grid mask", data.len(), mask.len()));
        }
        Ok(Self {
            nrow,
            ncol,
            data,
            mask,
        })
    }

    pub fn filled(nrow: usize, ncol: usize, value: T) -> Self {
        Self {
            nrow,
            ncol,
            data: vec![value; nrow * ncol],
            mask: vec![false; nrow * ncol],
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrow, self.ncol)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn offset(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.nrow {
            return Err(DimensionError::IndexOutOfBounds {
                index: row,
                len: self.nrow,
            });
        }
        if col >= self.ncol {
            return Err(DimensionError::IndexOutOfBounds {
                index: col,
                len: self.ncol,
            });
        }
        Ok(row * self.ncol + col)
    }

    /// The cell value, or `None` when masked or out of range.
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        let i = self.offset(row, col).ok()?;
        (!self.mask[i]).then(|| &self.data[i])
    }

    /// The cell value regardless of its mask.
    pub fn get_raw(&self, row: usize, col: usize) -> Result<&T> {
        let i = self.offset(row, col)?;
        Ok(&self.data[i])
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let i = self.offset(row, col)?;
        self.data[i] = value;
        Ok(())
    }

    pub fn is_masked(&self, row: usize, col: usize) -> bool {
        self.offset(row, col).map(|i| self.mask[i]).unwrap_or(true)
    }

    pub fn set_masked(&mut self, row: usize, col: usize, masked: bool) -> Result<()> {
        let i = self.offset(row, col)?;
        self.mask[i] = masked;
        Ok(())
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// Mask every cell where `mask` is true, keeping existing masks.
    pub fn apply_mask(&mut self, mask: &[bool]) -> Result<()> {
        if mask.len() != self.mask.len() {
            return Err(DimensionError::length_mismatch("grid mask", self.mask.len(), mask.len()));
        }
        for (m, &extra) in self.mask.iter_mut().zip(mask) {
            *m |= extra;
        }
        Ok(())
    }

    pub fn count_unmasked(&self) -> usize {
        self.mask.iter().filter(|m| !**m).count()
    }

    /// Unmasked cells as `(row, col, value)`.
    pub fn iter_unmasked(&self) -> impl Iterator<Item = (usize, usize, &T)> + '_ {
        let ncol = self.ncol;
        self.data
            .iter()
            .zip(&self.mask)
            .enumerate()
            .filter(|(_, (_, masked))| !**masked)
            .map(move |(i, (value, _))| (i / ncol, i % ncol, value))
    }

    pub fn map<U: Clone>(&self, f: impl FnMut(&T) -> U) -> MaskedGrid<U> {
        MaskedGrid {
            nrow: self.nrow,
            ncol: self.ncol,
            data: self.data.iter().map(f).collect(),
            mask: self.mask.clone(),
        }
    }

    /// The grid restricted to the given rows and columns, in that order.
    pub fn subgrid(&self, rows: &[usize], cols: &[usize]) -> Result<Self> {
        let mut data = Vec::with_capacity(rows.len() * cols.len());
        let mut mask = Vec::with_capacity(rows.len() * cols.len());
        for &r in rows {
            for &c in cols {
                let i = self.offset(r, c)?;
                data.push(self.data[i].clone());
                mask.push(self.mask[i]);
            }
        }
        Self::with_mask(rows.len(), cols.len(), data, mask)
    }
}

impl<T: Float> MaskedGrid<T> {
    /// Weighted mean over cells unmasked in both grids.
    ///
    /// Returns `None` when no cell contributes or the weights sum to zero.
    pub fn weighted_mean(&self, weights: &MaskedGrid<f64>) -> Option<T> {
        if weights.shape() != self.shape() {
            return None;
        }
        let mut total = T::zero();
        let mut weight_sum = T::zero();
        for (i, value) in self.data.iter().enumerate() {
            if self.mask[i] || weights.mask[i] {
                continue;
            }
            let w = <T as NumCast>::from(weights.data[i])?;
            total = total + *value * w;
            weight_sum = weight_sum + w;
        }
        (weight_sum > T::zero()).then(|| total / weight_sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_checked() {
        assert!(MaskedGrid::new(2, 2, vec![1, 2, 3]).is_err());
        let grid = MaskedGrid::new(2, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(grid.get(1, 2), Some(&6));
        assert_eq!(grid.get(2, 0), None);
    }

    #[test]
    fn test_subgrid_keeps_mask() {
        let mut grid = MaskedGrid::new(3, 3, (1..=9).collect()).unwrap();
        grid.set_masked(1, 1, true).unwrap();
        let sub = grid.subgrid(&[1, 2], &[1, 2]).unwrap();
        assert_eq!(sub.shape(), (2, 2));
        assert_eq!(sub.data(), &[5, 6, 8, 9]);
        assert_eq!(sub.get(0, 0), None);
        assert_eq!(sub.count_unmasked(), 3);
    }

    #[test]
    fn test_weighted_mean() {
        let mut values = MaskedGrid::new(1, 3, vec![1.0, 2.0, 100.0]).unwrap();
        values.set_masked(0, 2, true).unwrap();
        let weights = MaskedGrid::new(1, 3, vec![1.0, 3.0, 1.0]).unwrap();
        assert_eq!(values.weighted_mean(&weights), Some(1.75));

        let mut all_masked = values.clone();
        all_masked.apply_mask(&[true, true, true]).unwrap();
        assert_eq!(all_masked.weighted_mean(&weights), None);
    }
}
