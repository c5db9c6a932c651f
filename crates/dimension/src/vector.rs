//! One-dimensional coordinate dimensions.
//!
//! A `VectorDimension` is a view onto a shared backing store. Slicing,
//! selecting and masking produce new views over the same store, so a value
//! written through one view is visible in every other view. `deep_copy`
//! detaches a view into its own store.
//!
//! Values are either given up front or deferred: a dimension built from
//! source indices stays unloaded until first access, when its attached
//! [`DimensionLoader`] is asked for exactly those indices.

use std::cell::RefCell;
use std::fmt;
use std::ops::Range;
use std::rc::Rc;

use tracing::debug;

use crate::coordinate::{Coordinate, FieldValue, Record};
use crate::error::{DimensionError, Result};

/// Values (and optional bounds) produced by a loader.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    pub values: Vec<T>,
    pub bounds: Option<Vec<(T, T)>>,
}

/// Materializes deferred dimension values from an external dataset.
pub trait DimensionLoader<T> {
    /// Load the values at `src_idx`, in that order.
    fn load(&self, src_idx: &[usize]) -> Result<Loaded<T>>;
}

enum DimensionData<T> {
    Unloaded,
    Loading,
    Loaded(Vec<T>),
}

struct DimensionStore<T> {
    data: DimensionData<T>,
    bounds: Option<Vec<(T, T)>>,
    uid: Vec<u32>,
    src_idx: Option<Vec<usize>>,
    loader: Option<Box<dyn DimensionLoader<T>>>,
}

/// An ordered coordinate axis with optional cell bounds and stable uids.
#[derive(Clone)]
pub struct VectorDimension<T: Coordinate> {
    store: Rc<RefCell<DimensionStore<T>>>,
    /// Positions of this view's elements in the store.
    index: Vec<usize>,
    name: Option<String>,
    name_uid: Option<String>,
    units: Option<String>,
    /// Bounds with `lower > upper` may cross the longitude seam.
    longitude: bool,
}

impl<T: Coordinate> fmt::Debug for VectorDimension<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VectorDimension")
            .field("name", &self.name)
            .field("len", &self.index.len())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

/// Builder for [`VectorDimension`].
pub struct VectorDimensionBuilder<T> {
    name: Option<String>,
    name_uid: Option<String>,
    units: Option<String>,
    longitude: bool,
    values: Option<Vec<T>>,
    bounds: Option<Vec<(T, T)>>,
    uid: Option<Vec<u32>>,
    src_idx: Option<Vec<usize>>,
    loader: Option<Box<dyn DimensionLoader<T>>>,
}

impl<T: Coordinate> Default for VectorDimensionBuilder<T> {
    fn default() -> Self {
        Self {
            name: None,
            name_uid: None,
            units: None,
            longitude: false,
            values: None,
            bounds: None,
            uid: None,
            src_idx: None,
            loader: None,
        }
    }
}

impl<T: Coordinate> VectorDimensionBuilder<T> {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Field name of the uid in records. Defaults to `{name}_uid`.
    pub fn name_uid(mut self, name_uid: impl Into<String>) -> Self {
        self.name_uid = Some(name_uid.into());
        self
    }

    pub fn units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    /// Mark the axis as longitude. Implied by CF `degrees_east` units.
    pub fn longitude(mut self) -> Self {
        self.longitude = true;
        self
    }

    pub fn values(mut self, values: Vec<T>) -> Self {
        self.values = Some(values);
        self
    }

    pub fn bounds(mut self, bounds: Vec<(T, T)>) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Explicit uids. Defaults to 1..=n.
    pub fn uid(mut self, uid: Vec<u32>) -> Self {
        self.uid = Some(uid);
        self
    }

    /// Indices into the external dataset backing this dimension.
    pub fn src_idx(mut self, src_idx: Vec<usize>) -> Self {
        self.src_idx = Some(src_idx);
        self
    }

    pub fn loader(mut self, loader: Box<dyn DimensionLoader<T>>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn build(self) -> Result<VectorDimension<T>> {
        let len = match (&self.values, &self.src_idx) {
            (Some(values), _) => values.len(),
            (None, Some(src_idx)) => src_idx.len(),
            (None, None) if self.bounds.is_some() => {
                return Err(DimensionError::BoundsWithoutValue)
            }
            (None, None) => return Err(DimensionError::Empty),
        };
        if len == 0 {
            return Err(DimensionError::Empty);
        }

        if let Some(src_idx) = &self.src_idx {
            if src_idx.len() != len {
                return Err(DimensionError::length_mismatch("src_idx", len, src_idx.len()));
            }
        }
        if let Some(bounds) = &self.bounds {
            if bounds.len() != len {
                return Err(DimensionError::length_mismatch("bounds", len, bounds.len()));
            }
        }
        let uid = match self.uid {
            Some(uid) if uid.len() != len => {
                return Err(DimensionError::length_mismatch("uid", len, uid.len()))
            }
            Some(uid) => uid,
            None => (1..=len as u32).collect(),
        };

        let data = match self.values {
            Some(values) => DimensionData::Loaded(values),
            None => DimensionData::Unloaded,
        };

        Ok(VectorDimension {
            store: Rc::new(RefCell::new(DimensionStore {
                data,
                bounds: self.bounds,
                uid,
                src_idx: self.src_idx,
                loader: self.loader,
            })),
            index: (0..len).collect(),
            longitude: self.longitude || self.units.as_deref().is_some_and(is_longitude_units),
            name: self.name,
            name_uid: self.name_uid,
            units: self.units,
        })
    }
}

impl<T: Coordinate> VectorDimension<T> {
    pub fn builder() -> VectorDimensionBuilder<T> {
        VectorDimensionBuilder::default()
    }

    /// Unnamed dimension over explicit values.
    pub fn new(values: Vec<T>) -> Result<Self> {
        Self::builder().values(values).build()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Field name of the uid, `{name}_uid` unless set explicitly.
    pub fn name_uid(&self) -> Option<String> {
        self.name_uid
            .clone()
            .or_else(|| self.name.as_ref().map(|name| format!("{}_uid", name)))
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    pub fn is_longitude(&self) -> bool {
        self.longitude
    }

    /// This view marked as a longitude axis, so seam-crossing bounds are
    /// read as two parts.
    pub fn as_longitude(mut self) -> Self {
        self.longitude = true;
        self
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.store.borrow().data, DimensionData::Loaded(_))
    }

    /// Attach the loader used to materialize deferred values.
    pub fn attach_loader(&self, loader: Box<dyn DimensionLoader<T>>) -> Result<()> {
        let mut store = self.store.borrow_mut();
        if store.loader.is_some() {
            return Err(DimensionError::LoaderAlreadyAttached);
        }
        store.loader = Some(loader);
        Ok(())
    }

    fn ensure_loaded(&self) -> Result<()> {
        let (loader, src_idx) = {
            let mut store = self.store.borrow_mut();
            match store.data {
                DimensionData::Loaded(_) => return Ok(()),
                DimensionData::Loading => return Err(DimensionError::LoadInProgress),
                DimensionData::Unloaded => {}
            }
            let Some(src_idx) = store.src_idx.clone() else {
                return Err(DimensionError::NotLoaded);
            };
            let Some(loader) = store.loader.take() else {
                return Err(DimensionError::NotLoaded);
            };
            store.data = DimensionData::Loading;
            (loader, src_idx)
        };

        // The store is not borrowed while the loader runs
        let result = loader.load(&src_idx).and_then(|loaded| {
            if loaded.values.len() != src_idx.len() {
                return Err(DimensionError::length_mismatch(
                    "loaded values",
                    src_idx.len(),
                    loaded.values.len(),
                ));
            }
            match &loaded.bounds {
                Some(bounds) if bounds.len() != src_idx.len() => Err(
                    DimensionError::length_mismatch("loaded bounds", src_idx.len(), bounds.len()),
                ),
                _ => Ok(loaded),
            }
        });

        let mut store = self.store.borrow_mut();
        store.loader = Some(loader);
        match result {
            Ok(loaded) => {
                debug!(
                    name = ?self.name,
                    count = loaded.values.len(),
                    has_bounds = loaded.bounds.is_some(),
                    "Loaded dimension values from source"
                );
                store.data = DimensionData::Loaded(loaded.values);
                if store.bounds.is_none() {
                    store.bounds = loaded.bounds;
                }
                Ok(())
            }
            Err(err) => {
                store.data = DimensionData::Unloaded;
                Err(err)
            }
        }
    }

    /// The coordinate values of this view, loading them if needed.
    pub fn value(&self) -> Result<Vec<T>> {
        self.ensure_loaded()?;
        let store = self.store.borrow();
        match &store.data {
            DimensionData::Loaded(values) => Ok(self.index.iter().map(|&i| values[i]).collect()),
            _ => Err(DimensionError::NotLoaded),
        }
    }

    pub fn value_at(&self, i: usize) -> Result<T> {
        let pos = self.position(i)?;
        self.ensure_loaded()?;
        match &self.store.borrow().data {
            DimensionData::Loaded(values) => Ok(values[pos]),
            _ => Err(DimensionError::NotLoaded),
        }
    }

    /// Cell bounds of this view, if the dimension has any.
    pub fn bounds(&self) -> Result<Option<Vec<(T, T)>>> {
        self.ensure_loaded()?;
        let store = self.store.borrow();
        Ok(store
            .bounds
            .as_ref()
            .map(|bounds| self.index.iter().map(|&i| bounds[i]).collect()))
    }

    pub fn has_bounds(&self) -> Result<bool> {
        self.ensure_loaded()?;
        Ok(self.store.borrow().bounds.is_some())
    }

    pub fn bounds_at(&self, i: usize) -> Result<(T, T)> {
        let pos = self.position(i)?;
        self.ensure_loaded()?;
        let store = self.store.borrow();
        store
            .bounds
            .as_ref()
            .map(|bounds| bounds[pos])
            .ok_or(DimensionError::NoBounds)
    }

    pub fn uid(&self) -> Vec<u32> {
        let store = self.store.borrow();
        self.index.iter().map(|&i| store.uid[i]).collect()
    }

    pub fn src_idx(&self) -> Option<Vec<usize>> {
        let store = self.store.borrow();
        store
            .src_idx
            .as_ref()
            .map(|src| self.index.iter().map(|&i| src[i]).collect())
    }

    /// Write a value through to the backing store.
    pub fn set_value(&self, i: usize, value: T) -> Result<()> {
        let pos = self.position(i)?;
        self.ensure_loaded()?;
        match &mut self.store.borrow_mut().data {
            DimensionData::Loaded(values) => {
                values[pos] = value;
                Ok(())
            }
            _ => Err(DimensionError::NotLoaded),
        }
    }

    /// Write a cell bound through to the backing store.
    pub fn set_bounds_at(&self, i: usize, bounds: (T, T)) -> Result<()> {
        let pos = self.position(i)?;
        self.ensure_loaded()?;
        match &mut self.store.borrow_mut().bounds {
            Some(all) => {
                all[pos] = bounds;
                Ok(())
            }
            None => Err(DimensionError::NoBounds),
        }
    }

    fn position(&self, i: usize) -> Result<usize> {
        self.index
            .get(i)
            .copied()
            .ok_or(DimensionError::IndexOutOfBounds {
                index: i,
                len: self.index.len(),
            })
    }

    fn view(&self, positions: &[usize]) -> Result<Self> {
        if positions.is_empty() {
            return Err(DimensionError::empty_subset("selection is empty"));
        }
        let index = positions
            .iter()
            .map(|&p| self.position(p))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            store: Rc::clone(&self.store),
            index,
            name: self.name.clone(),
            name_uid: self.name_uid.clone(),
            units: self.units.clone(),
            longitude: self.longitude,
        })
    }

    /// Single-element view.
    pub fn get(&self, i: usize) -> Result<Self> {
        self.view(&[i])
    }

    pub fn slice(&self, range: Range<usize>) -> Result<Self> {
        if range.end > self.len() {
            return Err(DimensionError::IndexOutOfBounds {
                index: range.end,
                len: self.len(),
            });
        }
        let positions: Vec<usize> = range.collect();
        self.view(&positions)
    }

    pub fn select(&self, positions: &[usize]) -> Result<Self> {
        self.view(positions)
    }

    /// View of the elements where `keep` is true.
    pub fn mask(&self, keep: &[bool]) -> Result<Self> {
        if keep.len() != self.len() {
            return Err(DimensionError::length_mismatch("mask", self.len(), keep.len()));
        }
        let positions: Vec<usize> = keep
            .iter()
            .enumerate()
            .filter_map(|(i, &k)| k.then_some(i))
            .collect();
        self.view(&positions)
    }

    /// Positions of elements inside `[lower, upper]`.
    ///
    /// With bounds, an element matches when its interval touches the range.
    pub fn between_indices(&self, lower: T, upper: T) -> Result<Vec<usize>> {
        let values = self.value()?;
        let bounds = self.bounds()?;

        let selected: Vec<usize> = match bounds {
            Some(bounds) => bounds
                .iter()
                .enumerate()
                .filter(|(_, &(a, b))| {
                    let overlaps = |(lo, hi): (T, T)| lo <= upper && hi >= lower;
                    let (first, second) = self.cell_parts(a, b);
                    overlaps(first) || second.is_some_and(overlaps)
                })
                .map(|(i, _)| i)
                .collect(),
            None => values
                .iter()
                .enumerate()
                .filter(|(_, &v)| v >= lower && v <= upper)
                .map(|(i, _)| i)
                .collect(),
        };

        if selected.is_empty() {
            return Err(DimensionError::empty_subset(format!(
                "no elements of {} between {:?} and {:?}",
                self.name.as_deref().unwrap_or("dimension"),
                lower,
                upper
            )));
        }
        Ok(selected)
    }

    /// View of elements inside `[lower, upper]`, order preserved.
    pub fn get_between(&self, lower: T, upper: T) -> Result<Self> {
        let selected = self.between_indices(lower, upper)?;
        self.view(&selected)
    }

    /// Mean bound width, or mean spacing of adjacent values without bounds.
    pub fn resolution(&self) -> Result<f64> {
        if let Some(bounds) = self.bounds()? {
            let total: f64 = bounds
                .iter()
                .map(|&(a, b)| match self.cell_parts(a, b) {
                    ((lo, hi), None) => T::spacing(lo, hi),
                    ((lo, hi), Some((lo2, hi2))) => T::spacing(lo, hi) + T::spacing(lo2, hi2),
                })
                .sum();
            return Ok(total / bounds.len() as f64);
        }

        let values = self.value()?;
        if values.len() < 2 {
            return Err(DimensionError::ResolutionUndefined);
        }
        let total: f64 = values.windows(2).map(|w| T::spacing(w[0], w[1])).sum();
        Ok(total / (values.len() - 1) as f64)
    }

    /// Minimum and maximum coordinate, over bounds when present.
    pub fn extent(&self) -> Result<(T, T)> {
        let points: Vec<T> = match self.bounds()? {
            Some(bounds) => bounds
                .iter()
                .flat_map(|&(a, b)| {
                    let (first, second) = self.cell_parts(a, b);
                    std::iter::once(first).chain(second)
                })
                .flat_map(|(lo, hi)| [lo, hi])
                .collect(),
            None => self.value()?,
        };
        let first = points[0];
        Ok(points.iter().fold((first, first), |(lo, hi), &v| {
            (if v < lo { v } else { lo }, if v > hi { v } else { hi })
        }))
    }

    /// Ascending parts covered by a cell's bounds. Only a seam-crossing
    /// cell of a longitude axis has a second part.
    fn cell_parts(&self, a: T, b: T) -> ((T, T), Option<(T, T)>) {
        if self.longitude {
            if let Some((first, second)) = T::seam_parts(a, b) {
                return (first, Some(second));
            }
        }
        (if a <= b { (a, b) } else { (b, a) }, None)
    }

    /// An isolated copy holding only this view's elements. Uids are kept.
    pub fn deep_copy(&self) -> Result<Self> {
        let values = self.value()?;
        let bounds = self.bounds()?;
        Ok(Self {
            store: Rc::new(RefCell::new(DimensionStore {
                data: DimensionData::Loaded(values),
                bounds,
                uid: self.uid(),
                src_idx: self.src_idx(),
                loader: None,
            })),
            index: (0..self.len()).collect(),
            name: self.name.clone(),
            name_uid: self.name_uid.clone(),
            units: self.units.clone(),
            longitude: self.longitude,
        })
    }

    /// Flat records of this view, one per element.
    pub fn get_iter(&self) -> Result<std::vec::IntoIter<(usize, Record)>> {
        let name = self.name.as_deref().ok_or(DimensionError::NameRequired)?;
        let name_uid = self.name_uid().ok_or(DimensionError::NameRequired)?;
        let lower_key = format!("{}_bnds_lower", name);
        let upper_key = format!("{}_bnds_upper", name);

        let values = self.value()?;
        let bounds = self.bounds()?;
        let uid = self.uid();

        let records: Vec<(usize, Record)> = values
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let (lower, upper) = match &bounds {
                    Some(b) => (b[i].0.to_field(), b[i].1.to_field()),
                    None => (FieldValue::Null, FieldValue::Null),
                };
                let mut record = Record::new();
                record.insert(name.to_string(), value.to_field());
                record.insert(name_uid.clone(), FieldValue::Int(i64::from(uid[i])));
                record.insert(lower_key.clone(), lower);
                record.insert(upper_key.clone(), upper);
                (i, record)
            })
            .collect();

        Ok(records.into_iter())
    }
}

/// CF spellings of longitude units.
fn is_longitude_units(units: &str) -> bool {
    matches!(
        units.to_ascii_lowercase().as_str(),
        "degrees_east" | "degree_east" | "degrees_e" | "degree_e" | "degreese" | "degreee"
    )
}
