//! Upstream datasets and deferred loading.
//!
//! File readers (NetCDF, shapefiles) live outside this crate and plug in
//! through [`DatasetSource`]. [`SourceLoader`] adapts a source to the
//! [`DimensionLoader`] interface so dimensions can defer their reads.

use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::NaiveDateTime;
use geo_common::{AttrValue, CommonError, DatasetMetadata, TimeUnits};
use tracing::debug;

use crate::coordinate::Coordinate;
use crate::error::{DimensionError, Result};
use crate::temporal::decode_all;
use crate::vector::{DimensionLoader, Loaded, VectorDimension};

/// A dataset that can read 1D coordinate variables by index.
pub trait DatasetSource {
    fn metadata(&self) -> &DatasetMetadata;

    /// Number of elements of a 1D variable.
    fn dimension_len(&self, variable: &str) -> Result<usize>;

    /// Values of `variable` at `idx`, in that order.
    fn read_values(&self, variable: &str, idx: &[usize]) -> Result<Vec<f64>>;

    /// Bounds of `variable` at `idx`, if the dataset has a bounds variable for it.
    fn read_bounds(&self, variable: &str, idx: &[usize]) -> Result<Option<Vec<(f64, f64)>>>;
}

/// A dataset held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataset {
    metadata: DatasetMetadata,
    values: BTreeMap<String, Vec<f64>>,
    bounds: BTreeMap<String, Vec<(f64, f64)>>,
}

impl InMemoryDataset {
    pub fn new(metadata: DatasetMetadata) -> Self {
        Self {
            metadata,
            ..Default::default()
        }
    }

    pub fn with_variable(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.values.insert(name.into(), values);
        self
    }

    /// Bounds stored for the coordinate variable `name`.
    pub fn with_bounds(mut self, name: impl Into<String>, bounds: Vec<(f64, f64)>) -> Self {
        self.bounds.insert(name.into(), bounds);
        self
    }

    fn variable(&self, variable: &str) -> Result<&[f64]> {
        self.values
            .get(variable)
            .map(Vec::as_slice)
            .ok_or_else(|| CommonError::VariableNotFound(variable.to_string()).into())
    }
}

fn pick<T: Copy>(variable: &str, data: &[T], idx: &[usize]) -> Result<Vec<T>> {
    idx.iter()
        .map(|&i| {
            data.get(i).copied().ok_or_else(|| {
                DimensionError::source(format!(
                    "index {} out of range for '{}' of length {}",
                    i,
                    variable,
                    data.len()
                ))
            })
        })
        .collect()
}

impl DatasetSource for InMemoryDataset {
    fn metadata(&self) -> &DatasetMetadata {
        &self.metadata
    }

    fn dimension_len(&self, variable: &str) -> Result<usize> {
        Ok(self.variable(variable)?.len())
    }

    fn read_values(&self, variable: &str, idx: &[usize]) -> Result<Vec<f64>> {
        pick(variable, self.variable(variable)?, idx)
    }

    fn read_bounds(&self, variable: &str, idx: &[usize]) -> Result<Option<Vec<(f64, f64)>>> {
        match self.bounds.get(variable) {
            Some(bounds) => Ok(Some(pick(variable, bounds, idx)?)),
            None => Ok(None),
        }
    }
}

/// Loads one coordinate variable of a dataset on demand.
///
/// Numeric variables load as `f64`; time variables are decoded with their
/// CF `units` attribute.
pub struct SourceLoader<S> {
    source: Rc<S>,
    variable: String,
}

impl<S: DatasetSource> SourceLoader<S> {
    pub fn new(source: Rc<S>, variable: impl Into<String>) -> Self {
        Self {
            source,
            variable: variable.into(),
        }
    }

    fn read(&self, src_idx: &[usize]) -> Result<Loaded<f64>> {
        debug!(
            variable = %self.variable,
            count = src_idx.len(),
            "Reading coordinate variable from source"
        );
        Ok(Loaded {
            values: self.source.read_values(&self.variable, src_idx)?,
            bounds: self.source.read_bounds(&self.variable, src_idx)?,
        })
    }

    fn time_units(&self) -> Result<TimeUnits> {
        let units = self.source.metadata().text(&self.variable, "units")?;
        Ok(TimeUnits::parse(units).map_err(CommonError::from)?)
    }
}

impl<S: DatasetSource> DimensionLoader<f64> for SourceLoader<S> {
    fn load(&self, src_idx: &[usize]) -> Result<Loaded<f64>> {
        self.read(src_idx)
    }
}

impl<S: DatasetSource> DimensionLoader<NaiveDateTime> for SourceLoader<S> {
    fn load(&self, src_idx: &[usize]) -> Result<Loaded<NaiveDateTime>> {
        let units = self.time_units()?;
        let raw = self.read(src_idx)?;

        let values = decode_all(raw.values.into_iter(), &units)?;
        let bounds = match raw.bounds {
            Some(bounds) => {
                let lower = decode_all(bounds.iter().map(|b| b.0), &units)?;
                let upper = decode_all(bounds.iter().map(|b| b.1), &units)?;
                Some(lower.into_iter().zip(upper).collect())
            }
            None => None,
        };
        Ok(Loaded { values, bounds })
    }
}

/// A deferred dimension over every element of `variable`.
///
/// Name and units come from the variable's metadata; nothing is read until
/// the values are first accessed.
pub fn lazy_dimension<T, S>(source: Rc<S>, variable: &str) -> Result<VectorDimension<T>>
where
    T: Coordinate,
    S: DatasetSource + 'static,
    SourceLoader<S>: DimensionLoader<T>,
{
    let len = source.dimension_len(variable)?;
    let units = source
        .metadata()
        .variables
        .get(variable)
        .and_then(|v| v.attribute("units"))
        .and_then(AttrValue::as_text)
        .map(str::to_string);

    let mut builder = VectorDimension::builder()
        .name(variable)
        .src_idx((0..len).collect())
        .loader(Box::new(SourceLoader::new(source, variable)));
    if let Some(units) = units {
        builder = builder.units(units);
    }
    builder.build()
}
