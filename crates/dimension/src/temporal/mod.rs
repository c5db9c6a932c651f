//! Time dimensions: range and calendar subsetting, grouping.

pub mod grouping;
pub mod region;

use chrono::NaiveDateTime;
use geo_common::{AnalysisConfig, CommonError, TimeUnits};
use tracing::debug;

use crate::coordinate::Record;
use crate::error::{DimensionError, Result};
use crate::vector::VectorDimension;

pub use grouping::{GroupKey, Grouping, GroupingItem, TemporalGroupDimension};
pub use region::TimeRegion;

/// A time axis. Resolution and spacing are measured in days.
#[derive(Debug, Clone)]
pub struct TemporalDimension {
    dim: VectorDimension<NaiveDateTime>,
}

impl From<VectorDimension<NaiveDateTime>> for TemporalDimension {
    fn from(dim: VectorDimension<NaiveDateTime>) -> Self {
        Self { dim }
    }
}

impl TemporalDimension {
    pub fn new(dim: VectorDimension<NaiveDateTime>) -> Self {
        Self { dim }
    }

    /// A dimension named `time` over explicit datetimes.
    pub fn from_values(
        values: Vec<NaiveDateTime>,
        bounds: Option<Vec<(NaiveDateTime, NaiveDateTime)>>,
    ) -> Result<Self> {
        let mut builder = VectorDimension::builder().name("time").values(values);
        if let Some(bounds) = bounds {
            builder = builder.bounds(bounds);
        }
        Ok(Self::new(builder.build()?))
    }

    /// Decode numeric offsets (CF `"<unit> since <date>"`) into a time dimension.
    pub fn from_numeric(
        values: &[f64],
        bounds: Option<&[(f64, f64)]>,
        units: &TimeUnits,
    ) -> Result<Self> {
        let decoded = decode_all(values.iter().copied(), units)?;
        let mut builder = VectorDimension::builder()
            .name("time")
            .units(units.to_string())
            .values(decoded);
        if let Some(bounds) = bounds {
            let lower = decode_all(bounds.iter().map(|b| b.0), units)?;
            let upper = decode_all(bounds.iter().map(|b| b.1), units)?;
            builder = builder.bounds(lower.into_iter().zip(upper).collect());
        }
        Ok(Self::new(builder.build()?))
    }

    pub fn dimension(&self) -> &VectorDimension<NaiveDateTime> {
        &self.dim
    }

    pub fn into_inner(self) -> VectorDimension<NaiveDateTime> {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.dim.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dim.is_empty()
    }

    pub fn value(&self) -> Result<Vec<NaiveDateTime>> {
        self.dim.value()
    }

    pub fn bounds(&self) -> Result<Option<Vec<(NaiveDateTime, NaiveDateTime)>>> {
        self.dim.bounds()
    }

    pub fn uid(&self) -> Vec<u32> {
        self.dim.uid()
    }

    /// Mean step (or bound width) in days.
    pub fn resolution(&self) -> Result<f64> {
        self.dim.resolution()
    }

    pub fn extent(&self) -> Result<(NaiveDateTime, NaiveDateTime)> {
        self.dim.extent()
    }

    /// Elements inside `[lower, upper]`, by bounds intersection when present.
    pub fn get_between(&self, lower: NaiveDateTime, upper: NaiveDateTime) -> Result<Self> {
        Ok(Self::new(self.dim.get_between(lower, upper)?))
    }

    /// Elements matching a calendar region, with their positions in `self`.
    pub fn get_time_region(&self, region: &TimeRegion) -> Result<(Self, Vec<usize>)> {
        let values = self.dim.value()?;
        let idx: Vec<usize> = values
            .iter()
            .enumerate()
            .filter(|(_, dt)| region.matches(dt))
            .map(|(i, _)| i)
            .collect();

        if idx.is_empty() {
            return Err(DimensionError::empty_subset(format!(
                "no time elements in region {:?}",
                region
            )));
        }
        debug!(selected = idx.len(), total = values.len(), "Applied time region");

        Ok((Self::new(self.dim.select(&idx)?), idx))
    }

    /// Partition the elements into groups.
    pub fn get_grouping(
        &self,
        grouping: &Grouping,
        config: &AnalysisConfig,
    ) -> Result<TemporalGroupDimension> {
        config.validate()?;
        let values = self.dim.value()?;
        let bounds = self.dim.bounds()?;
        grouping::group(
            self.dim.name(),
            &values,
            bounds.as_deref(),
            grouping,
            config,
        )
    }

    pub fn get_iter(&self) -> Result<std::vec::IntoIter<(usize, Record)>> {
        self.dim.get_iter()
    }
}

pub(crate) fn decode_all(values: impl Iterator<Item = f64>, units: &TimeUnits) -> Result<Vec<NaiveDateTime>> {
    values
        .map(|v| {
            units.to_datetime(v).ok_or_else(|| {
                DimensionError::from(CommonError::InvalidTimeUnits(format!(
                    "cannot decode {} as {}",
                    v, units
                )))
            })
        })
        .collect()
}
