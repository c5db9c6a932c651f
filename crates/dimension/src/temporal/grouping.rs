//! Temporal grouping: calendar parts and seasons.
//!
//! A grouping partitions the elements of a temporal dimension into keyed
//! groups. Each group gets a representative date (a calendar centroid),
//! inclusive bounds and a membership mask over the source elements.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use geo_common::{AnalysisConfig, CalendarPart, DateParts};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{DimensionError, Result};
use crate::vector::VectorDimension;

/// One entry of a grouping definition: a calendar part or a season.
///
/// Deserializes from mixed JSON lists such as `[[12, 1, 2], "year"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupingItem {
    Part(CalendarPart),
    Season(Vec<u32>),
}

/// A validated grouping definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Grouping {
    /// Group by the selected calendar parts (sorted, unique).
    Calendar(Vec<CalendarPart>),

    /// Group by season, optionally split by calendar year.
    Seasons { seasons: Vec<Vec<u32>>, by_year: bool },
}

impl Grouping {
    pub fn calendar(parts: impl IntoIterator<Item = CalendarPart>) -> Result<Self> {
        let mut parts: Vec<CalendarPart> = parts.into_iter().collect();
        parts.sort();
        parts.dedup();
        if parts.is_empty() {
            return Err(DimensionError::invalid_grouping("grouping is empty"));
        }
        Ok(Grouping::Calendar(parts))
    }

    pub fn seasons(seasons: Vec<Vec<u32>>, by_year: bool) -> Result<Self> {
        if seasons.is_empty() {
            return Err(DimensionError::invalid_grouping("no seasons given"));
        }
        for season in &seasons {
            if season.is_empty() {
                return Err(DimensionError::invalid_grouping("season has no months"));
            }
            if let Some(month) = season.iter().find(|m| !(1..=12).contains(*m)) {
                return Err(DimensionError::invalid_grouping(format!(
                    "month {} is outside 1-12",
                    month
                )));
            }
            for (i, month) in season.iter().enumerate() {
                if season[..i].contains(month) {
                    return Err(DimensionError::invalid_grouping(format!(
                        "month {} repeated in season {:?}",
                        month, season
                    )));
                }
            }
        }
        Ok(Grouping::Seasons { seasons, by_year })
    }

    /// Build a grouping from a mixed list of parts and seasons.
    ///
    /// Seasons may only be combined with `year`.
    pub fn from_items(items: &[GroupingItem]) -> Result<Self> {
        let mut parts = Vec::new();
        let mut seasons = Vec::new();
        for item in items {
            match item {
                GroupingItem::Part(part) => parts.push(*part),
                GroupingItem::Season(months) => seasons.push(months.clone()),
            }
        }

        if seasons.is_empty() {
            return Self::calendar(parts);
        }

        let by_year = match parts.as_slice() {
            [] => false,
            parts if parts.iter().all(|p| *p == CalendarPart::Year) => true,
            _ => {
                return Err(DimensionError::invalid_grouping(
                    "seasons may only be combined with year",
                ))
            }
        };
        Self::seasons(seasons, by_year)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let items: Vec<GroupingItem> = serde_json::from_str(json)
            .map_err(|e| DimensionError::invalid_grouping(e.to_string()))?;
        Self::from_items(&items)
    }
}

/// Identity of one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum GroupKey {
    Calendar(DateParts),
    Season { months: Vec<u32>, year: Option<i32> },
}

/// The result of grouping a temporal dimension.
#[derive(Debug, Clone)]
pub struct TemporalGroupDimension {
    dim: VectorDimension<NaiveDateTime>,
    bounds: Vec<(NaiveDateTime, NaiveDateTime)>,
    dgroups: Vec<Vec<bool>>,
    keys: Vec<GroupKey>,
    grouping: Grouping,
}

impl TemporalGroupDimension {
    /// Representative value and bounds of each group, with uids 1..=n.
    pub fn dimension(&self) -> &VectorDimension<NaiveDateTime> {
        &self.dim
    }

    pub fn value(&self) -> Result<Vec<NaiveDateTime>> {
        self.dim.value()
    }

    pub fn bounds(&self) -> &[(NaiveDateTime, NaiveDateTime)] {
        &self.bounds
    }

    /// Membership masks aligned to the source dimension, one per group.
    pub fn dgroups(&self) -> &[Vec<bool>] {
        &self.dgroups
    }

    pub fn keys(&self) -> &[GroupKey] {
        &self.keys
    }

    pub fn uid(&self) -> Vec<u32> {
        self.dim.uid()
    }

    pub fn grouping(&self) -> &Grouping {
        &self.grouping
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Group `values` (with optional element bounds) by `grouping`.
pub(crate) fn group(
    name: Option<&str>,
    values: &[NaiveDateTime],
    bounds: Option<&[(NaiveDateTime, NaiveDateTime)]>,
    grouping: &Grouping,
    config: &AnalysisConfig,
) -> Result<TemporalGroupDimension> {
    let members = partition(values, grouping);
    if members.is_empty() {
        return Err(DimensionError::empty_subset("no elements match the grouping"));
    }

    let interval = |i: usize| match bounds {
        Some(b) if b[i].0 <= b[i].1 => b[i],
        Some(b) => (b[i].1, b[i].0),
        None => (values[i], values[i]),
    };

    let mut reps = Vec::with_capacity(members.len());
    let mut group_bounds = Vec::with_capacity(members.len());
    let mut dgroups = Vec::with_capacity(members.len());
    let mut keys = Vec::with_capacity(members.len());

    for (key, idx) in members {
        let (mut lower, mut upper) = interval(idx[0]);
        for &i in &idx[1..] {
            let (lo, hi) = interval(i);
            lower = lower.min(lo);
            upper = upper.max(hi);
        }

        let centroid = match &key {
            GroupKey::Calendar(parts) => calendar_centroid(parts, &lower, config),
            GroupKey::Season { months, .. } => season_centroid(months, &lower, &upper, config),
        };
        reps.push(centroid.unwrap_or_else(|| lower + (upper - lower) / 2));
        group_bounds.push((lower, upper));

        let mut mask = vec![false; values.len()];
        for i in idx {
            mask[i] = true;
        }
        dgroups.push(mask);
        keys.push(key);
    }

    let mut builder = VectorDimension::builder()
        .values(reps)
        .bounds(group_bounds.clone());
    if let Some(name) = name {
        builder = builder.name(name);
    }
    let dim = builder.build()?;

    info!(
        groups = keys.len(),
        elements = values.len(),
        "Built temporal grouping"
    );

    Ok(TemporalGroupDimension {
        dim,
        bounds: group_bounds,
        dgroups,
        keys,
        grouping: grouping.clone(),
    })
}

fn partition(values: &[NaiveDateTime], grouping: &Grouping) -> Vec<(GroupKey, Vec<usize>)> {
    match grouping {
        Grouping::Calendar(parts) => {
            let mut groups: BTreeMap<DateParts, Vec<usize>> = BTreeMap::new();
            for (i, dt) in values.iter().enumerate() {
                groups
                    .entry(DateParts::from_datetime(dt, parts))
                    .or_default()
                    .push(i);
            }
            groups
                .into_iter()
                .map(|(parts, idx)| (GroupKey::Calendar(parts), idx))
                .collect()
        }
        Grouping::Seasons { seasons, by_year } => {
            let mut groups: BTreeMap<(Option<i32>, usize), Vec<usize>> = BTreeMap::new();
            let mut dropped = 0usize;
            for (i, dt) in values.iter().enumerate() {
                match seasons.iter().position(|s| s.contains(&dt.month())) {
                    Some(season) => {
                        let year = by_year.then(|| dt.year());
                        groups.entry((year, season)).or_default().push(i);
                    }
                    None => dropped += 1,
                }
            }
            if dropped > 0 {
                debug!(dropped, "Elements outside every season left ungrouped");
            }
            groups
                .into_iter()
                .map(|((year, season), idx)| {
                    let key = GroupKey::Season {
                        months: seasons[season].clone(),
                        year,
                    };
                    (key, idx)
                })
                .collect()
        }
    }
}

fn calendar_centroid(
    parts: &DateParts,
    lower: &NaiveDateTime,
    config: &AnalysisConfig,
) -> Option<NaiveDateTime> {
    match (parts.year, parts.month, parts.day) {
        (year, month, Some(day)) => {
            let month = match (year, month) {
                (_, Some(month)) => month,
                (Some(_), None) => 1,
                (None, None) => lower.month(),
            };
            NaiveDate::from_ymd_opt(year.unwrap_or(lower.year()), month, day)?.and_hms_opt(12, 0, 0)
        }
        (Some(year), Some(month), None) => {
            NaiveDate::from_ymd_opt(year, month, config.month_centroid_day)?.and_hms_opt(0, 0, 0)
        }
        (None, Some(month), None) => {
            NaiveDate::from_ymd_opt(lower.year(), month, config.month_centroid_day)?
                .and_hms_opt(0, 0, 0)
        }
        (Some(year), None, None) => NaiveDate::from_ymd_opt(
            year,
            config.year_centroid_month,
            config.year_centroid_day,
        )?
        .and_hms_opt(0, 0, 0),
        (None, None, None) => None,
    }
}

fn season_centroid(
    months: &[u32],
    lower: &NaiveDateTime,
    upper: &NaiveDateTime,
    config: &AnalysisConfig,
) -> Option<NaiveDateTime> {
    // A season spanning the new year is centred on its middle listed month
    let month = if months.contains(&12) && months.contains(&1) {
        months[months.len() / 2]
    } else {
        (lower.month() + upper.month()) / 2
    };
    let year = (lower.year() + upper.year()).div_euclid(2);
    NaiveDate::from_ymd_opt(year, month, config.month_centroid_day)?
        .and_hms_opt(0, 0, 0)
        // A partial season may not reach its middle month
        .filter(|centroid| lower <= centroid && centroid <= upper)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_grouping_from_json() {
        let grouping = Grouping::from_json(r#"[[12, 1, 2], "year"]"#).unwrap();
        assert_eq!(
            grouping,
            Grouping::Seasons {
                seasons: vec![vec![12, 1, 2]],
                by_year: true
            }
        );

        let grouping = Grouping::from_json(r#"["month", "year", "month"]"#).unwrap();
        assert_eq!(
            grouping,
            Grouping::Calendar(vec![CalendarPart::Year, CalendarPart::Month])
        );
    }

    #[test]
    fn test_invalid_groupings() {
        assert!(Grouping::from_json("[]").is_err());
        assert!(Grouping::from_json(r#"[[6, 7, 8], "month"]"#).is_err());
        assert!(Grouping::from_json(r#"[[0, 1]]"#).is_err());
        assert!(Grouping::from_json(r#"[[13]]"#).is_err());
        assert!(Grouping::from_json(r#"["week"]"#).is_err());
        assert!(Grouping::seasons(vec![vec![]], false).is_err());
    }

    #[test]
    fn test_calendar_centroids() {
        let config = AnalysisConfig::default();
        let lower = dt(2012, 3, 1);

        let year = DateParts { year: Some(1900), month: None, day: None };
        assert_eq!(calendar_centroid(&year, &lower, &config), Some(dt(1900, 7, 1)));

        let month = DateParts { year: None, month: Some(2), day: None };
        assert_eq!(calendar_centroid(&month, &lower, &config), Some(dt(2012, 2, 16)));

        let day = DateParts { year: None, month: None, day: Some(5) };
        let expected = NaiveDate::from_ymd_opt(2012, 3, 5).unwrap().and_hms_opt(12, 0, 0);
        assert_eq!(calendar_centroid(&day, &lower, &config), expected);
    }

    #[test]
    fn test_invalid_centroid_falls_back_to_midpoint() {
        // Year comes from the lower bound, and 2015-02-29 does not exist
        let values = vec![dt(2016, 2, 29)];
        let bounds = vec![(dt(2015, 12, 31), dt(2016, 3, 1))];
        let grouping = Grouping::calendar([CalendarPart::Month, CalendarPart::Day]).unwrap();
        let config = AnalysisConfig::default();

        let parts = DateParts { year: None, month: Some(2), day: Some(29) };
        assert_eq!(calendar_centroid(&parts, &dt(2015, 12, 31), &config), None);

        let grouped = group(None, &values, Some(&bounds), &grouping, &config).unwrap();
        assert_eq!(
            grouped.value().unwrap()[0],
            dt(2016, 1, 30) + chrono::Duration::hours(12)
        );
        assert_eq!(grouped.bounds()[0], bounds[0]);
    }

    #[test]
    fn test_dropped_elements_not_in_any_group() {
        let values = vec![dt(2012, 5, 1), dt(2012, 6, 1), dt(2012, 9, 1)];
        let grouping = Grouping::seasons(vec![vec![6, 7, 8]], false).unwrap();
        let grouped = group(None, &values, None, &grouping, &AnalysisConfig::default()).unwrap();
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped.dgroups()[0], vec![false, true, false]);
    }
}
