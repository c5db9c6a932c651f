//! Tests for temporal dimensions: range and region subsets, calendar and
//! seasonal grouping.

use chrono::{Datelike, NaiveDateTime};
use dimension::{DimensionError, GroupKey, Grouping, TemporalDimension, TimeRegion};
use geo_common::{AnalysisConfig, CalendarPart, TimeUnits};
use test_utils::{daily_dates, daily_series, datetime, init_tracing, monthly_dates};

fn daily(start: NaiveDateTime, end: NaiveDateTime) -> TemporalDimension {
    let (values, bounds) = daily_series(start, end);
    TemporalDimension::from_values(values, Some(bounds)).unwrap()
}

fn daily_without_bounds(start: NaiveDateTime, end: NaiveDateTime) -> TemporalDimension {
    TemporalDimension::from_values(daily_dates(start, end), None).unwrap()
}

// ============================================================================
// Subsetting
// ============================================================================

#[test]
fn test_get_between_touching_bounds() {
    let tdim = daily(datetime(2000, 1, 1), datetime(2000, 1, 10));
    let subset = tdim
        .get_between(datetime(2000, 1, 3), datetime(2000, 1, 4))
        .unwrap();

    // Days 2, 3 and 4 touch the closed range
    assert_eq!(subset.len(), 3);
    assert_eq!(subset.uid(), vec![2, 3, 4]);
}

#[test]
fn test_get_between_nothing() {
    let tdim = daily(datetime(2000, 1, 1), datetime(2000, 1, 10));
    let result = tdim.get_between(datetime(2001, 1, 1), datetime(2001, 2, 1));
    assert!(matches!(result, Err(DimensionError::EmptySubset(_))));
}

#[test]
fn test_time_region_months_and_years() {
    let tdim = TemporalDimension::from_values(monthly_dates(2010, 1, 36), None).unwrap();
    let region = TimeRegion {
        year: Some(vec![2011, 2012]),
        month: Some(vec![6, 7]),
        day: None,
    };
    let (subset, idx) = tdim.get_time_region(&region).unwrap();
    assert_eq!(idx, vec![17, 18, 29, 30]);
    let months: Vec<u32> = subset.value().unwrap().iter().map(|d| d.month()).collect();
    assert_eq!(months, vec![6, 7, 6, 7]);
}

#[test]
fn test_time_region_without_match() {
    let tdim = TemporalDimension::from_values(monthly_dates(2010, 1, 12), None).unwrap();
    let result = tdim.get_time_region(&TimeRegion::years(vec![1999]));
    assert!(matches!(result, Err(DimensionError::EmptySubset(_))));
}

#[test]
fn test_time_region_from_json() {
    let region: TimeRegion = serde_json::from_str(r#"{"month": [12, 1, 2]}"#).unwrap();
    assert_eq!(region, TimeRegion::months(vec![12, 1, 2]));
}

#[test]
fn test_numeric_time_resolution_in_days() {
    let units = TimeUnits::parse("hours since 2000-01-01 00:00:00").unwrap();
    let tdim = TemporalDimension::from_numeric(&[0.0, 6.0, 12.0], None, &units).unwrap();
    assert_eq!(tdim.resolution().unwrap(), 0.25);
    assert_eq!(tdim.extent().unwrap().1, datetime(2000, 1, 1) + chrono::Duration::hours(12));
}

// ============================================================================
// Seasonal grouping
// ============================================================================

#[test]
fn test_season_spanning_new_year_without_year() {
    init_tracing();
    let tdim = daily(datetime(2012, 10, 1), datetime(2013, 3, 31));
    let grouping = Grouping::from_json("[[11, 12, 1]]").unwrap();
    let grouped = tdim
        .get_grouping(&grouping, &AnalysisConfig::default())
        .unwrap();

    assert_eq!(grouped.len(), 1);
    assert_eq!(grouped.value().unwrap(), vec![datetime(2012, 12, 16)]);
    assert_eq!(
        grouped.bounds()[0],
        (datetime(2012, 11, 1), datetime(2013, 2, 1))
    );
    // November, December and January only
    let members = grouped.dgroups()[0].iter().filter(|m| **m).count();
    assert_eq!(members, 30 + 31 + 31);
}

#[test]
fn test_summer_by_year() {
    let tdim = daily(datetime(2012, 1, 1), datetime(2013, 12, 31));
    let grouping = Grouping::from_json(r#"[[6, 7, 8], "year"]"#).unwrap();
    let grouped = tdim
        .get_grouping(&grouping, &AnalysisConfig::default())
        .unwrap();

    assert_eq!(
        grouped.value().unwrap(),
        vec![datetime(2012, 7, 16), datetime(2013, 7, 16)]
    );
    assert_eq!(
        grouped.keys()[1],
        GroupKey::Season {
            months: vec![6, 7, 8],
            year: Some(2013)
        }
    );
    assert_eq!(grouped.uid(), vec![1, 2]);
}

#[test]
fn test_winter_by_calendar_year() {
    let tdim = daily_without_bounds(datetime(2012, 1, 1), datetime(2013, 12, 31));
    let grouping = Grouping::from_json(r#"[[12, 1, 2], "year"]"#).unwrap();
    let grouped = tdim
        .get_grouping(&grouping, &AnalysisConfig::default())
        .unwrap();

    assert_eq!(
        grouped.value().unwrap(),
        vec![datetime(2012, 1, 16), datetime(2013, 1, 16)]
    );
    assert_eq!(
        grouped.bounds(),
        &[
            (datetime(2012, 1, 1), datetime(2012, 12, 31)),
            (datetime(2013, 1, 1), datetime(2013, 12, 31)),
        ]
    );
}

#[test]
fn test_partial_winter_centroid_stays_in_bounds() {
    let tdim = daily_without_bounds(datetime(2012, 12, 1), datetime(2012, 12, 31));
    let grouping = Grouping::from_json(r#"[[12, 1, 2], "year"]"#).unwrap();
    let grouped = tdim
        .get_grouping(&grouping, &AnalysisConfig::default())
        .unwrap();

    // Only December is present, so January 16 would fall outside the group
    assert_eq!(grouped.bounds(), &[(datetime(2012, 12, 1), datetime(2012, 12, 31))]);
    assert_eq!(grouped.value().unwrap(), vec![datetime(2012, 12, 16)]);
}

#[test]
fn test_four_seasons_partition_every_element() {
    let tdim = daily(datetime(2000, 1, 1), datetime(2001, 12, 31));
    let grouping = Grouping::seasons(
        vec![vec![3, 4, 5], vec![6, 7, 8], vec![9, 10, 11], vec![12, 1, 2]],
        false,
    )
    .unwrap();
    let grouped = tdim
        .get_grouping(&grouping, &AnalysisConfig::default())
        .unwrap();

    assert_eq!(grouped.len(), 4);
    for i in 0..tdim.len() {
        let owners = grouped.dgroups().iter().filter(|mask| mask[i]).count();
        assert_eq!(owners, 1, "element {} belongs to {} groups", i, owners);
    }
}

#[test]
fn test_single_season_selects_its_months() {
    let tdim = daily(datetime(2000, 1, 1), datetime(2000, 12, 31));
    let values = tdim.value().unwrap();
    let grouping = Grouping::from_json("[[6, 7, 8]]").unwrap();
    let grouped = tdim
        .get_grouping(&grouping, &AnalysisConfig::default())
        .unwrap();

    for (value, member) in values.iter().zip(&grouped.dgroups()[0]) {
        assert_eq!(*member, (6..=8).contains(&value.month()));
    }
}

// ============================================================================
// Calendar grouping
// ============================================================================

#[test]
fn test_group_by_year() {
    let tdim = daily(datetime(1900, 1, 1), datetime(1900, 12, 31));
    let grouping = Grouping::calendar([CalendarPart::Year]).unwrap();
    let grouped = tdim
        .get_grouping(&grouping, &AnalysisConfig::default())
        .unwrap();

    assert_eq!(grouped.value().unwrap(), vec![datetime(1900, 7, 1)]);
    assert_eq!(
        grouped.bounds()[0],
        (datetime(1900, 1, 1), datetime(1901, 1, 1))
    );
}

#[test]
fn test_group_by_month_across_years() {
    let tdim = TemporalDimension::from_values(monthly_dates(2000, 1, 24), None).unwrap();
    let grouping = Grouping::calendar([CalendarPart::Month]).unwrap();
    let grouped = tdim
        .get_grouping(&grouping, &AnalysisConfig::default())
        .unwrap();

    assert_eq!(grouped.len(), 12);
    // Each month group gathers one element per year
    assert!(grouped
        .dgroups()
        .iter()
        .all(|mask| mask.iter().filter(|m| **m).count() == 2));
    assert_eq!(grouped.value().unwrap()[0], datetime(2000, 1, 16));
}

#[test]
fn test_group_by_year_month_uses_config() {
    let tdim = daily(datetime(2001, 3, 1), datetime(2001, 4, 30));
    let grouping = Grouping::from_json(r#"["year", "month"]"#).unwrap();
    let config = AnalysisConfig {
        month_centroid_day: 15,
        ..Default::default()
    };
    let grouped = tdim.get_grouping(&grouping, &config).unwrap();
    assert_eq!(
        grouped.value().unwrap(),
        vec![datetime(2001, 3, 15), datetime(2001, 4, 15)]
    );
}

#[test]
fn test_invalid_config_rejected() {
    let tdim = daily(datetime(2001, 3, 1), datetime(2001, 3, 2));
    let grouping = Grouping::calendar([CalendarPart::Month]).unwrap();
    let config = AnalysisConfig {
        month_centroid_day: 31,
        ..Default::default()
    };
    assert!(matches!(
        tdim.get_grouping(&grouping, &config),
        Err(DimensionError::Common(_))
    ));
}

#[test]
fn test_season_without_elements() {
    let tdim = daily(datetime(2001, 3, 1), datetime(2001, 3, 31));
    let grouping = Grouping::from_json("[[6, 7, 8]]").unwrap();
    assert!(matches!(
        tdim.get_grouping(&grouping, &AnalysisConfig::default()),
        Err(DimensionError::EmptySubset(_))
    ));
}
