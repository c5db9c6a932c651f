use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Calendar filter over years, months and days.
///
/// Fields are combined with AND; the values listed for one field are
/// alternatives. An unset field matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeRegion {
    pub year: Option<Vec<i32>>,
    pub month: Option<Vec<u32>>,
    pub day: Option<Vec<u32>>,
}

impl TimeRegion {
    pub fn years(years: impl Into<Vec<i32>>) -> Self {
        Self {
            year: Some(years.into()),
            ..Default::default()
        }
    }

    pub fn months(months: impl Into<Vec<u32>>) -> Self {
        Self {
            month: Some(months.into()),
            ..Default::default()
        }
    }

    pub fn matches(&self, dt: &NaiveDateTime) -> bool {
        fn allowed<V: PartialEq>(field: &Option<Vec<V>>, value: V) -> bool {
            field.as_ref().map_or(true, |values| values.contains(&value))
        }

        allowed(&self.year, dt.year())
            && allowed(&self.month, dt.month())
            && allowed(&self.day, dt.day())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_fields_combine_with_and() {
        let dt = NaiveDate::from_ymd_opt(2013, 6, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let region = TimeRegion {
            year: Some(vec![2012, 2013]),
            month: Some(vec![6]),
            day: None,
        };
        assert!(region.matches(&dt));
        assert!(!TimeRegion::months([7]).matches(&dt));
        assert!(TimeRegion::default().matches(&dt));
    }

    #[test]
    fn test_deserialize_partial() {
        let region: TimeRegion = serde_json::from_str(r#"{"month": [6, 7, 8]}"#).unwrap();
        assert_eq!(region, TimeRegion::months([6, 7, 8]));
    }
}
