//! Analysis configuration.
//!
//! One `AnalysisConfig` is built at startup (from defaults, the environment
//! or a serialized file) and handed to the operations that need it.

use serde::{Deserialize, Serialize};

use crate::error::{CommonError, CommonResult};

/// Tunable parameters for grouping and aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Value written for masked aggregation results.
    pub fill_value: f64,

    /// Day of month used as the representative day of a month group.
    pub month_centroid_day: u32,

    /// Month used as the representative month of a year group.
    pub year_centroid_month: u32,

    /// Day of month used as the representative day of a year group.
    pub year_centroid_day: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            fill_value: 1e20,
            month_centroid_day: 16,
            year_centroid_month: 7,
            year_centroid_day: 1,
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from `CLIMSLICE_*` environment variables.
    ///
    /// Unset or unparsable variables keep their default.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("CLIMSLICE_FILL_VALUE") {
            if let Ok(fill) = val.parse() {
                config.fill_value = fill;
            }
        }

        if let Ok(val) = std::env::var("CLIMSLICE_MONTH_CENTROID_DAY") {
            if let Ok(day) = val.parse() {
                config.month_centroid_day = day;
            }
        }

        if let Ok(val) = std::env::var("CLIMSLICE_YEAR_CENTROID_MONTH") {
            if let Ok(month) = val.parse() {
                config.year_centroid_month = month;
            }
        }

        if let Ok(val) = std::env::var("CLIMSLICE_YEAR_CENTROID_DAY") {
            if let Ok(day) = val.parse() {
                config.year_centroid_day = day;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> CommonResult<()> {
        if !(1..=28).contains(&self.month_centroid_day) {
            return Err(CommonError::InvalidConfig(
                "month_centroid_day must be 1-28".to_string(),
            ));
        }

        if !(1..=12).contains(&self.year_centroid_month) {
            return Err(CommonError::InvalidConfig(
                "year_centroid_month must be 1-12".to_string(),
            ));
        }

        if !(1..=28).contains(&self.year_centroid_day) {
            return Err(CommonError::InvalidConfig(
                "year_centroid_day must be 1-28".to_string(),
            ));
        }

        if self.fill_value.is_nan() {
            return Err(CommonError::InvalidConfig(
                "fill_value must not be NaN".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.month_centroid_day, 16);
        assert_eq!(config.year_centroid_month, 7);
    }

    #[test]
    fn test_invalid_month() {
        let config = AnalysisConfig {
            year_centroid_month: 13,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AnalysisConfig = serde_json::from_str(r#"{"fill_value": -999.0}"#).unwrap();
        assert_eq!(config.fill_value, -999.0);
        assert_eq!(config.month_centroid_day, 16);
    }
}
