// src/profiles/profile.rs

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{DdoptimError, Result};

/// Key of a buffer profile in the registry (e.g. `"F"`, `"AI"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileKey(String);

impl fmt::Display for ProfileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProfileKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Sizing parameters for one category of items.
///
/// Mirrors a `[profile.<KEY>]` table in the settings file:
///
/// ```toml
/// [profile.AI]
/// description = "Purchased international"
/// dlt_threshold_short = 1
/// dlt_threshold_medium = 5
/// dlt_threshold_long = 21
/// lead_time_factor_short = 0.7
/// lead_time_factor_medium = 0.5
/// lead_time_factor_long = 0.25
/// variability_factor = 0.7
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferProfile {
    #[serde(default)]
    pub description: String,

    /// DLT (days) up to which the short factor applies.
    pub dlt_threshold_short: f64,
    /// DLT (days) up to which the medium factor applies.
    pub dlt_threshold_medium: f64,
    /// Upper edge of the long band. Informational: anything above the medium
    /// threshold uses the long factor.
    pub dlt_threshold_long: f64,

    pub lead_time_factor_short: f64,
    pub lead_time_factor_medium: f64,
    pub lead_time_factor_long: f64,

    /// Combined supply/demand variability.
    pub variability_factor: f64,
}

impl BufferProfile {
    /// Lead-time factor for the band `dlt` falls into.
    pub fn lead_time_factor(&self, dlt: f64) -> f64 {
        if dlt <= self.dlt_threshold_short {
            self.lead_time_factor_short
        } else if dlt <= self.dlt_threshold_medium {
            self.lead_time_factor_medium
        } else {
            self.lead_time_factor_long
        }
    }

    /// Check threshold ordering and factor ranges.
    ///
    /// - thresholds strictly ascending (short < medium < long)
    /// - every factor in (0, 1]
    /// - lead-time factors non-increasing from short to long
    pub fn validate(&self, key: &ProfileKey) -> Result<()> {
        if !(self.dlt_threshold_short < self.dlt_threshold_medium
            && self.dlt_threshold_medium < self.dlt_threshold_long)
        {
            return Err(DdoptimError::InvalidProfile(format!(
                "profile '{key}': DLT thresholds must be ascending: short({}) < medium({}) < long({})",
                self.dlt_threshold_short, self.dlt_threshold_medium, self.dlt_threshold_long
            )));
        }

        for (name, value) in [
            ("short", self.lead_time_factor_short),
            ("medium", self.lead_time_factor_medium),
            ("long", self.lead_time_factor_long),
            ("variability", self.variability_factor),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(DdoptimError::InvalidProfile(format!(
                    "profile '{key}': {name} factor must be in (0, 1], got {value}"
                )));
            }
        }

        if !(self.lead_time_factor_short >= self.lead_time_factor_medium
            && self.lead_time_factor_medium >= self.lead_time_factor_long)
        {
            return Err(DdoptimError::InvalidProfile(format!(
                "profile '{key}': lead time factors must not increase: short({}) >= medium({}) >= long({})",
                self.lead_time_factor_short, self.lead_time_factor_medium, self.lead_time_factor_long
            )));
        }

        Ok(())
    }
}
