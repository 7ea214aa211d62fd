use std::{collections::HashSet, path::Path};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::WorklogError;

/// Constants a [WorklogStore](super::store::WorklogStore) is built with. None of them change
/// while the store is alive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorklogConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub hourly_rate: f64,
    pub standard_hours_per_workday: f64,
    pub non_working_days: HashSet<Weekday>,
    /// Makes logging today refuse an already logged day, the same way backfilling does.
    pub strict_today: bool,
    /// Display only.
    pub currency: String,
}

impl Default for WorklogConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2025, 9, 14).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2025, 10, 11).unwrap_or_default(),
            hourly_rate: 12.48,
            standard_hours_per_workday: 4.,
            non_working_days: HashSet::from([Weekday::Sun, Weekday::Wed]),
            strict_today: false,
            currency: "£".into(),
        }
    }
}

impl WorklogConfig {
    /// Reads configuration from a json file. Missing file means defaults, missing keys fall
    /// back to their default values.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        let config = match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse configuration {path:?}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No configuration at {path:?}, using defaults");
                Self::default()
            }
            Err(e) => Err(e).with_context(|| format!("Failed to read configuration {path:?}"))?,
        };
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write configuration {path:?}"))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), WorklogError> {
        if self.start_date > self.end_date {
            return Err(WorklogError::InvalidConfig(format!(
                "start date {} is after end date {}",
                self.start_date, self.end_date
            )));
        }
        if !self.hourly_rate.is_finite() || self.hourly_rate <= 0. {
            return Err(WorklogError::InvalidConfig(format!(
                "hourly rate must be positive, got {}",
                self.hourly_rate
            )));
        }
        if !self.standard_hours_per_workday.is_finite() || self.standard_hours_per_workday <= 0. {
            return Err(WorklogError::InvalidConfig(format!(
                "standard hours per workday must be positive, got {}",
                self.standard_hours_per_workday
            )));
        }
        Ok(())
    }

    pub fn is_working_day(&self, day: Weekday) -> bool {
        !self.non_working_days.contains(&day)
    }

    /// What a fully logged working day is worth.
    pub fn daily_quota_value(&self) -> f64 {
        self.standard_hours_per_workday * self.hourly_rate
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}
