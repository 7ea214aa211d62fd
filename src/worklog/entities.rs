use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::record::DayRecord;

/// The struct used for storing a day on disk. Column names match the header the ledger file
/// has always used: `Date,Day,Hours Worked,Hourly Rate,Earned,To Earn`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRowEntity {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Day")]
    pub day: String,
    #[serde(rename = "Hours Worked")]
    pub hours_worked: f64,
    #[serde(rename = "Hourly Rate")]
    pub hourly_rate: f64,
    #[serde(rename = "Earned")]
    pub earned: f64,
    #[serde(rename = "To Earn")]
    pub to_earn: f64,
}

impl From<&DayRecord> for DayRowEntity {
    fn from(record: &DayRecord) -> Self {
        DayRowEntity {
            date: record.date(),
            day: record.day_name().to_owned(),
            hours_worked: record.hours_worked(),
            hourly_rate: record.hourly_rate(),
            earned: record.earned(),
            to_earn: record.to_earn(),
        }
    }
}
