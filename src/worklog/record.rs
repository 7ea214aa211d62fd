use chrono::{Datelike, NaiveDate, Weekday};

use crate::utils::time::weekday_name;

/// One calendar day of the ledger. Derived columns are private and only change through the
/// store, so `earned` always equals `hours_worked * hourly_rate`.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRecord {
    date: NaiveDate,
    weekday: Weekday,
    hours_worked: f64,
    hourly_rate: f64,
    earned: f64,
    to_earn: f64,
}

impl DayRecord {
    pub(crate) fn new(date: NaiveDate, hourly_rate: f64) -> Self {
        Self {
            date,
            weekday: date.weekday(),
            hours_worked: 0.,
            hourly_rate,
            earned: 0.,
            to_earn: 0.,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn day_name(&self) -> &'static str {
        weekday_name(self.weekday)
    }

    pub fn hours_worked(&self) -> f64 {
        self.hours_worked
    }

    pub fn hourly_rate(&self) -> f64 {
        self.hourly_rate
    }

    pub fn earned(&self) -> f64 {
        self.earned
    }

    pub fn to_earn(&self) -> f64 {
        self.to_earn
    }

    pub fn is_logged(&self) -> bool {
        self.hours_worked > 0.
    }

    /// Sets hours and the matching `earned` value in one step.
    pub(crate) fn set_hours(&mut self, hours: f64) {
        self.hours_worked = hours;
        self.earned = hours * self.hourly_rate;
    }

    pub(crate) fn set_to_earn(&mut self, to_earn: f64) {
        self.to_earn = to_earn;
    }
}
