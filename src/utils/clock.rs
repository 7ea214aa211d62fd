use chrono::{Local, NaiveDate};

/// Represents an entity responsible for providing the current date across the application.
/// Lets tests pin "today" to a fixed day.
#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Uses the local timezone of the machine, the calendar day the user is living in.
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
