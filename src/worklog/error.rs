use chrono::NaiveDate;
use thiserror::Error;

/// Failures of the ledger. Operations that decline to change anything (a non-working day, an
/// already logged day, nothing to remove) are reported through their outcome types instead.
#[derive(Debug, Error)]
pub enum WorklogError {
    #[error("{date} is outside of the tracked range {start} to {end}")]
    OutOfRange {
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Stored worklog is corrupt: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
