//! The ledger itself. [store::WorklogStore] owns one record per calendar day of the configured
//! range and is the only thing allowed to change them:
//!  - hours are credited with [store::WorklogStore::log_day] and cleared with
//!    [store::WorklogStore::remove_log],
//!  - `earned` and `to_earn` are derived after every change,
//!  - the whole table is written through [storage::WorklogStorage] after every change.

pub mod config;
pub mod entities;
pub mod error;
pub mod record;
pub mod storage;
pub mod store;
