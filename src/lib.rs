//! Small terminal tools for a single person.
//! [worklog] keeps a ledger of hours worked per day against a fixed hourly rate, [checklist]
//! decides whether a trade may be taken.
//!

pub mod checklist;
pub mod cli;
pub mod fs;
pub mod utils;
pub mod worklog;
