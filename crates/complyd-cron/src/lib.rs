//! `complyd-cron` — 5-field cron expression evaluation for scheduled reports.
//!
//! # Expression grammar
//!
//! `minute hour day-of-month month day-of-week`, whitespace-separated.
//!
//! | Field        | Range | Notes                         |
//! |--------------|-------|-------------------------------|
//! | minute       | 0–59  |                               |
//! | hour         | 0–23  |                               |
//! | day-of-month | 1–31  |                               |
//! | month        | 1–12  |                               |
//! | day-of-week  | 0–7   | 0 and 7 are both Sunday       |
//!
//! Each field accepts `*`, a single integer, an inclusive range `a-b`, a
//! comma-separated list of those, and a step `*/n` or `a-b/n`.
//!
//! # Day-field conjunction
//!
//! Unlike conventional cron (which ORs day-of-month and day-of-week when
//! both are restricted), a timestamp here must satisfy **all five** fields,
//! the two day fields included. `0 9 13 * 5` fires only on Friday the 13th
//! at 09:00, never on every 13th or every Friday. This is intentional
//! behaviour, relied on by existing schedules — do not "fix" it.
//!
//! # Next-run computation
//!
//! [`CronExpression::next_after`] scans forward one minute at a time,
//! starting one minute after the reference instant (seconds zeroed), until
//! a matching minute is found. The scan is bounded at roughly one year of
//! minutes; a schedule with no occurrence inside the bound (e.g. day 31 of
//! a 30-day month) yields `None` instead of looping forever.

pub mod error;
pub mod expression;

pub use error::{CronError, Result};
pub use expression::{is_valid, CronExpression};
