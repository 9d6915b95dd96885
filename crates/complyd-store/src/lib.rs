//! `complyd-store` — SQLite persistence for report records and scheduled
//! report definitions.
//!
//! # Lifecycle enforcement
//!
//! A [`Report`] moves strictly forward: `queued → processing → completed`
//! or `queued → processing → failed`. The store is where the invariant
//! lives — every status write is a guarded `UPDATE … WHERE status = …`, so
//! an out-of-order write fails with [`StoreError::InvalidTransition`] and
//! leaves the row untouched. Terminal rows are immutable; retrying a report
//! means creating a new one.
//!
//! `download_url` is written only with the `completed` transition and
//! `error_message` only with `failed`, keeping the two mutually exclusive
//! by construction.

pub mod db;
pub mod error;
pub mod store;
pub mod types;

pub use error::{Result, StoreError};
pub use store::ReportStore;
pub use types::{NewReport, NewScheduledReport, Report, ReportStatus, ScheduledReport};
