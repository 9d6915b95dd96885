//! `complyd-engine` — dispatch and lifecycle driving for report generation.
//!
//! # Dispatch decision
//!
//! [`Dispatcher::create_report`] persists the report in `queued`, then picks
//! exactly one path:
//!
//! - **Queue live** — publish a durable [`GenerationJob`] and return
//!   immediately; a [`Worker`] drains the queue later.
//! - **Queue down or publish failed** — generate inline before returning,
//!   leaving the report `completed` or `failed`, never stuck in `queued`.
//!
//! A publish failure downgrades silently to the inline path; after a report
//! is accepted, no generation error ever propagates to the caller — failures
//! are recorded on the row and observed by polling it.
//!
//! The report generator itself (PDF/CSV rendering) is an external
//! collaborator behind [`ReportGenerator`]; the broker sits behind
//! [`complyd_queue::ReportQueue`]. Both are injected, so each dispatch
//! branch is testable in isolation.
//!
//! [`GenerationJob`]: complyd_queue::GenerationJob

pub mod dispatcher;
pub mod error;
pub mod generator;
pub mod schedules;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use dispatcher::Dispatcher;
pub use error::{EngineError, Result};
pub use generator::ReportGenerator;
pub use schedules::ScheduledReports;
pub use worker::Worker;
