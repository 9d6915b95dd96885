//! `complyd-queue` — durable delivery of report-generation jobs.
//!
//! The dispatcher talks to the broker through the [`ReportQueue`] trait so
//! queue connectivity stays an injectable seam: the AMQP implementation
//! answers the liveness probe from its real connection state, test doubles
//! answer from a flag, and both dispatch branches stay testable without a
//! broker.
//!
//! Jobs are JSON messages published persistent (delivery mode 2) to a
//! single well-known queue; the wire shape is pinned in
//! `tests/job_schema.rs`.

pub mod amqp;
pub mod error;
pub mod message;
pub mod queue;

pub use amqp::AmqpReportQueue;
pub use error::{QueueError, Result};
pub use message::GenerationJob;
pub use queue::ReportQueue;
