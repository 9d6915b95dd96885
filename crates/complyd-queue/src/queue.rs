use async_trait::async_trait;

use crate::error::Result;
use crate::message::GenerationJob;

/// Publishing side of the durable generation queue.
///
/// The dispatcher decides between the queued and the inline path by probing
/// [`is_live`](ReportQueue::is_live) and falls back inline when
/// [`publish`](ReportQueue::publish) fails anyway, so implementations never
/// need to retry internally.
#[async_trait]
pub trait ReportQueue: Send + Sync {
    /// Whether the broker connection is currently usable.
    fn is_live(&self) -> bool;

    /// Publish a job as a persistent message to the well-known queue.
    async fn publish(&self, job: &GenerationJob) -> Result<()>;
}
