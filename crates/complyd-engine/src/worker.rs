use std::sync::Arc;

use complyd_queue::{AmqpReportQueue, GenerationJob};
use complyd_store::ReportStore;
use futures_util::StreamExt;
use lapin::options::BasicAckOptions;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::generator::ReportGenerator;

/// Asynchronous consumer of queued generation jobs.
///
/// One logical consumer handles one delivery at a time (prefetch controls
/// this at the channel level); horizontal scale is more worker processes,
/// which share nothing in memory — the report row is the only
/// serialization point. Every delivery is acked exactly once, on success,
/// failure, parse error, or status-write error alike, so a single bad job
/// can never block the queue.
pub struct Worker {
    store: Arc<ReportStore>,
    generator: Arc<dyn ReportGenerator>,
}

impl Worker {
    pub fn new(store: Arc<ReportStore>, generator: Arc<dyn ReportGenerator>) -> Self {
        Self { store, generator }
    }

    /// Consume jobs until `shutdown` broadcasts `true` or the broker
    /// closes the stream.
    pub async fn run(
        &self,
        queue: &AmqpReportQueue,
        prefetch: u16,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        let mut consumer = queue.consumer(prefetch).await?;
        info!(queue = %queue.queue_name(), "report generation worker started");

        loop {
            tokio::select! {
                delivery = consumer.next() => {
                    match delivery {
                        Some(Ok(delivery)) => {
                            self.handle_payload(&delivery.data).await;
                            // Unconditional: a delivery that could not be
                            // processed must still leave the queue.
                            if let Err(e) = delivery.acker.ack(BasicAckOptions::default()).await {
                                error!("failed to ack delivery: {e}");
                            }
                        }
                        Some(Err(e)) => {
                            error!("consumer error: {e}");
                        }
                        None => {
                            info!("consumer stream ended");
                            break;
                        }
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("report generation worker shutting down");
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Decode and process one delivery payload.
    ///
    /// Infallible by design: every failure is logged or recorded on the
    /// report, so the caller can always ack.
    pub async fn handle_payload(&self, payload: &[u8]) {
        let job: GenerationJob = match serde_json::from_slice(payload) {
            Ok(job) => job,
            Err(e) => {
                // A malformed payload can never succeed; drop without retry
                // and without touching any report.
                warn!("discarding malformed generation job payload: {e}");
                return;
            }
        };
        self.process_job(&job).await;
    }

    /// Drive one decoded job to a terminal report state.
    pub async fn process_job(&self, job: &GenerationJob) {
        if let Err(e) = self.store.mark_processing(&job.report_id) {
            // Redeliveries of already-finished reports land here
            // (at-least-once queue, terminal rows immutable): skip, the
            // delivery still gets acked.
            warn!(report_id = %job.report_id, "skipping generation job: {e}");
            return;
        }

        let parameters = match &job.parameters {
            serde_json::Value::Null => None,
            value => Some(value),
        };
        let outcome = self
            .generator
            .generate(&job.report_id, &job.report_type, parameters, job.format)
            .await;

        let write = match outcome {
            Ok(location) => {
                info!(report_id = %job.report_id, "report generated");
                self.store.mark_completed(&job.report_id, &location)
            }
            Err(e) => {
                // Message text only — no stack traces in the record.
                info!(report_id = %job.report_id, "generation failed: {e}");
                self.store.mark_failed(&job.report_id, &e.to_string())
            }
        };
        if let Err(e) = write {
            // Logged but not propagated: the ack must still happen.
            error!(report_id = %job.report_id, "status write failed after generation: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{memory_store, new_request, FailingGenerator, OkGenerator};
    use complyd_core::ReportFormat;
    use complyd_store::ReportStatus;
    use serde_json::json;

    fn job_for_id(id: &str) -> GenerationJob {
        GenerationJob {
            report_id: id.to_string(),
            report_type: "gap-analysis".to_string(),
            parameters: json!({}),
            format: ReportFormat::Pdf,
        }
    }

    #[tokio::test]
    async fn valid_job_completes_the_report() {
        let store = memory_store();
        let report = store.create_report(new_request()).unwrap();
        let worker = Worker::new(store.clone(), Arc::new(OkGenerator::new("/reports/out.pdf")));

        let payload = serde_json::to_vec(&job_for_id(&report.id)).unwrap();
        worker.handle_payload(&payload).await;

        let done = store.get_report(&report.id).unwrap();
        assert_eq!(done.status, ReportStatus::Completed);
        assert_eq!(done.download_url.as_deref(), Some("/reports/out.pdf"));
    }

    #[tokio::test]
    async fn generator_error_writes_the_message_text() {
        let store = memory_store();
        let report = store.create_report(new_request()).unwrap();
        let worker = Worker::new(store.clone(), Arc::new(FailingGenerator::new("template missing")));

        worker.process_job(&job_for_id(&report.id)).await;

        let failed = store.get_report(&report.id).unwrap();
        assert_eq!(failed.status, ReportStatus::Failed);
        assert_eq!(failed.error_message.as_deref(), Some("template missing"));
    }

    #[tokio::test]
    async fn malformed_payload_touches_no_report() {
        let store = memory_store();
        let report = store.create_report(new_request()).unwrap();
        let generator = Arc::new(OkGenerator::new("/reports/out.pdf"));
        let worker = Worker::new(store.clone(), generator.clone());

        worker.handle_payload(b"{ not json").await;
        worker.handle_payload(b"{\"unexpected\":true}").await;

        assert_eq!(generator.calls(), 0);
        assert_eq!(
            store.get_report(&report.id).unwrap().status,
            ReportStatus::Queued
        );
    }

    #[tokio::test]
    async fn redelivered_job_for_finished_report_is_skipped() {
        let store = memory_store();
        let report = store.create_report(new_request()).unwrap();
        let generator = Arc::new(OkGenerator::new("/reports/out.pdf"));
        let worker = Worker::new(store.clone(), generator.clone());
        let job = job_for_id(&report.id);

        worker.process_job(&job).await;
        // At-least-once delivery: the same job arrives again.
        worker.process_job(&job).await;

        assert_eq!(generator.calls(), 1);
        let done = store.get_report(&report.id).unwrap();
        assert_eq!(done.status, ReportStatus::Completed);
    }

    #[tokio::test]
    async fn job_for_unknown_report_is_dropped_quietly() {
        let store = memory_store();
        let worker = Worker::new(store, Arc::new(OkGenerator::new("/reports/out.pdf")));
        // Must not panic and must not error — the delivery gets acked.
        worker.process_job(&job_for_id("no-such-report")).await;
    }
}
