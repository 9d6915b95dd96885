use std::sync::Arc;

use complyd_queue::{GenerationJob, ReportQueue};
use complyd_store::{NewReport, Report, ReportStore};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::generator::ReportGenerator;

/// Routes each new report through the durable queue or the synchronous
/// fallback, depending on current queue connectivity.
///
/// Runs inline with the originating request — no internal concurrency.
pub struct Dispatcher {
    store: Arc<ReportStore>,
    queue: Arc<dyn ReportQueue>,
    generator: Arc<dyn ReportGenerator>,
}

impl Dispatcher {
    pub fn new(
        store: Arc<ReportStore>,
        queue: Arc<dyn ReportQueue>,
        generator: Arc<dyn ReportGenerator>,
    ) -> Self {
        Self {
            store,
            queue,
            generator,
        }
    }

    /// Accept a report request and route its generation.
    ///
    /// Exactly one path runs: with a live queue the job is published
    /// durable and the report comes back still `queued`; otherwise (never
    /// connected, dropped, or the publish itself failed) generation runs
    /// inline and the report comes back `completed` or `failed`. A publish
    /// failure is downgraded, never surfaced as a creation error.
    pub async fn create_report(&self, request: NewReport) -> Result<Report> {
        let report = self.store.create_report(request)?;

        if self.queue.is_live() {
            match self.queue.publish(&job_for(&report)).await {
                Ok(()) => {
                    info!(report_id = %report.id, "generation job queued");
                    return Ok(report);
                }
                Err(e) => {
                    warn!(
                        report_id = %report.id,
                        "queue publish failed, falling back to inline generation: {e}"
                    );
                }
            }
        } else {
            debug!(report_id = %report.id, "queue offline, generating inline");
        }

        self.generate_inline(report).await
    }

    /// Synchronous fallback: drive the report to a terminal state before
    /// returning. `processing` is persisted before the generator call so
    /// concurrent readers see accurate in-flight state.
    async fn generate_inline(&self, report: Report) -> Result<Report> {
        self.store.mark_processing(&report.id)?;
        let outcome = self
            .generator
            .generate(
                &report.id,
                &report.report_type,
                report.parameters.as_ref(),
                report.format,
            )
            .await;
        match outcome {
            Ok(location) => self.store.mark_completed(&report.id, &location)?,
            // Message text only: a debug representation could leak
            // internals into a client-visible record.
            Err(e) => self.store.mark_failed(&report.id, &e.to_string())?,
        }
        Ok(self.store.get_report(&report.id)?)
    }
}

/// Build the wire job for a report. Reports without parameters publish an
/// empty object — the schema requires the field.
pub(crate) fn job_for(report: &Report) -> GenerationJob {
    GenerationJob {
        report_id: report.id.clone(),
        report_type: report.report_type.clone(),
        parameters: report
            .parameters
            .clone()
            .unwrap_or_else(|| Value::Object(Default::default())),
        format: report.format,
    }
}
