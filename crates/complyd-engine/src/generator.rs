use async_trait::async_trait;
use complyd_core::ReportFormat;
use serde_json::Value;

/// Renders a report artifact — the one external collaborator of the engine.
///
/// Implementations live with the host platform (PDF/CSV rendering is out of
/// scope here); the engine only routes parameters in and the artifact
/// location out. Calls may take arbitrarily long and fail arbitrarily; no
/// timeout is imposed. Generation must be idempotent: the queue delivers
/// at-least-once, so the same report may be generated twice.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    /// Produce the artifact and return its location (file path or URL).
    async fn generate(
        &self,
        report_id: &str,
        report_type: &str,
        parameters: Option<&Value>,
        format: ReportFormat,
    ) -> anyhow::Result<String>;
}
