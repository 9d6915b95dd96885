use complyd_core::ReportFormat;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One queued unit of report-generation work.
///
/// Wire shape (camelCase, consumed by every worker version in the fleet):
///
/// ```json
/// { "reportId": "…", "reportType": "…", "parameters": { }, "format": "pdf" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationJob {
    pub report_id: String,
    pub report_type: String,
    /// Opaque structured payload; `{}` when the report carries none.
    pub parameters: Value,
    pub format: ReportFormat,
}
