use complyd_core::ReportFormat;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle state of a report record.
///
/// Transitions are strictly forward; `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Accepted, waiting for a worker (or the inline path) to pick it up.
    Queued,
    /// Generation is in flight.
    Processing,
    /// Generation succeeded; `download_url` is set.
    Completed,
    /// Generation failed; `error_message` is set.
    Failed,
}

impl ReportStatus {
    /// Whether no further transition is allowed out of this state.
    pub fn is_terminal(self) -> bool {
        matches!(self, ReportStatus::Completed | ReportStatus::Failed)
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ReportStatus::Queued => "queued",
            ReportStatus::Processing => "processing",
            ReportStatus::Completed => "completed",
            ReportStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "queued" => Ok(ReportStatus::Queued),
            "processing" => Ok(ReportStatus::Processing),
            "completed" => Ok(ReportStatus::Completed),
            "failed" => Ok(ReportStatus::Failed),
            other => Err(format!("unknown report status: {other}")),
        }
    }
}

/// A persisted report request and its lifecycle state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// UUID v4 string — primary key.
    pub id: String,
    /// User that requested the report.
    pub owner: String,
    /// Report kind, opaque to the engine (e.g. "gap-analysis").
    pub report_type: String,
    /// Artifact format handed to the generator.
    pub format: ReportFormat,
    /// Opaque structured payload forwarded to the generator.
    pub parameters: Option<Value>,
    /// Current lifecycle state.
    pub status: ReportStatus,
    /// Artifact location; set exactly once, on `completed`.
    pub download_url: Option<String>,
    /// Human-readable failure text; set exactly once, on `failed`.
    pub error_message: Option<String>,
    /// ISO-8601 timestamp of record creation.
    pub created_at: String,
    /// ISO-8601 timestamp of the last status write.
    pub updated_at: String,
}

/// Fields supplied by the caller when requesting a report.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub owner: String,
    pub report_type: String,
    pub format: ReportFormat,
    pub parameters: Option<Value>,
}

/// A persisted recurring report definition.
///
/// `next_run_at` is NULL or strictly in the future of the instant it was
/// computed from, and always agrees with evaluating `cron` at that instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledReport {
    pub id: String,
    pub owner: String,
    pub report_type: String,
    /// Optional rendering template reference, opaque to the engine.
    pub template_id: Option<String>,
    pub parameters: Option<Value>,
    pub format: ReportFormat,
    /// 5-field cron expression; validated before it is ever persisted.
    pub cron: String,
    pub is_active: bool,
    /// ISO-8601 timestamp of the most recent trigger, if any.
    pub last_run_at: Option<String>,
    /// ISO-8601 timestamp of the next planned trigger, if any.
    pub next_run_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields supplied by the caller when defining a scheduled report.
#[derive(Debug, Clone)]
pub struct NewScheduledReport {
    pub owner: String,
    pub report_type: String,
    pub template_id: Option<String>,
    pub parameters: Option<Value>,
    pub format: ReportFormat,
    pub cron: String,
}
