use thiserror::Error;

use crate::types::ReportStatus;

/// Errors that can occur in the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Report parameters could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No report with the given ID exists.
    #[error("Report not found: {id}")]
    ReportNotFound { id: String },

    /// No scheduled report definition with the given ID exists.
    #[error("Scheduled report not found: {id}")]
    ScheduleNotFound { id: String },

    /// A status write that would move a report backwards or out of a
    /// terminal state.
    #[error("Invalid status transition for report {id}: {from} -> {to}")]
    InvalidTransition {
        id: String,
        from: ReportStatus,
        to: ReportStatus,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;
