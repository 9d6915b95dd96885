use thiserror::Error;

/// Errors that can occur within the dispatch engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Persistence failure.
    #[error("Store error: {0}")]
    Store(#[from] complyd_store::StoreError),

    /// Queue failure surfaced to the caller (consumer setup only —
    /// publish failures are downgraded to the inline path instead).
    #[error("Queue error: {0}")]
    Queue(#[from] complyd_queue::QueueError),

    /// A cron expression that failed validation; rejected before anything
    /// is persisted.
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
