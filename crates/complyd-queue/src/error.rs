use thiserror::Error;

/// Errors that can occur in the queue layer.
#[derive(Debug, Error)]
pub enum QueueError {
    /// Underlying AMQP / lapin error.
    #[error("Broker error: {0}")]
    Broker(#[from] lapin::Error),

    /// A job payload could not be (de)serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The broker refused or never confirmed a publish.
    #[error("Publish failed: {0}")]
    Publish(String),
}

pub type Result<T> = std::result::Result<T, QueueError>;
