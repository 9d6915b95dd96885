use thiserror::Error;

/// Reasons a cron expression fails validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CronError {
    /// Anything other than exactly five whitespace-separated fields.
    #[error("Expected 5 fields, found {found}")]
    FieldCount { found: usize },

    /// A token that is not `*`, an integer, a range, or a step thereof.
    #[error("Invalid token in {field} field: {token:?}")]
    InvalidToken { field: &'static str, token: String },

    /// An integer outside the field's allowed range.
    #[error("Value {value} out of range for {field} field ({min}-{max})")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    /// A range whose start is greater than its end.
    #[error("Descending range {start}-{end} in {field} field")]
    DescendingRange {
        field: &'static str,
        start: u32,
        end: u32,
    },

    /// A step of zero (steps must be >= 1).
    #[error("Step must be at least 1 in {field} field")]
    ZeroStep { field: &'static str },
}

pub type Result<T> = std::result::Result<T, CronError>;
