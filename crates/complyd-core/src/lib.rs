//! `complyd-core` — shared configuration, types, and errors for the
//! complyd report-dispatch engine.
//!
//! Everything here is consumed by the sibling crates (`complyd-store`,
//! `complyd-queue`, `complyd-engine`); nothing depends on a database or a
//! broker, so this crate stays dependency-light.

pub mod config;
pub mod error;
pub mod types;

pub use config::ComplydConfig;
pub use error::{ComplydError, Result};
pub use types::ReportFormat;
