//! Viewer-level errors
//!
//! The per-tick path has no recoverable errors by design: incomplete
//! progress is expressed through flags and cursors and always converges.
//! Failures surface only at construction and configuration time.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors produced by viewer construction and configuration
#[derive(Error, Debug)]
pub enum ViewerError {
    /// Configuration loading or validation failed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A component was wired up inconsistently
    #[error("Invalid state: {0}")]
    InvalidState(String),
}
