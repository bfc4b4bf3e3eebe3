//! Application error types.

use thiserror::Error;

/// Application-level errors for Phado.
///
/// Data-quality problems in the input are not errors: they are counted,
/// logged, or reported as findings. These variants cover contract
/// violations and I/O at the edges.
#[derive(Error, Debug)]
pub enum AppError {
    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Domain errors
    #[error("Individual not registered: {0}")]
    MissingEntity(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Photo errors
    #[error("Photo extraction error: {0}")]
    Photo(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}
