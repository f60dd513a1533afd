use std::path::PathBuf;

use thiserror::Error;

use crate::cause::Cause;

/// Main library error type that encompasses all possible failure modes
#[derive(Error, Debug)]
pub enum DiagnosticsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status error: {status} for {url} - {message}")]
    HttpStatus {
        url: String,
        status: u16,
        message: String,
    },

    #[error("Reference is empty")]
    EmptyReference,

    #[error("Invalid reference: {reference} - {details}")]
    InvalidReference { reference: String, details: String },

    #[error("Unsupported URL scheme: {scheme}")]
    UnsupportedScheme { scheme: String },

    /// The diagnostic sink itself could not be written to.
    #[error("Failed to write diagnostic report: {0}")]
    Reporting(#[source] std::io::Error),

    /// A reporter or handler requested that processing stop.
    #[error("Processing aborted: {0}")]
    Aborted(#[source] Cause),

    #[error("Stylesheet not found or loaded: {path}")]
    StylesheetNotFound { path: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<crate::config::ConfigError> for DiagnosticsError {
    fn from(err: crate::config::ConfigError) -> Self {
        DiagnosticsError::Config(err.to_string())
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, DiagnosticsError>;
