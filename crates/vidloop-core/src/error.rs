//! Error types for vidloop core

use thiserror::Error;

/// Result type alias for vidloop operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised around the loop controller.
///
/// The controller itself is total; these cover the edges of a session:
/// parsing a media source, loading configuration from disk.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid media source '{source_str}': {reason}")]
    InvalidSource {
        source_str: String,
        reason: url::ParseError,
    },

    #[error("Unsupported media scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }

    /// Returns the error code used in event records
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidSource { .. } => "INVALID_SOURCE",
            Error::UnsupportedScheme(_) => "UNSUPPORTED_SCHEME",
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::Json(_) => "CONFIG_PARSE",
            Error::Io(_) => "IO",
        }
    }
}
