//! Error types for the availability checker

use std::fmt;

pub type Result<T> = std::result::Result<T, CheckerError>;

#[derive(Debug)]
pub enum CheckerError {
    /// IO operation failed
    Io(std::io::Error),

    /// HTTP client construction failed
    Http(reqwest::Error),

    /// JSON serialization/deserialization failed
    Json(serde_json::Error),

    /// Configuration error
    Config(String),

    /// Target registry could not be loaded
    Registry(String),

    /// History store read/write/truncate failed
    Store(String),

    /// Generic error with message
    Other(String),
}

impl fmt::Display for CheckerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckerError::Io(err) => write!(f, "IO error: {}", err),
            CheckerError::Http(err) => write!(f, "HTTP error: {}", err),
            CheckerError::Json(err) => write!(f, "JSON error: {}", err),
            CheckerError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CheckerError::Registry(msg) => write!(f, "Registry error: {}", msg),
            CheckerError::Store(msg) => write!(f, "History store error: {}", msg),
            CheckerError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for CheckerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CheckerError::Io(err) => Some(err),
            CheckerError::Http(err) => Some(err),
            CheckerError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CheckerError {
    fn from(err: std::io::Error) -> Self {
        CheckerError::Io(err)
    }
}

impl From<reqwest::Error> for CheckerError {
    fn from(err: reqwest::Error) -> Self {
        CheckerError::Http(err)
    }
}

impl From<serde_json::Error> for CheckerError {
    fn from(err: serde_json::Error) -> Self {
        CheckerError::Json(err)
    }
}
