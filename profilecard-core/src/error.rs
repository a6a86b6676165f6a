//! Error types for profilecard core.

use std::{error::Error, fmt, io};

use crate::source::FetchError;

/// Error type for profilecard core operations.
#[derive(Debug)]
pub enum ProfileError {
    /// An underlying I/O error.
    Io(io::Error),
    /// A snapshot or payload failed to (de)serialize.
    Json(serde_json::Error),
    /// A remote fetch failed.
    Fetch(FetchError),
    /// The pipeline configuration is invalid.
    Config(String),
    /// A catch-all error with a message.
    Other(String),
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::Fetch(err) => write!(f, "fetch error: {err}"),
            Self::Config(message) => write!(f, "invalid configuration: {message}"),
            Self::Other(message) => write!(f, "{message}"),
        }
    }
}

impl Error for ProfileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Fetch(err) => Some(err),
            Self::Config(_) | Self::Other(_) => None,
        }
    }
}

impl From<io::Error> for ProfileError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ProfileError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<FetchError> for ProfileError {
    fn from(value: FetchError) -> Self {
        Self::Fetch(value)
    }
}

/// Convenience result type for profilecard core.
pub type Result<T> = std::result::Result<T, ProfileError>;
