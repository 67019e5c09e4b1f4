//! Error types shared by every backend

use std::path::PathBuf;
use thiserror::Error;

/// Result type for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the client and its collaborators.
///
/// A non-2xx HTTP status is never an error; it is returned as part of the
/// [`Response`](crate::Response).
#[derive(Debug, Error)]
pub enum Error {
    /// The request was rejected before being sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Transport-level failure such as an unreachable host or a timeout
    #[error("Network error: {message}")]
    Network {
        /// Error message
        message: String,
    },

    /// The response body does not match its declared content type
    #[error("Failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// A file could not be read from the filesystem collaborator
    #[error("Failed to read file {}: {source}", path.display())]
    FileAccess {
        /// Path that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A file could not be written by the filesystem collaborator
    #[error("Failed to write file {}: {source}", path.display())]
    FileWrite {
        /// Path that was being written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The cookie store rejected or failed an operation
    #[error("Cookie store error: {0}")]
    CookieStore(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub(crate) fn network(message: impl Into<String>) -> Self {
        Error::Network {
            message: message.into(),
        }
    }

    /// Whether this error came from the transport
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network { .. })
    }

    /// Whether the response body failed to decode
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode(_))
    }

    /// Whether the request was rejected before being sent
    pub fn is_invalid_request(&self) -> bool {
        matches!(self, Error::InvalidRequest(_))
    }
}

#[cfg(feature = "backend-reqwest")]
impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Error::network(format!("Request timed out: {}", error))
        } else if error.is_connect() {
            Error::network(format!("Connection failed: {}", error))
        } else if error.is_builder() {
            Error::InvalidRequest(error.to_string())
        } else {
            Error::network(format!("Request failed: {}", error))
        }
    }
}
