//! Error types for meridian-link.

use std::fmt;

/// Result type for link operations
pub type Result<T> = std::result::Result<T, LinkError>;

/// Errors that can occur while talking to a Meridian server
#[derive(Debug)]
pub enum LinkError {
    /// Connection-level failure (refused, reset, timed out)
    Network(String),

    /// Login or relogin rejected by the server
    Authentication(String),

    /// Non-success HTTP response with the server's message
    Server { status_code: u16, message: String },

    /// Statement rejected by the query engine
    Query(String),

    /// Request or response body could not be encoded/decoded
    Serialization(String),

    /// Client was constructed with invalid settings
    Configuration(String),
}

impl LinkError {
    /// True when the server rejected the request as unauthorized, the one
    /// condition that triggers the single relogin-and-retry.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            LinkError::Server {
                status_code: 401,
                ..
            }
        )
    }
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::Network(msg) => write!(f, "network error: {}", msg),
            LinkError::Authentication(msg) => write!(f, "authentication failed: {}", msg),
            LinkError::Server {
                status_code,
                message,
            } => write!(f, "server error ({}): {}", status_code, message),
            LinkError::Query(msg) => write!(f, "query error: {}", msg),
            LinkError::Serialization(msg) => write!(f, "serialization error: {}", msg),
            LinkError::Configuration(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl std::error::Error for LinkError {}

impl From<reqwest::Error> for LinkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LinkError::Serialization(err.to_string())
        } else {
            LinkError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LinkError {
    fn from(err: serde_json::Error) -> Self {
        LinkError::Serialization(err.to_string())
    }
}
