//! Remote error types.

use thiserror::Error;

/// Errors raised by the remote issue tracker or the transport beneath it.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Non-success HTTP status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// Requested issue or attachment does not exist.
    #[error("remote resource not found: {resource}")]
    NotFound {
        /// Issue key or URL that was not found.
        resource: String,
    },

    /// Request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Request(String),

    /// Response body was not what the API promised.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// Client could not be built from the given settings.
    #[error("client configuration error: {0}")]
    Configuration(String),
}

impl RemoteError {
    /// Create a status error.
    #[must_use]
    pub fn status(status: u16, url: impl Into<String>) -> Self {
        Self::Status {
            status,
            url: url.into(),
        }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a request error.
    #[must_use]
    pub fn request(msg: impl Into<String>) -> Self {
        Self::Request(msg.into())
    }

    /// Create a decode error.
    #[must_use]
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
