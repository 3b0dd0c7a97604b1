//! Attachment error types.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::remote::RemoteError;

/// Attachment operation errors.
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// Missing or malformed argument, detected before any I/O.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Issue does not exist or its metadata cannot be read.
    #[error("could not retrieve issue {0}")]
    IssueNotFound(String),

    /// Local file to upload does not exist.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Attachment record carries no content URL.
    #[error("no URL available for attachment")]
    MissingUrl,

    /// Download completed but the file is not on disk.
    #[error("file was not created at {}", .0.display())]
    Verification(PathBuf),

    /// Count or byte limit is not strictly positive.
    #[error("invalid limit: {0}")]
    InvalidLimit(String),

    /// Remote accepted the request but created no attachment.
    #[error("failed to upload attachment {filename} to {issue_key}")]
    UploadRejected {
        /// Basename of the uploaded file.
        filename: String,
        /// Target issue.
        issue_key: String,
    },

    /// Issue payload does not have the expected shape.
    #[error("unexpected issue payload: {0}")]
    UnexpectedPayload(String),

    /// Local filesystem operation failed.
    #[error("i/o error at {}: {source}", .path.display())]
    Io {
        /// Path being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Remote call failed.
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),
}

impl AttachmentError {
    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an issue not found error.
    #[must_use]
    pub fn issue_not_found(issue_key: impl Into<String>) -> Self {
        Self::IssueNotFound(issue_key.into())
    }

    /// Create an invalid limit error.
    #[must_use]
    pub fn invalid_limit(msg: impl Into<String>) -> Self {
        Self::InvalidLimit(msg.into())
    }

    /// Create an upload rejected error.
    #[must_use]
    pub fn upload_rejected(filename: impl Into<String>, issue_key: impl Into<String>) -> Self {
        Self::UploadRejected {
            filename: filename.into(),
            issue_key: issue_key.into(),
        }
    }

    /// Create an I/O error bound to a path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Returns the error code reported in structured results.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) | Self::MissingUrl => "INPUT_ERROR",
            Self::IssueNotFound(_) | Self::FileNotFound(_) => "NOT_FOUND",
            Self::Verification(_) => "VERIFICATION_ERROR",
            Self::InvalidLimit(_) => "LIMIT_ERROR",
            Self::UploadRejected { .. } | Self::Remote(_) => "TRANSPORT_ERROR",
            Self::UnexpectedPayload(_) => "PAYLOAD_ERROR",
            Self::Io { .. } => "IO_ERROR",
        }
    }
}
