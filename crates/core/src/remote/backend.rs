//! Backend traits for the remote issue tracker.

use std::future::Future;
use std::path::Path;

use bytes::Bytes;
use serde_json::Value;

use super::error::RemoteError;

/// A response body read chunk by chunk.
///
/// Implementations must never hand out more than their configured chunk
/// size at once, so a consumer holds at most one chunk in memory.
pub trait ByteStream: Send {
    /// Read the next chunk. `Ok(None)` marks the end of the stream.
    fn next_chunk(&mut self) -> impl Future<Output = Result<Option<Bytes>, RemoteError>> + Send;
}

/// Authenticated access to the issue tracker.
///
/// This trait is implemented by the jira crate to provide actual HTTP calls.
pub trait AttachmentBackend: Send + Sync {
    /// Streaming body returned by [`AttachmentBackend::stream_get`].
    type Body: ByteStream;

    /// Fetch the issue object with only its attachment field populated.
    fn fetch_issue_attachments(
        &self,
        issue_key: &str,
    ) -> impl Future<Output = Result<Value, RemoteError>> + Send;

    /// Open an authenticated GET stream. Non-success statuses are errors.
    fn stream_get(&self, url: &str) -> impl Future<Output = Result<Self::Body, RemoteError>> + Send;

    /// Attach a local file to the issue.
    ///
    /// Returns the raw API response, which may or may not carry an id.
    fn create_attachment(
        &self,
        issue_key: &str,
        file_path: &Path,
    ) -> impl Future<Output = Result<Value, RemoteError>> + Send;
}
