//! Streaming response body.

use bytes::Bytes;
use ferry_core::remote::{ByteStream, RemoteError};

/// Attachment content read from a Jira response.
///
/// Transport frames larger than `chunk_size` are split without copying.
#[derive(Debug)]
pub struct JiraBody {
    response: reqwest::Response,
    pending: Bytes,
    chunk_size: usize,
}

impl JiraBody {
    pub(crate) fn new(response: reqwest::Response, chunk_size: usize) -> Self {
        Self {
            response,
            pending: Bytes::new(),
            chunk_size: chunk_size.max(1),
        }
    }
}

impl ByteStream for JiraBody {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, RemoteError> {
        while self.pending.is_empty() {
            match self
                .response
                .chunk()
                .await
                .map_err(|e| RemoteError::request(e.to_string()))?
            {
                Some(frame) => self.pending = frame,
                None => return Ok(None),
            }
        }
        let take = self.pending.len().min(self.chunk_size);
        Ok(Some(self.pending.split_to(take)))
    }
}
