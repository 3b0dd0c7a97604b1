//! Inline attachment content as base64 with count and byte caps.
//!
//! Meant for callers that cannot read the local filesystem and need small
//! assets (screenshots mostly) embedded in a structured result.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{error, info, warn};

use super::error::AttachmentError;
use super::service::AttachmentService;
use super::types::{
    AttachmentRecord, BatchResult, FailedItem, InlineOptions, InlineReport, InlinedAttachment,
    TransferOutcome,
};
use crate::remote::{AttachmentBackend, ByteStream};

/// Preallocation ceiling so a huge cap does not reserve memory up front.
const INITIAL_CAPACITY: usize = 64 * 1024;

/// Byte accumulator that stops at a fixed cap.
#[derive(Debug)]
pub struct CappedBuffer {
    data: Vec<u8>,
    cap: usize,
    truncated: bool,
}

impl CappedBuffer {
    /// Create a buffer holding at most `cap` bytes.
    #[must_use]
    pub fn new(cap: usize) -> Self {
        Self {
            data: Vec::with_capacity(cap.min(INITIAL_CAPACITY)),
            cap,
            truncated: false,
        }
    }

    /// Append a chunk, keeping at most the bytes that still fit.
    ///
    /// Returns `false` once the source is known to exceed the cap; the
    /// caller must stop reading at that point.
    pub fn push(&mut self, chunk: &[u8]) -> bool {
        if chunk.is_empty() {
            return true;
        }
        let remaining = self.cap - self.data.len();
        if chunk.len() > remaining {
            self.data.extend_from_slice(&chunk[..remaining]);
            self.truncated = true;
            return false;
        }
        self.data.extend_from_slice(chunk);
        true
    }

    /// Whether bytes were dropped.
    #[must_use]
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Captured bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the buffer.
    #[must_use]
    pub fn into_parts(self) -> (Vec<u8>, bool) {
        (self.data, self.truncated)
    }
}

impl<B: AttachmentBackend> AttachmentService<B> {
    /// Return attachment contents of an issue encoded as base64.
    ///
    /// Filtering by content type happens first and defines `total`; then
    /// only the first `max_attachments` candidates are fetched, each capped
    /// at `max_bytes_per_attachment` bytes. Candidates past the count cap
    /// appear in neither list.
    ///
    /// # Errors
    ///
    /// Returns an error only if:
    /// - A limit is zero (no request is made)
    /// - `issue_key` is empty
    /// - The issue cannot be retrieved
    pub async fn get_issue_attachments_content(
        &self,
        issue_key: &str,
        options: &InlineOptions,
    ) -> Result<InlineReport, AttachmentError> {
        if options.max_attachments == 0 || options.max_bytes_per_attachment == 0 {
            return Err(AttachmentError::invalid_limit(
                "max_attachments and max_bytes_per_attachment must be positive",
            ));
        }
        if issue_key.is_empty() {
            return Err(AttachmentError::invalid_input("no issue key provided"));
        }

        info!(
            issue_key,
            only_images = options.only_images,
            max_attachments = options.max_attachments,
            max_bytes_per_attachment = options.max_bytes_per_attachment,
            "Fetching attachments content"
        );

        let mut records = self.load_records(issue_key).await?;
        if options.only_images {
            records.retain(AttachmentRecord::is_image);
        }

        let mut batch = BatchResult::new(records.len());
        for record in records.into_iter().take(options.max_attachments) {
            let outcome = self
                .inline_record(record, options.max_bytes_per_attachment)
                .await;
            batch.record(outcome);
        }

        Ok(InlineReport::from_batch(issue_key, batch))
    }

    async fn inline_record(
        &self,
        record: AttachmentRecord,
        max_bytes: usize,
    ) -> TransferOutcome<InlinedAttachment> {
        let Some(url) = record.url.as_deref() else {
            warn!(filename = %record.filename, "No URL for attachment");
            return TransferOutcome::Failed(
                FailedItem::new(&record.filename, AttachmentError::MissingUrl)
                    .with_id(&record.id),
            );
        };

        info!(url, "Downloading attachment content");
        match self.read_capped(url, max_bytes).await {
            Ok(buffer) => {
                let (content, truncated) = buffer.into_parts();
                TransferOutcome::Succeeded(InlinedAttachment {
                    content_base64: STANDARD.encode(&content),
                    truncated,
                    record,
                })
            }
            Err(e) => {
                error!(
                    error = %e,
                    filename = %record.filename,
                    "Error fetching attachment content"
                );
                TransferOutcome::Failed(
                    FailedItem::new(&record.filename, e).with_id(&record.id),
                )
            }
        }
    }

    /// Read at most `cap` bytes from `url`, abandoning the rest of the stream.
    async fn read_capped(&self, url: &str, cap: usize) -> Result<CappedBuffer, AttachmentError> {
        let mut body = self.backend.stream_get(url).await?;
        let mut buffer = CappedBuffer::new(cap);
        while let Some(chunk) = body.next_chunk().await? {
            if !buffer.push(&chunk) {
                break;
            }
        }
        Ok(buffer)
    }
}
