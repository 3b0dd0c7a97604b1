//! Attachment transfers for issue tracker attachments.
//!
//! This module provides:
//! - Single download to disk and single upload from disk
//! - Batch download/upload that reports per-item failures and carries on
//! - Base64 inlining of attachment content with count and byte caps
//! - Structured response envelopes for callers

mod error;
mod inline;
mod path;
mod response;
mod service;
mod types;


pub use error::AttachmentError;
pub use inline::CappedBuffer;
pub use path::safe_filename;
pub use response::to_response;
pub use service::AttachmentService;
pub use types::{
    AttachmentRecord, BatchResult, DownloadReport, DownloadedFile, FailedItem, InlineOptions,
    InlineReport, InlinedAttachment, SavedFile, TransferOutcome, UploadReport, UploadedFile,
};
