//! Attachment types and data structures.

use std::path::PathBuf;

use ferry_shared::TransferConfig;
use serde::Serialize;
use serde_json::Value;

use super::error::AttachmentError;

/// Attachment metadata as reported by the issue tracker.
///
/// Immutable; built once per issue lookup and dropped after the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentRecord {
    /// Remote identifier.
    pub id: String,
    /// Display name. Not safe to use as a path as-is.
    pub filename: String,
    /// Size in bytes declared by the remote.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// MIME type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Creation timestamp as sent by the remote.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Display name of the uploader.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Content location. Records without one cannot be transferred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Thumbnail location, when the remote renders one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

impl AttachmentRecord {
    /// Parse a single attachment object from the REST API.
    ///
    /// Returns `None` when `raw` is not a JSON object.
    #[must_use]
    pub fn from_api_response(raw: &Value) -> Option<Self> {
        let obj = raw.as_object()?;
        let text = |key: &str| obj.get(key).and_then(Value::as_str).map(String::from);

        Some(Self {
            id: obj.get("id").map(id_to_string).unwrap_or_default(),
            filename: text("filename").unwrap_or_default(),
            size: obj.get("size").and_then(Value::as_u64),
            content_type: text("mimeType"),
            created: text("created"),
            author: obj
                .get("author")
                .and_then(|a| a.get("displayName"))
                .and_then(Value::as_str)
                .map(String::from),
            url: text("content").filter(|u| !u.is_empty()),
            thumbnail_url: text("thumbnail"),
        })
    }

    /// Extract every attachment record from an issue payload, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not an object or carries no
    /// `fields` member, which is how the remote signals an unreadable issue.
    pub fn list_from_issue(issue_key: &str, issue: &Value) -> Result<Vec<Self>, AttachmentError> {
        let Some(obj) = issue.as_object() else {
            return Err(AttachmentError::UnexpectedPayload(format!(
                "expected an object for issue {issue_key}, got {}",
                json_kind(issue)
            )));
        };
        let Some(fields) = obj.get("fields") else {
            return Err(AttachmentError::issue_not_found(issue_key));
        };

        Ok(fields
            .get("attachment")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Self::from_api_response).collect())
            .unwrap_or_default())
    }

    /// Whether the content type is `image/*`, ignoring case.
    ///
    /// Records without a content type are never images.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().starts_with("image/"))
    }
}

fn id_to_string(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A failed item inside a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedItem {
    /// Remote filename, or the basename of the local path.
    pub filename: String,
    /// Remote id, when the item came from issue metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Failure reason.
    pub error: String,
}

impl FailedItem {
    /// Create a failure without a remote id.
    #[must_use]
    pub fn new(filename: impl Into<String>, error: impl ToString) -> Self {
        Self {
            filename: filename.into(),
            id: None,
            error: error.to_string(),
        }
    }

    /// Attach the remote id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Fate of one item in a batch.
#[derive(Debug, Clone)]
pub enum TransferOutcome<T> {
    /// Item transferred.
    Succeeded(T),
    /// Item failed; the batch carries on.
    Failed(FailedItem),
}

/// Ordered per-item outcomes of a batch.
///
/// `succeeded.len() + failed.len() <= total`. Items cut by a count limit
/// appear in neither list.
#[derive(Debug, Clone)]
pub struct BatchResult<T> {
    /// Candidate count before any count limit.
    pub total: usize,
    /// Successful items, in input order.
    pub succeeded: Vec<T>,
    /// Failed items, in input order.
    pub failed: Vec<FailedItem>,
}

impl<T> BatchResult<T> {
    /// Create an empty result for `total` candidates.
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self {
            total,
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Append one item's outcome.
    pub fn record(&mut self, outcome: TransferOutcome<T>) {
        match outcome {
            TransferOutcome::Succeeded(item) => self.succeeded.push(item),
            TransferOutcome::Failed(item) => self.failed.push(item),
        }
    }
}

/// File written by a single download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedFile {
    /// Absolute destination path.
    pub path: PathBuf,
    /// Bytes on disk after the write.
    pub size: u64,
}

/// Successfully downloaded attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadedFile {
    /// Remote filename.
    pub filename: String,
    /// Where the content was written.
    pub path: PathBuf,
    /// Size declared by the remote.
    pub size: Option<u64>,
}

/// Result of downloading every attachment of an issue.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadReport {
    /// Issue key.
    pub issue_key: String,
    /// Attachments found on the issue.
    pub total: usize,
    /// Downloaded attachments, in metadata order.
    pub downloaded: Vec<DownloadedFile>,
    /// Failed attachments, in metadata order.
    pub failed: Vec<FailedItem>,
    /// Informational note, set when the issue has nothing to download.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DownloadReport {
    pub(crate) fn from_batch(issue_key: &str, batch: BatchResult<DownloadedFile>) -> Self {
        Self {
            issue_key: issue_key.to_string(),
            total: batch.total,
            downloaded: batch.succeeded,
            failed: batch.failed,
            message: None,
        }
    }
}

/// Successfully uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    /// Basename of the local file.
    pub filename: String,
    /// Local size in bytes.
    pub size: u64,
    /// Remote-assigned id; some deployments do not return one.
    pub id: Option<String>,
}

/// Result of uploading several files to an issue.
#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    /// Issue key.
    pub issue_key: String,
    /// Files attempted.
    pub total: usize,
    /// Uploaded files, in input order.
    pub uploaded: Vec<UploadedFile>,
    /// Failed files, in input order.
    pub failed: Vec<FailedItem>,
}

impl UploadReport {
    pub(crate) fn from_batch(issue_key: &str, batch: BatchResult<UploadedFile>) -> Self {
        Self {
            issue_key: issue_key.to_string(),
            total: batch.total,
            uploaded: batch.succeeded,
            failed: batch.failed,
        }
    }
}

/// Attachment metadata with its (possibly truncated) content inlined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlinedAttachment {
    /// Source metadata.
    #[serde(flatten)]
    pub record: AttachmentRecord,
    /// Base64 (standard alphabet, padded) of the captured bytes.
    pub content_base64: String,
    /// True when the source had more bytes than the cap.
    pub truncated: bool,
}

/// Result of inlining attachment content.
#[derive(Debug, Clone, Serialize)]
pub struct InlineReport {
    /// Issue key.
    pub issue_key: String,
    /// Attachments left after filtering, before the count cap.
    pub total: usize,
    /// Attachments successfully inlined.
    pub returned: usize,
    /// Inlined attachments, in metadata order.
    pub attachments: Vec<InlinedAttachment>,
    /// Failed attachments, in metadata order.
    pub failed: Vec<FailedItem>,
}

impl InlineReport {
    pub(crate) fn from_batch(issue_key: &str, batch: BatchResult<InlinedAttachment>) -> Self {
        Self {
            issue_key: issue_key.to_string(),
            total: batch.total,
            returned: batch.succeeded.len(),
            attachments: batch.succeeded,
            failed: batch.failed,
        }
    }
}

/// Limits for inlining attachment content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineOptions {
    /// Keep only `image/*` attachments.
    pub only_images: bool,
    /// Maximum attachments to fetch.
    pub max_attachments: usize,
    /// Maximum bytes captured per attachment.
    pub max_bytes_per_attachment: usize,
}

impl Default for InlineOptions {
    fn default() -> Self {
        Self {
            only_images: true,
            max_attachments: 5,
            max_bytes_per_attachment: 1_000_000,
        }
    }
}

impl From<&TransferConfig> for InlineOptions {
    fn from(config: &TransferConfig) -> Self {
        Self {
            only_images: config.only_images,
            max_attachments: config.max_attachments,
            max_bytes_per_attachment: config.max_bytes_per_attachment,
        }
    }
}
