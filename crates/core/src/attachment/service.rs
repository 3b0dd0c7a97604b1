//! Attachment service implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};

use super::error::AttachmentError;
use super::path::{display_name, normalize_path, safe_filename};
use super::types::{
    AttachmentRecord, BatchResult, DownloadReport, DownloadedFile, FailedItem, SavedFile,
    TransferOutcome, UploadReport, UploadedFile,
};
use crate::remote::{AttachmentBackend, ByteStream, RemoteError};

/// Attachment transfers between the local filesystem and an issue tracker.
///
/// Holds a shared handle to the authenticated backend; other components may
/// hold the same handle independently.
pub struct AttachmentService<B: AttachmentBackend> {
    pub(crate) backend: Arc<B>,
}

impl<B: AttachmentBackend> AttachmentService<B> {
    /// Create a new attachment service.
    #[must_use]
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Download one attachment to `target_path`.
    ///
    /// Parent directories are created as needed and an existing file is
    /// overwritten. The body is streamed chunk by chunk.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `url` is empty (no request is made)
    /// - Directories or the file cannot be written
    /// - The remote answers with an error or the stream breaks
    /// - The file is missing after the write
    pub async fn download_attachment(
        &self,
        url: &str,
        target_path: &Path,
    ) -> Result<SavedFile, AttachmentError> {
        if url.is_empty() {
            error!("No URL provided for attachment download");
            return Err(AttachmentError::invalid_input(
                "no URL provided for attachment download",
            ));
        }

        let target_path = normalize_path(target_path)?;
        info!(url, path = %target_path.display(), "Downloading attachment");

        self.fetch_to_file(url, &target_path)
            .await
            .inspect(|saved| {
                info!(
                    path = %saved.path.display(),
                    size = saved.size,
                    "Downloaded attachment"
                );
            })
            .inspect_err(|e| error!(error = %e, url, "Error downloading attachment"))
    }

    async fn fetch_to_file(&self, url: &str, path: &Path) -> Result<SavedFile, AttachmentError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AttachmentError::io(parent, e))?;
        }

        // Open the stream first so an HTTP error leaves no empty file behind.
        let mut body = self.backend.stream_get(url).await?;
        let mut file = fs::File::create(path)
            .await
            .map_err(|e| AttachmentError::io(path, e))?;

        if let Err(e) = write_stream(&mut body, &mut file, path).await {
            drop(file);
            // Best effort; the stream error is what gets reported.
            let _ = fs::remove_file(path).await;
            return Err(e);
        }
        drop(file);

        match fs::metadata(path).await {
            Ok(meta) => Ok(SavedFile {
                path: path.to_path_buf(),
                size: meta.len(),
            }),
            Err(_) => Err(AttachmentError::Verification(path.to_path_buf())),
        }
    }

    /// Upload one local file as an attachment of `issue_key`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `issue_key` or `file_path` is empty
    /// - The file does not exist (nothing is sent)
    /// - The remote fails or creates no attachment
    pub async fn upload_attachment(
        &self,
        issue_key: &str,
        file_path: &Path,
    ) -> Result<UploadedFile, AttachmentError> {
        if issue_key.is_empty() {
            error!("No issue key provided for attachment upload");
            return Err(AttachmentError::invalid_input("no issue key provided"));
        }
        if file_path.as_os_str().is_empty() {
            error!("No file path provided for attachment upload");
            return Err(AttachmentError::invalid_input("no file path provided"));
        }

        self.send_file(issue_key, file_path)
            .await
            .inspect_err(|e| error!(error = %e, issue_key, "Error uploading attachment"))
    }

    async fn send_file(
        &self,
        issue_key: &str,
        file_path: &Path,
    ) -> Result<UploadedFile, AttachmentError> {
        let file_path = normalize_path(file_path)?;
        match fs::metadata(&file_path).await {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => {
                return Err(AttachmentError::invalid_input(format!(
                    "not a regular file: {}",
                    file_path.display()
                )));
            }
            Err(_) => return Err(AttachmentError::FileNotFound(file_path)),
        }

        let filename = display_name(&file_path);
        info!(path = %file_path.display(), issue_key, "Uploading attachment");

        let response = self
            .backend
            .create_attachment(issue_key, &file_path)
            .await?;
        if is_empty_response(&response) {
            return Err(AttachmentError::upload_rejected(filename, issue_key));
        }

        let size = fs::metadata(&file_path)
            .await
            .map_err(|e| AttachmentError::io(&file_path, e))?
            .len();
        info!(filename, issue_key, size, "Uploaded attachment");

        Ok(UploadedFile {
            filename,
            size,
            id: created_attachment_id(&response),
        })
    }

    /// Download every attachment of an issue into `target_dir`.
    ///
    /// Per-item failures are reported in the result and never abort the
    /// batch. Remote filenames are reduced to their basename before use.
    ///
    /// # Errors
    ///
    /// Returns an error only if:
    /// - `issue_key` is empty
    /// - `target_dir` cannot be created
    /// - The issue cannot be retrieved
    pub async fn download_issue_attachments(
        &self,
        issue_key: &str,
        target_dir: &Path,
    ) -> Result<DownloadReport, AttachmentError> {
        if issue_key.is_empty() {
            return Err(AttachmentError::invalid_input("no issue key provided"));
        }

        let target_dir = normalize_path(target_dir)?;
        info!(
            issue_key,
            dir = %target_dir.display(),
            "Downloading attachments"
        );
        fs::create_dir_all(&target_dir)
            .await
            .map_err(|e| AttachmentError::io(&target_dir, e))?;

        let records = self.load_records(issue_key).await?;
        if records.is_empty() {
            let mut report = DownloadReport::from_batch(issue_key, BatchResult::new(0));
            report.message = Some(format!("No attachments found for issue {issue_key}"));
            return Ok(report);
        }

        let mut batch = BatchResult::new(records.len());
        for record in &records {
            let outcome = self.download_record(record, &target_dir).await;
            batch.record(outcome);
        }

        info!(
            issue_key,
            total = batch.total,
            downloaded = batch.succeeded.len(),
            failed = batch.failed.len(),
            "Finished downloading attachments"
        );
        Ok(DownloadReport::from_batch(issue_key, batch))
    }

    async fn download_record(
        &self,
        record: &AttachmentRecord,
        target_dir: &Path,
    ) -> TransferOutcome<DownloadedFile> {
        let Some(url) = record.url.as_deref() else {
            warn!(filename = %record.filename, "No URL for attachment");
            return TransferOutcome::Failed(FailedItem::new(
                &record.filename,
                AttachmentError::MissingUrl,
            ));
        };

        let path = target_dir.join(local_filename(record));
        match self.download_attachment(url, &path).await {
            Ok(saved) => TransferOutcome::Succeeded(DownloadedFile {
                filename: record.filename.clone(),
                path: saved.path,
                size: record.size,
            }),
            Err(e) => TransferOutcome::Failed(FailedItem::new(&record.filename, e)),
        }
    }

    /// Upload several local files to one issue.
    ///
    /// Each file is attempted in order; failures are reported by basename.
    ///
    /// # Errors
    ///
    /// Returns an error only if `issue_key` or `file_paths` is empty, in
    /// which case nothing is sent.
    pub async fn upload_attachments<P: AsRef<Path>>(
        &self,
        issue_key: &str,
        file_paths: &[P],
    ) -> Result<UploadReport, AttachmentError> {
        if issue_key.is_empty() {
            error!("No issue key provided for attachment upload");
            return Err(AttachmentError::invalid_input("no issue key provided"));
        }
        if file_paths.is_empty() {
            error!("No file paths provided for attachment upload");
            return Err(AttachmentError::invalid_input("no file paths provided"));
        }

        info!(
            issue_key,
            count = file_paths.len(),
            "Uploading attachments"
        );

        let mut batch = BatchResult::new(file_paths.len());
        for path in file_paths {
            let path = path.as_ref();
            let outcome = match self.upload_attachment(issue_key, path).await {
                Ok(uploaded) => TransferOutcome::Succeeded(uploaded),
                Err(e) => TransferOutcome::Failed(FailedItem::new(display_name(path), e)),
            };
            batch.record(outcome);
        }

        Ok(UploadReport::from_batch(issue_key, batch))
    }

    /// Fetch and parse attachment metadata for an issue.
    pub(crate) async fn load_records(
        &self,
        issue_key: &str,
    ) -> Result<Vec<AttachmentRecord>, AttachmentError> {
        info!(issue_key, "Fetching issue attachment metadata");
        let issue = self
            .backend
            .fetch_issue_attachments(issue_key)
            .await
            .map_err(|e| match e {
                RemoteError::NotFound { .. } => AttachmentError::issue_not_found(issue_key),
                other => AttachmentError::Remote(other),
            })
            .inspect_err(|e| error!(error = %e, issue_key, "Could not retrieve issue"))?;

        AttachmentRecord::list_from_issue(issue_key, &issue)
    }
}

async fn write_stream<S: ByteStream>(
    body: &mut S,
    file: &mut fs::File,
    path: &Path,
) -> Result<(), AttachmentError> {
    while let Some(chunk) = body.next_chunk().await? {
        file.write_all(&chunk)
            .await
            .map_err(|e| AttachmentError::io(path, e))?;
    }
    file.flush().await.map_err(|e| AttachmentError::io(path, e))
}

/// Filename a record is written under inside the target directory.
fn local_filename(record: &AttachmentRecord) -> PathBuf {
    match safe_filename(&record.filename) {
        Some(name) => PathBuf::from(name),
        None => PathBuf::from(format!("attachment-{}", record.id)),
    }
}

/// Whether an upload response carries no attachment at all.
fn is_empty_response(response: &Value) -> bool {
    match response {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::Number(_) => false,
    }
}

/// Id of the created attachment; the API answers with an object or a list.
fn created_attachment_id(response: &Value) -> Option<String> {
    let attachment = match response {
        Value::Array(items) => items.first()?,
        other => other,
    };
    match attachment.get("id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
