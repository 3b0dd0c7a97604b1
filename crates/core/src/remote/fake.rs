//! In-memory backend for tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use serde_json::{Value, json};

use super::{AttachmentBackend, ByteStream, RemoteError};

/// A call made against the fake, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Fetch(String),
    Get(String),
    Create(String, PathBuf),
}

#[derive(Debug, Clone)]
enum Chunk {
    Data(Bytes),
    Fail(String),
}

#[derive(Debug, Clone)]
enum Resource {
    Body(Vec<Chunk>),
    Status(u16),
}

/// Stream over a canned list of chunks, counting how many were pulled.
pub(crate) struct FakeBody {
    chunks: VecDeque<Chunk>,
    reads: Arc<AtomicUsize>,
}

impl ByteStream for FakeBody {
    async fn next_chunk(&mut self) -> Result<Option<Bytes>, RemoteError> {
        let Some(chunk) = self.chunks.pop_front() else {
            return Ok(None);
        };
        self.reads.fetch_add(1, Ordering::SeqCst);
        match chunk {
            Chunk::Data(bytes) => Ok(Some(bytes)),
            Chunk::Fail(msg) => Err(RemoteError::request(msg)),
        }
    }
}

/// Fake tracker holding issues, downloadable bodies and upload behavior.
#[derive(Default)]
pub(crate) struct FakeBackend {
    issues: HashMap<String, Value>,
    resources: HashMap<String, Resource>,
    reads: Mutex<HashMap<String, Arc<AtomicUsize>>>,
    rejected_uploads: HashSet<String>,
    upload_response: Option<Value>,
    next_id: AtomicU64,
    calls: Mutex<Vec<Call>>,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self {
            next_id: AtomicU64::new(10_000),
            ..Self::default()
        }
    }

    /// Register an issue payload as returned by the API.
    pub(crate) fn with_issue(mut self, key: &str, payload: Value) -> Self {
        self.issues.insert(key.to_string(), payload);
        self
    }

    /// Register an issue whose `fields.attachment` is `attachments`.
    pub(crate) fn with_attachments(self, key: &str, attachments: Value) -> Self {
        self.with_issue(key, json!({ "key": key, "fields": { "attachment": attachments } }))
    }

    /// Serve `content` at `url`, split into chunks of `chunk_size` bytes.
    pub(crate) fn with_body(mut self, url: &str, content: &[u8], chunk_size: usize) -> Self {
        let chunks = content
            .chunks(chunk_size.max(1))
            .map(|c| Chunk::Data(Bytes::copy_from_slice(c)))
            .collect();
        self.resources.insert(url.to_string(), Resource::Body(chunks));
        self
    }

    /// Serve `prefix` then fail mid-stream.
    pub(crate) fn with_broken_body(mut self, url: &str, prefix: &[u8]) -> Self {
        let chunks = vec![
            Chunk::Data(Bytes::copy_from_slice(prefix)),
            Chunk::Fail("connection reset by peer".to_string()),
        ];
        self.resources.insert(url.to_string(), Resource::Body(chunks));
        self
    }

    /// Answer `url` with an HTTP error status.
    pub(crate) fn with_status(mut self, url: &str, status: u16) -> Self {
        self.resources
            .insert(url.to_string(), Resource::Status(status));
        self
    }

    /// Reject uploads of files with this basename.
    pub(crate) fn rejecting_upload(mut self, filename: &str) -> Self {
        self.rejected_uploads.insert(filename.to_string());
        self
    }

    /// Answer every upload with this payload instead of a generated one.
    pub(crate) fn with_upload_response(mut self, response: Value) -> Self {
        self.upload_response = Some(response);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of remote GETs issued for content.
    pub(crate) fn get_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Get(_)))
            .count()
    }

    /// Number of chunks pulled from `url` across all streams.
    pub(crate) fn chunks_read(&self, url: &str) -> usize {
        self.reads
            .lock()
            .unwrap()
            .get(url)
            .map_or(0, |r| r.load(Ordering::SeqCst))
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl AttachmentBackend for FakeBackend {
    type Body = FakeBody;

    async fn fetch_issue_attachments(&self, issue_key: &str) -> Result<Value, RemoteError> {
        self.record(Call::Fetch(issue_key.to_string()));
        self.issues
            .get(issue_key)
            .cloned()
            .ok_or_else(|| RemoteError::not_found(issue_key))
    }

    async fn stream_get(&self, url: &str) -> Result<FakeBody, RemoteError> {
        self.record(Call::Get(url.to_string()));
        match self.resources.get(url) {
            Some(Resource::Body(chunks)) => {
                let reads = Arc::clone(
                    self.reads
                        .lock()
                        .unwrap()
                        .entry(url.to_string())
                        .or_default(),
                );
                Ok(FakeBody {
                    chunks: chunks.iter().cloned().collect(),
                    reads,
                })
            }
            Some(Resource::Status(status)) => Err(RemoteError::status(*status, url)),
            None => Err(RemoteError::status(404, url)),
        }
    }

    async fn create_attachment(
        &self,
        issue_key: &str,
        file_path: &Path,
    ) -> Result<Value, RemoteError> {
        self.record(Call::Create(issue_key.to_string(), file_path.to_path_buf()));
        let filename = file_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.rejected_uploads.contains(&filename) {
            return Err(RemoteError::status(
                413,
                format!("/rest/api/2/issue/{issue_key}/attachments"),
            ));
        }
        if let Some(response) = &self.upload_response {
            return Ok(response.clone());
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(json!([{ "id": id.to_string(), "filename": filename }]))
    }
}
