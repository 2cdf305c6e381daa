use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use study_core::model::rounded_percent;
use thiserror::Error;
use url::Url;

const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;
const DEFAULT_BASE_URL: &str = "memory://uploads.local/";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BlobError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid object path: {0}")]
    InvalidPath(String),
}

/// Incremental transfer report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub bytes_transferred: u64,
    pub total_bytes: u64,
}

impl TransferProgress {
    /// Rounded percentage transferred; an empty transfer counts as complete.
    #[must_use]
    pub fn percent(&self) -> u32 {
        if self.total_bytes == 0 {
            return 100;
        }
        rounded_percent(self.bytes_transferred, self.total_bytes)
    }
}

/// Remote object storage: accepts bytes, hands back a retrieval URL.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload `bytes` under `path`, reporting progress after every chunk.
    ///
    /// # Errors
    ///
    /// Returns `BlobError::Transport` if the transfer fails midway and
    /// `BlobError::InvalidPath` if a segment of `path` is empty, `.`, `..`, or would be
    /// re-read as a query, fragment or escape by the URL parser.
    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        progress: &mut (dyn FnMut(TransferProgress) + Send),
    ) -> Result<Url, BlobError>;
}

/// Chunked in-memory blob store with optional fault injection.
#[derive(Clone)]
pub struct InMemoryBlobStore {
    base_url: String,
    chunk_size: usize,
    fail_after_chunks: Option<usize>,
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            fail_after_chunks: None,
            objects: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl InMemoryBlobStore {
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Abort with a transport error after `chunks` chunks have been sent.
    #[must_use]
    pub fn with_failure_after(mut self, chunks: usize) -> Self {
        self.fail_after_chunks = Some(chunks);
        self
    }

    /// Fetch a stored object by path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .ok()
            .and_then(|guard| guard.get(path).cloned())
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(
        &self,
        path: &str,
        bytes: &[u8],
        progress: &mut (dyn FnMut(TransferProgress) + Send),
    ) -> Result<Url, BlobError> {
        let url = object_url(&self.base_url, path)?;

        let total_bytes = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        if bytes.is_empty() {
            progress(TransferProgress {
                bytes_transferred: 0,
                total_bytes,
            });
        }

        let mut transferred = 0_u64;
        for (sent, chunk) in bytes.chunks(self.chunk_size).enumerate() {
            if self.fail_after_chunks.is_some_and(|limit| sent >= limit) {
                return Err(BlobError::Transport("connection reset mid-upload".into()));
            }
            transferred = transferred.saturating_add(u64::try_from(chunk.len()).unwrap_or(0));
            progress(TransferProgress {
                bytes_transferred: transferred,
                total_bytes,
            });
        }

        let mut guard = self
            .objects
            .lock()
            .map_err(|e| BlobError::Transport(e.to_string()))?;
        guard.insert(path.to_string(), bytes.to_vec());
        Ok(url)
    }
}

/// Resolve `path` against `base`, refusing paths whose URL would not name the same key.
fn object_url(base: &str, path: &str) -> Result<Url, BlobError> {
    let invalid = || BlobError::InvalidPath(path.to_string());
    let reserved = |c: char| matches!(c, '\\' | '?' | '#' | '%') || c.is_control();
    let valid_segment = |segment: &str| {
        !segment.is_empty() && segment != "." && segment != ".." && !segment.chars().any(reserved)
    };
    if !path.split('/').all(valid_segment) {
        return Err(invalid());
    }
    Url::parse(base)
        .and_then(|base| base.join(path))
        .map_err(|_| invalid())
}
