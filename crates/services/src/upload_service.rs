use std::fmt;
use std::sync::Arc;

use storage::blob::BlobStore;
use tracing::{info, warn};
use url::Url;

use crate::error::UploadError;

/// Content types a syllabus upload may have.
pub const ACCEPTED_CONTENT_TYPES: [&str; 3] = [
    "application/pdf",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

/// A file picked by the user, not yet uploaded.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadState {
    Empty,
    Selected(SelectedFile),
    Uploading { file_name: String, percent: u32 },
    Done { file_name: String, url: Url },
}

/// Drives a single file from selection to a retrieval URL.
///
/// One upload at a time; a transport failure drops the file and returns to `Empty`.
pub struct UploadService {
    blobs: Arc<dyn BlobStore>,
    state: UploadState,
}

impl UploadService {
    #[must_use]
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            blobs,
            state: UploadState::Empty,
        }
    }

    #[must_use]
    pub fn state(&self) -> &UploadState {
        &self.state
    }

    /// Pick a file for upload, replacing any earlier pick.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::UnsupportedType` (state unchanged) for anything but
    /// PDF, DOCX, or plain text, `UploadError::InvalidFileName` for names that
    /// are not a single URL-safe path segment, and `UploadError::Busy` mid-upload.
    pub fn select(&mut self, file: SelectedFile) -> Result<(), UploadError> {
        if matches!(self.state, UploadState::Uploading { .. }) {
            return Err(UploadError::Busy);
        }
        if !is_plain_file_name(&file.name) {
            return Err(UploadError::InvalidFileName { name: file.name });
        }
        if !ACCEPTED_CONTENT_TYPES.contains(&file.content_type.as_str()) {
            return Err(UploadError::UnsupportedType {
                content_type: file.content_type,
            });
        }
        self.state = UploadState::Selected(file);
        Ok(())
    }

    /// Upload the selected file to `uploads/<name>`, reporting percent after each chunk.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::NoFile` without a selection and
    /// `UploadError::Blob` when the transfer fails.
    pub async fn upload(
        &mut self,
        progress: &mut (dyn FnMut(u32) + Send),
    ) -> Result<Url, UploadError> {
        let file = match std::mem::replace(&mut self.state, UploadState::Empty) {
            UploadState::Selected(file) => file,
            other => {
                self.state = other;
                return Err(UploadError::NoFile);
            }
        };

        let path = format!("uploads/{}", file.name);
        self.state = UploadState::Uploading {
            file_name: file.name.clone(),
            percent: 0,
        };
        let blobs = Arc::clone(&self.blobs);
        let state = &mut self.state;
        let outcome = blobs
            .put(&path, &file.bytes, &mut |transfer| {
                let pct = transfer.percent();
                if let UploadState::Uploading { percent, .. } = state {
                    *percent = pct;
                }
                progress(pct);
            })
            .await;

        match outcome {
            Ok(url) => {
                info!(file = %file.name, bytes = file.bytes.len(), url = %url, "upload finished");
                self.state = UploadState::Done {
                    file_name: file.name,
                    url: url.clone(),
                };
                Ok(url)
            }
            Err(err) => {
                warn!(file = %file.name, error = %err, "upload failed");
                self.state = UploadState::Empty;
                Err(err.into())
            }
        }
    }

    /// Drop any selection or finished upload.
    pub fn reset(&mut self) {
        self.state = UploadState::Empty;
    }
}

/// A name that maps to exactly one object key segment and one URL segment.
fn is_plain_file_name(name: &str) -> bool {
    let reserved = |c: char| matches!(c, '/' | '\\' | '?' | '#' | '%') || c.is_control();
    !name.trim().is_empty() && name != "." && name != ".." && !name.chars().any(reserved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::blob::{BlobError, InMemoryBlobStore};

    fn txt(name: &str, bytes: &[u8]) -> SelectedFile {
        SelectedFile {
            name: name.to_string(),
            content_type: "text/plain".to_string(),
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn unsupported_type_keeps_state() {
        let mut uploads = UploadService::new(Arc::new(InMemoryBlobStore::default()));
        let err = uploads
            .select(SelectedFile {
                name: "pic.png".into(),
                content_type: "image/png".into(),
                bytes: vec![1],
            })
            .unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedType { .. }));
        assert_eq!(uploads.state(), &UploadState::Empty);
    }

    #[test]
    fn names_that_escape_the_upload_folder_are_rejected() {
        let mut uploads = UploadService::new(Arc::new(InMemoryBlobStore::default()));
        for name in ["../x", "a/b", "x?.txt", "x#.txt", "..", "%2e", " "] {
            let err = uploads.select(txt(name, b"abc")).unwrap_err();
            assert!(matches!(err, UploadError::InvalidFileName { .. }), "{name}");
        }
        assert_eq!(uploads.state(), &UploadState::Empty);
    }

    #[tokio::test]
    async fn url_and_stored_key_agree_for_names_with_spaces() {
        let store = InMemoryBlobStore::default();
        let mut uploads = UploadService::new(Arc::new(store.clone()));
        uploads.select(txt("week 1.txt", b"abc")).unwrap();

        let url = uploads.upload(&mut |_| {}).await.unwrap();
        assert_eq!(url.as_str(), "memory://uploads.local/uploads/week%201.txt");
        assert!(store.get("uploads/week 1.txt").is_some());
    }

    #[tokio::test]
    async fn upload_without_selection_is_rejected() {
        let mut uploads = UploadService::new(Arc::new(InMemoryBlobStore::default()));
        let err = uploads.upload(&mut |_| {}).await.unwrap_err();
        assert!(matches!(err, UploadError::NoFile));
    }

    #[tokio::test]
    async fn successful_upload_ends_done_with_url() {
        let store = InMemoryBlobStore::default().with_chunk_size(5);
        let mut uploads = UploadService::new(Arc::new(store.clone()));
        uploads.select(txt("syllabus.txt", b"0123456789")).unwrap();

        let mut seen = Vec::new();
        let url = uploads.upload(&mut |p| seen.push(p)).await.unwrap();

        assert_eq!(seen, vec![50, 100]);
        assert!(url.as_str().ends_with("uploads/syllabus.txt"));
        assert_eq!(store.get("uploads/syllabus.txt").unwrap(), b"0123456789");
        assert_eq!(
            uploads.state(),
            &UploadState::Done {
                file_name: "syllabus.txt".into(),
                url,
            }
        );
    }

    #[tokio::test]
    async fn transport_error_resets_to_empty() {
        let store = InMemoryBlobStore::default()
            .with_chunk_size(2)
            .with_failure_after(2);
        let mut uploads = UploadService::new(Arc::new(store));
        uploads.select(txt("notes.txt", b"abcdef")).unwrap();

        let err = uploads.upload(&mut |_| {}).await.unwrap_err();
        assert!(matches!(err, UploadError::Blob(BlobError::Transport(_))));
        assert_eq!(uploads.state(), &UploadState::Empty);
    }
}
