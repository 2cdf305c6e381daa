//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use study_core::model::{CurriculumError, IdentityError, ProviderConfigError, QuizQuestionError};

/// Errors emitted by `ProgressStore`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error(transparent)]
    Curriculum(#[from] CurriculumError),
}

/// Errors emitted by a running `QuizSession`.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSessionError {
    #[error("quiz has no questions")]
    Empty,
    #[error("quiz already finished")]
    Finished,
    #[error("quiz result already recorded")]
    AlreadyRecorded,
    #[error(transparent)]
    Question(#[from] QuizQuestionError),
}

/// Errors emitted while generating or assembling quiz questions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error(transparent)]
    Question(#[from] QuizQuestionError),
    #[error(transparent)]
    Session(#[from] QuizSessionError),
}

/// Errors emitted by processing pipelines.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipelineError {
    #[error("nothing to process: provide a file or syllabus text")]
    NoInput,
    #[error("pipeline has no stages")]
    NoStages,
    #[error(transparent)]
    Curriculum(#[from] CurriculumError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors emitted by `AuthService`.
///
/// Provider failures carry only the provider's message text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AuthError {
    #[error("email is required")]
    MissingEmail,
    #[error("password is required")]
    MissingPassword,
    #[error("{message}")]
    Provider { message: String },
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

impl AuthError {
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }
}

/// Errors emitted by `UploadService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum UploadError {
    #[error("unsupported file type {content_type}: upload a PDF, DOCX, or TXT file")]
    UnsupportedType { content_type: String },
    #[error("invalid file name {name:?}: use a plain file name")]
    InvalidFileName { name: String },
    #[error("no file selected")]
    NoFile,
    #[error("upload already in progress")]
    Busy,
    #[error(transparent)]
    Blob(#[from] storage::blob::BlobError),
}

/// Errors emitted by `ConfigService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigServiceError {
    #[error(transparent)]
    Validation(#[from] ProviderConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Config(#[from] ConfigServiceError),
    #[error(transparent)]
    Quiz(#[from] QuizServiceError),
    #[error(transparent)]
    Curriculum(#[from] CurriculumError),
}
