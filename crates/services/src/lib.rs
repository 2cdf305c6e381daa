#![forbid(unsafe_code)]

pub mod adaptive;
pub mod app_services;
pub mod auth;
pub mod config_service;
pub mod dashboard;
pub mod demo;
pub mod error;
pub mod pipeline;
pub mod quiz;
pub mod store;
pub mod upload_service;

pub use study_core::Clock;

pub use adaptive::AdaptiveQuestionGenerator;
pub use app_services::{AppServices, Providers};
pub use auth::{AuthService, IdentityProvider, InMemoryIdentityProvider, ProviderUser};
pub use config_service::ConfigService;
pub use dashboard::DashboardSummary;
pub use error::{
    AppServicesError, AuthError, ConfigServiceError, PipelineError, QuizServiceError,
    QuizSessionError, StoreError, UploadError,
};
pub use pipeline::{
    IngestionService, NotesGenerator, Pipeline, SimulatedNotesGenerator,
    SimulatedSyllabusProcessor, Stage, StageProgress, SyllabusInput, SyllabusProcessor,
};
pub use quiz::{QuizPlan, QuizService, QuizSession, QuizState};
pub use store::{ProgressStore, StoreEvent, StudyState, SubscriptionId};
pub use upload_service::{SelectedFile, UploadService, UploadState};
