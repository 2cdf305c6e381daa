use std::sync::Arc;

use storage::repository::Storage;
use study_core::model::{NotesContent, QuizResult, SubjectId, TopicId};
use tracing::info;

use crate::Clock;
use crate::adaptive::AdaptiveQuestionGenerator;
use crate::auth::{AuthService, IdentityProvider};
use crate::config_service::ConfigService;
use crate::dashboard::DashboardSummary;
use crate::error::{AppServicesError, PipelineError, QuizServiceError};
use crate::pipeline::{
    IngestionService, NotesGenerator, ProgressFn, SyllabusInput, SyllabusProcessor,
};
use crate::quiz::{QuizService, QuizSession};
use crate::store::ProgressStore;
use crate::upload_service::UploadService;

/// External collaborators the app is wired against.
#[derive(Clone)]
pub struct Providers {
    pub identity: Arc<dyn IdentityProvider>,
    pub syllabus: Arc<dyn SyllabusProcessor>,
    pub notes: Arc<dyn NotesGenerator>,
}

/// Owns the progress store and the services that read or mutate it.
pub struct AppServices {
    store: ProgressStore,
    quiz: QuizService,
    ingestion: IngestionService,
    auth: AuthService,
    uploads: UploadService,
    config: ConfigService,
}

impl AppServices {
    /// Assemble services over `storage`, starting from `store`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the stored provider config cannot be
    /// loaded or the quiz bank is malformed.
    pub async fn new(
        storage: Storage,
        providers: Providers,
        clock: Clock,
        generator: AdaptiveQuestionGenerator,
        store: ProgressStore,
    ) -> Result<Self, AppServicesError> {
        let config = ConfigService::new(Arc::clone(&storage.config));
        let provider_config = config.load().await?;
        info!(
            configured = provider_config.is_configured(),
            subjects = store.subjects().len(),
            "app services ready"
        );

        Ok(Self {
            store,
            quiz: QuizService::new(clock, generator)?,
            ingestion: IngestionService::new(clock, providers.syllabus, providers.notes),
            auth: AuthService::new(providers.identity),
            uploads: UploadService::new(Arc::clone(&storage.blobs)),
            config,
        })
    }

    #[must_use]
    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ProgressStore {
        &mut self.store
    }

    #[must_use]
    pub fn dashboard(&self) -> DashboardSummary {
        DashboardSummary::from_state(self.store.state())
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    #[must_use]
    pub fn config(&self) -> &ConfigService {
        &self.config
    }

    pub fn uploads_mut(&mut self) -> &mut UploadService {
        &mut self.uploads
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError` if the quiz cannot be assembled.
    pub fn start_quiz(&mut self) -> Result<QuizSession, QuizServiceError> {
        self.quiz.start_quiz(&self.store)
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError` if the attempt was already recorded.
    pub fn complete_quiz(
        &mut self,
        session: &mut QuizSession,
    ) -> Result<QuizResult, QuizServiceError> {
        self.quiz.complete_quiz(session, &mut self.store)
    }

    /// # Errors
    ///
    /// Returns `PipelineError` if processing fails or the subject cannot be added.
    pub async fn ingest(
        &mut self,
        input: &SyllabusInput,
        progress: ProgressFn<'_>,
    ) -> Result<SubjectId, PipelineError> {
        self.ingestion
            .ingest(&mut self.store, input, progress)
            .await
    }

    /// # Errors
    ///
    /// Returns `PipelineError` if note generation fails.
    pub async fn generate_notes(
        &mut self,
        topic_id: &TopicId,
        progress: ProgressFn<'_>,
    ) -> Result<Option<NotesContent>, PipelineError> {
        self.ingestion
            .generate_notes(&mut self.store, topic_id, progress)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::InMemoryIdentityProvider;
    use crate::pipeline::{SimulatedNotesGenerator, SimulatedSyllabusProcessor};
    use study_core::time::fixed_clock;

    fn providers() -> Providers {
        Providers {
            identity: Arc::new(InMemoryIdentityProvider::new()),
            syllabus: Arc::new(SimulatedSyllabusProcessor::default()),
            notes: Arc::new(SimulatedNotesGenerator::default()),
        }
    }

    #[tokio::test]
    async fn assembles_over_in_memory_storage() {
        let app = AppServices::new(
            Storage::in_memory(),
            providers(),
            fixed_clock(),
            AdaptiveQuestionGenerator::from_seed(5),
            ProgressStore::new(),
        )
        .await
        .unwrap();

        assert_eq!(app.dashboard().subject_count, 0);
        assert!(app.auth().current_user().is_none());
        assert!(!app.config().load().await.unwrap().is_configured());
    }
}
