use std::sync::Arc;

use study_core::Clock;
use study_core::model::{NotesContent, SubjectId, TopicId};
use tracing::{debug, info};

use super::{NotesGenerator, ProgressFn, SyllabusInput, SyllabusProcessor};
use crate::error::{PipelineError, StoreError};
use crate::store::ProgressStore;

/// Runs syllabus and notes processing and lands the output in the store.
#[derive(Clone)]
pub struct IngestionService {
    clock: Clock,
    processor: Arc<dyn SyllabusProcessor>,
    notes: Arc<dyn NotesGenerator>,
}

impl IngestionService {
    #[must_use]
    pub fn new(
        clock: Clock,
        processor: Arc<dyn SyllabusProcessor>,
        notes: Arc<dyn NotesGenerator>,
    ) -> Self {
        Self {
            clock,
            processor,
            notes,
        }
    }

    /// Process a syllabus and add the resulting subject to the store.
    ///
    /// The new subject gets the next free numeric id.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError` if there is no input, processing fails, or the
    /// outline cannot form a subject.
    pub async fn ingest(
        &self,
        store: &mut ProgressStore,
        input: &SyllabusInput,
        progress: ProgressFn<'_>,
    ) -> Result<SubjectId, PipelineError> {
        let parsed = self.processor.process(input, progress).await?;
        let id = next_subject_id(store);
        let subject = parsed.into_subject(id.clone(), self.clock.now())?;
        let topics = subject.total_topics();
        let name = subject.name().to_string();
        store.add_subject(subject).map_err(StoreError::from)?;

        info!(subject_id = %id, subject = %name, topics, "syllabus ingested");
        Ok(id)
    }

    /// Generate notes for a topic and attach them.
    ///
    /// Unknown topics yield `Ok(None)` without running the generator.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError` if generation fails.
    pub async fn generate_notes(
        &self,
        store: &mut ProgressStore,
        topic_id: &TopicId,
        progress: ProgressFn<'_>,
    ) -> Result<Option<NotesContent>, PipelineError> {
        let Some(topic) = store.find_topic(topic_id) else {
            debug!(topic_id = %topic_id, "notes requested for unknown topic");
            return Ok(None);
        };
        let name = topic.name().to_string();
        let notes = self.notes.generate(&name, progress).await?;
        store.attach_notes(topic_id, &notes);

        info!(topic_id = %topic_id, topic = %name, "notes generated");
        Ok(Some(notes))
    }
}

fn next_subject_id(store: &ProgressStore) -> SubjectId {
    let mut n = store.subjects().len() + 1;
    loop {
        let candidate = SubjectId::new(n.to_string());
        if store.subjects().iter().all(|s| s.id() != &candidate) {
            return candidate;
        }
        n += 1;
    }
}
