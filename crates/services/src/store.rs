use std::fmt;

use study_core::model::{
    Curriculum, NotesContent, QuizResult, Subject, SubjectId, Topic, TopicId, UserProgress,
};
use tracing::debug;

use crate::error::StoreError;

//
// ─── EVENTS ────────────────────────────────────────────────────────────────────
//

/// Change notification delivered to store subscribers after each mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    SubjectAdded(SubjectId),
    TopicCompletionChanged { topic_id: TopicId, completed: bool },
    TopicMarkedWeak(TopicId),
    NotesAttached(TopicId),
    ProgressUpdated {
        quizzes_taken: u32,
        average_score: u32,
        marked_weak: Vec<TopicId>,
    },
}

/// Handle returned by `ProgressStore::subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StoreEvent, &StudyState) + Send>;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Read-only view of everything the store owns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyState {
    curriculum: Curriculum,
    progress: UserProgress,
}

impl StudyState {
    #[must_use]
    pub fn subjects(&self) -> &[Subject] {
        self.curriculum.subjects()
    }

    #[must_use]
    pub fn curriculum(&self) -> &Curriculum {
        &self.curriculum
    }

    #[must_use]
    pub fn user_progress(&self) -> &UserProgress {
        &self.progress
    }

    /// Every topic flagged as weak, in curriculum order.
    #[must_use]
    pub fn weak_topics(&self) -> Vec<&Topic> {
        self.curriculum.weak_topics()
    }

    /// Rounded mean of the subjects' cached progress; 0 with no subjects.
    #[must_use]
    pub fn overall_progress(&self) -> u32 {
        self.curriculum.overall_progress()
    }

    #[must_use]
    pub fn find_topic(&self, id: &TopicId) -> Option<&Topic> {
        self.curriculum.find_topic(id)
    }
}

//
// ─── STORE ─────────────────────────────────────────────────────────────────────
//

/// Single source of truth for curriculum and aggregate progress.
///
/// Views read through `state()` and mutate only through the methods below;
/// subscribers are notified synchronously after every successful mutation.
#[derive(Default)]
pub struct ProgressStore {
    state: StudyState,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl ProgressStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with existing curriculum and progress.
    #[must_use]
    pub fn with_state(curriculum: Curriculum, progress: UserProgress) -> Self {
        Self {
            state: StudyState {
                curriculum,
                progress,
            },
            ..Self::default()
        }
    }

    #[must_use]
    pub fn state(&self) -> &StudyState {
        &self.state
    }

    #[must_use]
    pub fn subjects(&self) -> &[Subject] {
        self.state.subjects()
    }

    #[must_use]
    pub fn user_progress(&self) -> &UserProgress {
        self.state.user_progress()
    }

    #[must_use]
    pub fn weak_topics(&self) -> Vec<&Topic> {
        self.state.weak_topics()
    }

    #[must_use]
    pub fn overall_progress(&self) -> u32 {
        self.state.overall_progress()
    }

    #[must_use]
    pub fn find_topic(&self, id: &TopicId) -> Option<&Topic> {
        self.state.find_topic(id)
    }

    /// Register a listener; it runs after every mutation until unsubscribed.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&StoreEvent, &StudyState) + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Append a subject to the curriculum.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Curriculum` if a subject with the same id exists.
    pub fn add_subject(&mut self, subject: Subject) -> Result<(), StoreError> {
        let id = subject.id().clone();
        self.state.curriculum.add_subject(subject)?;
        debug!(subject_id = %id, "subject added");
        self.emit(&StoreEvent::SubjectAdded(id));
        Ok(())
    }

    /// Set a topic's completion flag.
    ///
    /// The owning subject's aggregates are recomputed in the same step. The
    /// global completed counter moves by one on every call for a known topic,
    /// even when the flag already had that value, and never drops below zero.
    /// Unknown ids are ignored; returns whether the topic was found.
    pub fn update_topic_completion(&mut self, topic_id: &TopicId, completed: bool) -> bool {
        let Some(changed) = self
            .state
            .curriculum
            .set_topic_completed(topic_id, completed)
        else {
            debug!(topic_id = %topic_id, "completion update for unknown topic ignored");
            return false;
        };

        self.state.progress.record_completion(completed);
        debug!(
            topic_id = %topic_id,
            completed,
            changed,
            global_completed = self.state.progress.completed_topics(),
            "topic completion updated"
        );
        self.emit(&StoreEvent::TopicCompletionChanged {
            topic_id: topic_id.clone(),
            completed,
        });
        true
    }

    /// Flag a topic as weak. There is no way back; returns whether it was found.
    pub fn mark_topic_as_weak(&mut self, topic_id: &TopicId) -> bool {
        if !self.state.curriculum.mark_topic_weak(topic_id) {
            debug!(topic_id = %topic_id, "weak mark for unknown topic ignored");
            return false;
        }
        debug!(topic_id = %topic_id, "topic marked weak");
        self.emit(&StoreEvent::TopicMarkedWeak(topic_id.clone()));
        true
    }

    /// Store generated notes on a topic; returns whether it was found.
    pub fn attach_notes(&mut self, topic_id: &TopicId, notes: &NotesContent) -> bool {
        if !self.state.curriculum.attach_notes(topic_id, notes) {
            debug!(topic_id = %topic_id, "notes for unknown topic ignored");
            return false;
        }
        debug!(topic_id = %topic_id, "notes attached");
        self.emit(&StoreEvent::NotesAttached(topic_id.clone()));
        true
    }

    /// Fold a finished quiz into the user's progress.
    ///
    /// Every topic whose name contains one of the result's weak-topic names
    /// (case-insensitive) is flagged weak, so overlapping names match broadly.
    /// Returns the ids of the topics that were flagged.
    pub fn update_user_progress(&mut self, result: &QuizResult) -> Vec<TopicId> {
        let newly_tracked = self.state.progress.apply_quiz_result(result);

        let mut marked: Vec<TopicId> = Vec::new();
        for name in &result.weak_topics {
            for id in self.state.curriculum.mark_weak_matching(name) {
                if !marked.contains(&id) {
                    marked.push(id);
                }
            }
        }

        let progress = &self.state.progress;
        debug!(
            score = result.score,
            quizzes_taken = progress.quizzes_taken(),
            average_score = progress.average_score(),
            new_weak_topics = newly_tracked.len(),
            marked_topics = marked.len(),
            "user progress updated"
        );
        let event = StoreEvent::ProgressUpdated {
            quizzes_taken: progress.quizzes_taken(),
            average_score: progress.average_score(),
            marked_weak: marked.clone(),
        };
        self.emit(&event);
        marked
    }

    fn emit(&mut self, event: &StoreEvent) {
        let Self {
            state, listeners, ..
        } = self;
        for (_, listener) in listeners.iter_mut() {
            listener(event, state);
        }
    }
}

impl fmt::Debug for ProgressStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressStore")
            .field("subjects_len", &self.state.subjects().len())
            .field("progress", &self.state.progress)
            .field("listeners_len", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
