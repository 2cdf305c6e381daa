use study_core::Clock;
use study_core::model::{QuizQuestion, QuizResult};
use tracing::info;

use super::bank::baseline_questions;
use super::plan::QuizPlan;
use super::session::QuizSession;
use crate::adaptive::AdaptiveQuestionGenerator;
use crate::error::{QuizServiceError, QuizSessionError};
use crate::store::ProgressStore;

/// Assembles quizzes from the baseline bank plus adaptive questions and
/// records finished attempts in the progress store.
#[derive(Debug, Clone)]
pub struct QuizService {
    clock: Clock,
    plan: QuizPlan,
    bank: Vec<QuizQuestion>,
    generator: AdaptiveQuestionGenerator,
}

impl QuizService {
    /// Service with the default plan and baseline bank.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Question` if the baseline bank is malformed.
    pub fn new(
        clock: Clock,
        generator: AdaptiveQuestionGenerator,
    ) -> Result<Self, QuizServiceError> {
        Ok(Self {
            clock,
            plan: QuizPlan::default(),
            bank: baseline_questions()?,
            generator,
        })
    }

    #[must_use]
    pub fn with_plan(mut self, plan: QuizPlan) -> Self {
        self.plan = plan;
        self
    }

    #[must_use]
    pub fn plan(&self) -> QuizPlan {
        self.plan
    }

    /// Replace the baseline bank; adaptive questions are still appended after it.
    #[must_use]
    pub fn with_bank(mut self, bank: Vec<QuizQuestion>) -> Self {
        self.bank = bank;
        self
    }

    /// Build a quiz for the learner's current weak topics.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError` if question generation fails or the
    /// assembled quiz is empty.
    pub fn start_quiz(&mut self, store: &ProgressStore) -> Result<QuizSession, QuizServiceError> {
        let weak = store.user_progress().weak_topics();
        let targets = self.plan.adaptive_topics(weak);
        let adaptive = self.generator.generate(targets)?;
        let adaptive_len = adaptive.len();
        let questions = self.plan.assemble(&self.bank, adaptive);

        info!(
            questions = questions.len(),
            adaptive = adaptive_len,
            weak_topics = targets.len(),
            "quiz started"
        );
        Ok(QuizSession::new(
            questions,
            self.plan.time_limit_secs,
            self.clock.now(),
        )?)
    }

    /// Finish the session if it is still running and fold its result into the store.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::AlreadyRecorded` if this attempt was already applied.
    pub fn complete_quiz(
        &self,
        session: &mut QuizSession,
        store: &mut ProgressStore,
    ) -> Result<QuizResult, QuizServiceError> {
        if session.is_recorded() {
            return Err(QuizSessionError::AlreadyRecorded.into());
        }
        let result = session.finish(self.clock.now());
        let marked = store.update_user_progress(&result);
        session.mark_recorded();

        info!(
            score = result.score,
            correct = result.correct_answers,
            total = result.total_questions,
            weak_topics = result.weak_topics.len(),
            topics_marked_weak = marked.len(),
            "quiz completed"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use study_core::model::{Choice, Curriculum, Difficulty, QuestionId, UserProgress};
    use study_core::time::fixed_clock;

    fn service() -> QuizService {
        QuizService::new(fixed_clock(), AdaptiveQuestionGenerator::from_seed(11)).unwrap()
    }

    #[test]
    fn fresh_learner_gets_baseline_only() {
        let store = ProgressStore::new();
        let quiz = service().start_quiz(&store).unwrap();
        assert_eq!(quiz.len(), 5);
        assert!(quiz.questions().iter().all(|q| !q.is_adaptive()));
        assert_eq!(quiz.format_remaining(), "10:00");
    }

    #[test]
    fn completion_is_recorded_once() {
        let mut store = ProgressStore::new();
        let service = service();
        let mut quiz = service.clone().start_quiz(&store).unwrap();
        quiz.select_answer(1).unwrap();

        let result = service.complete_quiz(&mut quiz, &mut store).unwrap();
        assert_eq!(result.correct_answers, 1);
        assert_eq!(store.user_progress().quizzes_taken(), 1);

        let err = service.complete_quiz(&mut quiz, &mut store).unwrap_err();
        assert!(matches!(
            err,
            QuizServiceError::Session(QuizSessionError::AlreadyRecorded)
        ));
        assert_eq!(store.user_progress().quizzes_taken(), 1);
    }

    #[test]
    fn custom_bank_leads_and_adaptive_questions_follow() {
        let question = QuizQuestion::new(
            QuestionId::new("sql-1"),
            "Which clause filters grouped rows?",
            [
                "WHERE".to_string(),
                "HAVING".to_string(),
                "ORDER BY".to_string(),
                "LIMIT".to_string(),
            ],
            Choice::B,
            "HAVING applies after GROUP BY.",
            "SQL Joins",
            Difficulty::Easy,
        )
        .unwrap();
        let store = ProgressStore::with_state(
            Curriculum::new(),
            UserProgress::from_persisted(0, 0, 0, 1, 50, vec!["Indexes".to_string()]),
        );

        let quiz = service()
            .with_bank(vec![question])
            .start_quiz(&store)
            .unwrap();

        assert_eq!(quiz.len(), 3);
        assert_eq!(quiz.questions()[0].id(), &QuestionId::new("sql-1"));
        assert!(quiz.questions()[1..].iter().all(QuizQuestion::is_adaptive));
        assert!(quiz.questions()[1..].iter().all(|q| q.topic() == "Indexes"));
    }
}
