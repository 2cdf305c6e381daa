use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use study_core::model::{Choice, QuestionId, QuizQuestion, QuizResult, rounded_percent};
use tracing::debug;

use crate::error::QuizSessionError;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Where a quiz currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizState {
    InProgress,
    Finished(QuizResult),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One attempt at a fixed list of questions with a countdown.
///
/// Answers are keyed by question id; selecting again overwrites. Once
/// finished the session only changes through `restart`.
pub struct QuizSession {
    questions: Vec<QuizQuestion>,
    current: usize,
    answers: HashMap<QuestionId, Choice>,
    time_limit_secs: u64,
    remaining_secs: u64,
    started_at: DateTime<Utc>,
    state: QuizState,
    recorded: bool,
}

impl QuizSession {
    /// Start a session; `started_at` should come from the services layer clock.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::Empty` if no questions are provided.
    pub fn new(
        questions: Vec<QuizQuestion>,
        time_limit_secs: u64,
        started_at: DateTime<Utc>,
    ) -> Result<Self, QuizSessionError> {
        if questions.is_empty() {
            return Err(QuizSessionError::Empty);
        }
        Ok(Self {
            questions,
            current: 0,
            answers: HashMap::new(),
            time_limit_secs,
            remaining_secs: time_limit_secs,
            started_at,
            state: QuizState::InProgress,
            recorded: false,
        })
    }

    #[must_use]
    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    #[must_use]
    pub fn answers(&self) -> &HashMap<QuestionId, Choice> {
        &self.answers
    }

    #[must_use]
    pub fn answer_for(&self, id: &QuestionId) -> Option<Choice> {
        self.answers.get(id).copied()
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn time_limit_secs(&self) -> u64 {
        self.time_limit_secs
    }

    #[must_use]
    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    #[must_use]
    pub fn state(&self) -> &QuizState {
        &self.state
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.state, QuizState::Finished(_))
    }

    #[must_use]
    pub fn result(&self) -> Option<&QuizResult> {
        match &self.state {
            QuizState::Finished(result) => Some(result),
            QuizState::InProgress => None,
        }
    }

    /// Position through the quiz as a rounded percentage, counting the current question.
    #[must_use]
    pub fn progress_percent(&self) -> u32 {
        rounded_percent(
            u64::try_from(self.current + 1).unwrap_or(u64::MAX),
            u64::try_from(self.questions.len()).unwrap_or(u64::MAX),
        )
    }

    /// Remaining time as `m:ss`.
    #[must_use]
    pub fn format_remaining(&self) -> String {
        format_clock(self.remaining_secs)
    }

    /// Record an answer (option index) for the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::Finished` after the quiz ended and
    /// `QuizSessionError::Question` for an index outside `0..4`.
    pub fn select_answer(&mut self, option_index: usize) -> Result<(), QuizSessionError> {
        self.ensure_in_progress()?;
        let choice = Choice::from_index(option_index)?;
        let Some(question) = self.questions.get(self.current) else {
            return Err(QuizSessionError::Empty);
        };
        debug!(question_id = %question.id(), ?choice, "answer selected");
        self.answers.insert(question.id().clone(), choice);
        Ok(())
    }

    /// Move forward one question; returns false at the last question or once finished.
    pub fn next(&mut self) -> bool {
        if self.is_finished() || self.is_last() {
            return false;
        }
        self.current += 1;
        true
    }

    /// Move back one question; returns false at the first question or once finished.
    pub fn previous(&mut self) -> bool {
        if self.is_finished() || self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Advance the countdown by one second.
    ///
    /// When it reaches zero the quiz finishes on its own; the result is
    /// returned only on that tick.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<QuizResult> {
        if self.is_finished() {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }
        debug!("quiz countdown expired");
        Some(self.finish(now))
    }

    /// Grade the quiz. Finishing twice returns the first result unchanged.
    pub fn finish(&mut self, now: DateTime<Utc>) -> QuizResult {
        if let QuizState::Finished(result) = &self.state {
            return result.clone();
        }
        let time_spent = u64::try_from((now - self.started_at).num_seconds()).unwrap_or(0);
        let result = QuizResult::grade(&self.questions, &self.answers, time_spent);
        debug!(
            score = result.score,
            correct = result.correct_answers,
            total = result.total_questions,
            time_spent,
            "quiz finished"
        );
        self.state = QuizState::Finished(result.clone());
        result
    }

    /// Back to the first question with no answers and a full countdown.
    pub fn restart(&mut self, now: DateTime<Utc>) {
        self.current = 0;
        self.answers.clear();
        self.remaining_secs = self.time_limit_secs;
        self.started_at = now;
        self.state = QuizState::InProgress;
        self.recorded = false;
        debug!("quiz restarted");
    }

    pub(crate) fn is_recorded(&self) -> bool {
        self.recorded
    }

    pub(crate) fn mark_recorded(&mut self) {
        self.recorded = true;
    }

    fn ensure_in_progress(&self) -> Result<(), QuizSessionError> {
        if self.is_finished() {
            Err(QuizSessionError::Finished)
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("answers_len", &self.answers.len())
            .field("remaining_secs", &self.remaining_secs)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Seconds as `m:ss`.
#[must_use]
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use study_core::model::{Difficulty, QuizQuestionError};
    use study_core::time::fixed_now;

    fn question(id: &str, topic: &str, correct: Choice) -> QuizQuestion {
        QuizQuestion::new(
            QuestionId::new(id),
            format!("Question {id}?"),
            ["w", "x", "y", "z"].map(String::from),
            correct,
            "",
            topic,
            Difficulty::Easy,
        )
        .unwrap()
    }

    fn session() -> QuizSession {
        QuizSession::new(
            vec![
                question("1", "Stacks", Choice::B),
                question("2", "Hashing", Choice::C),
                question("3", "Trees", Choice::A),
            ],
            600,
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn empty_quiz_is_rejected() {
        let err = QuizSession::new(Vec::new(), 600, fixed_now()).unwrap_err();
        assert_eq!(err, QuizSessionError::Empty);
    }

    #[test]
    fn navigation_is_bounded() {
        let mut quiz = session();
        assert!(!quiz.previous());
        assert!(quiz.next());
        assert!(quiz.next());
        assert!(quiz.is_last());
        assert!(!quiz.next());
        assert_eq!(quiz.current_index(), 2);
        assert_eq!(quiz.progress_percent(), 100);
        assert!(quiz.previous());
        assert_eq!(quiz.progress_percent(), 67);
    }

    #[test]
    fn reselecting_overwrites_previous_answer() {
        let mut quiz = session();
        quiz.select_answer(0).unwrap();
        quiz.select_answer(1).unwrap();
        assert_eq!(quiz.answers().len(), 1);
        assert_eq!(quiz.answer_for(&QuestionId::new("1")), Some(Choice::B));
    }

    #[test]
    fn out_of_range_answer_is_rejected() {
        let mut quiz = session();
        let err = quiz.select_answer(4).unwrap_err();
        assert_eq!(
            err,
            QuizSessionError::Question(QuizQuestionError::InvalidChoice(4))
        );
    }

    #[test]
    fn finish_grades_and_locks_the_session() {
        let mut quiz = session();
        quiz.select_answer(1).unwrap();
        quiz.next();
        quiz.select_answer(0).unwrap();

        let result = quiz.finish(fixed_now() + Duration::seconds(75));
        assert_eq!(result.correct_answers, 1);
        assert_eq!(result.score, 33);
        assert_eq!(result.weak_topics, vec!["Hashing"]);
        assert_eq!(result.time_spent, 75);

        let err = quiz.select_answer(2).unwrap_err();
        assert_eq!(err, QuizSessionError::Finished);
        assert!(!quiz.next());
        let again = quiz.finish(fixed_now() + Duration::seconds(500));
        assert_eq!(again, result);
    }

    #[test]
    fn countdown_expiry_finishes_the_quiz() {
        let mut quiz = QuizSession::new(vec![question("1", "Stacks", Choice::A)], 3, fixed_now())
            .unwrap();
        assert!(quiz.tick(fixed_now()).is_none());
        assert_eq!(quiz.format_remaining(), "0:02");
        assert!(quiz.tick(fixed_now()).is_none());
        let result = quiz.tick(fixed_now() + Duration::seconds(3));
        assert_eq!(result.map(|r| r.time_spent), Some(3));
        assert!(quiz.is_finished());
        assert!(quiz.tick(fixed_now()).is_none());
    }

    #[test]
    fn restart_resets_index_answers_and_countdown() {
        let mut quiz = session();
        quiz.select_answer(1).unwrap();
        quiz.next();
        quiz.tick(fixed_now());
        quiz.finish(fixed_now());

        let later = fixed_now() + Duration::minutes(5);
        quiz.restart(later);
        assert_eq!(quiz.current_index(), 0);
        assert!(quiz.answers().is_empty());
        assert_eq!(quiz.remaining_secs(), 600);
        assert_eq!(quiz.started_at(), later);
        assert_eq!(quiz.state(), &QuizState::InProgress);
    }

    #[test]
    fn clock_format_pads_seconds() {
        assert_eq!(format_clock(600), "10:00");
        assert_eq!(format_clock(65), "1:05");
        assert_eq!(format_clock(0), "0:00");
    }
}
