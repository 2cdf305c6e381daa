use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::QuestionId;
use crate::model::progress::rounded_percent;

/// Every quiz question offers exactly this many options.
pub const OPTION_COUNT: usize = 4;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizQuestionError {
    #[error("question text cannot be empty")]
    EmptyQuestion,

    #[error("question topic cannot be empty")]
    EmptyTopic,

    #[error("option {0} cannot be empty")]
    EmptyOption(usize),

    #[error("answer index {0} is out of range")]
    InvalidChoice(usize),
}

//
// ─── CHOICE ────────────────────────────────────────────────────────────────────
//

/// One of the four answer slots of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Choice {
    A,
    B,
    C,
    D,
}

impl Choice {
    pub const ALL: [Choice; OPTION_COUNT] = [Choice::A, Choice::B, Choice::C, Choice::D];

    /// Converts a zero-based option index.
    ///
    /// # Errors
    ///
    /// Returns `QuizQuestionError::InvalidChoice` for indices outside `0..4`.
    pub fn from_index(index: usize) -> Result<Self, QuizQuestionError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(QuizQuestionError::InvalidChoice(index))
    }

    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Choice::A => 0,
            Choice::B => 1,
            Choice::C => 2,
            Choice::D => 3,
        }
    }
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Immutable multiple-choice quiz item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    id: QuestionId,
    question: String,
    options: [String; OPTION_COUNT],
    correct_answer: Choice,
    explanation: String,
    topic: String,
    difficulty: Difficulty,
    is_adaptive: bool,
}

impl QuizQuestion {
    /// Creates a baseline (non-adaptive) question.
    ///
    /// # Errors
    ///
    /// Returns `QuizQuestionError` if the question, topic, or any option is blank.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: QuestionId,
        question: impl Into<String>,
        options: [String; OPTION_COUNT],
        correct_answer: Choice,
        explanation: impl Into<String>,
        topic: impl Into<String>,
        difficulty: Difficulty,
    ) -> Result<Self, QuizQuestionError> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(QuizQuestionError::EmptyQuestion);
        }
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(QuizQuestionError::EmptyTopic);
        }
        if let Some(idx) = options.iter().position(|opt| opt.trim().is_empty()) {
            return Err(QuizQuestionError::EmptyOption(idx));
        }

        Ok(Self {
            id,
            question,
            options,
            correct_answer,
            explanation: explanation.into(),
            topic,
            difficulty,
            is_adaptive: false,
        })
    }

    /// Marks the question as generated for a weak topic.
    #[must_use]
    pub fn adaptive(mut self) -> Self {
        self.is_adaptive = true;
        self
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn options(&self) -> &[String; OPTION_COUNT] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> Choice {
        self.correct_answer
    }

    #[must_use]
    pub fn correct_answer_index(&self) -> usize {
        self.correct_answer.index()
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn is_adaptive(&self) -> bool {
        self.is_adaptive
    }

    #[must_use]
    pub fn is_correct(&self, choice: Choice) -> bool {
        self.correct_answer == choice
    }
}

//
// ─── RESULT ────────────────────────────────────────────────────────────────────
//

/// Outcome of a finished quiz, consumed once by the progress update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    /// Percentage 0–100.
    pub score: u32,
    pub total_questions: u32,
    pub correct_answers: u32,
    /// Unique topics of answered-but-wrong questions, in question order.
    pub weak_topics: Vec<String>,
    /// Seconds.
    pub time_spent: u64,
}

impl QuizResult {
    /// Scores a set of answers against the questions.
    ///
    /// Unanswered questions count against the score but never contribute a weak topic.
    #[must_use]
    pub fn grade(
        questions: &[QuizQuestion],
        answers: &HashMap<QuestionId, Choice>,
        time_spent: u64,
    ) -> Self {
        let mut correct = 0_u32;
        let mut weak_topics: Vec<String> = Vec::new();

        for question in questions {
            match answers.get(question.id()) {
                Some(choice) if question.is_correct(*choice) => correct = correct.saturating_add(1),
                Some(_) => {
                    if !weak_topics.iter().any(|t| t == question.topic()) {
                        weak_topics.push(question.topic().to_string());
                    }
                }
                None => {}
            }
        }

        let total = u32::try_from(questions.len()).unwrap_or(u32::MAX);
        Self {
            score: rounded_percent(u64::from(correct), u64::from(total)),
            total_questions: total,
            correct_answers: correct,
            weak_topics,
            time_spent,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> [String; OPTION_COUNT] {
        ["a", "b", "c", "d"].map(String::from)
    }

    fn question(id: &str, topic: &str, correct: Choice) -> QuizQuestion {
        QuizQuestion::new(
            QuestionId::new(id),
            format!("Question {id}?"),
            options(),
            correct,
            "because",
            topic,
            Difficulty::Easy,
        )
        .unwrap()
    }

    #[test]
    fn choice_index_conversion() {
        assert_eq!(Choice::from_index(0).unwrap(), Choice::A);
        assert_eq!(Choice::from_index(3).unwrap(), Choice::D);
        assert_eq!(
            Choice::from_index(4).unwrap_err(),
            QuizQuestionError::InvalidChoice(4)
        );
        assert_eq!(Choice::C.index(), 2);
    }

    #[test]
    fn blank_fields_are_rejected() {
        let err = QuizQuestion::new(
            QuestionId::new("1"),
            " ",
            options(),
            Choice::A,
            "",
            "t",
            Difficulty::Easy,
        )
        .unwrap_err();
        assert_eq!(err, QuizQuestionError::EmptyQuestion);

        let mut opts = options();
        opts[2] = String::new();
        let err = QuizQuestion::new(
            QuestionId::new("1"),
            "Q",
            opts,
            Choice::A,
            "",
            "t",
            Difficulty::Easy,
        )
        .unwrap_err();
        assert_eq!(err, QuizQuestionError::EmptyOption(2));
    }

    #[test]
    fn difficulty_serializes_lowercase() {
        let json = serde_json::to_string(&Difficulty::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }

    #[test]
    fn grading_skips_unanswered_for_weak_topics() {
        let questions = vec![
            question("1", "Stacks", Choice::B),
            question("2", "Hashing", Choice::B),
            question("3", "Stacks", Choice::C),
            question("4", "Trees", Choice::A),
        ];
        let mut answers = HashMap::new();
        answers.insert(QuestionId::new("1"), Choice::B);
        answers.insert(QuestionId::new("2"), Choice::A);
        answers.insert(QuestionId::new("3"), Choice::A);

        let result = QuizResult::grade(&questions, &answers, 42);
        assert_eq!(result.correct_answers, 1);
        assert_eq!(result.total_questions, 4);
        assert_eq!(result.score, 25);
        assert_eq!(result.weak_topics, vec!["Hashing", "Stacks"]);
        assert_eq!(result.time_spent, 42);
    }

    #[test]
    fn grading_empty_quiz_scores_zero() {
        let result = QuizResult::grade(&[], &HashMap::new(), 0);
        assert_eq!(result.score, 0);
        assert!(result.weak_topics.is_empty());
    }
}
