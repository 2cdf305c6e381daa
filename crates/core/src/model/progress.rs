use serde::{Deserialize, Serialize};

use crate::model::quiz::QuizResult;

/// Aggregate learner metrics for the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    total_study_time: u64,
    streak_days: u32,
    completed_topics: u32,
    quizzes_taken: u32,
    average_score: u32,
    weak_topics: Vec<String>,
}

impl UserProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate progress from previously recorded values.
    ///
    /// Duplicate weak-topic names collapse, keeping the first occurrence.
    #[must_use]
    pub fn from_persisted(
        total_study_time: u64,
        streak_days: u32,
        completed_topics: u32,
        quizzes_taken: u32,
        average_score: u32,
        weak_topics: Vec<String>,
    ) -> Self {
        let mut progress = Self {
            total_study_time,
            streak_days,
            completed_topics,
            quizzes_taken,
            average_score: average_score.min(100),
            weak_topics: Vec::with_capacity(weak_topics.len()),
        };
        for name in weak_topics {
            progress.add_weak_topic(name);
        }
        progress
    }

    /// Total study time in seconds.
    #[must_use]
    pub fn total_study_time(&self) -> u64 {
        self.total_study_time
    }

    #[must_use]
    pub fn streak_days(&self) -> u32 {
        self.streak_days
    }

    #[must_use]
    pub fn completed_topics(&self) -> u32 {
        self.completed_topics
    }

    #[must_use]
    pub fn quizzes_taken(&self) -> u32 {
        self.quizzes_taken
    }

    #[must_use]
    pub fn average_score(&self) -> u32 {
        self.average_score
    }

    /// Weak topic names in first-seen order, without duplicates.
    #[must_use]
    pub fn weak_topics(&self) -> &[String] {
        &self.weak_topics
    }

    /// Moves the global completed-topic counter by one, floored at zero.
    pub fn record_completion(&mut self, completed: bool) {
        self.completed_topics = if completed {
            self.completed_topics.saturating_add(1)
        } else {
            self.completed_topics.saturating_sub(1)
        };
    }

    /// Folds a finished quiz into the aggregates.
    ///
    /// `average_score` becomes the running mean
    /// `round((old * (n - 1) + score) / n)` with `n` the post-increment quiz count.
    /// Returns the weak-topic names that were not already tracked.
    pub fn apply_quiz_result(&mut self, result: &QuizResult) -> Vec<String> {
        self.quizzes_taken = self.quizzes_taken.saturating_add(1);
        let n = u64::from(self.quizzes_taken);
        let total = u64::from(self.average_score) * (n - 1) + u64::from(result.score);
        self.average_score = rounded_ratio(total, n).min(100);

        result
            .weak_topics
            .iter()
            .filter(|name| self.add_weak_topic((*name).clone()))
            .cloned()
            .collect()
    }

    fn add_weak_topic(&mut self, name: String) -> bool {
        if self.weak_topics.contains(&name) {
            return false;
        }
        self.weak_topics.push(name);
        true
    }
}

/// `round(100 * part / whole)` with halves rounding up; 0 when `whole` is 0.
#[must_use]
pub fn rounded_percent(part: u64, whole: u64) -> u32 {
    rounded_ratio(part.saturating_mul(100), whole)
}

/// `round(numerator / denominator)` with halves rounding up; 0 when `denominator` is 0.
pub(crate) fn rounded_ratio(numerator: u64, denominator: u64) -> u32 {
    if denominator == 0 {
        return 0;
    }
    let doubled = numerator.saturating_mul(2).saturating_add(denominator);
    let rounded = doubled / denominator.saturating_mul(2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}
