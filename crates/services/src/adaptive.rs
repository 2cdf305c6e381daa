use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use study_core::model::{
    Choice, Difficulty, OPTION_COUNT, QuestionId, QuizQuestion, QuizQuestionError,
};

/// Questions produced for every weak topic.
pub const QUESTIONS_PER_TOPIC: usize = 2;

const OPTION_TEMPLATES: [&str; OPTION_COUNT] = [
    "Option A - focusing on core concepts",
    "Option B - addressing common misconceptions",
    "Option C - practical application",
    "Option D - theoretical foundation",
];

/// Produces placeholder questions aimed at the learner's weak topics.
///
/// The correct answer slot is drawn from a seedable source; everything else is
/// templated from the topic name.
#[derive(Debug, Clone)]
pub struct AdaptiveQuestionGenerator {
    rng: StdRng,
}

impl Default for AdaptiveQuestionGenerator {
    fn default() -> Self {
        Self::from_os_rng()
    }
}

impl AdaptiveQuestionGenerator {
    #[must_use]
    pub fn from_os_rng() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Deterministic generator for tests and reproducible runs.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Two medium, adaptive questions per topic, in input order.
    ///
    /// Callers are expected to cap the topic list themselves.
    ///
    /// # Errors
    ///
    /// Returns `QuizQuestionError::EmptyTopic` if a topic name is blank.
    pub fn generate(
        &mut self,
        weak_topics: &[String],
    ) -> Result<Vec<QuizQuestion>, QuizQuestionError> {
        let mut questions = Vec::with_capacity(weak_topics.len() * QUESTIONS_PER_TOPIC);
        for topic in weak_topics {
            for i in 0..QUESTIONS_PER_TOPIC {
                questions.push(self.question_for(topic, i)?);
            }
        }
        Ok(questions)
    }

    fn question_for(
        &mut self,
        topic: &str,
        ordinal: usize,
    ) -> Result<QuizQuestion, QuizQuestionError> {
        let correct = Choice::from_index(self.rng.random_range(0..OPTION_COUNT))?;
        QuizQuestion::new(
            QuestionId::new(format!("adaptive-{topic}-{ordinal}")),
            format!("[Adaptive] Advanced question about {topic} to strengthen your understanding"),
            OPTION_TEMPLATES.map(String::from),
            correct,
            format!(
                "This adaptive question was generated to help you master {topic}. \
                 Focus on understanding the underlying principles."
            ),
            topic,
            Difficulty::Medium,
        )
        .map(QuizQuestion::adaptive)
    }
}
