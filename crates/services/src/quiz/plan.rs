use study_core::model::QuizQuestion;

/// Shape of an assembled quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizPlan {
    pub max_questions: usize,
    pub time_limit_secs: u64,
    /// How many of the learner's weak topics feed the adaptive generator.
    pub adaptive_topic_limit: usize,
}

impl Default for QuizPlan {
    fn default() -> Self {
        Self {
            max_questions: 10,
            time_limit_secs: 600,
            adaptive_topic_limit: 3,
        }
    }
}

impl QuizPlan {
    /// Leading weak topics that adaptive questions are generated for.
    #[must_use]
    pub fn adaptive_topics<'a>(&self, weak_topics: &'a [String]) -> &'a [String] {
        &weak_topics[..weak_topics.len().min(self.adaptive_topic_limit)]
    }

    /// Baseline questions first, then adaptive ones, cut at `max_questions`.
    ///
    /// Overflowing adaptive questions are dropped from the tail.
    #[must_use]
    pub fn assemble(
        &self,
        baseline: &[QuizQuestion],
        adaptive: Vec<QuizQuestion>,
    ) -> Vec<QuizQuestion> {
        baseline
            .iter()
            .cloned()
            .chain(adaptive)
            .take(self.max_questions)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptive::AdaptiveQuestionGenerator;
    use crate::quiz::bank::baseline_questions;

    #[test]
    fn five_baseline_plus_six_adaptive_keeps_first_five_adaptive() {
        let baseline = baseline_questions().unwrap();
        let topics: Vec<String> = ["Graphs", "Integrals", "Joins"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let mut generator = AdaptiveQuestionGenerator::from_seed(3);
        let adaptive = generator.generate(&topics).unwrap();
        assert_eq!(adaptive.len(), 6);
        let expected_tail: Vec<_> = adaptive[..5].iter().map(|q| q.id().clone()).collect();

        let quiz = QuizPlan::default().assemble(&baseline, adaptive);

        assert_eq!(quiz.len(), 10);
        assert_eq!(&quiz[..5], baseline.as_slice());
        let tail: Vec<_> = quiz[5..].iter().map(|q| q.id().clone()).collect();
        assert_eq!(tail, expected_tail);
    }

    #[test]
    fn small_quizzes_are_not_padded() {
        let baseline = baseline_questions().unwrap();
        let quiz = QuizPlan::default().assemble(&baseline, Vec::new());
        assert_eq!(quiz.len(), 5);
    }

    #[test]
    fn adaptive_topics_are_capped() {
        let weak: Vec<String> = ["a", "b", "c", "d"].iter().map(ToString::to_string).collect();
        let plan = QuizPlan::default();
        assert_eq!(plan.adaptive_topics(&weak), &weak[..3]);
        assert_eq!(plan.adaptive_topics(&weak[..1]), &weak[..1]);
    }
}
