use std::time::Duration;

use async_trait::async_trait;
use study_core::model::NotesContent;

use super::{Pipeline, ProgressFn, Stage};
use crate::error::PipelineError;

/// Produces study notes for a single topic.
#[async_trait]
pub trait NotesGenerator: Send + Sync {
    /// # Errors
    ///
    /// Returns `PipelineError` if generation cannot complete.
    async fn generate(
        &self,
        topic_name: &str,
        progress: ProgressFn<'_>,
    ) -> Result<NotesContent, PipelineError>;
}

/// Five one-second stages, then notes templated from the topic name.
#[derive(Debug, Clone)]
pub struct SimulatedNotesGenerator {
    pipeline: Pipeline,
}

impl Default for SimulatedNotesGenerator {
    fn default() -> Self {
        let second = Duration::from_secs(1);
        Self::new(Pipeline::new(
            [
                "Analyzing topic content...",
                "Generating conceptual overview...",
                "Creating key points...",
                "Adding practical examples...",
                "Preparing practice questions...",
            ]
            .into_iter()
            .map(|label| Stage::new(label, second))
            .collect(),
        ))
    }
}

impl SimulatedNotesGenerator {
    #[must_use]
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }
}

#[async_trait]
impl NotesGenerator for SimulatedNotesGenerator {
    async fn generate(
        &self,
        topic_name: &str,
        progress: ProgressFn<'_>,
    ) -> Result<NotesContent, PipelineError> {
        self.pipeline.run(progress).await?;
        Ok(templated_notes(topic_name))
    }
}

const KEY_POINTS: [&str; 4] = [
    "Time Complexity: Understanding the performance characteristics in different scenarios",
    "Space Complexity: Memory usage considerations and trade-offs",
    "Real-world Applications: Where and how this concept is applied in practice",
    "Common Pitfalls: Mistakes to avoid when implementing or using this concept",
];

const EXAMPLES: [&str; 3] = [
    "Optimization Techniques: Methods to improve performance and efficiency",
    "Edge Cases: Special scenarios that require careful consideration",
    "Integration: How this concept works with other data structures and algorithms",
];

const PRACTICE_QUESTIONS: [&str; 3] = [
    "Compare and contrast different approaches to implementing this concept",
    "Analyze the time and space complexity of various operations",
    "Design a solution using this concept for a real-world problem",
];

fn templated_notes(topic: &str) -> NotesContent {
    let definition = format!(
        "Definition: {topic} refers to the systematic organization of data to enable \
         efficient access and modification"
    );
    let mut key_points = vec![definition];
    key_points.extend(KEY_POINTS.map(String::from));

    let basic = format!(
        "Basic Implementation: A simple example showing how {topic} works in practice"
    );
    let mut examples = vec![basic];
    examples.extend(EXAMPLES.map(String::from));

    let core = format!("Explain the core principles behind {topic} and why it's important");
    let mut practice_questions = vec![core];
    practice_questions.extend(PRACTICE_QUESTIONS.map(String::from));

    NotesContent {
        overview: format!(
            "{topic} is a fundamental concept in computer science that deals with organizing \
             and storing data efficiently. Understanding this topic is crucial for developing \
             efficient algorithms and solving complex computational problems. The key is to \
             grasp not just the implementation details, but the underlying principles that \
             govern when and why to use different approaches."
        ),
        key_points,
        examples,
        practice_questions,
    }
}
