use serde::{Deserialize, Serialize};

/// Study notes attached to a topic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotesContent {
    pub overview: String,
    pub key_points: Vec<String>,
    pub examples: Vec<String>,
    pub practice_questions: Vec<String>,
}

impl NotesContent {
    /// Notes with nothing in them carry no value for the learner.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.overview.trim().is_empty()
            && self.key_points.is_empty()
            && self.examples.is_empty()
            && self.practice_questions.is_empty()
    }
}
