use std::time::Duration;

use async_trait::async_trait;
use study_core::model::{ParsedSyllabus, ParsedUnit};

use super::{Pipeline, ProgressFn, Stage};
use crate::error::PipelineError;

/// What the learner handed in: an uploaded file, pasted text, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyllabusInput {
    pub file_name: Option<String>,
    pub text: String,
}

impl SyllabusInput {
    #[must_use]
    pub fn from_file(name: impl Into<String>) -> Self {
        Self {
            file_name: Some(name.into()),
            text: String::new(),
        }
    }

    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            file_name: None,
            text: text.into(),
        }
    }

    /// True when there is neither a file nor any non-blank text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.file_name.is_none() && self.text.trim().is_empty()
    }
}

/// Turns a syllabus document into a subject outline.
#[async_trait]
pub trait SyllabusProcessor: Send + Sync {
    /// # Errors
    ///
    /// Returns `PipelineError::NoInput` when `input` is empty.
    async fn process(
        &self,
        input: &SyllabusInput,
        progress: ProgressFn<'_>,
    ) -> Result<ParsedSyllabus, PipelineError>;
}

/// Walks the processing stages with fixed delays and returns a canned outline.
#[derive(Debug, Clone)]
pub struct SimulatedSyllabusProcessor {
    pipeline: Pipeline,
}

impl Default for SimulatedSyllabusProcessor {
    fn default() -> Self {
        let stage = |label: &str, millis| Stage::new(label, Duration::from_millis(millis));
        Self::new(Pipeline::new(vec![
            stage("Parsing syllabus document...", 1500),
            stage("Extracting subjects and topics...", 1500),
            stage("Organizing content with AI...", 2000),
            stage("Generating study notes...", 1500),
        ]))
    }
}

impl SimulatedSyllabusProcessor {
    #[must_use]
    pub fn new(pipeline: Pipeline) -> Self {
        Self { pipeline }
    }

    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }
}

#[async_trait]
impl SyllabusProcessor for SimulatedSyllabusProcessor {
    async fn process(
        &self,
        input: &SyllabusInput,
        progress: ProgressFn<'_>,
    ) -> Result<ParsedSyllabus, PipelineError> {
        if input.is_empty() {
            return Err(PipelineError::NoInput);
        }
        self.pipeline.run(progress).await?;
        Ok(sample_syllabus())
    }
}

fn unit(name: &str, topics: [&str; 4]) -> ParsedUnit {
    ParsedUnit {
        name: name.to_string(),
        topics: topics.map(String::from).to_vec(),
    }
}

fn sample_syllabus() -> ParsedSyllabus {
    ParsedSyllabus {
        subject: "Computer Science Advanced Topics".to_string(),
        units: vec![
            unit(
                "Data Structures and Algorithms",
                [
                    "Binary Trees",
                    "Hash Tables",
                    "Graph Algorithms",
                    "Dynamic Programming",
                ],
            ),
            unit(
                "Database Systems",
                [
                    "SQL Fundamentals",
                    "Normalization",
                    "Indexing",
                    "Transaction Management",
                ],
            ),
            unit(
                "Software Engineering",
                [
                    "Design Patterns",
                    "Testing Strategies",
                    "Agile Methodologies",
                    "Code Quality",
                ],
            ),
        ],
    }
}
