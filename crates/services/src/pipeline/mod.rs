//! Multi-stage processing with progress reporting.
//!
//! Processing is simulated today: each stage waits a fixed delay. Callers only
//! depend on the stage/progress contract, so real work can replace the delays.

mod ingestion;
mod notes;
mod syllabus;

use std::time::Duration;

use tracing::debug;

use crate::error::PipelineError;

pub use ingestion::IngestionService;
pub use notes::{NotesGenerator, SimulatedNotesGenerator};
pub use syllabus::{SimulatedSyllabusProcessor, SyllabusInput, SyllabusProcessor};

/// Progress callback handed to every processing step.
pub type ProgressFn<'a> = &'a mut (dyn FnMut(StageProgress) + Send);

/// A named processing step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    label: String,
    delay: Duration,
}

impl Stage {
    #[must_use]
    pub fn new(label: impl Into<String>, delay: Duration) -> Self {
        Self {
            label: label.into(),
            delay,
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Reported after each stage completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageProgress {
    pub label: String,
    pub index: usize,
    pub total: usize,
    /// `(index + 1) * 100 / total`.
    pub percent: u32,
}

/// Ordered stages run one after another; not cancellable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    #[must_use]
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Total simulated duration.
    #[must_use]
    pub fn total_delay(&self) -> Duration {
        self.stages.iter().map(Stage::delay).sum()
    }

    /// Run every stage in order, reporting after each one.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::NoStages` for an empty pipeline.
    pub async fn run(&self, progress: ProgressFn<'_>) -> Result<(), PipelineError> {
        if self.stages.is_empty() {
            return Err(PipelineError::NoStages);
        }
        let total = self.stages.len();
        for (index, stage) in self.stages.iter().enumerate() {
            debug!(stage = stage.label(), index, total, "stage started");
            tokio::time::sleep(stage.delay).await;
            progress(StageProgress {
                label: stage.label.clone(),
                index,
                total,
                percent: stage_percent(index, total),
            });
        }
        Ok(())
    }
}

fn stage_percent(index: usize, total: usize) -> u32 {
    let done = (index + 1).saturating_mul(100) / total.max(1);
    u32::try_from(done).unwrap_or(100)
}
