mod bank;
mod plan;
mod service;
mod session;

// Public API of the quiz subsystem.
pub use crate::error::{QuizServiceError, QuizSessionError};
pub use bank::baseline_questions;
pub use plan::QuizPlan;
pub use service::QuizService;
pub use session::{QuizSession, QuizState, format_clock};
