mod curriculum;
mod identity;
mod ids;
mod notes;
mod progress;
mod provider_config;
mod quiz;
mod syllabus;

pub use curriculum::{Curriculum, CurriculumError, Subject, Topic, Unit};
pub use identity::{IdentityError, UserIdentity, default_avatar_url};
pub use ids::{QuestionId, SubjectId, TopicId, UnitId};
pub use notes::NotesContent;
pub use progress::{UserProgress, rounded_percent};
pub use provider_config::{ProviderConfig, ProviderConfigDraft, ProviderConfigError};
pub use quiz::{Choice, Difficulty, OPTION_COUNT, QuizQuestion, QuizQuestionError, QuizResult};
pub use syllabus::{ParsedSyllabus, ParsedUnit};
