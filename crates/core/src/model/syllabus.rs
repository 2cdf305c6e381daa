use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::curriculum::{CurriculumError, Subject, Topic, Unit};
use crate::model::ids::{SubjectId, TopicId, UnitId};

/// Structure extracted from a syllabus document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSyllabus {
    pub subject: String,
    pub units: Vec<ParsedUnit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedUnit {
    pub name: String,
    pub topics: Vec<String>,
}

impl ParsedSyllabus {
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.units.iter().map(|unit| unit.topics.len()).sum()
    }

    /// Builds a fresh subject; unit and topic ids are `<subject>-<unit#>-<topic#>`.
    ///
    /// # Errors
    ///
    /// Returns `CurriculumError` if any name is blank.
    pub fn into_subject(
        self,
        id: SubjectId,
        upload_date: DateTime<Utc>,
    ) -> Result<Subject, CurriculumError> {
        let mut units = Vec::with_capacity(self.units.len());
        for (u, parsed) in self.units.into_iter().enumerate() {
            let unit_id = format!("{id}-{}", u + 1);
            let topics = parsed
                .topics
                .into_iter()
                .enumerate()
                .map(|(t, name)| {
                    let id = TopicId::new(format!("{unit_id}-{}", t + 1));
                    Topic::new(id, name)
                })
                .collect::<Result<Vec<_>, _>>()?;
            units.push(Unit::new(UnitId::new(unit_id), parsed.name, topics)?);
        }
        Subject::new(id, self.subject, units, upload_date)
    }
}
