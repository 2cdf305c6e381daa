use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::ids::{SubjectId, TopicId, UnitId};
use crate::model::notes::NotesContent;
use crate::model::progress::{rounded_percent, rounded_ratio};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CurriculumError {
    #[error("subject name cannot be empty")]
    EmptySubjectName,

    #[error("unit name cannot be empty")]
    EmptyUnitName,

    #[error("topic name cannot be empty")]
    EmptyTopicName,

    #[error("subject {0} already exists")]
    DuplicateSubject(SubjectId),

    #[error("too many topics in subject: {len}")]
    TooManyTopics { len: usize },
}

//
// ─── TOPIC ─────────────────────────────────────────────────────────────────────
//

/// Leaf of the curriculum tree: the atomic trackable unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    id: TopicId,
    name: String,
    completed: bool,
    has_notes: bool,
    weak_area: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<NotesContent>,
}

impl Topic {
    /// Creates an incomplete topic without notes.
    ///
    /// # Errors
    ///
    /// Returns `CurriculumError::EmptyTopicName` if the name is blank.
    pub fn new(id: TopicId, name: impl Into<String>) -> Result<Self, CurriculumError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(CurriculumError::EmptyTopicName);
        }
        Ok(Self {
            id,
            name,
            completed: false,
            has_notes: false,
            weak_area: false,
            notes: None,
        })
    }

    #[must_use]
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    #[must_use]
    pub fn with_weak_area(mut self, weak_area: bool) -> Self {
        self.weak_area = weak_area;
        self
    }

    /// Flags the topic as having notes without carrying their content.
    #[must_use]
    pub fn with_has_notes(mut self, has_notes: bool) -> Self {
        self.has_notes = has_notes;
        self
    }

    #[must_use]
    pub fn with_notes(mut self, notes: NotesContent) -> Self {
        self.has_notes = true;
        self.notes = Some(notes);
        self
    }

    #[must_use]
    pub fn id(&self) -> &TopicId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn has_notes(&self) -> bool {
        self.has_notes
    }

    #[must_use]
    pub fn weak_area(&self) -> bool {
        self.weak_area
    }

    #[must_use]
    pub fn notes(&self) -> Option<&NotesContent> {
        self.notes.as_ref()
    }

    /// Case-insensitive substring match of `needle` against the topic name.
    #[must_use]
    pub fn name_contains(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(&needle.to_lowercase())
    }
}

//
// ─── UNIT ──────────────────────────────────────────────────────────────────────
//

/// Ordered group of topics inside a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unit {
    id: UnitId,
    name: String,
    topics: Vec<Topic>,
}

impl Unit {
    /// # Errors
    ///
    /// Returns `CurriculumError::EmptyUnitName` if the name is blank.
    pub fn new(
        id: UnitId,
        name: impl Into<String>,
        topics: Vec<Topic>,
    ) -> Result<Self, CurriculumError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(CurriculumError::EmptyUnitName);
        }
        Ok(Self { id, name, topics })
    }

    #[must_use]
    pub fn id(&self) -> &UnitId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }
}

//
// ─── SUBJECT ───────────────────────────────────────────────────────────────────
//

/// Top-level curriculum node with cached aggregates.
///
/// `completed_topics`, `total_topics` and `progress` are recomputed after every
/// topic mutation, so they always agree with the topics beneath.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    id: SubjectId,
    name: String,
    units: Vec<Unit>,
    progress: u32,
    total_topics: u32,
    completed_topics: u32,
    upload_date: DateTime<Utc>,
}

impl Subject {
    /// Builds a subject and derives its aggregates from the topic tree.
    ///
    /// # Errors
    ///
    /// Returns `CurriculumError::EmptySubjectName` if the name is blank, or
    /// `CurriculumError::TooManyTopics` if the topic count does not fit in `u32`.
    pub fn new(
        id: SubjectId,
        name: impl Into<String>,
        units: Vec<Unit>,
        upload_date: DateTime<Utc>,
    ) -> Result<Self, CurriculumError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(CurriculumError::EmptySubjectName);
        }
        let len: usize = units.iter().map(|unit| unit.topics.len()).sum();
        if u32::try_from(len).is_err() {
            return Err(CurriculumError::TooManyTopics { len });
        }

        let mut subject = Self {
            id,
            name,
            units,
            progress: 0,
            total_topics: 0,
            completed_topics: 0,
            upload_date,
        };
        subject.recompute();
        Ok(subject)
    }

    #[must_use]
    pub fn id(&self) -> &SubjectId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Percentage of completed topics, rounded to the nearest integer.
    #[must_use]
    pub fn progress(&self) -> u32 {
        self.progress
    }

    #[must_use]
    pub fn total_topics(&self) -> u32 {
        self.total_topics
    }

    #[must_use]
    pub fn completed_topics(&self) -> u32 {
        self.completed_topics
    }

    #[must_use]
    pub fn upload_date(&self) -> DateTime<Utc> {
        self.upload_date
    }

    /// All topics in unit order.
    pub fn topics(&self) -> impl Iterator<Item = &Topic> {
        self.units.iter().flat_map(|unit| unit.topics.iter())
    }

    #[must_use]
    pub fn find_topic(&self, id: &TopicId) -> Option<&Topic> {
        self.topics().find(|topic| &topic.id == id)
    }

    fn topics_mut(&mut self) -> impl Iterator<Item = &mut Topic> {
        self.units
            .iter_mut()
            .flat_map(|unit| unit.topics.iter_mut())
    }

    /// Sets the completion flag on every topic with `id`.
    ///
    /// Returns `None` when no topic matched, otherwise whether any flag flipped.
    pub fn set_topic_completed(&mut self, id: &TopicId, completed: bool) -> Option<bool> {
        let mut found = false;
        let mut changed = false;
        for topic in self.topics_mut().filter(|topic| &topic.id == id) {
            found = true;
            changed |= topic.completed != completed;
            topic.completed = completed;
        }
        if !found {
            return None;
        }
        self.recompute();
        Some(changed)
    }

    /// Returns true when a topic with `id` exists in this subject.
    pub fn mark_topic_weak(&mut self, id: &TopicId) -> bool {
        let mut found = false;
        for topic in self.topics_mut().filter(|topic| &topic.id == id) {
            topic.weak_area = true;
            found = true;
        }
        found
    }

    /// Marks every topic whose name contains `needle` (case-insensitive) as weak.
    ///
    /// Returns the ids of the matched topics.
    pub fn mark_weak_matching(&mut self, needle: &str) -> Vec<TopicId> {
        let mut matched = Vec::new();
        for topic in self.topics_mut().filter(|t| t.name_contains(needle)) {
            topic.weak_area = true;
            matched.push(topic.id.clone());
        }
        matched
    }

    /// Returns true when a topic with `id` exists in this subject.
    pub fn attach_notes(&mut self, id: &TopicId, notes: &NotesContent) -> bool {
        let mut found = false;
        for topic in self.topics_mut().filter(|topic| &topic.id == id) {
            topic.has_notes = true;
            topic.notes = Some(notes.clone());
            found = true;
        }
        found
    }

    fn recompute(&mut self) {
        let mut total = 0_u32;
        let mut completed = 0_u32;
        for topic in self.topics() {
            total = total.saturating_add(1);
            if topic.completed {
                completed = completed.saturating_add(1);
            }
        }
        self.total_topics = total;
        self.completed_topics = completed;
        self.progress = rounded_percent(u64::from(completed), u64::from(total));
    }
}

//
// ─── CURRICULUM ────────────────────────────────────────────────────────────────
//

/// Append-only collection of subjects for the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Curriculum {
    subjects: Vec<Subject>,
}

impl Curriculum {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    /// Appends a subject.
    ///
    /// # Errors
    ///
    /// Returns `CurriculumError::DuplicateSubject` if the id is already present.
    pub fn add_subject(&mut self, subject: Subject) -> Result<(), CurriculumError> {
        if self.subjects.iter().any(|s| s.id == subject.id) {
            return Err(CurriculumError::DuplicateSubject(subject.id));
        }
        self.subjects.push(subject);
        Ok(())
    }

    pub fn topics(&self) -> impl Iterator<Item = &Topic> {
        self.subjects.iter().flat_map(Subject::topics)
    }

    #[must_use]
    pub fn find_topic(&self, id: &TopicId) -> Option<&Topic> {
        self.topics().find(|topic| &topic.id == id)
    }

    /// Full-tree scan; see `Subject::set_topic_completed` for the return value.
    pub fn set_topic_completed(&mut self, id: &TopicId, completed: bool) -> Option<bool> {
        self.subjects
            .iter_mut()
            .filter_map(|subject| subject.set_topic_completed(id, completed))
            .reduce(|a, b| a || b)
    }

    pub fn mark_topic_weak(&mut self, id: &TopicId) -> bool {
        self.subjects
            .iter_mut()
            .fold(false, |found, subject| subject.mark_topic_weak(id) || found)
    }

    pub fn mark_weak_matching(&mut self, needle: &str) -> Vec<TopicId> {
        self.subjects
            .iter_mut()
            .flat_map(|subject| subject.mark_weak_matching(needle))
            .collect()
    }

    pub fn attach_notes(&mut self, id: &TopicId, notes: &NotesContent) -> bool {
        self.subjects
            .iter_mut()
            .fold(false, |found, s| s.attach_notes(id, notes) || found)
    }

    /// Topics currently flagged as weak, in curriculum order.
    #[must_use]
    pub fn weak_topics(&self) -> Vec<&Topic> {
        self.topics().filter(|topic| topic.weak_area).collect()
    }

    /// Mean of the cached subject progress values; 0 with no subjects.
    #[must_use]
    pub fn overall_progress(&self) -> u32 {
        let sum: u64 = self
            .subjects
            .iter()
            .map(|subject| u64::from(subject.progress))
            .sum();
        let count = u64::try_from(self.subjects.len()).unwrap_or(u64::MAX);
        rounded_ratio(sum, count)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn topic(id: &str, name: &str, completed: bool) -> Topic {
        Topic::new(TopicId::new(id), name)
            .unwrap()
            .with_completed(completed)
    }

    fn algorithms_subject() -> Subject {
        let unit = Unit::new(
            UnitId::new("1-2"),
            "Algorithms",
            vec![
                topic("1-2-1", "Sorting Algorithms", true),
                topic("1-2-2", "Graph Algorithms", false),
                topic("1-2-3", "Dynamic Programming", false),
            ],
        )
        .unwrap();
        Subject::new(
            SubjectId::new("1"),
            "Computer Science",
            vec![unit],
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn subject_aggregates_are_derived_from_topics() {
        let subject = algorithms_subject();
        assert_eq!(subject.total_topics(), 3);
        assert_eq!(subject.completed_topics(), 1);
        assert_eq!(subject.progress(), 33);
    }

    #[test]
    fn empty_subject_has_zero_progress() {
        let subject = Subject::new(SubjectId::new("9"), "Empty", Vec::new(), fixed_now()).unwrap();
        assert_eq!(subject.total_topics(), 0);
        assert_eq!(subject.progress(), 0);
    }

    #[test]
    fn blank_names_are_rejected() {
        assert_eq!(
            Topic::new(TopicId::new("x"), "  ").unwrap_err(),
            CurriculumError::EmptyTopicName
        );
        assert_eq!(
            Unit::new(UnitId::new("u"), "", Vec::new()).unwrap_err(),
            CurriculumError::EmptyUnitName
        );
        assert_eq!(
            Subject::new(SubjectId::new("s"), " ", Vec::new(), fixed_now()).unwrap_err(),
            CurriculumError::EmptySubjectName
        );
    }

    #[test]
    fn completing_a_topic_recomputes_subject_aggregates() {
        let mut subject = algorithms_subject();
        let changed = subject.set_topic_completed(&TopicId::new("1-2-2"), true);
        assert_eq!(changed, Some(true));
        assert_eq!(subject.completed_topics(), 2);
        assert_eq!(subject.progress(), 67);

        let unchanged = subject.set_topic_completed(&TopicId::new("1-2-2"), true);
        assert_eq!(unchanged, Some(false));
        assert_eq!(subject.completed_topics(), 2);
    }

    #[test]
    fn unknown_topic_is_a_silent_miss() {
        let mut subject = algorithms_subject();
        let nope = TopicId::new("nope");
        assert_eq!(subject.set_topic_completed(&nope, true), None);
        assert!(!subject.mark_topic_weak(&nope));
        assert_eq!(subject.completed_topics(), 1);
    }

    #[test]
    fn weak_matching_is_case_insensitive_substring() {
        let mut subject = algorithms_subject();
        let matched = subject.mark_weak_matching("algorithms");
        assert_eq!(matched, vec![TopicId::new("1-2-1"), TopicId::new("1-2-2")]);
        let searching = subject.find_topic(&TopicId::new("1-2-3")).unwrap();
        assert!(!searching.weak_area());
    }

    #[test]
    fn attaching_notes_sets_has_notes() {
        let mut subject = algorithms_subject();
        let notes = NotesContent {
            overview: "Graphs".into(),
            ..NotesContent::default()
        };
        assert!(subject.attach_notes(&TopicId::new("1-2-2"), &notes));
        let topic = subject.find_topic(&TopicId::new("1-2-2")).unwrap();
        assert!(topic.has_notes());
        assert_eq!(topic.notes(), Some(&notes));
    }

    #[test]
    fn curriculum_rejects_duplicate_subject_ids() {
        let mut curriculum = Curriculum::new();
        curriculum.add_subject(algorithms_subject()).unwrap();
        let err = curriculum.add_subject(algorithms_subject()).unwrap_err();
        assert_eq!(err, CurriculumError::DuplicateSubject(SubjectId::new("1")));
        assert_eq!(curriculum.subjects().len(), 1);
    }

    #[test]
    fn overall_progress_is_rounded_mean() {
        let mut curriculum = Curriculum::new();
        assert_eq!(curriculum.overall_progress(), 0);

        curriculum.add_subject(algorithms_subject()).unwrap();
        let unit = Unit::new(
            UnitId::new("2-1"),
            "Calculus",
            vec![
                topic("2-1-1", "Derivatives", true),
                topic("2-1-2", "Integrals", true),
            ],
        )
        .unwrap();
        curriculum
            .add_subject(
                Subject::new(SubjectId::new("2"), "Mathematics", vec![unit], fixed_now()).unwrap(),
            )
            .unwrap();

        // (33 + 100) / 2 = 66.5 -> 67
        assert_eq!(curriculum.overall_progress(), 67);
    }

    #[test]
    fn weak_topics_flatten_the_tree() {
        let mut curriculum = Curriculum::new();
        curriculum.add_subject(algorithms_subject()).unwrap();
        assert!(curriculum.weak_topics().is_empty());
        assert!(curriculum.mark_topic_weak(&TopicId::new("1-2-3")));
        let names: Vec<_> = curriculum.weak_topics().iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["Dynamic Programming"]);
    }
}
