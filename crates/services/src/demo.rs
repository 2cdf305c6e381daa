//! Sample curriculum and progress for a first run.

use chrono::{DateTime, Duration, Utc};
use study_core::model::{
    Curriculum, CurriculumError, Subject, SubjectId, Topic, TopicId, Unit, UnitId, UserProgress,
};

use crate::store::ProgressStore;

// (id, name, completed, has notes, weak)
type TopicRow = (&'static str, &'static str, bool, bool, bool);

const DATA_STRUCTURES: [TopicRow; 4] = [
    ("1-1-1", "Arrays and Linked Lists", true, true, false),
    ("1-1-2", "Stacks and Queues", true, true, true),
    ("1-1-3", "Trees and Graphs", false, false, false),
    ("1-1-4", "Hash Tables", true, true, false),
];
const ALGORITHMS: [TopicRow; 3] = [
    ("1-2-1", "Sorting Algorithms", true, true, false),
    ("1-2-2", "Graph Algorithms", false, false, true),
    ("1-2-3", "Dynamic Programming", false, false, true),
];
const CALCULUS: [TopicRow; 3] = [
    ("2-1-1", "Derivatives", true, true, false),
    ("2-1-2", "Integrals", false, false, true),
    ("2-1-3", "Limits", true, true, false),
];
const LINEAR_ALGEBRA: [TopicRow; 2] = [
    ("2-2-1", "Matrices", false, false, false),
    ("2-2-2", "Vector Spaces", false, false, true),
];

// Days since the Unix epoch.
const CS_UPLOAD_DAY: i64 = 19_737; // 2024-01-15
const MATH_UPLOAD_DAY: i64 = 19_742; // 2024-01-20

/// Two seeded subjects plus matching learner progress.
///
/// # Errors
///
/// Returns `CurriculumError` if the sample data is malformed.
pub fn demo_store() -> Result<ProgressStore, CurriculumError> {
    let mut curriculum = Curriculum::new();
    curriculum.add_subject(subject(
        "1",
        "Computer Science",
        CS_UPLOAD_DAY,
        &[
            ("1-1", "Data Structures", &DATA_STRUCTURES[..]),
            ("1-2", "Algorithms", &ALGORITHMS[..]),
        ],
    )?)?;
    curriculum.add_subject(subject(
        "2",
        "Mathematics",
        MATH_UPLOAD_DAY,
        &[
            ("2-1", "Calculus", &CALCULUS[..]),
            ("2-2", "Linear Algebra", &LINEAR_ALGEBRA[..]),
        ],
    )?)?;

    let progress = UserProgress::from_persisted(
        3600,
        7,
        23,
        15,
        78,
        [
            "Stacks and Queues",
            "Graph Algorithms",
            "Dynamic Programming",
            "Integrals",
            "Vector Spaces",
        ]
        .map(String::from)
        .to_vec(),
    );
    Ok(ProgressStore::with_state(curriculum, progress))
}

fn subject(
    id: &str,
    name: &str,
    upload_day: i64,
    units: &[(&str, &str, &[TopicRow])],
) -> Result<Subject, CurriculumError> {
    let units = units
        .iter()
        .map(|(unit_id, unit_name, rows)| {
            let topics = rows
                .iter()
                .map(|&(topic_id, topic_name, completed, has_notes, weak)| {
                    Topic::new(TopicId::new(topic_id), topic_name).map(|topic| {
                        topic
                            .with_completed(completed)
                            .with_has_notes(has_notes)
                            .with_weak_area(weak)
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Unit::new(UnitId::new(*unit_id), *unit_name, topics)
        })
        .collect::<Result<Vec<_>, _>>()?;
    let upload_date = DateTime::<Utc>::UNIX_EPOCH + Duration::days(upload_day);
    Subject::new(SubjectId::new(id), name, units, upload_date)
}
