use serde::Serialize;

use crate::store::StudyState;

const SECS_PER_HOUR: u64 = 3600;

/// Headline numbers shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub subject_count: usize,
    pub overall_progress: u32,
    pub completed_topics: u32,
    pub quizzes_taken: u32,
    pub average_score: u32,
    pub study_hours: u64,
    pub streak_days: u32,
    pub weak_topics: Vec<String>,
}

impl DashboardSummary {
    #[must_use]
    pub fn from_state(state: &StudyState) -> Self {
        let progress = state.user_progress();
        Self {
            subject_count: state.subjects().len(),
            overall_progress: state.overall_progress(),
            completed_topics: progress.completed_topics(),
            quizzes_taken: progress.quizzes_taken(),
            average_score: progress.average_score(),
            study_hours: rounded_hours(progress.total_study_time()),
            streak_days: progress.streak_days(),
            weak_topics: state
                .weak_topics()
                .into_iter()
                .map(|topic| topic.name().to_string())
                .collect(),
        }
    }
}

fn rounded_hours(secs: u64) -> u64 {
    secs.saturating_add(SECS_PER_HOUR / 2) / SECS_PER_HOUR
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ProgressStore;
    use study_core::model::{
        Curriculum, Subject, SubjectId, Topic, TopicId, Unit, UnitId, UserProgress,
    };
    use study_core::time::fixed_now;

    #[test]
    fn summary_reflects_store_state() {
        let topics = vec![
            Topic::new(TopicId::new("1-1-1"), "Binary Trees")
                .unwrap()
                .with_completed(true),
            Topic::new(TopicId::new("1-1-2"), "Hash Tables")
                .unwrap()
                .with_weak_area(true),
        ];
        let unit = Unit::new(UnitId::new("1-1"), "Structures", topics).unwrap();
        let subject = Subject::new(SubjectId::new("1"), "CS", vec![unit], fixed_now()).unwrap();
        let mut curriculum = Curriculum::new();
        curriculum.add_subject(subject).unwrap();
        let weak = vec!["Hash Tables".to_string()];
        let progress = UserProgress::from_persisted(45_000, 7, 3, 2, 78, weak);
        let store = ProgressStore::with_state(curriculum, progress);

        let summary = DashboardSummary::from_state(store.state());
        assert_eq!(summary.subject_count, 1);
        assert_eq!(summary.overall_progress, 50);
        assert_eq!(summary.completed_topics, 3);
        assert_eq!(summary.study_hours, 13);
        assert_eq!(summary.streak_days, 7);
        assert_eq!(summary.weak_topics, vec!["Hash Tables"]);

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["averageScore"], 78);
        assert_eq!(json["studyHours"], 13);
    }

    #[test]
    fn hours_round_half_up() {
        assert_eq!(rounded_hours(0), 0);
        assert_eq!(rounded_hours(1799), 0);
        assert_eq!(rounded_hours(1800), 1);
    }
}
