use chrono::{DateTime, Utc};

use journey_core::model::LearningJourney;
use journey_core::progression::{next_lesson_time, NextLessonTime};

/// Aggregated view of journey progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyProgress {
    pub current_day: u32,
    pub total_days: u32,
    pub completed_days: usize,
    pub streak: u32,
    pub total_score: u32,
    pub course_title: Option<String>,
    pub focus_area: Option<String>,
    pub next_lesson: NextLessonTime,
}

impl JourneyProgress {
    /// Projects the read-only progress numbers for a journey at `now`.
    #[must_use]
    pub fn project(journey: &LearningJourney, now: DateTime<Utc>) -> Self {
        Self {
            current_day: journey.current_day(),
            total_days: journey.total_days(),
            completed_days: journey.completed_days().len(),
            streak: journey.streak(),
            total_score: journey.total_score(),
            course_title: journey.current_course().map(|c| c.title.clone()),
            focus_area: journey.current_course().map(|c| c.focus_area.clone()),
            next_lesson: next_lesson_time(now),
        }
    }
}
