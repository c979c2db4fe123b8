use std::sync::Arc;

use journey_core::dashboard::build_dashboard;
use journey_core::model::UserId;
use journey_core::progression::{next_lesson_time, NextLessonTime};
use journey_core::Clock;
use storage::repository::JourneyRepository;

use crate::error::DashboardServiceError;

/// The dashboard as rendered for the user.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub course_name: String,
    pub average_score: u32,
    /// Formatted 0-5 rating, e.g. "3.5 / 5".
    pub rating: String,
    pub trend: &'static str,
    pub lessons_completed: usize,
    pub estimated_level: &'static str,
    pub next_lesson: NextLessonTime,
}

/// Read-only dashboard projection; never mutates the journey.
#[derive(Clone)]
pub struct DashboardService {
    clock: Clock,
    journeys: Arc<dyn JourneyRepository>,
}

impl DashboardService {
    #[must_use]
    pub fn new(clock: Clock, journeys: Arc<dyn JourneyRepository>) -> Self {
        Self { clock, journeys }
    }

    /// Builds the dashboard for the given user.
    ///
    /// # Errors
    ///
    /// Returns `DashboardServiceError::Storage` when the journey cannot load.
    pub async fn dashboard(&self, user_id: UserId) -> Result<DashboardSummary, DashboardServiceError> {
        let journey = self.journeys.load_journey(user_id).await?;
        let view = build_dashboard(&journey);

        Ok(DashboardSummary {
            course_name: journey
                .current_course()
                .map(|c| c.title.clone())
                .unwrap_or_else(|| "No Course".into()),
            average_score: view.average_score,
            rating: format!("{} / 5", view.rating),
            trend: view.trend.as_str(),
            lessons_completed: view.completed_count,
            estimated_level: view.estimated_level,
            next_lesson: next_lesson_time(self.clock.now()),
        })
    }
}
