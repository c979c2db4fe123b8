use std::sync::Arc;

use tracing::warn;

use journey_core::model::{Profile, UserId};
use storage::repository::{JourneyRepository, UserRepository};

use crate::ai::{fallback_plan, LearningPlan, PlanGenerator};
use crate::error::PlanServiceError;

/// The plan as presented to the user: title plus numbered module list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanView {
    pub course_title: String,
    pub modules: Vec<String>,
    pub duration: u32,
}

/// Lazily creates and explicitly regenerates learning plans.
#[derive(Clone)]
pub struct PlanService {
    users: Arc<dyn UserRepository>,
    journeys: Arc<dyn JourneyRepository>,
    planner: Arc<dyn PlanGenerator>,
}

impl PlanService {
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        journeys: Arc<dyn JourneyRepository>,
        planner: Arc<dyn PlanGenerator>,
    ) -> Self {
        Self {
            users,
            journeys,
            planner,
        }
    }

    async fn generate_or_fallback(
        &self,
        user_id: UserId,
        profile: &Profile,
        focus_area: Option<&str>,
        duration_days: Option<u32>,
    ) -> LearningPlan {
        match self
            .planner
            .generate_plan(profile, focus_area, duration_days)
            .await
        {
            Ok(plan) => plan,
            Err(err) => {
                warn!(user = %user_id, error = %err, "plan generation failed, serving fallback");
                fallback_plan(focus_area, duration_days)
            }
        }
    }

    /// Returns the user's plan, generating one on first request.
    ///
    /// The lazy path assigns the course without touching existing progress.
    ///
    /// # Errors
    ///
    /// Returns `PlanServiceError::Storage` on load/persist failures.
    pub async fn learning_plan(&self, user_id: UserId) -> Result<PlanView, PlanServiceError> {
        let user = self.users.get_user(user_id).await?;
        let mut journey = user.journey;

        if journey.current_course().is_none() {
            let plan = self
                .generate_or_fallback(user_id, &user.profile, None, None)
                .await;
            journey.adopt_plan(plan.into_course());
            self.journeys.save_journey(user_id, &journey).await?;
        }

        let (course_title, modules) = match journey.current_course() {
            Some(course) => (
                course.title.clone(),
                course
                    .learning_objectives
                    .iter()
                    .enumerate()
                    .map(|(i, objective)| format!("{}. {objective}", i + 1))
                    .collect(),
            ),
            None => (String::new(), Vec::new()),
        };

        Ok(PlanView {
            course_title,
            modules,
            duration: journey.total_days(),
        })
    }

    /// Regenerates the plan and restarts the journey from day one.
    ///
    /// Clears completed days, streak, and total score per the explicit
    /// regeneration contract.
    ///
    /// # Errors
    ///
    /// Returns `PlanServiceError::Storage` on load/persist failures.
    pub async fn regenerate_plan(
        &self,
        user_id: UserId,
        focus_area: Option<&str>,
        duration_days: Option<u32>,
    ) -> Result<LearningPlan, PlanServiceError> {
        let user = self.users.get_user(user_id).await?;
        let mut journey = user.journey;

        let plan = self
            .generate_or_fallback(user_id, &user.profile, focus_area, duration_days)
            .await;
        journey.reset_with_plan(plan.clone().into_course());
        self.journeys.save_journey(user_id, &journey).await?;

        Ok(plan)
    }
}
