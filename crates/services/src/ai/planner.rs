use async_trait::async_trait;
use serde::Deserialize;

use journey_core::model::{Course, Profile};

use super::client::GeneratorService;
use crate::error::GenerationError;

/// Course length used when neither the caller nor the plan supplies one.
pub const DEFAULT_PLAN_DURATION_DAYS: u32 = 180;

const PLANNER_SYSTEM_PROMPT: &str = "You are an AI learning planner. Create personalized \
learning journeys based on user profiles. Return JSON with: courseTitle, duration (days), \
focusArea, learningObjectives, and dailyStructure.";

/// A generated multi-day learning plan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPlan {
    pub course_title: String,
    pub duration: u32,
    pub focus_area: String,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub daily_structure: String,
}

impl LearningPlan {
    /// The course this plan assigns to the journey.
    #[must_use]
    pub fn into_course(self) -> Course {
        Course {
            title: self.course_title,
            duration_days: self.duration,
            focus_area: self.focus_area,
            learning_objectives: self.learning_objectives,
            daily_structure: self.daily_structure,
        }
    }
}

/// Collaborator that produces multi-day learning plans.
#[async_trait]
pub trait PlanGenerator: Send + Sync {
    /// Generate a plan for the given profile.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` on failure or timeout; callers substitute
    /// [`fallback_plan`] so plan requests never fail outright.
    async fn generate_plan(
        &self,
        profile: &Profile,
        focus_area: Option<&str>,
        duration_days: Option<u32>,
    ) -> Result<LearningPlan, GenerationError>;
}

#[async_trait]
impl PlanGenerator for GeneratorService {
    async fn generate_plan(
        &self,
        profile: &Profile,
        focus_area: Option<&str>,
        duration_days: Option<u32>,
    ) -> Result<LearningPlan, GenerationError> {
        let goals = profile
            .goals
            .iter()
            .map(|g| g.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let growth_areas = profile
            .growth_areas
            .iter()
            .map(|g| g.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let user_prompt = format!(
            "Create a personalized learning plan for:\n\
             Skill Level: {}\n\
             Desired Level: {}\n\
             Goals: {goals}\n\
             Growth Areas: {growth_areas}\n\
             Focus Area: {}\n\
             Duration: {} days",
            profile.skill_level.as_str(),
            profile.desired_level.as_str(),
            focus_area.unwrap_or("strategic_foresight"),
            duration_days.unwrap_or(DEFAULT_PLAN_DURATION_DAYS),
        );

        let raw = self.complete_json(PLANNER_SYSTEM_PROMPT, &user_prompt).await?;
        let plan: LearningPlan = serde_json::from_str(&raw)
            .map_err(|e| GenerationError::MalformedContent(e.to_string()))?;

        if plan.duration == 0 {
            return Err(GenerationError::MalformedContent(
                "plan duration must be positive".into(),
            ));
        }
        Ok(plan)
    }
}

/// Deterministic plan used whenever generation fails or is disabled.
#[must_use]
pub fn fallback_plan(focus_area: Option<&str>, duration_days: Option<u32>) -> LearningPlan {
    LearningPlan {
        course_title: "Personalized Learning Journey".into(),
        duration: duration_days.unwrap_or(DEFAULT_PLAN_DURATION_DAYS),
        focus_area: focus_area.unwrap_or("strategic_foresight").into(),
        learning_objectives: vec![
            "Master prospective terminology".into(),
            "Develop strategic thinking skills".into(),
            "Apply foresight methodologies".into(),
        ],
        daily_structure: "Five phases per day (scan, analyze, interpret, prospect, act) \
                          delivered as 15-minute lessons with practical exercises"
            .into(),
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
