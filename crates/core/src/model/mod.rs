mod ids;
mod journey;
mod lesson;
mod profile;

pub use ids::UserId;

pub use journey::{
    Course, DayRecord, DayState, DaySummary, JourneyError, LearningJourney, QuizCompletion,
    DEFAULT_TOTAL_DAYS, REQUIRED_QUIZZES,
};
pub use lesson::{Lesson, LessonError, Mcq};
pub use profile::{
    AgeGroup, DesiredLevel, Goal, GrowthArea, Language, LearningPace, Preferences, Profession,
    Profile, ProfileError, SkillEntry, SkillLevel, SkillTag,
};

use serde::{Deserialize, Serialize};

/// The aggregate root: one registered learner.
///
/// Credentials and token state live with the identity collaborator; this
/// type carries only what the progression engine reads and writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub profile: Profile,
    pub preferences: Preferences,
    pub journey: LearningJourney,
}

impl User {
    /// A new user with a fresh journey and default preferences.
    #[must_use]
    pub fn new(id: UserId, email: impl Into<String>, profile: Profile) -> Self {
        Self {
            id,
            email: email.into(),
            profile,
            preferences: Preferences::default(),
            journey: LearningJourney::new(),
        }
    }
}
