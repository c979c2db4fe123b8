use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use journey_core::gaps::identify_gaps;
use journey_core::model::{
    DayRecord, DaySummary, JourneyError, LearningJourney, Lesson, QuizCompletion, UserId,
};
use journey_core::progression::{decide_gate, next_lesson_time, GateDecision, NextLessonTime};
use journey_core::Clock;
use storage::repository::{
    JourneyRepository, LessonArchiveRepository, StorageError, UserRepository,
};

use crate::ai::{fallback_lesson, LessonGenerator, LessonRequest};
use crate::error::LessonServiceError;
use super::progress::JourneyProgress;

/// Result of a today's-lesson fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum TodaysLesson {
    Ready(Box<LessonView>),
    /// The day index moved past the course length; nothing left to serve.
    CourseCompleted,
}

/// Today's lesson plus the progress numbers shown alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonView {
    pub todays_goal: String,
    pub lesson: Lesson,
    pub progress: JourneyProgress,
}

/// Everything the completion screen needs after a finished day.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSummary {
    pub summary: DaySummary,
    pub next_lesson: NextLessonTime,
}

/// Orchestrates the daily lesson workflow over one user's journey.
///
/// Each operation loads the aggregate, applies one guarded transition, and
/// persists the whole journey; concurrent writers are last-write-wins at
/// aggregate granularity.
#[derive(Clone)]
pub struct LessonLoopService {
    clock: Clock,
    users: Arc<dyn UserRepository>,
    journeys: Arc<dyn JourneyRepository>,
    lesson_archive: Arc<dyn LessonArchiveRepository>,
    generator: Arc<dyn LessonGenerator>,
}

impl LessonLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        users: Arc<dyn UserRepository>,
        journeys: Arc<dyn JourneyRepository>,
        lesson_archive: Arc<dyn LessonArchiveRepository>,
        generator: Arc<dyn LessonGenerator>,
    ) -> Self {
        Self {
            clock,
            users,
            journeys,
            lesson_archive,
            generator,
        }
    }

    /// Returns today's lesson, generating a fresh one when the day gate says
    /// the cache no longer serves the current day.
    ///
    /// Generation failures are recovered with deterministic fallback content;
    /// the request still succeeds. The lesson cache and timestamps are only
    /// written once a lesson (real or fallback) is in hand.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::Storage` when the aggregate cannot be
    /// loaded or persisted.
    pub async fn todays_lesson(&self, user_id: UserId) -> Result<TodaysLesson, LessonServiceError> {
        let user = self.users.get_user(user_id).await?;
        let mut journey = user.journey;
        let now = self.clock.now();

        match decide_gate(&journey, now) {
            GateDecision::CourseCompleted => Ok(TodaysLesson::CourseCompleted),
            GateDecision::UseCached => {
                let Some(lesson) = journey.current_lesson().cloned() else {
                    // The gate never chooses the cache without a lesson.
                    return Err(JourneyError::LessonNotGenerated.into());
                };
                Ok(Self::ready(lesson, &journey, now))
            }
            GateDecision::Regenerate { reset_streak } => {
                if reset_streak {
                    debug!(user = %user_id, "multi-day gap on fetch, streak dropped");
                    journey.clear_streak();
                }

                let request = LessonRequest {
                    skill_level: user.profile.skill_level,
                    learning_pace: user.preferences.learning_pace,
                    language: user.preferences.language,
                    current_day: journey.current_day(),
                    total_days: journey.total_days(),
                    completed_days: journey.completed_days().len(),
                    knowledge_gaps: identify_gaps(journey.completed_days()),
                };

                let lesson = match self.generator.generate_lesson(&request, now).await {
                    Ok(lesson) => lesson,
                    Err(err) => {
                        warn!(user = %user_id, error = %err, "lesson generation failed, serving fallback");
                        fallback_lesson(&request, now)
                    }
                };

                journey.cache_lesson(lesson.clone(), now);
                self.lesson_archive
                    .append_lesson(user_id, &lesson, now)
                    .await?;
                self.journeys.save_journey(user_id, &journey).await?;

                debug!(user = %user_id, day = journey.current_day(), "lesson cached for current day");
                Ok(Self::ready(lesson, &journey, now))
            }
        }
    }

    fn ready(lesson: Lesson, journey: &LearningJourney, now: DateTime<Utc>) -> TodaysLesson {
        TodaysLesson::Ready(Box::new(LessonView {
            todays_goal: format!("Today's Goal: {}", lesson.title),
            progress: JourneyProgress::project(journey, now),
            lesson,
        }))
    }

    /// Starts (or re-rates) the current day and returns its record.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::Journey` for an out-of-range rating and
    /// `Storage` for load/persist failures.
    pub async fn start_lesson(
        &self,
        user_id: UserId,
        rating: u8,
    ) -> Result<DayRecord, LessonServiceError> {
        let mut journey = self.journeys.load_journey(user_id).await?;
        let record = journey.start_day(rating)?.clone();
        self.journeys.save_journey(user_id, &journey).await?;
        Ok(record)
    }

    /// Validates and records one quiz answer for the current day.
    ///
    /// # Errors
    ///
    /// Propagates the workflow-state errors from the journey (not started,
    /// duplicate index, invalid selection) and storage failures.
    pub async fn submit_quiz(
        &self,
        user_id: UserId,
        quiz_index: usize,
        selected: &str,
    ) -> Result<QuizCompletion, LessonServiceError> {
        let mut journey = self.journeys.load_journey(user_id).await?;
        let now = self.clock.now();
        let completion = journey.submit_quiz(quiz_index, selected, now)?.clone();
        self.journeys.save_journey(user_id, &journey).await?;
        Ok(completion)
    }

    /// Completes the current day and returns the summary for the result
    /// screen.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::Journey` unless all quizzes are in, and
    /// `Storage` when persistence fails after the mutation (surfaced, never
    /// swallowed).
    pub async fn complete_lesson(
        &self,
        user_id: UserId,
    ) -> Result<CompletionSummary, LessonServiceError> {
        let mut journey = self.journeys.load_journey(user_id).await?;
        let now = self.clock.now();
        let summary = journey.complete_day(now)?;
        self.journeys.save_journey(user_id, &journey).await?;

        // Archive rows are auxiliary; a day completed before its lesson was
        // archived should not fail the completion.
        match self.lesson_archive.mark_completed(user_id, summary.day).await {
            Ok(()) | Err(StorageError::NotFound) => {}
            Err(err) => return Err(err.into()),
        }

        Ok(CompletionSummary {
            summary,
            next_lesson: next_lesson_time(now),
        })
    }

    /// Read-only progress projection for the given user.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::Storage` when the journey cannot load.
    pub async fn progress(&self, user_id: UserId) -> Result<JourneyProgress, LessonServiceError> {
        let journey = self.journeys.load_journey(user_id).await?;
        Ok(JourneyProgress::project(&journey, self.clock.now()))
    }
}
