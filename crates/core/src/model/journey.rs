use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::lesson::Lesson;
use crate::model::profile::SkillTag;
use crate::progression;
use crate::quiz::{self, SelectionError};

/// Quizzes a day must answer before it can be completed.
pub const REQUIRED_QUIZZES: u32 = 5;

/// Course length assigned to a journey before any plan is generated.
pub const DEFAULT_TOTAL_DAYS: u32 = 90;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum JourneyError {
    #[error("lesson quality rating must be between 1 and 5, got {provided}")]
    InvalidRating { provided: u8 },

    #[error("today's lesson has not been started")]
    LessonNotStarted,

    #[error("no lesson has been generated for the current day")]
    LessonNotGenerated,

    #[error("quiz index {provided} is out of range for a lesson with {available} questions")]
    InvalidQuizIndex { provided: usize, available: usize },

    #[error("quiz {quiz_index} was already submitted for this day")]
    DuplicateSubmission { quiz_index: usize },

    #[error("all {required} quizzes must be submitted before completing, got {submitted}")]
    IncompleteQuizzes { submitted: usize, required: u32 },

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error("persisted journey is inconsistent: {0}")]
    InvalidPersistedState(String),
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// The active course assigned by the plan generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub title: String,
    pub duration_days: u32,
    pub focus_area: String,
    pub learning_objectives: Vec<String>,
    pub daily_structure: String,
}

//
// ─── QUIZ COMPLETION ───────────────────────────────────────────────────────────
//

/// One answer to one MCQ within a day.
///
/// The question text is snapshotted at submission time so gap analysis stays
/// a pure function of the completed-day history even after the lesson cache
/// is overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizCompletion {
    pub quiz_index: usize,
    pub question: String,
    pub selected: String,
    pub is_correct: bool,
    pub submitted_at: DateTime<Utc>,
}

//
// ─── DAY RECORD ────────────────────────────────────────────────────────────────
//

/// Lifecycle of a single day's lesson, derived from the record contents.
///
/// Transitions are monotonic; nothing in the engine moves a day backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayState {
    Started,
    QuizzesInProgress,
    ReadyToComplete,
    Completed,
}

/// Persisted outcome of one day's engagement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    day: u32,
    completed_at: Option<DateTime<Utc>>,
    lesson_content: String,
    score: u32,
    correct_answers: u32,
    total_questions: u32,
    time_spent: u32,
    lesson_quality_rating: Option<u8>,
    quiz_completions: Vec<QuizCompletion>,
    knowledge_gaps: Vec<SkillTag>,
}

impl DayRecord {
    fn new(day: u32, lesson_content: String) -> Self {
        Self {
            day,
            completed_at: None,
            lesson_content,
            score: 0,
            correct_answers: 0,
            total_questions: REQUIRED_QUIZZES,
            time_spent: 0,
            lesson_quality_rating: None,
            quiz_completions: Vec::new(),
            knowledge_gaps: Vec::new(),
        }
    }

    #[must_use]
    pub fn day(&self) -> u32 {
        self.day
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn lesson_content(&self) -> &str {
        &self.lesson_content
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn time_spent(&self) -> u32 {
        self.time_spent
    }

    #[must_use]
    pub fn lesson_quality_rating(&self) -> Option<u8> {
        self.lesson_quality_rating
    }

    #[must_use]
    pub fn quiz_completions(&self) -> &[QuizCompletion] {
        &self.quiz_completions
    }

    #[must_use]
    pub fn knowledge_gaps(&self) -> &[SkillTag] {
        &self.knowledge_gaps
    }

    /// Current position in the per-day state machine.
    #[must_use]
    pub fn state(&self) -> DayState {
        if self.completed_at.is_some() {
            DayState::Completed
        } else if self.quiz_completions.len() >= REQUIRED_QUIZZES as usize {
            DayState::ReadyToComplete
        } else if self.quiz_completions.is_empty() {
            DayState::Started
        } else {
            DayState::QuizzesInProgress
        }
    }

    fn has_submission(&self, quiz_index: usize) -> bool {
        self.quiz_completions
            .iter()
            .any(|c| c.quiz_index == quiz_index)
    }

    /// Re-derive correct-answer count and score from the submissions.
    ///
    /// Called after every mutation; completion also calls it so the stored
    /// score is never trusted from earlier writes.
    fn rescore(&mut self) {
        let correct = self
            .quiz_completions
            .iter()
            .filter(|c| c.is_correct)
            .count();
        self.correct_answers = u32::try_from(correct).unwrap_or(u32::MAX);
        self.score = progression::percentage_score(self.correct_answers, self.total_questions);
    }

    fn refresh_gaps(&mut self) {
        let gaps = crate::gaps::identify_gaps(std::slice::from_ref(self));
        self.knowledge_gaps = gaps;
    }
}

//
// ─── SUMMARY ───────────────────────────────────────────────────────────────────
//

/// Returned by `complete_day`; everything the caller shows on the result screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySummary {
    pub day: u32,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub score_fraction: String,
    pub percentage: u32,
    pub performance: &'static str,
    pub streak: u32,
    pub total_score: u32,
    pub lesson_quality_rating: Option<u8>,
    pub knowledge_gaps: Vec<SkillTag>,
}

//
// ─── LEARNING JOURNEY ──────────────────────────────────────────────────────────
//

/// The user's journey through the active course.
///
/// Owned exclusively by the user aggregate; every mutation goes through the
/// guarded operations below so the progression invariants (monotonic day,
/// unique quiz indices, recomputed scores) cannot be bypassed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningJourney {
    current_course: Option<Course>,
    current_day: u32,
    total_days: u32,
    last_lesson_date: Option<DateTime<Utc>>,
    current_lesson: Option<Lesson>,
    completed_days: Vec<DayRecord>,
    streak: u32,
    total_score: u32,
}

impl Default for LearningJourney {
    fn default() -> Self {
        Self::new()
    }
}

impl LearningJourney {
    /// A fresh journey as created alongside a new user.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current_course: None,
            current_day: 1,
            total_days: DEFAULT_TOTAL_DAYS,
            last_lesson_date: None,
            current_lesson: None,
            completed_days: Vec::new(),
            streak: 0,
            total_score: 0,
        }
    }

    #[must_use]
    pub fn current_course(&self) -> Option<&Course> {
        self.current_course.as_ref()
    }

    #[must_use]
    pub fn current_day(&self) -> u32 {
        self.current_day
    }

    #[must_use]
    pub fn total_days(&self) -> u32 {
        self.total_days
    }

    #[must_use]
    pub fn last_lesson_date(&self) -> Option<DateTime<Utc>> {
        self.last_lesson_date
    }

    #[must_use]
    pub fn current_lesson(&self) -> Option<&Lesson> {
        self.current_lesson.as_ref()
    }

    #[must_use]
    pub fn completed_days(&self) -> &[DayRecord] {
        &self.completed_days
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    /// Timestamp of the most recent completed day, if any.
    #[must_use]
    pub fn last_completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_days
            .iter()
            .rev()
            .find_map(|r| r.completed_at)
    }

    /// The record for the given day index.
    #[must_use]
    pub fn day_record(&self, day: u32) -> Option<&DayRecord> {
        self.completed_days.iter().find(|r| r.day == day)
    }

    fn day_record_mut(&mut self, day: u32) -> Option<&mut DayRecord> {
        self.completed_days.iter_mut().find(|r| r.day == day)
    }

    pub(crate) fn set_streak(&mut self, streak: u32) {
        self.streak = streak;
    }

    /// Drops the streak to zero, as the day gate requires after a fetch gap
    /// of more than one calendar day.
    pub fn clear_streak(&mut self) {
        self.streak = 0;
    }

    /// Caches a freshly generated lesson and stamps the fetch timestamp.
    pub fn cache_lesson(&mut self, lesson: Lesson, now: DateTime<Utc>) {
        self.current_lesson = Some(lesson);
        self.last_lesson_date = Some(now);
    }

    /// Attaches a plan lazily, without resetting progress.
    ///
    /// Used when the first plan request finds no course yet.
    pub fn adopt_plan(&mut self, course: Course) {
        self.total_days = course.duration_days;
        self.current_course = Some(course);
    }

    /// Replaces the plan and restarts the journey from day one.
    ///
    /// Clears completed days, streak, total score, and the lesson cache.
    pub fn reset_with_plan(&mut self, course: Course) {
        self.total_days = course.duration_days;
        self.current_course = Some(course);
        self.current_day = 1;
        self.last_lesson_date = None;
        self.current_lesson = None;
        self.completed_days.clear();
        self.streak = 0;
        self.total_score = 0;
    }

    /// Starts (or re-rates) the current day's lesson.
    ///
    /// Finds or creates the day record for `current_day` and records the
    /// quality rating; calling it again for the same day overwrites the
    /// rating instead of duplicating the record.
    ///
    /// # Errors
    ///
    /// Returns `JourneyError::InvalidRating` if `rating` is outside 1-5.
    pub fn start_day(&mut self, rating: u8) -> Result<&DayRecord, JourneyError> {
        if !(1..=5).contains(&rating) {
            return Err(JourneyError::InvalidRating { provided: rating });
        }

        let day = self.current_day;
        if self.day_record(day).is_none() {
            let snapshot = self
                .current_lesson
                .as_ref()
                .map(|l| l.content.clone())
                .unwrap_or_default();
            self.completed_days.push(DayRecord::new(day, snapshot));
        }

        let record = self
            .day_record_mut(day)
            .ok_or(JourneyError::LessonNotStarted)?;
        record.lesson_quality_rating = Some(rating);
        record.refresh_gaps();
        Ok(&*record)
    }

    /// Validates and records one quiz answer for the current day.
    ///
    /// # Errors
    ///
    /// - `LessonNotStarted` if the day has no record yet
    /// - `LessonNotGenerated` if no lesson is cached
    /// - `InvalidQuizIndex` if the index has no MCQ
    /// - `DuplicateSubmission` if the index was already answered
    /// - `Selection` if the submitted text matches no accepted form
    pub fn submit_quiz(
        &mut self,
        quiz_index: usize,
        selected: &str,
        now: DateTime<Utc>,
    ) -> Result<&QuizCompletion, JourneyError> {
        let day = self.current_day;
        let Some(existing) = self.day_record(day) else {
            return Err(JourneyError::LessonNotStarted);
        };
        // The duplicate check comes first: resubmission is rejected no
        // matter what the new answer looks like.
        if existing.has_submission(quiz_index) {
            return Err(JourneyError::DuplicateSubmission { quiz_index });
        }

        let lesson = self
            .current_lesson
            .as_ref()
            .ok_or(JourneyError::LessonNotGenerated)?;
        let mcq = lesson
            .mcq(quiz_index)
            .ok_or(JourneyError::InvalidQuizIndex {
                provided: quiz_index,
                available: lesson.mcqs.len(),
            })?;

        let verdict = quiz::validate_selection(mcq, selected)?;
        let question = mcq.question().to_string();

        let record = self
            .day_record_mut(day)
            .ok_or(JourneyError::LessonNotStarted)?;

        record.quiz_completions.push(QuizCompletion {
            quiz_index,
            question,
            selected: selected.to_string(),
            is_correct: verdict.is_correct,
            submitted_at: now,
        });
        record.rescore();
        record.refresh_gaps();

        record
            .quiz_completions
            .last()
            .ok_or(JourneyError::LessonNotStarted)
    }

    /// Completes the current day: re-derives the score, advances the day,
    /// accumulates the total, and applies the streak update.
    ///
    /// # Errors
    ///
    /// - `LessonNotStarted` if the day has no record
    /// - `IncompleteQuizzes` unless all required quizzes were submitted
    pub fn complete_day(&mut self, now: DateTime<Utc>) -> Result<DaySummary, JourneyError> {
        let day = self.current_day;
        if self.day_record(day).is_none() {
            return Err(JourneyError::LessonNotStarted);
        }

        let submitted = self
            .day_record(day)
            .map(|r| r.quiz_completions.len())
            .unwrap_or_default();
        if submitted != REQUIRED_QUIZZES as usize {
            return Err(JourneyError::IncompleteQuizzes {
                submitted,
                required: REQUIRED_QUIZZES,
            });
        }

        // Streak looks at the previous completed day, so it must be derived
        // before this record gets its completion timestamp.
        let streak = progression::streak_after_completion(self.last_completed_at(), self.streak, now);
        self.streak = streak;

        let lesson_content = self.current_lesson.as_ref().map(|l| l.content.clone());
        let record = self
            .day_record_mut(day)
            .ok_or(JourneyError::LessonNotStarted)?;
        record.rescore();
        record.refresh_gaps();
        record.completed_at = Some(now);
        if record.lesson_content.is_empty() {
            record.lesson_content = lesson_content.unwrap_or_default();
        }

        // Engagement time, measured from the first submission of the day.
        let first_submission = record
            .quiz_completions
            .iter()
            .map(|c| c.submitted_at)
            .min();
        record.time_spent = first_submission
            .map(|s| u32::try_from((now - s).num_seconds().max(0)).unwrap_or(u32::MAX))
            .unwrap_or(0);

        let correct = record.correct_answers;
        let total = record.total_questions;
        let percentage = record.score;
        let rating = record.lesson_quality_rating;
        let gaps = record.knowledge_gaps.clone();

        self.total_score += percentage;
        self.current_day += 1;

        Ok(DaySummary {
            day,
            correct_answers: correct,
            total_questions: total,
            score_fraction: format!("{correct}/{total}"),
            percentage,
            performance: progression::performance_label(correct),
            streak,
            total_score: self.total_score,
            lesson_quality_rating: rating,
            knowledge_gaps: gaps,
        })
    }

    /// Checks the structural invariants of a journey loaded from storage.
    ///
    /// # Errors
    ///
    /// Returns `JourneyError::InvalidPersistedState` naming the first
    /// violated invariant.
    pub fn validate(&self) -> Result<(), JourneyError> {
        if self.current_day < 1 {
            return Err(JourneyError::InvalidPersistedState(
                "current day must be at least 1".into(),
            ));
        }

        let mut previous_day = 0;
        for record in &self.completed_days {
            if record.day <= previous_day {
                return Err(JourneyError::InvalidPersistedState(format!(
                    "day records out of order at day {}",
                    record.day
                )));
            }
            previous_day = record.day;

            if record.quiz_completions.len() > REQUIRED_QUIZZES as usize {
                return Err(JourneyError::InvalidPersistedState(format!(
                    "day {} has more than {REQUIRED_QUIZZES} quiz completions",
                    record.day
                )));
            }
            for (i, completion) in record.quiz_completions.iter().enumerate() {
                if record.quiz_completions[..i]
                    .iter()
                    .any(|c| c.quiz_index == completion.quiz_index)
                {
                    return Err(JourneyError::InvalidPersistedState(format!(
                        "day {} repeats quiz index {}",
                        record.day, completion.quiz_index
                    )));
                }
            }
        }

        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::lesson::Mcq;
    use crate::model::profile::Language;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn build_lesson(day: u32) -> Lesson {
        let mcqs = (0..5)
            .map(|i| {
                Mcq::new(
                    format!("Question {i}?"),
                    vec![format!("Right {i}"), format!("Wrong {i}")],
                    format!("Right {i}"),
                    "",
                )
                .unwrap()
            })
            .collect();
        Lesson {
            title: format!("Day {day} lesson"),
            content: "Some markdown".into(),
            image_ref: None,
            mcqs,
            practical_exercise: "Try it".into(),
            key_takeaways: vec!["Takeaway".into()],
            day,
            total_days: 90,
            duration_minutes: Lesson::DEFAULT_DURATION_MINUTES,
            language: Language::En,
            generated_at: fixed_now(),
        }
    }

    fn started_journey() -> LearningJourney {
        let mut journey = LearningJourney::new();
        journey.cache_lesson(build_lesson(1), fixed_now());
        journey.start_day(4).unwrap();
        journey
    }

    fn submit_all(journey: &mut LearningJourney, correct: usize) {
        for i in 0..5 {
            let answer = if i < correct {
                format!("Right {i}")
            } else {
                format!("Wrong {i}")
            };
            journey.submit_quiz(i, &answer, fixed_now()).unwrap();
        }
    }

    #[test]
    fn start_day_rejects_invalid_rating() {
        let mut journey = LearningJourney::new();
        for rating in [0, 6] {
            let err = journey.start_day(rating).unwrap_err();
            assert!(matches!(err, JourneyError::InvalidRating { .. }));
        }
        assert!(journey.completed_days().is_empty());
    }

    #[test]
    fn start_day_is_idempotent_per_day() {
        let mut journey = started_journey();
        journey.start_day(2).unwrap();

        assert_eq!(journey.completed_days().len(), 1);
        assert_eq!(
            journey.day_record(1).unwrap().lesson_quality_rating(),
            Some(2)
        );
    }

    #[test]
    fn submit_requires_started_day() {
        let mut journey = LearningJourney::new();
        journey.cache_lesson(build_lesson(1), fixed_now());

        let err = journey.submit_quiz(0, "Right 0", fixed_now()).unwrap_err();
        assert!(matches!(err, JourneyError::LessonNotStarted));
    }

    #[test]
    fn submit_rejects_duplicate_index() {
        let mut journey = started_journey();
        journey.submit_quiz(0, "Right 0", fixed_now()).unwrap();

        let err = journey.submit_quiz(0, "Wrong 0", fixed_now()).unwrap_err();
        assert!(matches!(
            err,
            JourneyError::DuplicateSubmission { quiz_index: 0 }
        ));

        // Even gibberish hits the duplicate check before validation.
        let err = journey
            .submit_quiz(0, "not an option", fixed_now())
            .unwrap_err();
        assert!(matches!(err, JourneyError::DuplicateSubmission { .. }));
        assert_eq!(journey.day_record(1).unwrap().quiz_completions().len(), 1);
    }

    #[test]
    fn submit_rejects_out_of_range_index() {
        let mut journey = started_journey();
        let err = journey.submit_quiz(9, "Right 0", fixed_now()).unwrap_err();
        assert!(matches!(
            err,
            JourneyError::InvalidQuizIndex {
                provided: 9,
                available: 5
            }
        ));
    }

    #[test]
    fn submissions_rescore_the_record() {
        let mut journey = started_journey();
        journey.submit_quiz(0, "Right 0", fixed_now()).unwrap();
        journey.submit_quiz(1, "Wrong 1", fixed_now()).unwrap();

        let record = journey.day_record(1).unwrap();
        assert_eq!(record.correct_answers(), 1);
        assert_eq!(record.score(), 20);
        assert_eq!(record.state(), DayState::QuizzesInProgress);
    }

    #[test]
    fn complete_requires_all_quizzes() {
        let mut journey = started_journey();
        submit_all(&mut journey, 3);
        let mut partial = started_journey();
        partial.submit_quiz(0, "Right 0", fixed_now()).unwrap();

        let err = partial.complete_day(fixed_now()).unwrap_err();
        assert!(matches!(
            err,
            JourneyError::IncompleteQuizzes {
                submitted: 1,
                required: REQUIRED_QUIZZES
            }
        ));

        let summary = journey.complete_day(fixed_now()).unwrap();
        assert_eq!(summary.percentage, 60);
        assert_eq!(summary.score_fraction, "3/5");
        assert_eq!(summary.performance, "Fair");
    }

    #[test]
    fn complete_advances_day_and_accumulates_score() {
        let mut journey = started_journey();
        submit_all(&mut journey, 5);

        let summary = journey.complete_day(fixed_now()).unwrap();

        assert_eq!(summary.percentage, 100);
        assert_eq!(summary.performance, "Well done!!");
        assert_eq!(journey.current_day(), 2);
        assert_eq!(journey.total_score(), 100);
        assert_eq!(
            journey.day_record(1).unwrap().state(),
            DayState::Completed
        );
    }

    #[test]
    fn complete_twice_fails_without_new_start() {
        let mut journey = started_journey();
        submit_all(&mut journey, 5);
        journey.complete_day(fixed_now()).unwrap();

        let err = journey.complete_day(fixed_now()).unwrap_err();
        assert!(matches!(err, JourneyError::LessonNotStarted));
    }

    #[test]
    fn consecutive_daily_completions_build_streak() {
        let mut journey = LearningJourney::new();
        let mut now = fixed_now();

        for day in 1..=3 {
            journey.cache_lesson(build_lesson(day), now);
            journey.start_day(3).unwrap();
            submit_all(&mut journey, 5);
            let summary = journey.complete_day(now).unwrap();
            assert_eq!(summary.streak, day);
            now += Duration::days(1);
        }

        assert_eq!(journey.streak(), 3);
    }

    #[test]
    fn completion_after_long_gap_restarts_streak() {
        let mut journey = LearningJourney::new();
        let mut now = fixed_now();

        for day in 1..=2 {
            journey.cache_lesson(build_lesson(day), now);
            journey.start_day(3).unwrap();
            submit_all(&mut journey, 5);
            journey.complete_day(now).unwrap();
            now += Duration::days(1);
        }
        assert_eq!(journey.streak(), 2);

        now += Duration::days(3);
        journey.cache_lesson(build_lesson(3), now);
        journey.start_day(3).unwrap();
        submit_all(&mut journey, 5);
        let summary = journey.complete_day(now).unwrap();

        assert_eq!(summary.streak, 1);
    }

    #[test]
    fn reset_with_plan_clears_progress() {
        let mut journey = started_journey();
        submit_all(&mut journey, 5);
        journey.complete_day(fixed_now()).unwrap();

        journey.reset_with_plan(Course {
            title: "Fresh".into(),
            duration_days: 30,
            focus_area: "strategic_foresight".into(),
            learning_objectives: vec![],
            daily_structure: String::new(),
        });

        assert_eq!(journey.current_day(), 1);
        assert_eq!(journey.total_days(), 30);
        assert_eq!(journey.streak(), 0);
        assert_eq!(journey.total_score(), 0);
        assert!(journey.completed_days().is_empty());
        assert!(journey.current_lesson().is_none());
    }

    #[test]
    fn validate_catches_duplicate_quiz_indices() {
        let mut journey = started_journey();
        journey.submit_quiz(0, "Right 0", fixed_now()).unwrap();

        let mut tampered = journey.clone();
        let record = tampered.day_record_mut(1).unwrap();
        let dup = record.quiz_completions[0].clone();
        record.quiz_completions.push(dup);

        assert!(journey.validate().is_ok());
        assert!(matches!(
            tampered.validate().unwrap_err(),
            JourneyError::InvalidPersistedState(_)
        ));
    }
}
