use chrono::{DateTime, Utc};

use crate::model::LearningJourney;
use crate::time::{days_between, next_midnight};

//
// ─── DAY GATE ──────────────────────────────────────────────────────────────────
//

/// True when `now` is on a later calendar day than the last lesson fetch.
///
/// Unconditionally true when no lesson has ever been fetched. Compares
/// date-truncated timestamps, so 23:59 → 00:01 crosses the boundary even
/// though barely any wall time elapsed.
#[must_use]
pub fn has_crossed_day(now: DateTime<Utc>, last_lesson_date: Option<DateTime<Utc>>) -> bool {
    match last_lesson_date {
        Some(last) => days_between(last, now) > 0,
        None => true,
    }
}

/// Whole calendar days elapsed since `last`, or `None` when `last` is unset.
#[must_use]
pub fn days_elapsed(now: DateTime<Utc>, last: Option<DateTime<Utc>>) -> Option<i64> {
    last.map(|l| days_between(l, now))
}

/// What the lesson session should do for a fetch at `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// The cached lesson is still today's lesson.
    UseCached,
    /// A fresh lesson must be generated; `reset_streak` is set when more
    /// than one calendar day passed since the last fetch.
    Regenerate { reset_streak: bool },
    /// The course has run out of days; nothing left to generate.
    CourseCompleted,
}

/// Decide whether the cached lesson still serves the current day.
///
/// Regeneration is needed when no lesson is cached, the cache belongs to a
/// different day index, or the calendar day rolled over since the last
/// fetch. When the day index has already moved past the course length the
/// decision is `CourseCompleted` instead.
#[must_use]
pub fn decide_gate(journey: &LearningJourney, now: DateTime<Utc>) -> GateDecision {
    let crossed = has_crossed_day(now, journey.last_lesson_date());
    let stale = match journey.current_lesson() {
        Some(lesson) => lesson.day != journey.current_day(),
        None => true,
    };

    if !crossed && !stale {
        return GateDecision::UseCached;
    }
    if journey.current_day() > journey.total_days() {
        return GateDecision::CourseCompleted;
    }

    let reset_streak = matches!(
        days_elapsed(now, journey.last_lesson_date()),
        Some(gap) if gap > 1
    );
    GateDecision::Regenerate { reset_streak }
}

//
// ─── STREAK ────────────────────────────────────────────────────────────────────
//

/// Streak value after completing a lesson at `now`.
///
/// Completion-based policy: the gap is measured from the previous completed
/// day, not from the last fetch.
/// - no prior completion → 1
/// - same calendar day → unchanged
/// - exactly one day later → +1
/// - more than one day later → this completion restarts the streak at 1
#[must_use]
pub fn streak_after_completion(
    last_completed_at: Option<DateTime<Utc>>,
    current_streak: u32,
    now: DateTime<Utc>,
) -> u32 {
    match last_completed_at {
        None => 1,
        Some(last) => match days_between(last, now) {
            0 => current_streak.max(1),
            1 => current_streak + 1,
            _ => 1,
        },
    }
}

/// Applies the completion streak policy to the journey in place and returns
/// the new value.
pub fn apply_streak_update(journey: &mut LearningJourney, now: DateTime<Utc>) -> u32 {
    let updated = streak_after_completion(journey.last_completed_at(), journey.streak(), now);
    journey.set_streak(updated);
    updated
}

//
// ─── SCORING ───────────────────────────────────────────────────────────────────
//

/// Rounded percentage for `correct` out of `total` answers.
///
/// An empty quiz scores 0 rather than dividing by zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn percentage_score(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    // Values stay in 0..=100, so the cast cannot truncate meaningfully.
    let ratio = f64::from(correct) / f64::from(total) * 100.0;
    ratio.round() as u32
}

/// Fixed feedback phrase for a day's correct-answer count.
#[must_use]
pub fn performance_label(correct: u32) -> &'static str {
    match correct {
        0 => "Ouch!!",
        1 => "What Happen?",
        2 => "Uh huh",
        3 => "Fair",
        4 => "Good",
        _ => "Well done!!",
    }
}

//
// ─── NEXT LESSON ───────────────────────────────────────────────────────────────
//

/// Countdown until the next lesson unlocks at midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextLessonTime {
    pub hours: i64,
    pub minutes: i64,
    pub next_available: DateTime<Utc>,
}

/// Time remaining until the next day boundary after `now`.
#[must_use]
pub fn next_lesson_time(now: DateTime<Utc>) -> NextLessonTime {
    let next_available = next_midnight(now);
    let remaining = next_available - now;
    NextLessonTime {
        hours: remaining.num_hours(),
        minutes: remaining.num_minutes() % 60,
        next_available,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
