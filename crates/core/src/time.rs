use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

/// A simple clock abstraction for deterministic time in services and tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }

    /// Returns true if this clock is fixed.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Clock::Fixed(_))
    }
}

//
// ─── DAY ARITHMETIC ────────────────────────────────────────────────────────────
//

/// Truncates a timestamp to its calendar date.
///
/// The day boundary is midnight UTC; two timestamps belong to the same day
/// exactly when their truncated dates are equal.
#[must_use]
pub fn day_of(at: DateTime<Utc>) -> NaiveDate {
    at.date_naive()
}

/// Whole calendar days between two timestamps, truncated to dates first.
///
/// Negative when `later` is on an earlier date than `earlier`. A pair like
/// 23:59 and 00:01 the next day counts as one full day even though less than
/// two minutes of wall time elapsed.
#[must_use]
pub fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    (day_of(later) - day_of(earlier)).num_days()
}

/// The next midnight strictly after `now`.
///
/// # Panics
///
/// Panics only if `now` is within one day of the end of the representable
/// `chrono` range, which cannot happen for wall-clock input.
#[must_use]
pub fn next_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    let tomorrow = day_of(now)
        .succ_opt()
        .expect("date overflow computing next midnight");
    Utc.from_utc_datetime(
        &tomorrow
            .and_hms_opt(0, 0, 0)
            .expect("midnight is a valid time"),
    )
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_returns_fixed_time() {
        let clock = fixed_clock();
        assert!(clock.is_fixed());
        assert_eq!(clock.now(), fixed_now());
    }

    #[test]
    fn advance_moves_fixed_clock() {
        let mut clock = fixed_clock();
        clock.advance(Duration::hours(3));
        assert_eq!(clock.now(), fixed_now() + Duration::hours(3));
    }

    #[test]
    fn days_between_truncates_to_dates() {
        let late_evening = Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 0).unwrap();
        let next_morning = Utc.with_ymd_and_hms(2024, 3, 2, 0, 1, 0).unwrap();

        assert_eq!(days_between(late_evening, next_morning), 1);
        assert_eq!(days_between(next_morning, late_evening), -1);
        assert_eq!(days_between(late_evening, late_evening), 0);
    }

    #[test]
    fn next_midnight_is_start_of_following_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 18, 30, 0).unwrap();
        let midnight = next_midnight(now);

        assert_eq!(midnight, Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap());
        assert!(midnight > now);
    }
}
