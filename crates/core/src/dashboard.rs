use crate::model::LearningJourney;

/// Score movement across the last two completed days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    TrendingUp,
    TrendingDown,
    Stable,
}

impl Trend {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Trend::TrendingUp => "Trending Up",
            Trend::TrendingDown => "Trending Down",
            Trend::Stable => "Stable",
        }
    }
}

/// Read-only projection over the completed-day history.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub completed_count: usize,
    pub average_score: u32,
    /// 0-5 scale with one decimal, e.g. "3.5".
    pub rating: String,
    pub trend: Trend,
    pub estimated_level: &'static str,
}

/// Builds the dashboard projection. Pure; mutates nothing.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn build_dashboard(journey: &LearningJourney) -> DashboardView {
    let completed_count = journey.completed_days().len();

    // Per-day scores are 0-100, so the rounded average fits comfortably.
    let average_score = if completed_count > 0 {
        let count = u32::try_from(completed_count).unwrap_or(u32::MAX);
        let average = f64::from(journey.total_score()) / f64::from(count);
        average.round() as u32
    } else {
        0
    };

    let rating_value = f64::from(average_score) / 20.0;
    let rating = format!("{rating_value:.1}");

    let trend = match journey.completed_days() {
        [.., second_last, last] => {
            if last.score() > second_last.score() {
                Trend::TrendingUp
            } else {
                Trend::TrendingDown
            }
        }
        _ => Trend::Stable,
    };

    DashboardView {
        completed_count,
        average_score,
        rating,
        trend,
        estimated_level: estimated_level(rating_value),
    }
}

/// Threshold table mapping the 0-5 rating to a coarse proficiency estimate.
#[must_use]
pub fn estimated_level(rating: f64) -> &'static str {
    if rating >= 4.5 {
        "Master's Degree Level"
    } else if rating >= 3.5 {
        "Bachelor's Degree Level"
    } else if rating >= 2.5 {
        "Associate Degree Level"
    } else {
        "Beginner Level"
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
