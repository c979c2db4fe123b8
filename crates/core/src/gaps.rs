use std::collections::HashMap;

use crate::model::{DayRecord, SkillTag};

/// Keyword → tag table used to classify a question's skill.
///
/// Matching is a case-insensitive substring check; the first matching
/// keyword wins, anything else is `Unknown`.
const KEYWORD_TAGS: &[(&str, SkillTag)] = &[
    ("strategic", SkillTag::StrategicVision),
    ("engineering", SkillTag::UserEngineering),
    ("leadership", SkillTag::Leadership),
    ("technical", SkillTag::TechnicalMastery),
    ("measurement", SkillTag::Measurement),
];

/// Count an incorrect answer as a gap only after it recurs.
const GAP_THRESHOLD: usize = 1;

/// Classifies a question's skill by keyword.
#[must_use]
pub fn classify_question(question: &str) -> SkillTag {
    let lowered = question.to_lowercase();
    KEYWORD_TAGS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, tag)| *tag)
        .unwrap_or(SkillTag::Unknown)
}

/// Surfaces recurring weak skills from incorrect quiz answers.
///
/// Tallies the classified tag of every incorrect completion across the
/// given records and returns tags seen more than once. The output order is
/// the order in which each tag first exceeded the threshold, so it is
/// stable for a given record sequence.
#[must_use]
pub fn identify_gaps(records: &[DayRecord]) -> Vec<SkillTag> {
    let mut counts: HashMap<SkillTag, usize> = HashMap::new();
    let mut gaps = Vec::new();

    for record in records {
        for completion in record.quiz_completions() {
            if completion.is_correct {
                continue;
            }
            let tag = classify_question(&completion.question);
            let count = counts.entry(tag).or_insert(0);
            *count += 1;
            if *count == GAP_THRESHOLD + 1 {
                gaps.push(tag);
            }
        }
    }

    gaps
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
