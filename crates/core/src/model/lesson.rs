use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::profile::Language;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("an MCQ needs at least two options, got {provided}")]
    TooFewOptions { provided: usize },

    #[error("MCQ options must be distinct: {duplicate:?} appears twice")]
    DuplicateOption { duplicate: String },

    #[error("correct answer {answer:?} does not match any option verbatim")]
    CorrectAnswerNotAnOption { answer: String },
}

//
// ─── MCQ ───────────────────────────────────────────────────────────────────────
//

/// One multiple-choice question inside a generated lesson.
///
/// `correct_answer` must equal one option's text verbatim; the invariant is
/// checked at construction so scoring never has to handle a dangling answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mcq {
    question: String,
    options: Vec<String>,
    correct_answer: String,
    explanation: String,
}

impl Mcq {
    /// Creates a validated MCQ.
    ///
    /// # Errors
    ///
    /// Returns `LessonError` if fewer than two options are given, options
    /// repeat, or the correct answer is not one of the options.
    pub fn new(
        question: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Result<Self, LessonError> {
        let correct_answer = correct_answer.into();

        if options.len() < 2 {
            return Err(LessonError::TooFewOptions {
                provided: options.len(),
            });
        }
        for (i, option) in options.iter().enumerate() {
            if options[..i].contains(option) {
                return Err(LessonError::DuplicateOption {
                    duplicate: option.clone(),
                });
            }
        }
        if !options.contains(&correct_answer) {
            return Err(LessonError::CorrectAnswerNotAnOption {
                answer: correct_answer,
            });
        }

        Ok(Self {
            question: question.into(),
            options,
            correct_answer,
            explanation: explanation.into(),
        })
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// A generated daily lesson.
///
/// This is the payload cached on the journey as `current_lesson` and
/// overwritten each new day. `content` is markdown; rendering happens at the
/// display layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_ref: Option<String>,
    pub mcqs: Vec<Mcq>,
    pub practical_exercise: String,
    pub key_takeaways: Vec<String>,
    pub day: u32,
    pub total_days: u32,
    pub duration_minutes: u32,
    pub language: Language,
    pub generated_at: DateTime<Utc>,
}

impl Lesson {
    /// Default lesson length in minutes.
    pub const DEFAULT_DURATION_MINUTES: u32 = 15;

    #[must_use]
    pub fn mcq(&self, index: usize) -> Option<&Mcq> {
        self.mcqs.get(index)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn options(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn mcq_accepts_valid_input() {
        let mcq = Mcq::new(
            "Which animal barks?",
            options(&["Cats", "Dogs"]),
            "Dogs",
            "Dogs bark.",
        )
        .unwrap();
        assert_eq!(mcq.correct_answer(), "Dogs");
        assert_eq!(mcq.options().len(), 2);
    }

    #[test]
    fn mcq_rejects_single_option() {
        let err = Mcq::new("Q", options(&["Only"]), "Only", "").unwrap_err();
        assert!(matches!(err, LessonError::TooFewOptions { provided: 1 }));
    }

    #[test]
    fn mcq_rejects_duplicate_options() {
        let err = Mcq::new("Q", options(&["A", "B", "A"]), "B", "").unwrap_err();
        assert!(matches!(err, LessonError::DuplicateOption { .. }));
    }

    #[test]
    fn mcq_rejects_answer_outside_options() {
        let err = Mcq::new("Q", options(&["Cats", "Dogs"]), "Birds", "").unwrap_err();
        assert!(matches!(
            err,
            LessonError::CorrectAnswerNotAnOption { answer } if answer == "Birds"
        ));
    }
}
