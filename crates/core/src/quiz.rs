use thiserror::Error;

use crate::model::Mcq;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SelectionError {
    #[error("submitted answer {provided:?} matches no option in any accepted form")]
    InvalidSelection { provided: String },
}

//
// ─── VALIDATION ────────────────────────────────────────────────────────────────
//

/// Outcome of matching a submission against an MCQ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionVerdict {
    pub is_correct: bool,
}

/// Positional label for an option index: 0 → "A", 1 → "B", …
///
/// Indices beyond the alphabet never occur with real lessons; they simply
/// produce no label and thus accept only the raw option text.
fn option_label(index: usize) -> Option<char> {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map(|i| (b'A' + i) as char)
}

/// True when `selected` denotes the option at `index`, either as the raw
/// option text or prefixed with the option's positional label ("B. Dogs").
fn matches_option(selected: &str, option: &str, index: usize) -> bool {
    let selected = selected.trim();
    if selected == option.trim() {
        return true;
    }
    match option_label(index) {
        Some(label) => {
            let labelled = format!("{label}. {}", option.trim());
            selected == labelled
        }
        None => false,
    }
}

/// Validates one submission against the MCQ's options.
///
/// Accepted forms are the option's raw text or the label-prefixed form
/// assigned by option order. A label that points at a different option than
/// its text (e.g. "C. Dogs" when Dogs is option B) matches neither form and
/// is rejected.
///
/// # Errors
///
/// Returns `SelectionError::InvalidSelection` when no option matches.
pub fn validate_selection(mcq: &Mcq, selected: &str) -> Result<SelectionVerdict, SelectionError> {
    let matched = mcq
        .options()
        .iter()
        .enumerate()
        .find(|(index, option)| matches_option(selected, option, *index));

    let Some((_, option)) = matched else {
        return Err(SelectionError::InvalidSelection {
            provided: selected.to_string(),
        });
    };

    Ok(SelectionVerdict {
        is_correct: option.trim() == mcq.correct_answer().trim(),
    })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn pets_mcq() -> Mcq {
        Mcq::new(
            "Which animal barks?",
            vec!["Cats".into(), "Dogs".into()],
            "Dogs",
            "Dogs bark.",
        )
        .unwrap()
    }

    #[test]
    fn raw_text_is_accepted_and_scored() {
        let verdict = validate_selection(&pets_mcq(), "Dogs").unwrap();
        assert!(verdict.is_correct);

        let verdict = validate_selection(&pets_mcq(), "Cats").unwrap();
        assert!(!verdict.is_correct);
    }

    #[test]
    fn label_prefixed_text_is_accepted() {
        let verdict = validate_selection(&pets_mcq(), "B. Dogs").unwrap();
        assert!(verdict.is_correct);

        let verdict = validate_selection(&pets_mcq(), "A. Cats").unwrap();
        assert!(!verdict.is_correct);
    }

    #[test]
    fn mismatched_label_is_rejected() {
        let err = validate_selection(&pets_mcq(), "C. Dogs").unwrap_err();
        assert!(matches!(
            err,
            SelectionError::InvalidSelection { provided } if provided == "C. Dogs"
        ));
    }

    #[test]
    fn unknown_text_is_rejected() {
        let err = validate_selection(&pets_mcq(), "Birds").unwrap_err();
        assert!(matches!(err, SelectionError::InvalidSelection { .. }));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let verdict = validate_selection(&pets_mcq(), "  Dogs  ").unwrap();
        assert!(verdict.is_correct);
    }
}
