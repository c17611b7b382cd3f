use std::sync::Arc;

use crate::models::{DialogueState, RejectReason};
use crate::resolver::{self, Resolution};
use crate::services::extraction;
use crate::state::AppState;

const MIN_PHONE_DIGITS: usize = 8;

pub const REPEAT_PROMPT: &str = "Sorry, could you repeat that?";
pub const PHONE_PROMPT: &str = "Please say your phone number with at least 8 digits.";

/// One advanced dialogue turn: the updated slot state, the next question to
/// read to the caller, and whether all six slots are filled and valid.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub filled: DialogueState,
    pub next_question: String,
    pub ready: bool,
    pub reason: Option<RejectReason>,
}

impl TurnOutcome {
    fn reprompt(filled: DialogueState, question: impl Into<String>, reason: RejectReason) -> Self {
        Self {
            filled,
            next_question: question.into(),
            ready: false,
            reason: Some(reason),
        }
    }
}

/// Keep letters, spaces, and hyphens, then title-case each word.
pub fn clean_name(s: &str) -> String {
    let kept: String = s
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || *c == ' ' || *c == '-')
        .collect();

    kept.split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    word.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().to_string() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Digits only; anything under the minimum is discarded outright.
pub fn clean_phone(s: &str) -> String {
    let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() >= MIN_PHONE_DIGITS {
        digits
    } else {
        String::new()
    }
}

/// Advance the slot-filling state machine by one caller utterance.
///
/// The extraction capability proposes field values; local sanitizers and the
/// entity resolver are the sole source of truth for validity. Guard failures
/// short-circuit the turn, first failure wins, so the state can never be
/// marked ready while holding an unresolved doctor or an invalid phone.
pub async fn advance_turn(
    state: &Arc<AppState>,
    mut filled: DialogueState,
    user_text: &str,
) -> anyhow::Result<TurnOutcome> {
    let roster = state.directory.list()?;

    // Stale invalid phone digits must not reappear downstream.
    filled.phone = clean_phone(&filled.phone);

    let extracted =
        match extraction::extract_fields(state.llm.as_ref(), &roster, &filled, user_text).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(error = %e, "extraction failed, keeping prior state");
                return Ok(TurnOutcome::reprompt(
                    filled,
                    REPEAT_PROMPT,
                    RejectReason::ExtractionFailure,
                ));
            }
        };

    let mut filled = extracted.filled;
    filled.name = clean_name(&filled.name);

    // Digits only, and never let an under-length phone linger in state,
    // whichever guard ends the turn first.
    let digits: String = filled.phone.chars().filter(|c| c.is_ascii_digit()).collect();
    let short_phone = !digits.is_empty() && digits.len() < MIN_PHONE_DIGITS;
    filled.phone = if short_phone { String::new() } else { digits };

    // Fuzzy-map the spoken doctor to a canonical roster name.
    if !filled.doctor.trim().is_empty() {
        match resolver::resolve(&filled.doctor, &roster) {
            Resolution::Resolved(canonical) => {
                filled.doctor = canonical;
            }
            Resolution::Ambiguous([a, b]) => {
                filled.doctor.clear();
                return Ok(TurnOutcome::reprompt(
                    filled,
                    format!("Did you mean {a} or {b}?"),
                    RejectReason::AmbiguousDoctor,
                ));
            }
            Resolution::Unresolved => {
                filled.doctor.clear();
                return Ok(TurnOutcome::reprompt(
                    filled,
                    format!(
                        "Sorry, that doctor is not in our clinic. Available doctors: {}. Which doctor would you like?",
                        roster.join(", ")
                    ),
                    RejectReason::UnknownDoctor,
                ));
            }
        }
    }

    // Phone must reach the digit minimum or be cleared and re-asked.
    if short_phone {
        return Ok(TurnOutcome::reprompt(
            filled,
            PHONE_PROMPT,
            RejectReason::InvalidPhone,
        ));
    }

    let next_question = filled.next_missing_question().to_string();
    let ready = filled.is_complete();

    tracing::debug!(ready, next_question = %next_question, "turn advanced");

    Ok(TurnOutcome {
        filled,
        next_question,
        ready,
        reason: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("jane doe"), "Jane Doe");
        assert_eq!(clean_name("  o'neil, jr."), "Oneil Jr");
        assert_eq!(clean_name("anna-marie smith"), "Anna-Marie Smith");
        assert_eq!(clean_name("12345"), "");
    }

    #[test]
    fn test_clean_phone() {
        assert_eq!(clean_phone("01 23 45 67"), "01234567");
        assert_eq!(clean_phone("+1 (555) 010-9999"), "15550109999");
        assert_eq!(clean_phone("12 34"), "");
        assert_eq!(clean_phone(""), "");
    }
}
