use serde::{Deserialize, Serialize};

/// The six booking slots collected over a conversation. Values are either
/// empty or already sanitized: a non-empty `doctor` is a canonical roster
/// name and a non-empty `phone` is digits-only with at least 8 digits.
/// Raw caller wording is preserved in `date_text`/`time_text`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DialogueState {
    #[serde(default)]
    pub doctor: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub date_text: String,
    #[serde(default)]
    pub time_text: String,
}

/// Fixed slot order with the question asked when the slot is empty.
const SLOT_QUESTIONS: &[(&str, &str)] = &[
    ("doctor", "Which doctor would you like to book with?"),
    ("name", "What is your name?"),
    (
        "phone",
        "What is your phone number? Please say at least 8 digits.",
    ),
    ("service", "What service do you need?"),
    (
        "date_text",
        "What date would you like to schedule your appointment?",
    ),
    (
        "time_text",
        "What time would you like to schedule your appointment?",
    ),
];

pub const CONFIRMATION_QUESTION: &str = "Great, shall I proceed to book this appointment?";

impl DialogueState {
    fn slot(&self, key: &str) -> &str {
        match key {
            "doctor" => &self.doctor,
            "name" => &self.name,
            "phone" => &self.phone,
            "service" => &self.service,
            "date_text" => &self.date_text,
            "time_text" => &self.time_text,
            _ => "",
        }
    }

    /// The question for the first empty slot in fixed order, or the
    /// confirmation question when every slot is filled.
    pub fn next_missing_question(&self) -> &'static str {
        for &(key, question) in SLOT_QUESTIONS {
            if self.slot(key).trim().is_empty() {
                return question;
            }
        }
        CONFIRMATION_QUESTION
    }

    pub fn is_complete(&self) -> bool {
        SLOT_QUESTIONS
            .iter()
            .all(|(key, _)| !self.slot(key).trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state_asks_for_doctor() {
        let state = DialogueState::default();
        assert_eq!(
            state.next_missing_question(),
            "Which doctor would you like to book with?"
        );
        assert!(!state.is_complete());
    }

    #[test]
    fn test_slot_order_is_fixed() {
        let state = DialogueState {
            doctor: "Dr. Gregory House".to_string(),
            phone: "01234567".to_string(),
            ..Default::default()
        };
        // name comes before service even though phone is already filled
        assert_eq!(state.next_missing_question(), "What is your name?");
    }

    #[test]
    fn test_complete_state_asks_for_confirmation() {
        let state = DialogueState {
            doctor: "Dr. Gregory House".to_string(),
            name: "Jane Doe".to_string(),
            phone: "01234567".to_string(),
            service: "cleaning".to_string(),
            date_text: "tomorrow".to_string(),
            time_text: "3pm".to_string(),
        };
        assert_eq!(state.next_missing_question(), CONFIRMATION_QUESTION);
        assert!(state.is_complete());
    }

    #[test]
    fn test_whitespace_counts_as_empty() {
        let state = DialogueState {
            doctor: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(
            state.next_missing_question(),
            "Which doctor would you like to book with?"
        );
    }
}
