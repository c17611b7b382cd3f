pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::DialogueState;

/// Chat-completion seam for the field-extraction capability. Implementations
/// must bound the request with a timeout; an expired timeout surfaces as an
/// error and is handled like any other extraction failure.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn chat(&self, system_prompt: &str, user_prompt: &str) -> anyhow::Result<String>;
}

/// The fixed-shape result the extraction capability must produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub filled: DialogueState,
    pub next_question: String,
    pub ready: bool,
}

const SYSTEM_PROMPT: &str = r#"You are a friendly, concise receptionist for a dental clinic.
Your job is to collect exactly 6 fields: doctor, name, phone, service, date, time.
ALWAYS ask for the DOCTOR first. The list of valid doctors will be provided in the user message.
Keep responses short (under 15 words), one question at a time.

Output format (STRICT): respond with pure JSON only (no extra text):
{
  "filled": {"doctor":"", "name":"", "phone":"", "service":"", "date_text":"", "time_text":""},
  "next_question": "string",
  "ready": false
}

Rules:
- If the caller provides multiple fields at once, accept them.
- Phone can include spaces or words (e.g., 'zero'). Convert everything into digits only.
- Accept once at least 8 digits are present.
- Preserve the caller's wording for date_text and time_text (do not reformat).
- If the spoken doctor name is a partial or close spelling of a listed doctor, set filled.doctor to that listed name.
  If it's unclear between two doctors, ask "Did you mean Dr. X or Dr. Y?".
- If the caller says "wait", "hold on", or is silent/unclear:
  - set next_question to a brief acknowledgment like "No problem, say 'I'm ready' to continue."
  - keep ready = false and do not lose previously filled fields.
- If the caller says "hello", "I'm ready", or "continue":
  - resume asking for the next missing field (do NOT restart).
- Be natural and warm. If asked, you are the clinic's automated assistant.
- When all 6 fields are present, set ready = true and ask a short confirmation question.

Behavior:
- Always ask for exactly one missing field per turn (except a final confirmation).
- Never include anything except the JSON object described above.
"#;

/// Ask the extraction capability to merge one utterance into the current
/// slot state. Any transport error, timeout, or non-conforming response is
/// an `Err`; the caller substitutes its deterministic fallback.
pub async fn extract_fields(
    llm: &dyn LlmClient,
    roster: &[String],
    filled: &DialogueState,
    user_text: &str,
) -> anyhow::Result<ExtractionOutcome> {
    let user_prompt = format!(
        "Valid doctors list: {roster:?}\nCurrent filled fields: {}\nUser said: \"{user_text}\"\nReturn JSON as specified.",
        serde_json::to_string(filled)?,
    );

    let response = llm.chat(SYSTEM_PROMPT, &user_prompt).await?;
    parse_extraction_response(&response)
}

fn parse_extraction_response(response: &str) -> anyhow::Result<ExtractionOutcome> {
    if let Ok(outcome) = serde_json::from_str::<ExtractionOutcome>(response) {
        return Ok(outcome);
    }

    // Strip markdown code fences
    let cleaned = response
        .trim()
        .strip_prefix("```json")
        .or_else(|| response.trim().strip_prefix("```"))
        .unwrap_or(response.trim());
    let cleaned = cleaned.strip_suffix("```").unwrap_or(cleaned).trim();

    if let Ok(outcome) = serde_json::from_str::<ExtractionOutcome>(cleaned) {
        return Ok(outcome);
    }

    // Last attempt: the outermost JSON object embedded in the response
    if let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) {
        if start < end {
            if let Ok(outcome) = serde_json::from_str::<ExtractionOutcome>(&cleaned[start..=end]) {
                return Ok(outcome);
            }
        }
    }

    anyhow::bail!("extraction response did not conform to the expected JSON shape")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_json() {
        let json = r#"{"filled":{"doctor":"Dr. Jesan Ahmed","name":"","phone":"","service":"","date_text":"","time_text":""},"next_question":"What is your name?","ready":false}"#;
        let outcome = parse_extraction_response(json).unwrap();
        assert_eq!(outcome.filled.doctor, "Dr. Jesan Ahmed");
        assert!(!outcome.ready);
    }

    #[test]
    fn test_parse_markdown_fenced_json() {
        let fenced = "```json\n{\"filled\":{\"doctor\":\"\",\"name\":\"Jane\",\"phone\":\"\",\"service\":\"\",\"date_text\":\"\",\"time_text\":\"\"},\"next_question\":\"What is your phone number?\",\"ready\":false}\n```";
        let outcome = parse_extraction_response(fenced).unwrap();
        assert_eq!(outcome.filled.name, "Jane");
    }

    #[test]
    fn test_parse_embedded_object() {
        let noisy = "Sure! Here you go: {\"filled\":{\"doctor\":\"\",\"name\":\"\",\"phone\":\"\",\"service\":\"\",\"date_text\":\"\",\"time_text\":\"\"},\"next_question\":\"Which doctor?\",\"ready\":false} hope that helps";
        let outcome = parse_extraction_response(noisy).unwrap();
        assert_eq!(outcome.next_question, "Which doctor?");
    }

    #[test]
    fn test_parse_nonconforming_is_error() {
        assert!(parse_extraction_response("I can't do that").is_err());
        assert!(parse_extraction_response("{\"unexpected\":true}").is_err());
    }

    #[test]
    fn test_missing_slots_default_to_empty() {
        let json = r#"{"filled":{"doctor":"Dr. Jesan Ahmed"},"next_question":"?","ready":false}"#;
        let outcome = parse_extraction_response(json).unwrap();
        assert_eq!(outcome.filled.phone, "");
    }
}
