//! Prompt construction for the analysis-and-reply request
//!
//! Both pieces are pure text functions of their inputs: the same email and
//! preferences always produce byte-identical instructions. Parsing of the
//! response lives in `parser`, the network call in `client`.

use super::types::ReplyPreferences;

/// Fixed system instructions describing the assistant's role and the
/// required output contract.
pub const ANALYSIS_SYSTEM: &str = r#"You are an email assistant that analyzes received emails and drafts replies. For every email you:
1. Detect the language of the email and write all replies in that same language.
2. Classify urgency as exactly one of: low, medium, high.
3. Classify sentiment as exactly one of: positive, neutral, negative, mixed.
4. Assign a short free-form category label (e.g. "meeting request", "invoice", "complaint").
5. Summarize the email in 2-4 sentences.
6. Extract the concrete action items the recipient is expected to handle.
7. Draft the requested number of reply options, each matching the requested tone, formality and length.
Respond with a single JSON object and nothing else: no commentary, no code fences."#;

/// Build the user instructions for one analysis request.
///
/// The email text is embedded verbatim; the requested reply count is stated
/// as a hard constraint and repeated in the schema description.
pub fn analysis_request(email: &str, prefs: &ReplyPreferences) -> String {
    format!(
        r#"Analyze the email below and draft replies.

Reply preferences:
- Tone: {tone}
- Formality: {formality}
- Length: {length}
- Number of reply options: must be exactly {count}

Return a single JSON object with exactly this shape:
{{
  "language": "<detected language>",
  "urgency": "low" | "medium" | "high",
  "sentiment": "positive" | "neutral" | "negative" | "mixed",
  "category": "<short label>",
  "summary": "<2-4 sentence summary>",
  "action_items": ["<action item>", ...],
  "replies": [{{"subject": "<reply subject>", "body": "<reply body>"}}, ...]
}}

The "replies" array must contain exactly {count} entries.

Email:
{email}"#,
        tone = prefs.tone.as_str(),
        formality = prefs.formality.as_str(),
        length = prefs.length.as_str(),
        count = prefs.option_count,
        email = email,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::types::{Formality, ReplyLength, Tone};

    fn prefs() -> ReplyPreferences {
        ReplyPreferences {
            tone: Tone::Friendly,
            formality: Formality::Informal,
            length: ReplyLength::Short,
            option_count: 2,
        }
    }

    #[test]
    fn test_request_is_deterministic() {
        let email = "Hi, can you send the report by Friday? Thanks, Sam";
        let a = analysis_request(email, &prefs());
        let b = analysis_request(email, &prefs());
        assert_eq!(a, b);
    }

    #[test]
    fn test_request_embeds_email_verbatim() {
        // Including characters that naive escaping or truncation would mangle
        let email = "Zeilenumbruch\nhier, \"quotes\" & {braces} and a very long tail: "
            .to_string()
            + &"x".repeat(2000);
        let request = analysis_request(&email, &prefs());
        assert!(request.contains(&email));
    }

    #[test]
    fn test_request_states_option_count_as_hard_constraint() {
        let request = analysis_request("hello", &prefs());
        assert!(request.contains("must be exactly 2"));
        assert!(request.contains("exactly 2 entries"));
    }

    #[test]
    fn test_request_contains_preference_values() {
        let request = analysis_request("hello", &prefs());
        assert!(request.contains("Friendly"));
        assert!(request.contains("Informal"));
        assert!(request.contains("Short"));
    }

    #[test]
    fn test_request_contains_schema_field_names() {
        let request = analysis_request("hello", &prefs());
        for field in [
            "\"language\"",
            "\"urgency\"",
            "\"sentiment\"",
            "\"category\"",
            "\"summary\"",
            "\"action_items\"",
            "\"replies\"",
            "\"subject\"",
            "\"body\"",
        ] {
            assert!(request.contains(field), "missing schema field {}", field);
        }
    }

    #[test]
    fn test_system_instructions_enumerate_classifications() {
        assert!(ANALYSIS_SYSTEM.contains("low, medium, high"));
        assert!(ANALYSIS_SYSTEM.contains("positive, neutral, negative, mixed"));
        assert!(ANALYSIS_SYSTEM.contains("2-4 sentence"));
    }
}
