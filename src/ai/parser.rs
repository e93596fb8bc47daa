//! Response interpreter: raw model output -> `AnalysisResult`
//!
//! The provider usually returns the bare JSON object the prompt asks for,
//! but models sometimes wrap it in a ``` fence (optionally tagged with a
//! language name). Parsing tries the raw text first and retries exactly once
//! after stripping such a fence; anything else is a malformed response, never
//! a partial result.

use super::error::AiError;
use super::types::AnalysisResult;

/// Parse the raw completion text into an `AnalysisResult`.
///
/// Missing optional fields are defaulted (empty summary, empty sequences,
/// "N/A" classification placeholders); the requested reply count is NOT
/// enforced here, a mismatch is rendered as-is.
pub fn parse_analysis(raw: &str) -> Result<AnalysisResult, AiError> {
    let direct = serde_json::from_str::<AnalysisResult>(raw);

    let result = match direct {
        Ok(result) => result,
        Err(first_err) => {
            let repaired = strip_fence(raw);
            match serde_json::from_str::<AnalysisResult>(repaired) {
                Ok(result) => result,
                Err(_) => {
                    tracing::debug!("analysis parse failed: {}", first_err);
                    return Err(AiError::MalformedResponse {
                        raw: raw.to_string(),
                    });
                }
            }
        }
    };

    if result.replies.is_empty() {
        tracing::warn!("model response parsed but contains no reply options");
    }

    Ok(result)
}

/// Strip one leading/trailing ``` fence, tolerating a language tag after the
/// opening fence. Returns the input unchanged when no fence is present.
fn strip_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(rest) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the language tag, i.e. everything up to the first newline
    match rest.split_once('\n') {
        Some((_tag, body)) => body.trim(),
        None => rest.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::types::ReplyOption;

    const WELL_FORMED: &str = r#"{
        "language": "English",
        "urgency": "medium",
        "sentiment": "neutral",
        "category": "status request",
        "summary": "Sam asks for the report by Friday.",
        "action_items": ["Send the report by Friday"],
        "replies": [{"subject": "Re: report", "body": "On it, you'll have it by Friday."}]
    }"#;

    #[test]
    fn test_identity_on_valid_json() {
        let result = parse_analysis(WELL_FORMED).unwrap();
        assert_eq!(result.language, "English");
        assert_eq!(result.urgency, "medium");
        assert_eq!(result.sentiment, "neutral");
        assert_eq!(result.category, "status request");
        assert_eq!(result.summary, "Sam asks for the report by Friday.");
        assert_eq!(result.action_items, vec!["Send the report by Friday"]);
        assert_eq!(
            result.replies,
            vec![ReplyOption {
                subject: "Re: report".to_string(),
                body: "On it, you'll have it by Friday.".to_string(),
            }]
        );
    }

    #[test]
    fn test_fenced_response_recovers_same_result() {
        let plain = parse_analysis(WELL_FORMED).unwrap();

        let fenced = format!("```\n{}\n```", WELL_FORMED);
        assert_eq!(parse_analysis(&fenced).unwrap(), plain);

        let tagged = format!("```json\n{}\n```", WELL_FORMED);
        assert_eq!(parse_analysis(&tagged).unwrap(), plain);

        let padded = format!("  ```json\n{}\n```  \n", WELL_FORMED);
        assert_eq!(parse_analysis(&padded).unwrap(), plain);
    }

    #[test]
    fn test_unrecoverable_text_is_malformed() {
        let raw = "I'm sorry, I cannot analyze this email.";
        match parse_analysis(raw) {
            Err(AiError::MalformedResponse { raw: carried }) => assert_eq!(carried, raw),
            other => panic!("expected MalformedResponse, got {:?}", other),
        }
    }

    #[test]
    fn test_fenced_garbage_is_malformed() {
        let raw = "```json\nnot json at all\n```";
        assert!(matches!(
            parse_analysis(raw),
            Err(AiError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_missing_sequences_default_to_empty() {
        let raw = r#"{"language": "German", "urgency": "low", "sentiment": "positive", "category": "greeting"}"#;
        let result = parse_analysis(raw).unwrap();
        assert_eq!(result.summary, "");
        assert!(result.action_items.is_empty());
        assert!(result.replies.is_empty());
    }

    #[test]
    fn test_missing_classifications_default_to_placeholder() {
        let raw = r#"{"summary": "Just a summary.", "replies": [{"body": "ok"}]}"#;
        let result = parse_analysis(raw).unwrap();
        assert_eq!(result.language, "N/A");
        assert_eq!(result.urgency, "N/A");
        assert_eq!(result.sentiment, "N/A");
        assert_eq!(result.category, "N/A");
        // Reply subject is optional, body is not
        assert_eq!(result.replies[0].subject, "");
        assert_eq!(result.replies[0].body, "ok");
    }

    #[test]
    fn test_reply_without_body_is_malformed() {
        let raw = r#"{"replies": [{"subject": "Re: hi"}]}"#;
        assert!(matches!(
            parse_analysis(raw),
            Err(AiError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_three_replies_parse_as_three_options() {
        let raw = r#"{
            "language": "English", "urgency": "high", "sentiment": "negative",
            "category": "complaint", "summary": "Customer is unhappy.",
            "action_items": ["Apologize", "Issue refund"],
            "replies": [
                {"subject": "Re: order", "body": "We are sorry."},
                {"subject": "Re: order", "body": "Refund is on its way."},
                {"subject": "Re: order", "body": "We will make this right."}
            ]
        }"#;
        let result = parse_analysis(raw).unwrap();
        assert_eq!(result.replies.len(), 3);
        assert!(result.replies.iter().all(|r| !r.body.is_empty()));
    }
}
