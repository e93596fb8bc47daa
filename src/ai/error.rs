//! Error classes of the analysis protocol

use thiserror::Error;

/// How many raw-response bytes to include in user-facing parse errors
const RAW_EXCERPT_LEN: usize = 200;

/// Failures of a single analysis attempt.
///
/// Every attempt maps to exactly one of these; none are retried
/// automatically.
#[derive(Debug, Error)]
pub enum AiError {
    /// No API key configured. Fatal to any submission, surfaced once as a
    /// persistent banner rather than per attempt.
    #[error("no API key configured (set OPENAI_API_KEY or ai.api_key in config.toml)")]
    MissingApiKey,

    /// The completion call itself failed (network, auth, rate limit,
    /// provider-side fault). Carries the provider's own message.
    #[error("provider request failed: {0}")]
    Provider(String),

    /// The response text was not a parseable JSON object, even after the
    /// fence-stripping repair pass. Carries the full raw text for diagnosis.
    #[error("model returned malformed output: {}", excerpt(raw))]
    MalformedResponse { raw: String },
}

fn excerpt(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().count() <= RAW_EXCERPT_LEN {
        trimmed.to_string()
    } else {
        let cut: String = trimmed.chars().take(RAW_EXCERPT_LEN).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_includes_raw_excerpt() {
        let err = AiError::MalformedResponse {
            raw: "I'm sorry, I can't help with that.".to_string(),
        };
        assert!(err.to_string().contains("I'm sorry"));
    }

    #[test]
    fn test_malformed_message_truncates_long_raw() {
        let err = AiError::MalformedResponse {
            raw: "x".repeat(5000),
        };
        let msg = err.to_string();
        assert!(msg.len() < 300);
        assert!(msg.ends_with("..."));
    }
}
