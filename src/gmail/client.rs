//! Gmail REST API client (read-only)
//!
//! Two operations: list recent inbox messages (metadata only) and fetch one
//! decoded message body. An access token is minted from the stored refresh
//! token before each call; Gmail access tokens are short-lived and this app
//! issues calls rarely enough that caching them is not worth the state.

use anyhow::{Context, Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::oauth::{AppCredentials, GmailOAuth};
use super::token_store::TokenStore;

const GMAIL_API_BASE: &str = "https://gmail.googleapis.com/gmail/v1";

/// One row of the inbox listing: metadata only, the body is fetched
/// separately on selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSummary {
    pub id: String,
    pub from: String,
    pub subject: String,
    pub snippet: String,
    /// Unix timestamp (seconds) of the message, 0 when unknown
    pub date: i64,
}

pub struct GmailClient {
    client: Client,
    oauth: GmailOAuth,
    tokens: TokenStore,
}

impl GmailClient {
    pub fn new(credentials: AppCredentials, tokens: TokenStore) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;
        let oauth = GmailOAuth::new(credentials)?;
        Ok(Self {
            client,
            oauth,
            tokens,
        })
    }

    /// Mint a fresh access token from the stored refresh token
    async fn access_token(&self) -> Result<String> {
        let refresh_token = self
            .tokens
            .load()
            .ok_or_else(|| anyhow!("Gmail not authorized yet. Run 'draftly auth' first."))?;
        let granted = self.oauth.refresh_access_token(&refresh_token).await?;
        Ok(granted.access_token)
    }

    /// List the most recent messages in the primary inbox (metadata only)
    pub async fn list_recent(&self, max_results: u32) -> Result<Vec<MessageSummary>> {
        let token = self.access_token().await?;

        let url = format!("{}/users/me/messages", GMAIL_API_BASE);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .query(&[
                ("labelIds", "INBOX"),
                ("maxResults", &max_results.to_string()),
            ])
            .send()
            .await
            .context("Failed to list inbox messages")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Gmail API error ({}): {}", status, error_text);
        }

        let listing: MessagesListResponse = response
            .json()
            .await
            .context("Failed to parse message listing")?;

        let mut summaries = Vec::new();
        for info in listing.messages.unwrap_or_default() {
            match self.get_metadata(&token, &info.id).await {
                Ok(summary) => summaries.push(summary),
                Err(e) => tracing::warn!("skipping message {}: {}", info.id, e),
            }
        }

        Ok(summaries)
    }

    /// Fetch one message's metadata (From, Subject, snippet, date)
    async fn get_metadata(&self, token: &str, id: &str) -> Result<MessageSummary> {
        let url = format!("{}/users/me/messages/{}", GMAIL_API_BASE, id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("format", "metadata"),
                ("metadataHeaders", "From"),
                ("metadataHeaders", "Subject"),
            ])
            .send()
            .await
            .with_context(|| format!("Failed to fetch metadata for message {}", id))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Gmail API error ({}): {}", status, error_text);
        }

        let message: GmailMessage = response
            .json()
            .await
            .with_context(|| format!("Failed to parse metadata for message {}", id))?;

        Ok(summarize(message))
    }

    /// Fetch and decode one message body.
    ///
    /// Prefers a plain-text part; falls back to an HTML part rendered to
    /// text, then to the top-level body. Works for both multi-part and
    /// single-part payload shapes.
    pub async fn fetch_body(&self, id: &str) -> Result<String> {
        let token = self.access_token().await?;

        let url = format!("{}/users/me/messages/{}", GMAIL_API_BASE, id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .query(&[("format", "full")])
            .send()
            .await
            .with_context(|| format!("Failed to fetch message {}", id))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Gmail API error ({}): {}", status, error_text);
        }

        let message: GmailMessage = response
            .json()
            .await
            .with_context(|| format!("Failed to parse message {}", id))?;

        let payload = message
            .payload
            .ok_or_else(|| anyhow!("message {} has no payload", id))?;

        Ok(extract_body_text(&payload))
    }
}

fn summarize(message: GmailMessage) -> MessageSummary {
    let from = header_value(&message, "From").unwrap_or_else(|| "(unknown sender)".to_string());
    let subject = header_value(&message, "Subject").unwrap_or_else(|| "(no subject)".to_string());
    let date = message
        .internal_date
        .as_deref()
        .and_then(|ms| ms.parse::<i64>().ok())
        .map(|ms| ms / 1000)
        .unwrap_or(0);

    MessageSummary {
        id: message.id,
        from,
        subject,
        snippet: message.snippet.unwrap_or_default(),
        date,
    }
}

fn header_value(message: &GmailMessage, name: &str) -> Option<String> {
    message
        .payload
        .as_ref()?
        .headers
        .as_ref()?
        .iter()
        .find(|h| h.name.eq_ignore_ascii_case(name))
        .map(|h| h.value.clone())
}

/// Extract readable text from a message payload tree.
///
/// Preference order: any `text/plain` leaf, then any `text/html` leaf
/// (rendered to text), then the payload's own body data.
fn extract_body_text(payload: &MessagePart) -> String {
    if let Some(text) = find_part_data(payload, "text/plain") {
        return decode_body_data(&text);
    }

    if let Some(html) = find_part_data(payload, "text/html") {
        let decoded = decode_body_data(&html);
        // A render failure degrades to the decoded markup; decoding never errors
        return html2text::from_read(decoded.as_bytes(), 80)
            .map(|s| s.trim().to_string())
            .unwrap_or(decoded);
    }

    // Single-part message without an explicit text/* mime type
    payload
        .body
        .as_ref()
        .and_then(|b| b.data.as_ref())
        .map(|data| decode_body_data(data))
        .unwrap_or_default()
}

/// Depth-first search for the first part of the given mime type that
/// actually carries body data.
fn find_part_data(part: &MessagePart, mime_type: &str) -> Option<String> {
    if part.mime_type.as_deref() == Some(mime_type)
        && let Some(data) = part.body.as_ref().and_then(|b| b.data.clone())
    {
        return Some(data);
    }
    for child in part.parts.as_deref().unwrap_or_default() {
        if let Some(data) = find_part_data(child, mime_type) {
            return Some(data);
        }
    }
    None
}

/// Base64url-decode transport data, then decode as UTF-8 with replacement of
/// invalid byte sequences. Never fails: undecodable input comes back lossy
/// or, in the worst case, empty.
fn decode_body_data(data: &str) -> String {
    let bytes = URL_SAFE_NO_PAD
        .decode(data)
        .or_else(|_| URL_SAFE.decode(data))
        .unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

#[derive(Debug, Deserialize)]
struct MessagesListResponse {
    messages: Option<Vec<MessageInfo>>,
}

#[derive(Debug, Deserialize)]
struct MessageInfo {
    id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct GmailMessage {
    id: String,
    snippet: Option<String>,
    #[serde(rename = "internalDate")]
    internal_date: Option<String>,
    payload: Option<MessagePart>,
}

#[derive(Debug, Clone, Deserialize)]
struct MessagePart {
    #[serde(rename = "mimeType")]
    mime_type: Option<String>,
    headers: Option<Vec<Header>>,
    body: Option<MessagePartBody>,
    parts: Option<Vec<MessagePart>>,
}

#[derive(Debug, Clone, Deserialize)]
struct Header {
    name: String,
    value: String,
}

#[derive(Debug, Clone, Deserialize)]
struct MessagePartBody {
    data: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(mime: &str, data: &str) -> MessagePart {
        MessagePart {
            mime_type: Some(mime.to_string()),
            headers: None,
            body: Some(MessagePartBody {
                data: Some(URL_SAFE_NO_PAD.encode(data)),
            }),
            parts: None,
        }
    }

    fn multipart(children: Vec<MessagePart>) -> MessagePart {
        MessagePart {
            mime_type: Some("multipart/alternative".to_string()),
            headers: None,
            body: None,
            parts: Some(children),
        }
    }

    #[test]
    fn test_prefers_plain_text_part() {
        let payload = multipart(vec![
            leaf("text/html", "<p>hello</p>"),
            leaf("text/plain", "hello"),
        ]);
        assert_eq!(extract_body_text(&payload), "hello");
    }

    #[test]
    fn test_html_only_multipart_returns_decoded_text() {
        let payload = multipart(vec![leaf("text/html", "<p>Meeting at <b>3pm</b></p>")]);
        let text = extract_body_text(&payload);
        assert!(!text.is_empty());
        assert!(text.contains("Meeting at"));
        assert!(!text.contains("<p>"));
    }

    #[test]
    fn test_single_part_plain_message() {
        let payload = leaf("text/plain", "just a line");
        assert_eq!(extract_body_text(&payload), "just a line");
    }

    #[test]
    fn test_single_part_without_mime_type_uses_body_data() {
        let payload = MessagePart {
            mime_type: None,
            headers: None,
            body: Some(MessagePartBody {
                data: Some(URL_SAFE_NO_PAD.encode("raw body")),
            }),
            parts: None,
        };
        assert_eq!(extract_body_text(&payload), "raw body");
    }

    #[test]
    fn test_nested_multipart_is_searched() {
        let payload = multipart(vec![
            leaf("application/pdf", "binary"),
            multipart(vec![leaf("text/plain", "nested text")]),
        ]);
        assert_eq!(extract_body_text(&payload), "nested text");
    }

    #[test]
    fn test_decode_tolerates_padded_base64() {
        let padded = URL_SAFE.encode("with padding!");
        assert_eq!(decode_body_data(&padded), "with padding!");
    }

    #[test]
    fn test_decode_never_raises_on_malformed_bytes() {
        // Invalid UTF-8 is substituted, not an error
        let bad_utf8 = URL_SAFE_NO_PAD.encode([0x66, 0x6f, 0xff, 0x6f]);
        let decoded = decode_body_data(&bad_utf8);
        assert!(decoded.starts_with("fo"));
        assert!(decoded.contains('\u{FFFD}'));

        // Garbage base64 comes back empty rather than panicking
        assert_eq!(decode_body_data("%%%not-base64%%%"), "");
    }

    #[test]
    fn test_summarize_fills_missing_headers() {
        let message = GmailMessage {
            id: "m1".to_string(),
            snippet: Some("snippet text".to_string()),
            internal_date: Some("1700000000000".to_string()),
            payload: Some(MessagePart {
                mime_type: Some("text/plain".to_string()),
                headers: Some(vec![Header {
                    name: "from".to_string(),
                    value: "Sam <sam@example.com>".to_string(),
                }]),
                body: None,
                parts: None,
            }),
        };
        let summary = summarize(message);
        assert_eq!(summary.from, "Sam <sam@example.com>");
        assert_eq!(summary.subject, "(no subject)");
        assert_eq!(summary.date, 1_700_000_000);
        assert_eq!(summary.snippet, "snippet text");
    }
}
