//! OAuth2 installed-app flow for read-only Gmail access
//!
//! Opens a browser for consent and catches the redirect on a loopback
//! listener. PKCE and a random state parameter guard the code exchange.

use anyhow::{Context, Result, bail};
use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;
use std::time::Duration;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

// Listing and body fetching only; no send/modify scope
const GMAIL_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/gmail.readonly";

/// OAuth client credentials from a Google Cloud "Desktop app" client,
/// downloaded as `credentials.json` and placed in the config directory.
#[derive(Debug, Clone, Deserialize)]
pub struct AppCredentials {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
}

/// Wrapper matching Google's downloaded client-secret file layout
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    installed: AppCredentials,
}

impl AppCredentials {
    /// Load credentials from a Google client-secret JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials file: {}", path.display()))?;
        let file: CredentialsFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse credentials file: {}", path.display()))?;
        Ok(file.installed)
    }
}

/// Tokens returned after authorization or refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth2Tokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// PKCE code verifier and challenge
struct PkceChallenge {
    verifier: String,
    challenge: String,
}

impl PkceChallenge {
    fn new() -> Result<Self> {
        let mut verifier_bytes = [0u8; 32];
        getrandom::fill(&mut verifier_bytes)
            .map_err(|e| anyhow::anyhow!("Failed to generate random bytes: {}", e))?;
        let verifier = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(verifier_bytes);

        let mut hasher = Sha256::new();
        hasher.update(verifier.as_bytes());
        let challenge_hash = hasher.finalize();
        let challenge = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(challenge_hash);

        Ok(Self {
            verifier,
            challenge,
        })
    }
}

/// Error response from Google's token endpoint
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
    #[allow(dead_code)]
    error_description: Option<String>,
}

/// Gmail OAuth2 client for the installed-app flow
pub struct GmailOAuth {
    credentials: AppCredentials,
    http_client: reqwest::Client,
}

impl GmailOAuth {
    pub fn new(credentials: AppCredentials) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            credentials,
            http_client,
        })
    }

    /// Start the consent flow: bind a loopback listener and build the
    /// authorization URL to open in the browser.
    pub fn start_auth_flow(&self) -> Result<AuthFlowState> {
        let listener = TcpListener::bind("127.0.0.1:0").context("Failed to bind to local port")?;
        let port = listener.local_addr()?.port();
        let redirect_uri = format!("http://127.0.0.1:{}", port);

        let pkce = PkceChallenge::new()?;

        // Random state parameter for CSRF protection
        let mut state_bytes = [0u8; 16];
        getrandom::fill(&mut state_bytes)
            .map_err(|e| anyhow::anyhow!("Failed to generate random state: {}", e))?;
        let state = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(state_bytes);

        // access_type=offline + prompt=consent so Google issues a refresh token
        let auth_url = format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&code_challenge={}&code_challenge_method=S256&access_type=offline&prompt=consent&state={}",
            GOOGLE_AUTH_URL,
            url_encode(&self.credentials.client_id),
            url_encode(&redirect_uri),
            url_encode(GMAIL_READONLY_SCOPE),
            url_encode(&pkce.challenge),
            url_encode(&state),
        );

        tracing::debug!("OAuth2 redirect URI: {}", redirect_uri);

        Ok(AuthFlowState {
            auth_url,
            redirect_uri,
            pkce_verifier: pkce.verifier,
            state,
            listener,
        })
    }

    /// Wait for the browser redirect and extract the authorization code
    pub fn wait_for_callback(auth_state: &AuthFlowState) -> Result<String> {
        use std::io::ErrorKind;

        // Non-blocking accept so we can time out
        auth_state.listener.set_nonblocking(true)?;

        let timeout = Duration::from_secs(120);
        let start = std::time::Instant::now();

        let mut stream = loop {
            match auth_state.listener.accept() {
                Ok((stream, _)) => break stream,
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    if start.elapsed() > timeout {
                        bail!("OAuth callback timed out. Please try again.");
                    }
                    std::thread::sleep(Duration::from_millis(100));
                    continue;
                }
                Err(e) => {
                    return Err(e).context("Failed to accept OAuth callback connection");
                }
            }
        };

        let mut reader = BufReader::new(&stream);
        let mut request_line = String::new();
        reader.read_line(&mut request_line)?;

        let parse_query_param = |query: &str, param: &str| -> Option<String> {
            query
                .split('&')
                .find(|p| p.starts_with(&format!("{}=", param)))
                .map(|p| p.trim_start_matches(&format!("{}=", param)).to_string())
        };

        let query = request_line
            .split_whitespace()
            .nth(1)
            .and_then(|path| path.split('?').nth(1))
            .unwrap_or("");

        if let Some(error) = parse_query_param(query, "error") {
            let error = error.split(' ').next().unwrap_or(&error);
            let error_desc = parse_query_param(query, "error_description")
                .map(|s| s.split(' ').next().unwrap_or(&s).to_string())
                .map(|s| url_decode(&s))
                .unwrap_or_default();

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n\
                <html><body><h1>Authorization Failed</h1>\
                <p>Error: {}</p><p>{}</p>\
                <p>Please close this window and try again.</p></body></html>",
                escape_html(error),
                escape_html(&error_desc)
            );
            stream.write_all(response.as_bytes()).ok();

            bail!("Authorization failed: {} - {}", error, error_desc);
        }

        let returned_state = parse_query_param(query, "state")
            .context("No state parameter in callback - possible CSRF attack")?;
        if returned_state != auth_state.state {
            bail!("State parameter mismatch - possible CSRF attack");
        }

        let code = parse_query_param(query, "code").context(
            "No authorization code in callback. The browser may have sent an unexpected response.",
        )?;

        let response = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n\
            <html><body><h1>Authorization successful!</h1>\
            <p>You can close this window and return to draftly.</p>\
            <script>window.close();</script></body></html>";
        stream.write_all(response.as_bytes())?;

        Ok(code)
    }

    /// Exchange the authorization code for tokens
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        pkce_verifier: &str,
    ) -> Result<OAuth2Tokens> {
        let mut params = vec![
            ("client_id", self.credentials.client_id.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
            ("code_verifier", pkce_verifier),
        ];

        if let Some(ref secret) = self.credentials.client_secret {
            params.push(("client_secret", secret.as_str()));
        }

        let response = self
            .http_client
            .post(GOOGLE_TOKEN_URL)
            .form(&params)
            .send()
            .await
            .context("Failed to exchange authorization code")?;

        if !response.status().is_success() {
            let error: ErrorResponse = response.json().await.unwrap_or(ErrorResponse {
                error: "unknown_error".to_string(),
                error_description: None,
            });
            bail!("Token exchange failed: {}", error.error);
        }

        response
            .json()
            .await
            .context("Failed to parse token response")
    }

    /// Refresh an access token using a stored refresh token
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<OAuth2Tokens> {
        let mut params = vec![
            ("client_id", self.credentials.client_id.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        if let Some(ref secret) = self.credentials.client_secret {
            params.push(("client_secret", secret.as_str()));
        }

        let response = self
            .http_client
            .post(GOOGLE_TOKEN_URL)
            .form(&params)
            .send()
            .await
            .context("Failed to refresh token")?;

        if !response.status().is_success() {
            let error: ErrorResponse = response.json().await.unwrap_or(ErrorResponse {
                error: "unknown_error".to_string(),
                error_description: None,
            });
            bail!("Token refresh failed: {}", error.error);
        }

        response
            .json()
            .await
            .context("Failed to parse refresh token response")
    }
}

/// State for an in-progress OAuth flow
pub struct AuthFlowState {
    pub auth_url: String,
    pub redirect_uri: String,
    pub pkce_verifier: String,
    pub state: String,
    listener: TcpListener,
}

/// Run the full first-use consent flow and return the granted tokens.
///
/// Opens the consent URL in a browser (printing it as a fallback), waits for
/// the loopback callback, and exchanges the code.
pub async fn run_consent_flow(credentials_path: &Path) -> Result<OAuth2Tokens> {
    let credentials = AppCredentials::load(credentials_path)?;
    let oauth = GmailOAuth::new(credentials)?;
    let flow = oauth.start_auth_flow()?;

    println!("Opening browser for Google consent...");
    println!("If no browser opens, visit:\n\n  {}\n", flow.auth_url);
    open::that(&flow.auth_url).ok();

    let redirect_uri = flow.redirect_uri.clone();
    let pkce_verifier = flow.pkce_verifier.clone();

    // The listener blocks, so park it on a blocking task
    let code = tokio::task::spawn_blocking(move || GmailOAuth::wait_for_callback(&flow))
        .await
        .context("OAuth callback task failed")??;

    let tokens = oauth
        .exchange_code(&code, &redirect_uri, &pkce_verifier)
        .await?;
    if tokens.refresh_token.is_none() {
        tracing::warn!("Google did not return a refresh token; re-consent may be required");
    }
    Ok(tokens)
}

/// Escape HTML special characters to prevent XSS in the callback page
fn escape_html(s: &str) -> String {
    s.chars()
        .flat_map(|c| match c {
            '&' => "&amp;".chars().collect::<Vec<_>>(),
            '<' => "&lt;".chars().collect::<Vec<_>>(),
            '>' => "&gt;".chars().collect::<Vec<_>>(),
            '"' => "&quot;".chars().collect::<Vec<_>>(),
            '\'' => "&#x27;".chars().collect::<Vec<_>>(),
            _ => vec![c],
        })
        .collect()
}

/// Percent-encode a query parameter value
fn url_encode(s: &str) -> String {
    let mut result = String::new();
    for c in s.chars() {
        match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '.' | '~' => result.push(c),
            _ => {
                for b in c.to_string().as_bytes() {
                    result.push_str(&format!("%{:02X}", b));
                }
            }
        }
    }
    result
}

/// Decode a percent-encoded query parameter value
fn url_decode(s: &str) -> String {
    let mut result = String::new();
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '%' {
            let hex: String = chars.by_ref().take(2).collect();
            if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                result.push(byte as char);
            }
        } else if c == '+' {
            result.push(' ');
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_encode() {
        assert_eq!(url_encode("hello"), "hello");
        assert_eq!(url_encode("hello world"), "hello%20world");
        assert_eq!(url_encode("a=b&c=d"), "a%3Db%26c%3Dd");
    }

    #[test]
    fn test_url_decode_roundtrip() {
        assert_eq!(url_decode(&url_encode("a=b&c d")), "a=b&c d");
        assert_eq!(url_decode("a+b"), "a b");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("hello"), "hello");
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a&b"), "a&amp;b");
        assert_eq!(escape_html("\"test\""), "&quot;test&quot;");
    }

    #[test]
    fn test_credentials_file_parses_installed_section() {
        let json = r#"{
            "installed": {
                "client_id": "abc.apps.googleusercontent.com",
                "client_secret": "shh",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "redirect_uris": ["http://localhost"]
            }
        }"#;
        let file: CredentialsFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.installed.client_id, "abc.apps.googleusercontent.com");
        assert_eq!(file.installed.client_secret.as_deref(), Some("shh"));
    }
}
