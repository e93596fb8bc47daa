use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Completion provider settings
    #[serde(default)]
    pub ai: AiConfig,
    /// Optional Gmail inbox connector settings
    #[serde(default)]
    pub gmail: GmailConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Completion provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// API key. The OPENAI_API_KEY environment variable takes precedence.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature. Non-zero so reply drafts vary stylistically.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens for the analysis response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl AiConfig {
    /// Resolve the API key: environment first, then config file
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone())
    }
}

/// Gmail inbox connector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GmailConfig {
    /// Path to the Google OAuth client-secret file. Defaults to
    /// credentials.json in the config directory. The inbox feature is
    /// hidden entirely when the file does not exist.
    #[serde(default)]
    pub credentials_file: Option<PathBuf>,
    /// How many recent messages to list
    #[serde(default = "default_max_results")]
    pub max_results: u32,
}

impl Default for GmailConfig {
    fn default() -> Self {
        Self {
            credentials_file: None,
            max_results: default_max_results(),
        }
    }
}

impl GmailConfig {
    pub fn credentials_path(&self) -> PathBuf {
        self.credentials_file.clone().unwrap_or_else(|| {
            Config::config_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("credentials.json")
        })
    }

    /// Whether the inbox connector prerequisite is present
    pub fn is_available(&self) -> bool {
        self.credentials_path().exists()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub theme: ThemeVariant,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeVariant {
    #[default]
    Dark,
    #[serde(rename = "high-contrast")]
    HighContrast,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_max_results() -> u32 {
    10
}

impl Config {
    pub fn config_dir() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("draftly");
        Ok(dir)
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dir = dirs::data_local_dir()
            .context("Could not find data directory")?
            .join("draftly");
        Ok(dir)
    }

    /// Load the config file, falling back to defaults when absent.
    ///
    /// A missing API key is not an error here: the app starts and shows a
    /// persistent configuration banner instead.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(Self::config_dir()?)?;
        fs::create_dir_all(Self::data_dir()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.ai.model, "gpt-4o-mini");
        assert_eq!(config.ai.temperature, 0.7);
        assert_eq!(config.ai.max_tokens, 2000);
        assert!(config.ai.api_key.is_none());
        assert_eq!(config.gmail.max_results, 10);
        assert_eq!(config.ui.theme, ThemeVariant::Dark);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [ai]
            api_key = "sk-test"
            model = "gpt-4o"
            temperature = 0.2
            max_tokens = 500

            [gmail]
            credentials_file = "/tmp/credentials.json"
            max_results = 25

            [ui]
            theme = "high-contrast"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.ai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.ai.model, "gpt-4o");
        assert_eq!(config.ai.temperature, 0.2);
        assert_eq!(config.ai.max_tokens, 500);
        assert_eq!(
            config.gmail.credentials_file,
            Some(PathBuf::from("/tmp/credentials.json"))
        );
        assert_eq!(config.gmail.max_results, 25);
        assert_eq!(config.ui.theme, ThemeVariant::HighContrast);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let toml = r#"
            [ai]
            model = "gpt-4.1-mini"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.ai.model, "gpt-4.1-mini");
        assert_eq!(config.ai.temperature, 0.7);
        assert_eq!(config.gmail.max_results, 10);
    }

    #[test]
    fn test_credentials_path_override() {
        let gmail = GmailConfig {
            credentials_file: Some(PathBuf::from("/nonexistent/creds.json")),
            max_results: 10,
        };
        assert_eq!(
            gmail.credentials_path(),
            PathBuf::from("/nonexistent/creds.json")
        );
        assert!(!gmail.is_available());
    }
}
