//! Refresh-token storage: keyring with a restricted-permission file fallback

use anyhow::Result;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

const KEYRING_SERVICE: &str = "draftly";
const KEYRING_KEY: &str = "gmail-refresh-token";

/// Stores the long-lived Gmail refresh token.
///
/// The keyring is preferred; when no secret service is available the token
/// falls back to a 0600 file in the config directory.
pub struct TokenStore {
    token_file: PathBuf,
}

impl TokenStore {
    pub fn new() -> Self {
        let token_file = crate::config::Config::config_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".gmail_refresh_token");
        Self { token_file }
    }

    /// Construct with an explicit fallback file path (used in tests)
    pub fn with_file(token_file: PathBuf) -> Self {
        Self { token_file }
    }

    /// Load the stored refresh token, if any
    pub fn load(&self) -> Option<String> {
        if let Some(token) = self.keyring_get() {
            return Some(token);
        }
        self.file_get()
    }

    /// Persist the refresh token
    pub fn save(&self, token: &str) -> Result<()> {
        if self.keyring_set(token) {
            // Keep the file fallback from shadowing a rotated token
            self.clear_file();
            return Ok(());
        }
        tracing::warn!("keyring unavailable, storing refresh token in file fallback");
        self.file_set(token)
    }

    /// Remove the stored refresh token from all backends
    pub fn clear(&self) {
        if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, KEYRING_KEY) {
            entry.delete_credential().ok();
        }
        self.clear_file();
    }

    /// Whether a refresh token is available from any backend
    pub fn has_token(&self) -> bool {
        self.load().is_some()
    }

    fn keyring_get(&self) -> Option<String> {
        let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_KEY).ok()?;
        entry.get_password().ok()
    }

    fn keyring_set(&self, token: &str) -> bool {
        if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, KEYRING_KEY) {
            entry.set_password(token).is_ok()
        } else {
            false
        }
    }

    fn file_get(&self) -> Option<String> {
        fs::read_to_string(&self.token_file)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn file_set(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.token_file.parent() {
            fs::create_dir_all(parent)?;
        }

        #[cfg(unix)]
        {
            let mut file = fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.token_file)?;
            file.write_all(token.as_bytes())?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.token_file, token)?;
        }

        Ok(())
    }

    fn clear_file(&self) {
        fs::remove_file(&self.token_file).ok();
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_fallback_roundtrip() {
        let dir = tempdir().unwrap();
        let store = TokenStore::with_file(dir.path().join("token"));

        assert_eq!(store.file_get(), None);
        store.file_set("1//refresh-token\n").unwrap();
        assert_eq!(store.file_get().as_deref(), Some("1//refresh-token"));

        store.clear_file();
        assert_eq!(store.file_get(), None);
    }

    #[test]
    fn test_empty_file_is_no_token() {
        let dir = tempdir().unwrap();
        let store = TokenStore::with_file(dir.path().join("token"));
        store.file_set("").unwrap();
        assert_eq!(store.file_get(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_fallback_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("token");
        let store = TokenStore::with_file(path.clone());
        store.file_set("secret").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
