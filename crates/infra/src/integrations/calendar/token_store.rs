//! OAuth token persistence.
//!
//! Tokens live either in the platform keychain ([`KeyringTokenStore`]) or
//! in a JSON file ([`FileTokenStore`]) when a token path is configured.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use crewcal_domain::{CrewCalError, Result};
use keyring::Entry;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::InfraError;

const KEYCHAIN_SERVICE: &str = "crewcal.google";

/// OAuth tokens for one Google account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Address of the signed-in account, looked up after login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl TokenSet {
    #[must_use]
    pub fn new(access_token: String, refresh_token: Option<String>, expires_in: i64) -> Self {
        let expires_at = (expires_in > 0).then(|| Utc::now() + Duration::seconds(expires_in));
        Self { access_token, refresh_token, expires_at, scope: None, email: None }
    }

    /// Whether the access token expires within `threshold_seconds`.
    #[must_use]
    pub fn is_expired(&self, threshold_seconds: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() + Duration::seconds(threshold_seconds) >= expires_at,
            None => false,
        }
    }

    #[must_use]
    pub fn seconds_until_expiry(&self) -> Option<i64> {
        self.expires_at.map(|expires_at| (expires_at - Utc::now()).num_seconds())
    }
}

/// Storage for OAuth tokens keyed by account name.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self, account: &str) -> Result<Option<TokenSet>>;

    async fn save(&self, account: &str, tokens: &TokenSet) -> Result<()>;

    /// Remove stored tokens; missing entries are not an error.
    async fn delete(&self, account: &str) -> Result<()>;
}

/// JSON file holding tokens for every account.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_all(&self) -> Result<BTreeMap<String, TokenSet>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|err| InfraError::from(err).into())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(InfraError::from(err).into()),
        }
    }

    async fn write_all(&self, tokens: &BTreeMap<String, TokenSet>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(InfraError::from)?;
        }
        let contents = serde_json::to_string_pretty(tokens).map_err(InfraError::from)?;
        tokio::fs::write(&self.path, contents).await.map_err(InfraError::from)?;
        restrict_permissions(&self.path)?;
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &std::path::Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|err| InfraError::from(err).into())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &std::path::Path) -> Result<()> {
    Ok(())
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self, account: &str) -> Result<Option<TokenSet>> {
        Ok(self.read_all().await?.remove(account))
    }

    async fn save(&self, account: &str, tokens: &TokenSet) -> Result<()> {
        let mut all = self.read_all().await?;
        all.insert(account.to_string(), tokens.clone());
        self.write_all(&all).await?;
        debug!(account, path = %self.path.display(), "stored OAuth tokens");
        Ok(())
    }

    async fn delete(&self, account: &str) -> Result<()> {
        let mut all = self.read_all().await?;
        if all.remove(account).is_some() {
            self.write_all(&all).await?;
        }
        Ok(())
    }
}

/// Platform keychain storage, one JSON secret per account.
pub struct KeyringTokenStore {
    service: String,
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new(KEYCHAIN_SERVICE)
    }
}

impl KeyringTokenStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self { service: service.into() }
    }

    fn entry(&self, account: &str) -> Result<Entry> {
        Entry::new(&self.service, account).map_err(|err| InfraError::from(err).into())
    }
}

#[async_trait]
impl TokenStore for KeyringTokenStore {
    async fn load(&self, account: &str) -> Result<Option<TokenSet>> {
        match self.entry(account)?.get_password() {
            Ok(secret) => {
                let tokens = serde_json::from_str(&secret).map_err(InfraError::from)?;
                Ok(Some(tokens))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(InfraError::from(err).into()),
        }
    }

    async fn save(&self, account: &str, tokens: &TokenSet) -> Result<()> {
        let secret = serde_json::to_string(tokens).map_err(InfraError::from)?;
        self.entry(account)?.set_password(&secret).map_err(InfraError::from)?;
        debug!(account, service = %self.service, "stored OAuth tokens in keychain");
        Ok(())
    }

    async fn delete(&self, account: &str) -> Result<()> {
        match self.entry(account)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(InfraError::from(err).into()),
        }
    }
}

/// Pick the store for the configured token path.
pub fn token_store_for(token_path: Option<&str>) -> Arc<dyn TokenStore> {
    match token_path {
        Some(path) => Arc::new(FileTokenStore::new(path)),
        None => Arc::new(KeyringTokenStore::default()),
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn expiry_threshold() {
        let tokens = TokenSet::new("a".into(), None, 120);
        assert!(!tokens.is_expired(0));
        assert!(tokens.is_expired(300));
        assert!(!TokenSet::new("a".into(), None, 0).is_expired(300));
    }

    #[tokio::test]
    async fn file_store_round_trips_accounts() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested/tokens.json"));

        assert!(store.load("default").await.unwrap().is_none());

        let tokens = TokenSet::new("access".into(), Some("refresh".into()), 3600);
        store.save("default", &tokens).await.unwrap();
        store.save("other", &TokenSet::new("b".into(), None, 0)).await.unwrap();

        assert_eq!(store.load("default").await.unwrap(), Some(tokens));

        store.delete("default").await.unwrap();
        assert!(store.load("default").await.unwrap().is_none());
        assert!(store.load("other").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = FileTokenStore::new(path).load("default").await.unwrap_err();
        assert!(matches!(err, CrewCalError::Parse(_)));
    }
}
