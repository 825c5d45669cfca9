//! Configuration management.
//!
//! The config file is JSON. Missing fields take their defaults, so an empty
//! object is a valid config. The shared credential may also come from the
//! `LIKERELAY_KEY` environment variable, which wins over the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use likerelay_fetch::{
    DispatchSettings, RelayEnvelope, SimulationRange, DEFAULT_ENDPOINT_URL, DEFAULT_RELAY_URL,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::persistence::{default_config_path, default_history_path, load_json, save_json};

/// Environment variable holding the shared credential.
pub const CREDENTIAL_ENV: &str = "LIKERELAY_KEY";

// ============================================================================
// Config
// ============================================================================

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote "send likes" endpoint.
    pub endpoint_url: String,
    /// Pass-through relay base URL.
    pub relay_url: String,
    /// Shape of the relay's answer.
    pub relay_envelope: RelayEnvelope,
    /// Side query for nickname/region, if any.
    pub metadata_url: Option<String>,
    /// Whether a placeholder nickname may be resolved after delivery by
    /// sending one extra like.
    pub probe_metadata: bool,
    /// Shared credential.
    pub credential: Option<String>,
    /// Attempt bounds.
    pub timeouts: TimeoutConfig,
    /// Region reported by simulated results.
    pub default_region: String,
    /// Bounds for simulated results.
    pub simulation: SimulationRange,
    /// History settings.
    pub history: HistoryConfig,
}

/// Attempt bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Proxied transport bound, in seconds.
    pub proxied_secs: u64,
    /// Callback-channel transport bound, in seconds.
    pub callback_secs: u64,
    /// Direct transport bound per call mode, in seconds.
    pub direct_secs: u64,
    /// Metadata lookup bound, in seconds.
    pub metadata_secs: u64,
    /// Wait for pending metadata after delivery, in milliseconds.
    pub metadata_grace_ms: u64,
}

/// History settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Whether history is written to disk.
    pub persist: bool,
    /// History file; the platform data directory when unset.
    pub path: Option<PathBuf>,
    /// Maximum number of records kept.
    pub limit: usize,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            proxied_secs: 10,
            callback_secs: 15,
            direct_secs: 10,
            metadata_secs: 8,
            metadata_grace_ms: 1_000,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            persist: true,
            path: None,
            limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            relay_url: DEFAULT_RELAY_URL.to_string(),
            relay_envelope: RelayEnvelope::default(),
            metadata_url: None,
            probe_metadata: true,
            credential: None,
            timeouts: TimeoutConfig::default(),
            default_region: "BR".to_string(),
            simulation: SimulationRange::default(),
            history: HistoryConfig::default(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("endpoint_url", &self.endpoint_url)
            .field("relay_url", &self.relay_url)
            .field("relay_envelope", &self.relay_envelope)
            .field("metadata_url", &self.metadata_url)
            .field("probe_metadata", &self.probe_metadata)
            .field("credential", &self.credential.as_ref().map(|_| "***"))
            .field("timeouts", &self.timeouts)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        default_config_path()
    }

    /// Loads configuration from the default path.
    pub async fn load() -> Result<Self, StoreError> {
        Self::load_from(&Self::default_path()).await
    }

    /// Loads configuration from a specific path.
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub async fn load_from(path: &Path) -> Result<Self, StoreError> {
        match load_json::<Self>(path).await {
            Ok(config) => {
                info!(path = %path.display(), "Loaded configuration");
                config.validate()?;
                Ok(config)
            }
            Err(e) if e.is_not_found() => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Saves configuration to the default path.
    pub async fn save(&self) -> Result<(), StoreError> {
        self.save_to(&Self::default_path()).await
    }

    /// Saves configuration to a specific path.
    pub async fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        save_json(path, self).await?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Applies environment overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_credential_override(std::env::var(CREDENTIAL_ENV).ok())
    }

    /// Replaces the credential when `credential` is non-empty.
    pub fn with_credential_override(mut self, credential: Option<String>) -> Self {
        if let Some(key) = credential.filter(|k| !k.trim().is_empty()) {
            self.credential = Some(key);
        }
        self
    }

    /// Checks values that would make every dispatch fail.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.endpoint_url.trim().is_empty() {
            return Err(StoreError::Config("endpoint_url is empty".to_string()));
        }
        if self.history.limit == 0 {
            return Err(StoreError::Config("history.limit must be positive".to_string()));
        }
        Ok(())
    }

    /// Returns the history file path.
    pub fn history_path(&self) -> PathBuf {
        self.history.path.clone().unwrap_or_else(default_history_path)
    }

    /// Converts into dispatch settings.
    pub fn to_settings(&self) -> DispatchSettings {
        let t = &self.timeouts;
        DispatchSettings {
            endpoint_url: self.endpoint_url.clone(),
            relay_url: self.relay_url.clone(),
            relay_envelope: self.relay_envelope.clone(),
            credential: self.credential.clone().unwrap_or_default(),
            metadata_url: self.metadata_url.clone(),
            proxied_timeout: Duration::from_secs(t.proxied_secs),
            callback_timeout: Duration::from_secs(t.callback_secs),
            direct_timeout: Duration::from_secs(t.direct_secs),
            metadata_timeout: Duration::from_secs(t.metadata_secs),
            metadata_grace: Duration::from_millis(t.metadata_grace_ms),
            default_region: self.default_region.clone(),
            simulation: self.simulation.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_dispatch_defaults() {
        let settings = Config::default().to_settings();
        let expected = DispatchSettings::default();

        assert_eq!(settings.endpoint_url, expected.endpoint_url);
        assert_eq!(settings.proxied_timeout, expected.proxied_timeout);
        assert_eq!(settings.callback_timeout, expected.callback_timeout);
        assert_eq!(settings.direct_timeout, expected.direct_timeout);
        assert_eq!(settings.metadata_timeout, expected.metadata_timeout);
        assert_eq!(settings.metadata_grace, expected.metadata_grace);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"timeouts": {"callback_secs": 20}, "credential": "k3y"}"#)
                .unwrap();

        assert_eq!(config.timeouts.callback_secs, 20);
        assert_eq!(config.timeouts.proxied_secs, 10);
        assert_eq!(config.to_settings().credential, "k3y");
        assert!(config.probe_metadata);
    }

    #[test]
    fn test_credential_override() {
        let config = Config::default().with_credential_override(Some("from-env".into()));
        assert_eq!(config.credential.as_deref(), Some("from-env"));

        let config = config.with_credential_override(Some("  ".into()));
        assert_eq!(config.credential.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_debug_hides_credential() {
        let config = Config::default().with_credential_override(Some("hunter2".into()));
        assert!(!format!("{config:?}").contains("hunter2"));
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.history.limit = 0;
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("config.json"))
            .await
            .unwrap();
        assert_eq!(config.endpoint_url, DEFAULT_ENDPOINT_URL);
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");

        let mut config = Config::default();
        config.metadata_url = Some("https://meta.example/player".to_string());
        config.probe_metadata = false;
        config.save_to(&path).await.unwrap();

        let loaded = Config::load_from(&path).await.unwrap();
        assert_eq!(loaded.metadata_url, config.metadata_url);
        assert!(!loaded.probe_metadata);
    }

    #[tokio::test]
    async fn test_malformed_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        tokio::fs::write(&path, "{ nope").await.unwrap();

        assert!(Config::load_from(&path).await.is_err());
    }
}
