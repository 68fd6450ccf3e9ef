use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, TrialMatchError};

/// Top-level configuration for the TrialMatch service.
///
/// Loaded from `~/.trialmatch/config.toml` by default. Each section
/// corresponds to one subsystem.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrialMatchConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub nlu: NluConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl TrialMatchConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TrialMatchConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| TrialMatchError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// API server port.
    pub port: u16,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            port: 3030,
            log_level: "info".to_string(),
        }
    }
}

/// NLU gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NluConfig {
    /// Model-server URL. When absent, the built-in rule gateway is used.
    pub endpoint: Option<String>,
    /// Request timeout in seconds for the model server.
    pub timeout_secs: u64,
}

impl Default for NluConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: 5,
        }
    }
}

/// Trial registry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Base URL of the ClinicalTrials.gov v2 API.
    pub base_url: String,
    /// Maximum number of studies requested per query.
    pub page_size: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://clinicaltrials.gov/api/v2".to_string(),
            page_size: 10,
            timeout_secs: 10,
        }
    }
}

/// Conversation engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Maximum message length in characters.
    pub max_message_length: usize,
    /// Cap on the comorbidities list per session.
    pub max_comorbidities: usize,
    /// Cap on the prior-treatments list per session.
    pub max_prior_treatments: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_message_length: 2000,
            max_comorbidities: 20,
            max_prior_treatments: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TrialMatchConfig::default();
        assert_eq!(config.general.port, 3030);
        assert_eq!(config.general.log_level, "info");
        assert!(config.nlu.endpoint.is_none());
        assert_eq!(config.nlu.timeout_secs, 5);
        assert_eq!(config.registry.base_url, "https://clinicaltrials.gov/api/v2");
        assert_eq!(config.registry.page_size, 10);
        assert_eq!(config.registry.timeout_secs, 10);
        assert_eq!(config.chat.max_message_length, 2000);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = TrialMatchConfig::default();
        config.general.port = 8080;
        config.nlu.endpoint = Some("http://127.0.0.1:9000/extract".to_string());
        config.registry.page_size = 5;
        config.save(&path).unwrap();

        let loaded = TrialMatchConfig::load(&path).unwrap();
        assert_eq!(loaded.general.port, 8080);
        assert_eq!(
            loaded.nlu.endpoint.as_deref(),
            Some("http://127.0.0.1:9000/extract")
        );
        assert_eq!(loaded.registry.page_size, 5);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.toml");
        assert!(TrialMatchConfig::load(&path).is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.toml");
        let config = TrialMatchConfig::load_or_default(&path);
        assert_eq!(config.general.port, 3030);
    }

    #[test]
    fn test_load_or_default_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is not [ toml").unwrap();
        let config = TrialMatchConfig::load_or_default(&path);
        assert_eq!(config.registry.page_size, 10);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general]\nport = 4000\n").unwrap();

        let config = TrialMatchConfig::load(&path).unwrap();
        assert_eq!(config.general.port, 4000);
        // Unspecified sections keep their defaults.
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.registry.page_size, 10);
        assert_eq!(config.chat.max_message_length, 2000);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("config.toml");
        TrialMatchConfig::default().save(&path).unwrap();
        assert!(path.exists());
    }
}
