//! Configuration for hostprint.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for the probing engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Deadline applied to each guarded probe call
    #[serde(with = "duration_millis_serde")]
    pub probe_deadline: Duration,

    /// Wall-clock cap for transport-candidate gathering
    #[serde(with = "duration_millis_serde")]
    pub gather_cap: Duration,

    /// Timeout for remote submission/comparison requests
    #[serde(with = "duration_millis_serde")]
    pub transport_timeout: Duration,

    /// Remote collaborator base URL, if submission is configured
    pub endpoint: Option<String>,

    /// Path for the collection ledger and debug exports
    pub data_path: PathBuf,

    /// Which eager probes run at session start
    pub eager: EagerConfig,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hostprint");

        Self {
            probe_deadline: Duration::from_millis(4000),
            gather_cap: Duration::from_millis(2500),
            transport_timeout: Duration::from_millis(15_000),
            endpoint: None,
            data_path: data_dir,
            eager: EagerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hostprint")
            .join("config.json")
    }

    /// Ensure the data directory exists.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }
}

/// Configuration for which eager probes run at session start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EagerConfig {
    pub env: bool,
    pub display: bool,
    pub storage: bool,
    pub network: bool,
    pub perms: bool,
}

impl Default for EagerConfig {
    fn default() -> Self {
        Self {
            env: true,
            display: true,
            storage: true,
            network: true,
            perms: true,
        }
    }
}

impl EagerConfig {
    /// Parse eager-probe selection from a comma-separated string.
    pub fn from_csv(s: &str) -> Self {
        let names: Vec<String> = s.split(',').map(|s| s.trim().to_lowercase()).collect();
        let has = |name: &str| names.iter().any(|n| n == name || n == "all");

        Self {
            env: has("env"),
            display: has("display"),
            storage: has("storage"),
            network: has("network"),
            perms: has("perms"),
        }
    }

    /// Check if at least one eager probe is enabled.
    pub fn any_enabled(&self) -> bool {
        self.env || self.display || self.storage || self.network || self.perms
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for millisecond durations.
mod duration_millis_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eager_config_parsing() {
        let config = EagerConfig::from_csv("env,network");
        assert!(config.env);
        assert!(config.network);
        assert!(!config.display);
        assert!(!config.storage);
        assert!(!config.perms);

        let config = EagerConfig::from_csv("all");
        assert!(config.any_enabled());
        assert!(config.display && config.storage && config.perms);
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.probe_deadline, Duration::from_millis(4000));
        assert_eq!(config.gather_cap, Duration::from_millis(2500));
        assert!(config.endpoint.is_none());
        assert!(config.eager.any_enabled());
    }

    #[test]
    fn test_duration_roundtrip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.probe_deadline, config.probe_deadline);
        assert_eq!(parsed.transport_timeout, config.transport_timeout);
    }
}
