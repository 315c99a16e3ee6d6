//! Health Signal configuration management

use crate::error::{Error, Result};
use crate::privacy::Salt;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main Health Signal configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthSignalConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Constitution scoring configuration
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Emergency safety classifier configuration
    #[serde(default)]
    pub safety: SafetyConfig,

    /// Anonymization configuration
    #[serde(default)]
    pub privacy: PrivacyConfig,

    /// Symptom storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
}

impl HealthSignalConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed origins for CORS (empty = any)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 18800,
            cors_origins: Vec::new(),
        }
    }
}

/// Constitution scoring thresholds, in normalized score points
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Max spread between first and third rank that still counts as balanced
    pub balanced_threshold: f64,

    /// Max gap between first and second rank for a secondary dosha
    pub secondary_threshold: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            balanced_threshold: 10.0,
            secondary_threshold: 15.0,
        }
    }
}

/// How emergency phrases are matched against input text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Plain case-insensitive substring containment
    #[default]
    Substring,

    /// Phrase must start and end on a word boundary
    WordBoundary,
}

/// Safety classifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Advisory language used when the requested one is unsupported
    pub default_language: String,

    /// Keyword match mode
    pub match_mode: MatchMode,

    /// Additional trigger phrases appended to the built-in table
    pub extra_keywords: Vec<String>,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            default_language: "en".to_string(),
            match_mode: MatchMode::Substring,
            extra_keywords: Vec::new(),
        }
    }
}

/// Anonymization configuration.
///
/// The salt itself never lives in the file; only the name of the
/// environment variable that carries it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacyConfig {
    /// Environment variable holding the identity hash salt
    pub salt_env: String,

    /// Minimum accepted salt length in bytes
    pub min_salt_len: usize,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            salt_env: "HEALTHSIGNAL_HASH_SALT".to_string(),
            min_salt_len: 16,
        }
    }
}

impl PrivacyConfig {
    /// Resolve the hash salt from the configured environment variable.
    pub fn resolve_salt(&self) -> Result<Salt> {
        let value = std::env::var(&self.salt_env).map_err(|_| {
            Error::Config(format!(
                "Hash salt not set: export {} before starting",
                self.salt_env
            ))
        })?;
        self.check_salt(value)
    }

    fn check_salt(&self, value: String) -> Result<Salt> {
        if value.len() < self.min_salt_len {
            return Err(Error::Config(format!(
                "Hash salt in {} is too short ({} < {} bytes)",
                self.salt_env,
                value.len(),
                self.min_salt_len
            )));
        }
        Ok(Salt::new(value))
    }
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// JSON files on local disk
    #[default]
    File,

    /// Process memory only (development, tests)
    Memory,
}

/// Symptom storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend type
    pub backend: StorageBackend,

    /// Base directory for the file backend
    pub base_dir: PathBuf,

    /// Per-attempt query timeout in milliseconds
    pub query_timeout_ms: u64,

    /// Maximum query attempts before giving up
    pub max_attempts: u32,

    /// Initial retry backoff in milliseconds
    pub backoff_base_ms: u64,

    /// Retry backoff cap in milliseconds
    pub backoff_max_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base = dirs_next::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("healthsignal")
            .join("symptoms");

        Self {
            backend: StorageBackend::File,
            base_dir: base,
            query_timeout_ms: 2000,
            max_attempts: 3,
            backoff_base_ms: 100,
            backoff_max_ms: 2000,
        }
    }
}

impl StorageConfig {
    /// Per-attempt query timeout
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HealthSignalConfig::default();
        assert_eq!(config.server.port, 18800);
        assert_eq!(config.scoring.balanced_threshold, 10.0);
        assert_eq!(config.scoring.secondary_threshold, 15.0);
        assert_eq!(config.safety.default_language, "en");
        assert_eq!(config.safety.match_mode, MatchMode::Substring);
        assert_eq!(config.storage.backend, StorageBackend::File);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: HealthSignalConfig = toml::from_str(
            r#"
            [safety]
            default_language = "hi"
            match_mode = "word_boundary"

            [storage]
            backend = "memory"
            query_timeout_ms = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.safety.default_language, "hi");
        assert_eq!(config.safety.match_mode, MatchMode::WordBoundary);
        assert!(config.safety.extra_keywords.is_empty());
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.query_timeout(), Duration::from_millis(500));
        assert_eq!(config.storage.max_attempts, 3);
        assert_eq!(config.server.port, 18800);
        assert_eq!(config.privacy.salt_env, "HEALTHSIGNAL_HASH_SALT");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("healthsignal.toml");
        std::fs::write(&path, "[server]\nport = 9000\n").unwrap();
        let config = HealthSignalConfig::load(&path).unwrap();
        assert_eq!(config.server.port, 9000);

        std::fs::write(&path, "[server\nport = ").unwrap();
        assert!(matches!(
            HealthSignalConfig::load(&path),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_salt_never_serialized() {
        let toml = toml::to_string_pretty(&HealthSignalConfig::default()).unwrap();
        assert!(toml.contains("salt_env"));
        assert!(!toml.contains("salt ="));
    }

    #[test]
    fn test_short_salt_rejected() {
        let privacy = PrivacyConfig::default();
        let err = privacy.check_salt("short".to_string()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_salt_env() {
        let privacy = PrivacyConfig {
            salt_env: "HEALTHSIGNAL_TEST_SALT_THAT_IS_NEVER_SET".to_string(),
            ..Default::default()
        };
        assert!(matches!(privacy.resolve_salt(), Err(Error::Config(_))));
    }

    #[test]
    fn test_resolve_salt_from_env() {
        let privacy = PrivacyConfig {
            salt_env: "HEALTHSIGNAL_TEST_SALT_RESOLVE".to_string(),
            ..Default::default()
        };
        std::env::set_var(&privacy.salt_env, "0123456789abcdef-test-salt");
        let salt = privacy.resolve_salt().unwrap();
        assert_eq!(salt.expose(), "0123456789abcdef-test-salt");
        std::env::remove_var(&privacy.salt_env);
    }
}
