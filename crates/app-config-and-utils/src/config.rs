//! Configuration management.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use url::Url;

/// Default Firebase web API key (can be set at compile time via the
/// SAFEROUTE_FIREBASE_API_KEY env var).
pub const DEFAULT_FIREBASE_API_KEY: Option<&str> = option_env!("SAFEROUTE_FIREBASE_API_KEY");

/// Identity Toolkit v1 base URL.
pub const DEFAULT_IDENTITY_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

pub const DEFAULT_FEDERATED_CALLBACK_PORT: u16 = 9876;
pub const DEFAULT_FEDERATED_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MOCK_LATENCY_MS: u64 = 1000;

const ENV_LOG_LEVEL: &str = "SAFEROUTE_LOG_LEVEL";
const ENV_AUTH_BACKEND: &str = "SAFEROUTE_AUTH_BACKEND";
const ENV_FIREBASE_API_KEY: &str = "SAFEROUTE_FIREBASE_API_KEY";

/// Which auth backend the app talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthBackendKind {
    /// In-memory accounts, nothing leaves the process.
    #[default]
    Mock,
    /// Firebase Identity Toolkit REST API.
    Firebase,
}

impl FromStr for AuthBackendKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "firebase" => Ok(Self::Firebase),
            other => Err(CoreError::Config(format!(
                "Unknown auth backend '{}', expected 'mock' or 'firebase'",
                other
            ))),
        }
    }
}

impl fmt::Display for AuthBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mock => f.write_str("mock"),
            Self::Firebase => f.write_str("firebase"),
        }
    }
}

/// Application configuration, stored at `~/.saferoute/config.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    pub auth_backend: AuthBackendKind,
    /// Firebase web API key, required by the firebase backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firebase_api_key: Option<String>,
    pub identity_toolkit_url: String,
    /// Loopback port for the Google sign-in redirect.
    pub federated_callback_port: u16,
    pub federated_timeout_secs: u64,
    /// Simulated latency of the mock backend.
    pub mock_latency_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            auth_backend: AuthBackendKind::default(),
            firebase_api_key: DEFAULT_FIREBASE_API_KEY.map(|s| s.to_string()),
            identity_toolkit_url: DEFAULT_IDENTITY_TOOLKIT_URL.to_string(),
            federated_callback_port: DEFAULT_FEDERATED_CALLBACK_PORT,
            federated_timeout_secs: DEFAULT_FEDERATED_TIMEOUT_SECS,
            mock_latency_ms: DEFAULT_MOCK_LATENCY_MS,
        }
    }
}

impl Config {
    /// Create a new Config with default values, then override from environment.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load configuration from the config file, falling back to defaults,
    /// then apply environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the config file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    fn load_from_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from `lookup` (environment variable name → value).
    ///
    /// Empty values are ignored, as is an unknown backend name.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).and_then(crate::logging::non_empty_env);

        if let Some(log_level) = get(ENV_LOG_LEVEL) {
            self.log_level = log_level;
        }
        if let Some(raw) = get(ENV_AUTH_BACKEND) {
            match raw.parse() {
                Ok(kind) => self.auth_backend = kind,
                Err(e) => tracing::warn!(error = %e, "Ignoring {}", ENV_AUTH_BACKEND),
            }
        }
        if let Some(api_key) = get(ENV_FIREBASE_API_KEY) {
            self.firebase_api_key = Some(api_key);
        }
    }

    /// Identity Toolkit base URL as a parsed URL.
    pub fn identity_toolkit_url(&self) -> CoreResult<Url> {
        Url::parse(&self.identity_toolkit_url).map_err(CoreError::from)
    }

    /// Check that the selected backend has what it needs.
    pub fn validate(&self) -> CoreResult<()> {
        if self.auth_backend == AuthBackendKind::Firebase {
            let has_key = self
                .firebase_api_key
                .as_deref()
                .is_some_and(|key| !key.trim().is_empty());
            if !has_key {
                return Err(CoreError::Config(
                    "The firebase auth backend needs firebase_api_key".to_string(),
                ));
            }
            self.identity_toolkit_url()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.auth_backend, AuthBackendKind::Mock);
        assert_eq!(config.identity_toolkit_url, DEFAULT_IDENTITY_TOOLKIT_URL);
        assert_eq!(config.federated_callback_port, 9876);
        assert_eq!(config.federated_timeout_secs, 120);
    }

    #[test]
    fn test_config_load_partial_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(
            &config_path,
            r#"{ "log_level": "debug", "auth_backend": "firebase" }"#,
        )
        .unwrap();

        let config = Config::load_from_file(&config_path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.auth_backend, AuthBackendKind::Firebase);
        assert_eq!(config.mock_latency_ms, DEFAULT_MOCK_LATENCY_MS);
    }

    #[test]
    fn test_config_load_rejects_bad_json() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, "{ nope").unwrap();

        assert!(matches!(
            Config::load_from_file(&config_path),
            Err(CoreError::Json(_))
        ));
    }

    #[test]
    fn test_config_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let config = Config {
            log_level: "trace".to_string(),
            mock_latency_ms: 0,
            ..Config::default()
        };
        config.save(&paths).unwrap();

        let loaded = Config::load_from_file(&paths.config_file()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("SAFEROUTE_LOG_LEVEL", "debug"),
            ("SAFEROUTE_AUTH_BACKEND", "Firebase"),
            ("SAFEROUTE_FIREBASE_API_KEY", "key-123"),
        ]));

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.auth_backend, AuthBackendKind::Firebase);
        assert_eq!(config.firebase_api_key.as_deref(), Some("key-123"));
    }

    #[test]
    fn test_overrides_ignore_empty_and_unknown() {
        let mut config = Config::default();
        config.apply_overrides(env(&[
            ("SAFEROUTE_LOG_LEVEL", "   "),
            ("SAFEROUTE_AUTH_BACKEND", "ldap"),
        ]));

        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.auth_backend, AuthBackendKind::Mock);
    }

    #[test]
    fn test_backend_kind_parse_and_display() {
        assert_eq!("mock".parse::<AuthBackendKind>().unwrap(), AuthBackendKind::Mock);
        assert_eq!(
            " FIREBASE ".parse::<AuthBackendKind>().unwrap(),
            AuthBackendKind::Firebase
        );
        assert!("ldap".parse::<AuthBackendKind>().is_err());
        assert_eq!(AuthBackendKind::Firebase.to_string(), "firebase");
    }

    #[test]
    fn test_validate_firebase_needs_key() {
        let mut config = Config {
            auth_backend: AuthBackendKind::Firebase,
            firebase_api_key: None,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(CoreError::Config(_))));

        config.firebase_api_key = Some("key".to_string());
        assert!(config.validate().is_ok());

        config.identity_toolkit_url = "not a url".to_string();
        assert!(matches!(config.validate(), Err(CoreError::InvalidUrl(_))));
    }

    #[test]
    fn test_validate_mock_needs_nothing() {
        let config = Config {
            firebase_api_key: None,
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }
}
