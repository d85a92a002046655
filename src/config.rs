//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `EPITRENDS_*` environment overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::UpstreamConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub upstream: UpstreamSettings,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://127.0.0.1:3000".to_string(),
    ]
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Disease backend connection
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_upstream_timeout")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,

    /// Serve this CSV or JSON file instead of calling the backend
    #[serde(default)]
    pub dataset: Option<PathBuf>,
}

fn default_base_url() -> String {
    UpstreamConfig::default().base_url
}

fn default_upstream_timeout() -> u64 {
    UpstreamConfig::default().request_timeout_ms
}

fn default_max_retries() -> u32 {
    UpstreamConfig::default().max_retries
}

fn default_retry_backoff() -> u64 {
    UpstreamConfig::default().retry_backoff_ms
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_upstream_timeout(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff(),
            dataset: None,
        }
    }
}

impl UpstreamSettings {
    pub fn client_config(&self) -> UpstreamConfig {
        UpstreamConfig {
            base_url: self.base_url.clone(),
            request_timeout_ms: self.request_timeout_ms,
            max_retries: self.max_retries,
            retry_backoff_ms: self.retry_backoff_ms,
        }
    }
}

/// Query cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_stale_time")]
    pub stale_time_secs: u64,
}

fn default_stale_time() -> u64 {
    60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time_secs: default_stale_time(),
        }
    }
}

impl CacheConfig {
    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "epitrends=info,tower_http=info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        for path in Self::default_paths() {
            if path.exists() {
                match Self::load_with_env(&path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Candidate config file locations, in priority order
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("epitrends").join("config.toml")),
            Some(PathBuf::from("/etc/epitrends/config.toml")),
            Some(PathBuf::from("./epitrends.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Reject values that cannot work at runtime
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upstream.base_url.trim().is_empty() && self.upstream.dataset.is_none() {
            return Err(ConfigError::Invalid(
                "upstream.base_url is empty and no dataset is configured".to_string(),
            ));
        }
        if self.upstream.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "upstream.request_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // API overrides
        if let Some(host) = lookup("EPITRENDS_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("EPITRENDS_API_PORT").and_then(|p| p.parse().ok()) {
            self.api.port = port;
        }

        // Upstream overrides
        if let Some(url) = lookup("EPITRENDS_BACKEND_URL") {
            self.upstream.base_url = url;
        }
        if let Some(timeout) = lookup("EPITRENDS_BACKEND_TIMEOUT_MS").and_then(|t| t.parse().ok()) {
            self.upstream.request_timeout_ms = timeout;
        }
        if let Some(dataset) = lookup("EPITRENDS_DATASET") {
            self.upstream.dataset = Some(PathBuf::from(dataset));
        }

        // Cache overrides
        if let Some(secs) = lookup("EPITRENDS_CACHE_STALE_SECS").and_then(|s| s.parse().ok()) {
            self.cache.stale_time_secs = secs;
        }

        // Logging overrides
        if let Some(level) = lookup("EPITRENDS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("EPITRENDS_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# epitrends Configuration
#
# Environment variables override these settings:
# - EPITRENDS_API_HOST
# - EPITRENDS_API_PORT
# - EPITRENDS_BACKEND_URL
# - EPITRENDS_BACKEND_TIMEOUT_MS
# - EPITRENDS_DATASET
# - EPITRENDS_CACHE_STALE_SECS
# - EPITRENDS_LOG_LEVEL
# - EPITRENDS_LOG_FORMAT

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8090

# Allowed CORS origins
cors_origins = ["http://localhost:3000", "http://127.0.0.1:3000"]

# Request timeout in seconds
request_timeout_secs = 30

[upstream]
# Disease backend base URL, including the API prefix
base_url = "http://localhost:8080/api/v1"

# Per-request timeout (ms)
request_timeout_ms = 30000

# Extra attempts after a network, timeout or 5xx failure
max_retries = 1

# Base delay between attempts (ms)
retry_backoff_ms = 500

# Serve a local CSV or JSON file instead of the backend
# dataset = "./trends.csv"

[cache]
# Seconds before cached backend data is refetched
stale_time_secs = 60

[logging]
# Log filter, RUST_LOG syntax
level = "epitrends=info,tower_http=info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.port, 8090);
        assert_eq!(config.upstream.base_url, "http://localhost:8080/api/v1");
        assert_eq!(config.cache.stale_after(), Duration::from_secs(60));
        assert!(!config.logging.is_json());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config = Config::parse(&generate_default_config()).unwrap();
        let defaults = Config::default();

        assert_eq!(config.api.port, defaults.api.port);
        assert_eq!(config.api.cors_origins, defaults.api.cors_origins);
        assert_eq!(config.upstream.max_retries, defaults.upstream.max_retries);
        assert_eq!(config.cache.stale_time_secs, defaults.cache.stale_time_secs);
        assert_eq!(config.logging.level, defaults.logging.level);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[upstream]\nbase_url = \"http://backend:9000/api/v1\"\n[logging]\nformat = \"json\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.upstream.base_url, "http://backend:9000/api/v1");
        assert_eq!(config.upstream.request_timeout_ms, 30_000);
        assert!(config.logging.is_json());
        assert_eq!(config.api.host, "0.0.0.0");
    }

    #[test]
    fn test_load_errors() {
        let err = Config::load(Path::new("/nonexistent/epitrends.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api\nport = ").unwrap();
        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("EPITRENDS_API_PORT", "9999"),
            ("EPITRENDS_BACKEND_URL", "http://10.0.0.5/api/v1"),
            ("EPITRENDS_CACHE_STALE_SECS", "5"),
            ("EPITRENDS_DATASET", "/data/trends.csv"),
            ("EPITRENDS_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.port, 9999);
        assert_eq!(config.upstream.base_url, "http://10.0.0.5/api/v1");
        assert_eq!(config.cache.stale_time_secs, 5);
        assert_eq!(config.upstream.dataset, Some(PathBuf::from("/data/trends.csv")));
        assert!(config.logging.is_json());
    }

    #[test]
    fn test_unparsable_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides(|key| (key == "EPITRENDS_API_PORT").then(|| "high".to_string()));
        assert_eq!(config.api.port, 8090);
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.upstream.request_timeout_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_client_config() {
        let settings = UpstreamSettings {
            max_retries: 4,
            ..Default::default()
        };
        let client = settings.client_config();
        assert_eq!(client.max_retries, 4);
        assert_eq!(client.base_url, settings.base_url);
    }
}
