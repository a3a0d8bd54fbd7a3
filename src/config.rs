//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub status: StatusConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend REST API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_backend_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Blockchain status polling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StatusConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_poll_interval() -> u64 {
    30
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl StatusConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

/// Timings for the splash screen and toast notifications
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_splash_ms")]
    pub splash_ms: u64,

    #[serde(default = "default_fade_ms")]
    pub fade_ms: u64,

    #[serde(default = "default_toast_ms")]
    pub toast_ms: u64,

    #[serde(default = "default_toast_fade_ms")]
    pub toast_fade_ms: u64,
}

fn default_splash_ms() -> u64 {
    2000
}

fn default_fade_ms() -> u64 {
    500
}

fn default_toast_ms() -> u64 {
    5000
}

fn default_toast_fade_ms() -> u64 {
    300
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            splash_ms: default_splash_ms(),
            fade_ms: default_fade_ms(),
            toast_ms: default_toast_ms(),
            toast_fade_ms: default_toast_fade_ms(),
        }
    }
}

/// Shell server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8084
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Socket address string for binding
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Session persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_path")]
    pub storage_path: String,
}

fn default_session_path() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("chemtrack").join("session.json").to_string_lossy().to_string())
        .unwrap_or_else(|| "./chemtrack_session.json".to_string())
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_path: default_session_path(),
        }
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
    "info".to_string()
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

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
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
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("chemtrack").join("config.toml")),
            Some(PathBuf::from("/etc/chemtrack/config.toml")),
            Some(PathBuf::from("./chemtrack.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("CHEMTRACK_BACKEND_URL") {
            self.backend.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = lookup("CHEMTRACK_POLL_INTERVAL_SECS") {
            if let Ok(s) = secs.parse() {
                self.status.poll_interval_secs = s;
            }
        }

        if let Some(host) = lookup("CHEMTRACK_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("CHEMTRACK_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        if let Some(path) = lookup("CHEMTRACK_SESSION_PATH") {
            self.session.storage_path = path;
        }

        if let Some(level) = lookup("CHEMTRACK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("CHEMTRACK_LOG_FORMAT") {
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
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# ChemTrack Configuration
#
# Environment variables override these settings:
# - CHEMTRACK_BACKEND_URL
# - CHEMTRACK_POLL_INTERVAL_SECS
# - CHEMTRACK_HOST
# - CHEMTRACK_PORT
# - CHEMTRACK_SESSION_PATH
# - CHEMTRACK_LOG_LEVEL
# - CHEMTRACK_LOG_FORMAT

[backend]
# Traceability backend (REST API fronting the smart contract)
base_url = "http://127.0.0.1:5000"

# Per-request timeout in seconds
request_timeout_secs = 10

[status]
# How often the blockchain connection status is re-checked (seconds)
poll_interval_secs = 30

[ui]
# Splash screen display time and fade-out (ms)
splash_ms = 2000
fade_ms = 500

# Toast notification lifetime and fade-out (ms)
toast_ms = 5000
toast_fade_ms = 300

[server]
# Shell server bind address
host = "127.0.0.1"
port = 8084

[session]
# File holding the persisted session record
# storage_path = "~/.local/share/chemtrack/session.json"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.status.poll_interval_secs, 30);
        assert_eq!(config.ui.splash_ms, 2000);
        assert_eq!(config.ui.fade_ms, 500);
        assert_eq!(config.server.port, 8084);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.backend.request_timeout_secs, 10);
        assert_eq!(config.ui.toast_ms, 5000);
        assert_eq!(config.server.addr(), "127.0.0.1:8084");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse("[status]\npoll_interval_secs = 5\n").unwrap();
        assert_eq!(config.status.poll_interval_secs, 5);
        assert_eq!(config.backend.base_url, "http://127.0.0.1:5000");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CHEMTRACK_BACKEND_URL", "http://chain.local:9000/"),
            ("CHEMTRACK_PORT", "9999"),
            ("CHEMTRACK_POLL_INTERVAL_SECS", "not-a-number"),
            ("CHEMTRACK_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.backend.base_url, "http://chain.local:9000");
        assert_eq!(config.server.port, 9999);
        assert_eq!(config.status.poll_interval_secs, 30);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/chemtrack.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
