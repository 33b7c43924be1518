//! TOML Configuration File Support
//!
//! Centralized configuration loading for parley, supporting a TOML file at
//! `~/.config/parley/config.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (applied through [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # XDG Base Directory Compliance
//!
//! - Config: `$XDG_CONFIG_HOME/parley/config.toml`
//! - Data: `$XDG_DATA_HOME/parley/parley.db` and `parley.log`
//!
//! # Example Configuration
//!
//! ```toml
//! [storage]
//! db_path = "/home/me/.local/share/parley/parley.db"
//!
//! [backend]
//! kind = "ollama"
//! model = "llama3.2"
//! ollama_host = "localhost"
//! ollama_port = 11434
//!
//! [ui]
//! theme = "base16-ocean.dark"
//! default_title = "Untitled"
//!
//! [logging]
//! file = "/tmp/parley.log"
//! filter = "parley_core=debug,info"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::BackendKind;
use crate::messages::DEFAULT_TITLE;
use crate::render::DEFAULT_THEME;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// Failed to open the log file
    #[error("Failed to open log file at {path}: {source}")]
    LogFileError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Storage section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageToml {
    /// Database file path
    pub db_path: Option<PathBuf>,
}

/// Backend section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendToml {
    /// Which assistant to use
    pub kind: Option<BackendKind>,
    /// Model identifier
    pub model: Option<String>,
    /// Ollama host
    pub ollama_host: Option<String>,
    /// Ollama port
    pub ollama_port: Option<u16>,
    /// Gemini API key
    pub gemini_api_key: Option<String>,
}

/// UI section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiToml {
    /// Highlighting theme name
    pub theme: Option<String>,
    /// Title given to new conversations
    pub default_title: Option<String>,
}

/// Logging section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingToml {
    /// Log file path
    pub file: Option<PathBuf>,
    /// `EnvFilter` directive string
    pub filter: Option<String>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParleyToml {
    /// Storage configuration section
    pub storage: StorageToml,
    /// Backend configuration section
    pub backend: BackendToml,
    /// UI configuration section
    pub ui: UiToml,
    /// Logging configuration section
    pub logging: LoggingToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Where and how much to log
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log file (the terminal belongs to the UI)
    pub file: PathBuf,
    /// `EnvFilter` directives
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: data_dir().join("parley.log"),
            filter: "info".to_string(),
        }
    }
}

/// Resolved configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Conversation database path
    pub db_path: PathBuf,
    /// Keep conversations in memory only
    pub ephemeral: bool,
    /// Assistant backend
    pub backend: BackendKind,
    /// Model override (backend default when `None`)
    pub model: Option<String>,
    /// Ollama host
    pub ollama_host: String,
    /// Ollama port
    pub ollama_port: u16,
    /// Gemini API key
    pub gemini_api_key: Option<String>,
    /// Highlighting theme
    pub theme: String,
    /// Render without escape sequences
    pub plain: bool,
    /// Title given to new conversations
    pub default_title: String,
    /// Logging setup
    pub logging: LoggingConfig,
    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,
    source: ConfigSource,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: data_dir().join("parley.db"),
            ephemeral: false,
            backend: BackendKind::Ollama,
            model: None,
            ollama_host: "localhost".to_string(),
            ollama_port: 11434,
            gemini_api_key: None,
            theme: DEFAULT_THEME.to_string(),
            plain: false,
            default_title: DEFAULT_TITLE.to_string(),
            logging: LoggingConfig::default(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl Config {
    /// Model the configured backend will use
    #[must_use]
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.backend.default_model())
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] for a Gemini backend without
    /// an API key, an empty default title, or port 0.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend == BackendKind::Gemini && self.gemini_api_key.is_none() {
            return Err(ConfigError::ValidationError(
                "gemini backend requires GEMINI_API_KEY or [backend] gemini_api_key".into(),
            ));
        }
        if self.default_title.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "ui.default_title must not be empty".into(),
            ));
        }
        if self.ollama_port == 0 {
            return Err(ConfigError::ValidationError(
                "backend.ollama_port must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("parley"))
        .unwrap_or_else(|| PathBuf::from(".parley"))
}

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/parley/config.toml` or
/// `~/.config/parley/config.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("parley").join("config.toml"))
}

/// Load configuration from the default path, environment and defaults
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
/// A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<Config, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

fn load_config_with_env(
    path: Option<PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Config, ConfigError> {
    let mut config = Config::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: ParleyToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut Config, toml: &ParleyToml) {
    if let Some(ref path) = toml.storage.db_path {
        config.db_path = path.clone();
    }

    if let Some(kind) = toml.backend.kind {
        config.backend = kind;
    }
    if toml.backend.model.is_some() {
        config.model = toml.backend.model.clone();
    }
    if let Some(ref host) = toml.backend.ollama_host {
        config.ollama_host = host.clone();
    }
    if let Some(port) = toml.backend.ollama_port {
        config.ollama_port = port;
    }
    if toml.backend.gemini_api_key.is_some() {
        config.gemini_api_key = toml.backend.gemini_api_key.clone();
    }

    if let Some(ref theme) = toml.ui.theme {
        config.theme = theme.clone();
    }
    if let Some(ref title) = toml.ui.default_title {
        config.default_title = title.clone();
    }

    if let Some(ref file) = toml.logging.file {
        config.logging.file = file.clone();
    }
    if let Some(ref filter) = toml.logging.filter {
        config.logging.filter = filter.clone();
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config(config: &mut Config, env: impl Fn(&str) -> Option<String>) {
    if let Some(path) = env("PARLEY_DB") {
        config.db_path = PathBuf::from(path);
        config.source = ConfigSource::Env;
    }
    if let Some(kind) = env("PARLEY_BACKEND") {
        match kind.parse() {
            Ok(kind) => {
                config.backend = kind;
                config.source = ConfigSource::Env;
            }
            Err(e) => tracing::warn!(error = %e, "Ignoring PARLEY_BACKEND"),
        }
    }
    if let Some(model) = env("PARLEY_MODEL") {
        config.model = Some(model);
        config.source = ConfigSource::Env;
    }
    if let Some(host) = env("OLLAMA_HOST") {
        config.ollama_host = host;
        config.source = ConfigSource::Env;
    }
    if let Some(port) = env("OLLAMA_PORT") {
        if let Ok(port) = port.parse::<u16>() {
            config.ollama_port = port;
            config.source = ConfigSource::Env;
        }
    }
    if let Some(key) = env("GEMINI_API_KEY").or_else(|| env("API_KEY")) {
        if !key.is_empty() {
            config.gemini_api_key = Some(key);
            config.source = ConfigSource::Env;
        }
    }
    if let Some(theme) = env("PARLEY_THEME") {
        config.theme = theme;
        config.source = ConfigSource::Env;
    }
    if let Some(filter) = env("PARLEY_LOG") {
        config.logging.filter = filter;
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Database path override
    pub db_path: Option<PathBuf>,
    /// Backend override
    pub backend: Option<BackendKind>,
    /// Model override
    pub model: Option<String>,
    /// Theme override
    pub theme: Option<String>,
    /// Keep conversations in memory only
    pub ephemeral: bool,
    /// Render without escape sequences
    pub plain: bool,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set database path override
    #[must_use]
    pub fn with_db_path(mut self, path: PathBuf) -> Self {
        self.db_path = Some(path);
        self
    }

    /// Set backend override
    #[must_use]
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set model override
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.model = Some(model);
        self
    }

    /// Set theme override
    #[must_use]
    pub fn with_theme(mut self, theme: String) -> Self {
        self.theme = Some(theme);
        self
    }

    /// Use an in-memory store
    #[must_use]
    pub fn with_ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }

    /// Render without escape sequences
    #[must_use]
    pub fn with_plain(mut self, plain: bool) -> Self {
        self.plain = plain;
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut Config) {
        if self.db_path.is_some()
            || self.backend.is_some()
            || self.model.is_some()
            || self.theme.is_some()
            || self.ephemeral
            || self.plain
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref path) = self.db_path {
            config.db_path = path.clone();
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(ref model) = self.model {
            config.model = Some(model.clone());
        }
        if let Some(ref theme) = self.theme {
            config.theme = theme.clone();
        }
        if self.ephemeral {
            config.ephemeral = true;
        }
        if self.plain {
            config.plain = true;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn toml_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    // =========================================================================
    // Default Configuration Tests
    // =========================================================================

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.backend, BackendKind::Ollama);
        assert_eq!(config.model(), "llama3.2");
        assert_eq!(config.ollama_port, 11434);
        assert_eq!(config.theme, "base16-ocean.dark");
        assert_eq!(config.default_title, "Untitled");
        assert_eq!(config.logging.filter, "info");
        assert!(config.db_path.ends_with("parley.db"));
        assert!(config.logging.file.ends_with("parley.log"));
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(p) = default_config_path() {
            assert!(p.to_string_lossy().contains("parley"));
            assert!(p.to_string_lossy().ends_with("config.toml"));
        }
    }

    // =========================================================================
    // TOML Parsing Tests
    // =========================================================================

    #[test]
    fn test_parse_valid_toml() {
        let file = toml_file(
            r#"
[storage]
db_path = "/tmp/chat.db"

[backend]
kind = "gemini"
model = "gemini-pro"
gemini_api_key = "secret"

[ui]
theme = "InspiredGitHub"
default_title = "New chat"

[logging]
file = "/tmp/parley-test.log"
filter = "debug"
"#,
        );

        let config =
            load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();

        assert_eq!(config.db_path, PathBuf::from("/tmp/chat.db"));
        assert_eq!(config.backend, BackendKind::Gemini);
        assert_eq!(config.model(), "gemini-pro");
        assert_eq!(config.gemini_api_key.as_deref(), Some("secret"));
        assert_eq!(config.theme, "InspiredGitHub");
        assert_eq!(config.default_title, "New chat");
        assert_eq!(config.logging.file, PathBuf::from("/tmp/parley-test.log"));
        assert_eq!(config.logging.filter, "debug");
        assert_eq!(config.source(), ConfigSource::File);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml() {
        let file = toml_file(
            r#"
[backend]
ollama_port = 8080
"#,
        );

        let config =
            load_config_with_env(Some(file.path().to_path_buf()), no_env).unwrap();

        assert_eq!(config.ollama_port, 8080);
        assert_eq!(config.ollama_host, "localhost");
        assert_eq!(config.backend, BackendKind::Ollama);
    }

    #[test]
    fn test_missing_file_graceful() {
        let path = PathBuf::from("/nonexistent/path/config.toml");
        let config = load_config_with_env(Some(path), no_env).unwrap();

        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_malformed_toml_error() {
        let file = toml_file(
            r#"
[backend
kind = 3
"#,
        );

        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_unknown_backend_in_file_is_parse_error() {
        let file = toml_file("[backend]\nkind = \"openai\"\n");
        let result = load_config_with_env(Some(file.path().to_path_buf()), no_env);
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    // =========================================================================
    // Priority Ordering Tests
    // =========================================================================

    #[test]
    fn test_env_overrides_file() {
        let file = toml_file(
            r#"
[backend]
model = "file-model"
"#,
        );
        let env: HashMap<&str, &str> = [
            ("PARLEY_MODEL", "env-model"),
            ("PARLEY_BACKEND", "mock"),
            ("OLLAMA_PORT", "not-a-port"),
            ("API_KEY", "fallback-key"),
        ]
        .into_iter()
        .collect();

        let config = load_config_with_env(Some(file.path().to_path_buf()), |k| {
            env.get(k).map(|v| (*v).to_string())
        })
        .unwrap();

        assert_eq!(config.model(), "env-model");
        assert_eq!(config.backend, BackendKind::Mock);
        assert_eq!(config.ollama_port, 11434);
        assert_eq!(config.gemini_api_key.as_deref(), Some("fallback-key"));
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_cli_overrides_env() {
        let mut config = Config::default();
        config.model = Some("env-model".to_string());
        config.set_source(ConfigSource::Env);

        ConfigOverrides::new()
            .with_model("cli-model".to_string())
            .with_backend(BackendKind::Mock)
            .with_ephemeral(true)
            .apply(&mut config);

        assert_eq!(config.model(), "cli-model");
        assert_eq!(config.backend, BackendKind::Mock);
        assert!(config.ephemeral);
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_config_overrides_empty_no_change() {
        let mut config = Config::default();
        let original_source = config.source();

        ConfigOverrides::new().apply(&mut config);

        assert_eq!(config.source(), original_source);
        assert!(!config.plain);
    }

    // =========================================================================
    // Validation Tests
    // =========================================================================

    #[test]
    fn test_gemini_without_key_fails_validation() {
        let mut config = Config::default();
        config.backend = BackendKind::Gemini;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
        assert_eq!(config.model(), "gemini-1.5-flash");
    }

    #[test]
    fn test_blank_title_fails_validation() {
        let mut config = Config::default();
        config.default_title = "   ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_source_display() {
        assert_eq!(format!("{}", ConfigSource::Cli), "CLI");
        assert_eq!(format!("{}", ConfigSource::Env), "environment");
        assert_eq!(format!("{}", ConfigSource::File), "config file");
        assert_eq!(format!("{}", ConfigSource::Default), "default");
    }

    #[test]
    fn test_config_error_display() {
        let read_err = ConfigError::ReadError {
            path: PathBuf::from("/test/path"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        let msg = format!("{}", read_err);
        assert!(msg.contains("/test/path"));
        assert!(msg.contains("Failed to read"));
    }
}
