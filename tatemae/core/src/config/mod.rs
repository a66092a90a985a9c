//! TOML Configuration File Support
//!
//! Configuration for the translator, from a TOML file at
//! `~/.config/tatemae/translator.toml`, the environment, and CLI overrides.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! Credentials are only ever read from the environment.
//!
//! # Example Configuration
//!
//! ```toml
//! [provider]
//! kind = "auto"            # auto | deepseek | openai | fallback
//! model = "deepseek-chat"
//! temperature = 0.7
//! timeout_secs = 30
//!
//! [deepseek]
//! base_url = "https://api.deepseek.com"
//!
//! [openai]
//! base_url = "https://api.openai.com/v1"
//! model = "gpt-4"
//!
//! [retry]
//! max_attempts = 3
//! initial_backoff_ms = 2000
//! max_backoff_ms = 10000
//!
//! [lexicon]
//! path = "/etc/tatemae/lexicon.toml"
//!
//! [logging]
//! level = "info"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::provider::{ProviderKind, ProviderSettings, RemoteConfig, RemoteService, RetryConfig};

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

/// Provider section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderToml {
    /// Backend selection
    pub kind: Option<ProviderKind>,

    /// Model for the DeepSeek service
    pub model: Option<String>,

    /// Sampling temperature for classification
    pub temperature: Option<f32>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Per-service section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceToml {
    /// Endpoint root
    pub base_url: Option<String>,

    /// Model identifier
    pub model: Option<String>,
}

/// Retry section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryToml {
    /// Total attempts per call
    pub max_attempts: Option<u32>,

    /// Initial backoff delay in milliseconds
    pub initial_backoff_ms: Option<u64>,

    /// Maximum backoff delay in milliseconds
    pub max_backoff_ms: Option<u64>,
}

/// Lexicon section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LexiconToml {
    /// Replacement lexicon file
    pub path: Option<PathBuf>,
}

/// Logging section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingToml {
    /// Log filter (e.g. "info", "tatemae_core=debug")
    pub level: Option<String>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorToml {
    /// Provider configuration section
    pub provider: ProviderToml,

    /// DeepSeek configuration section
    pub deepseek: ServiceToml,

    /// OpenAI configuration section
    pub openai: ServiceToml,

    /// Retry configuration section
    pub retry: RetryToml,

    /// Lexicon configuration section
    pub lexicon: LexiconToml,

    /// Logging configuration section
    pub logging: LoggingToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Centralized configuration for the translator
///
/// Use [`load_config`] to load configuration with proper priority handling.
#[derive(Clone)]
pub struct TranslatorConfig {
    /// Backend selection
    pub provider_kind: ProviderKind,

    /// DeepSeek credential (environment only)
    pub deepseek_api_key: Option<String>,

    /// DeepSeek endpoint root
    pub deepseek_base_url: String,

    /// DeepSeek model
    pub deepseek_model: String,

    /// OpenAI credential (environment only)
    pub openai_api_key: Option<String>,

    /// OpenAI endpoint root
    pub openai_base_url: String,

    /// OpenAI model
    pub openai_model: String,

    /// Sampling temperature for classification
    pub temperature: f32,

    /// Request timeout
    pub timeout: Duration,

    /// Retry policy for remote calls
    pub retry: RetryConfig,

    /// Replacement lexicon file
    pub lexicon_path: Option<PathBuf>,

    /// Log filter
    pub log_level: String,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,

    /// Environment values that were present but could not be used
    ignored: Vec<String>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            provider_kind: ProviderKind::Auto,
            deepseek_api_key: None,
            deepseek_base_url: RemoteService::DeepSeek.default_base_url().to_string(),
            deepseek_model: RemoteService::DeepSeek.default_model().to_string(),
            openai_api_key: None,
            openai_base_url: RemoteService::OpenAi.default_base_url().to_string(),
            openai_model: RemoteService::OpenAi.default_model().to_string(),
            temperature: 0.7,
            timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            lexicon_path: None,
            log_level: "info".to_string(),
            config_file_path: None,
            source: ConfigSource::Default,
            ignored: Vec::new(),
        }
    }
}

impl std::fmt::Debug for TranslatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "<redacted>");
        f.debug_struct("TranslatorConfig")
            .field("provider_kind", &self.provider_kind)
            .field("deepseek_api_key", &redact(&self.deepseek_api_key))
            .field("deepseek_base_url", &self.deepseek_base_url)
            .field("deepseek_model", &self.deepseek_model)
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("lexicon_path", &self.lexicon_path)
            .field("log_level", &self.log_level)
            .field("config_file_path", &self.config_file_path)
            .field("source", &self.source)
            .field("ignored", &self.ignored)
            .finish()
    }
}

impl TranslatorConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
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

    /// Environment values skipped while loading, as `NAME: reason`
    ///
    /// Loading usually happens before a log subscriber exists, so callers
    /// report these once logging is up.
    #[must_use]
    pub fn ignored_values(&self) -> &[String] {
        &self.ignored
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(format!(
                "temperature must be within [0.0, 2.0], got {}",
                self.temperature
            )));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "timeout must be greater than zero".to_string(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return Err(ConfigError::ValidationError(format!(
                "retry.initial_backoff_ms ({}) exceeds retry.max_backoff_ms ({})",
                self.retry.initial_backoff_ms, self.retry.max_backoff_ms
            )));
        }
        Ok(())
    }

    /// Settings for provider selection
    #[must_use]
    pub fn provider_settings(&self) -> ProviderSettings {
        let remote = |service: RemoteService, key: &Option<String>, base_url: &str, model: &str| {
            let mut config = RemoteConfig::new(service)
                .with_base_url(base_url)
                .with_model(model);
            config.api_key = key.clone();
            config
        };

        ProviderSettings {
            kind: self.provider_kind,
            deepseek: remote(
                RemoteService::DeepSeek,
                &self.deepseek_api_key,
                &self.deepseek_base_url,
                &self.deepseek_model,
            ),
            openai: remote(
                RemoteService::OpenAi,
                &self.openai_api_key,
                &self.openai_base_url,
                &self.openai_model,
            ),
        }
        .with_shared(self.temperature, self.timeout, &self.retry)
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/tatemae/translator.toml` or
/// `~/.config/tatemae/translator.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tatemae").join("translator.toml"))
}

/// Load configuration from all sources with proper priority
///
/// CLI overrides are not handled here; apply [`ConfigOverrides`] afterwards.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if
/// the merged values fail validation. A missing config file is not an error.
pub fn load_config() -> Result<TranslatorConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path and the process environment
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<TranslatorConfig, ConfigError> {
    load_config_with_env(path, |name| std::env::var(name).ok())
}

/// Load configuration with a custom environment lookup
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<TranslatorConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // Start with defaults
    let mut config = TranslatorConfig::default();

    // Try to load from file
    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_config = read_toml(config_path)?;
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

    // Apply environment variables (overrides file values)
    apply_env_config(&mut config, env);

    config.validate()?;
    Ok(config)
}

fn read_toml(path: &Path) -> Result<TranslatorToml, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut TranslatorConfig, toml: &TranslatorToml) {
    // Provider settings
    if let Some(kind) = toml.provider.kind {
        config.provider_kind = kind;
    }
    if let Some(ref model) = toml.provider.model {
        config.deepseek_model = model.clone();
    }
    if let Some(temperature) = toml.provider.temperature {
        config.temperature = temperature;
    }
    if let Some(secs) = toml.provider.timeout_secs {
        config.timeout = Duration::from_secs(secs);
    }

    // Service settings
    if let Some(ref url) = toml.deepseek.base_url {
        config.deepseek_base_url = url.clone();
    }
    if let Some(ref model) = toml.deepseek.model {
        config.deepseek_model = model.clone();
    }
    if let Some(ref url) = toml.openai.base_url {
        config.openai_base_url = url.clone();
    }
    if let Some(ref model) = toml.openai.model {
        config.openai_model = model.clone();
    }

    // Retry settings
    if let Some(attempts) = toml.retry.max_attempts {
        config.retry.max_attempts = attempts;
    }
    if let Some(ms) = toml.retry.initial_backoff_ms {
        config.retry.initial_backoff_ms = ms;
    }
    if let Some(ms) = toml.retry.max_backoff_ms {
        config.retry.max_backoff_ms = ms;
    }

    if toml.lexicon.path.is_some() {
        config.lexicon_path = toml.lexicon.path.clone();
    }
    if let Some(ref level) = toml.logging.level {
        config.log_level = level.clone();
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut TranslatorConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| env(name).filter(|v| !v.trim().is_empty());

    if let Some(kind) = var("MODEL_PROVIDER") {
        match kind.parse::<ProviderKind>() {
            Ok(kind) => {
                config.provider_kind = kind;
                config.source = ConfigSource::Env;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring MODEL_PROVIDER");
                config.ignored.push(format!("MODEL_PROVIDER: {e}"));
            }
        }
    }

    // Credentials
    if let Some(key) = var("DEEPSEEK_API_KEY_CHAT") {
        config.deepseek_api_key = Some(key);
    }
    if let Some(key) = var("OPENAI_API_KEY") {
        config.openai_api_key = Some(key);
    }

    // Endpoints and models
    if let Some(url) = var("DEEPSEEK_BASE_URL") {
        config.deepseek_base_url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(model) = var("DEFAULT_MODEL") {
        config.deepseek_model = model;
        config.source = ConfigSource::Env;
    }
    if let Some(url) = var("OPENAI_BASE_URL") {
        config.openai_base_url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(model) = var("OPENAI_MODEL") {
        config.openai_model = model;
        config.source = ConfigSource::Env;
    }

    if let Some(temperature) = var("TEMPERATURE") {
        match temperature.trim().parse::<f32>() {
            Ok(t) => {
                config.temperature = t;
                config.source = ConfigSource::Env;
            }
            Err(_) => {
                tracing::warn!(value = %temperature, "Ignoring unparsable TEMPERATURE");
                config
                    .ignored
                    .push(format!("TEMPERATURE: not a number '{temperature}'"));
            }
        }
    }
    if let Some(level) = var("LOG_LEVEL") {
        config.log_level = level.to_lowercase();
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
    /// Provider selection override
    pub provider_kind: Option<ProviderKind>,

    /// Log level override
    pub log_level: Option<String>,

    /// Lexicon file override
    pub lexicon_path: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set provider selection override
    #[must_use]
    pub fn with_provider_kind(mut self, kind: ProviderKind) -> Self {
        self.provider_kind = Some(kind);
        self
    }

    /// Set log level override
    #[must_use]
    pub fn with_log_level(mut self, level: String) -> Self {
        self.log_level = Some(level);
        self
    }

    /// Set lexicon file override
    #[must_use]
    pub fn with_lexicon_path(mut self, path: PathBuf) -> Self {
        self.lexicon_path = Some(path);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut TranslatorConfig) {
        if self.provider_kind.is_some() || self.log_level.is_some() || self.lexicon_path.is_some() {
            config.source = ConfigSource::Cli;
        }

        if let Some(kind) = self.provider_kind {
            config.provider_kind = kind;
        }

        if let Some(ref level) = self.log_level {
            config.log_level = level.clone();
        }

        if let Some(ref path) = self.lexicon_path {
            config.lexicon_path = Some(path.clone());
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
