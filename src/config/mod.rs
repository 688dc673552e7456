//! Configuration module for the model integrator
//!
//! Provides layered configuration with support for:
//! - YAML/TOML/JSON config files
//! - Environment variable overrides (`OPENAI_API_KEY`, `GROQ_MODELS`, ...)
//! - Validation

mod models;

pub use models::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{IntegratorError, IntegratorResult};
use crate::registry::Strategy;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorConfig {
    /// Per-provider credentials and model lists
    pub providers: ProvidersConfig,
    /// Selection strategy used when no model is requested explicitly
    pub strategy: Strategy,
    /// Default generation parameters
    pub defaults: GenerationDefaults,
    /// Request tracker settings
    pub tracker: TrackerConfig,
    /// HTTP transport settings
    pub http: HttpConfig,
    /// Usage statistics file (read at startup, written on request)
    pub usage_file: Option<PathBuf>,
    /// Telemetry settings
    pub telemetry: TelemetryConfig,
}

impl IntegratorConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> IntegratorResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| IntegratorError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .map_err(|e| IntegratorError::Config(format!("YAML parse error: {}", e)))?,
            Some("toml") => toml::from_str(&content)
                .map_err(|e| IntegratorError::Config(format!("TOML parse error: {}", e)))?,
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| IntegratorError::Config(format!("JSON parse error: {}", e)))?,
            _ => return Err(IntegratorError::Config(
                "Unsupported config file format. Use .yaml, .toml, or .json".to_string()
            )),
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the process environment
    pub fn from_env() -> IntegratorResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key/value lookup
    pub fn from_lookup<F>(lookup: F) -> IntegratorResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_lookup(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Load a config file layered under environment overrides.
    ///
    /// A missing or malformed file is logged and ignored.
    pub fn load(path: Option<&Path>) -> IntegratorResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Ignoring config file, using defaults");
                Self::default()
            }),
            None => Self::default(),
        };

        config.apply_lookup(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply environment-style overrides.
    ///
    /// Unparseable values are logged and skipped.
    pub fn apply_lookup<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        for provider in Provider::ALL {
            let prefix = provider.env_prefix();
            let settings = self.providers.get_mut(provider);

            if let Some(key) = non_empty(&format!("{}_API_KEY", prefix)) {
                settings.api_key = Some(key);
            }
            if let Some(models) = non_empty(&format!("{}_MODELS", prefix)) {
                settings.models = parse_model_list(&models);
            }
            if let Some(url) = non_empty(&format!("{}_BASE_URL", prefix)) {
                settings.base_url = Some(url);
            }
        }

        let openai = self.providers.get_mut(Provider::OpenAI);
        if let Some(org) = non_empty("OPENAI_ORGANIZATION").or_else(|| non_empty("OPENAI_ORG_ID")) {
            openai.organization = Some(org);
        }
        if let Some(project) = non_empty("OPENAI_PROJECT").or_else(|| non_empty("OPENAI_PROJECT_ID")) {
            openai.project = Some(project);
        }

        if let Some(strategy) = non_empty("MODEL_STRATEGY") {
            match strategy.parse() {
                Ok(strategy) => self.strategy = strategy,
                Err(e) => warn!(error = %e, "Ignoring MODEL_STRATEGY, keeping {}", self.strategy),
            }
        }

        if let Some(path) = non_empty("MODEL_INTEGRATOR_USAGE_FILE") {
            self.usage_file = Some(PathBuf::from(path));
        }

        if let Some(val) = non_empty("MODEL_INTEGRATOR_TIMEOUT_SECS") {
            match val.parse() {
                Ok(secs) => self.http.request_timeout_secs = secs,
                Err(_) => warn!(value = %val, "Ignoring invalid MODEL_INTEGRATOR_TIMEOUT_SECS"),
            }
        }

        if let Some(val) = non_empty("MODEL_INTEGRATOR_TRACKER_CAPACITY") {
            match val.parse() {
                Ok(cap) => self.tracker.max_stored = cap,
                Err(_) => warn!(value = %val, "Ignoring invalid MODEL_INTEGRATOR_TRACKER_CAPACITY"),
            }
        }

        if let Some(level) = non_empty("MODEL_INTEGRATOR_LOG_LEVEL") {
            self.telemetry.log_level = level;
        }

        if let Some(val) = non_empty("MODEL_INTEGRATOR_JSON_LOGS") {
            match parse_flag(&val) {
                Some(flag) => self.telemetry.json_logs = flag,
                None => warn!(value = %val, "Ignoring invalid MODEL_INTEGRATOR_JSON_LOGS"),
            }
        }

        if let Some(path) = non_empty("MODEL_INTEGRATOR_LOG_FILE") {
            self.telemetry.log_file = Some(PathBuf::from(path));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> IntegratorResult<()> {
        self.defaults.validate()?;

        if self.tracker.max_stored == 0 {
            return Err(IntegratorError::Config(
                "tracker.max_stored must be greater than 0".to_string(),
            ));
        }
        if self.http.request_timeout_secs == 0 {
            return Err(IntegratorError::Config(
                "http.request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        for provider in Provider::ALL {
            if let Some(base) = &self.providers.get(provider).base_url {
                let url = url::Url::parse(base).map_err(|e| {
                    IntegratorError::Config(format!("Invalid {} base URL '{}': {}", provider, base, e))
                })?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(IntegratorError::Config(format!(
                        "{} base URL must use http or https",
                        provider
                    )));
                }
            }
        }

        Ok(())
    }

    /// Providers that have a credential configured
    pub fn configured_providers(&self) -> Vec<Provider> {
        Provider::ALL
            .into_iter()
            .filter(|p| self.providers.get(*p).api_key.is_some())
            .collect()
    }
}

fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
        .collect()
}

/// Credentials and model list for every provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openai: ProviderSettings,
    pub groq: ProviderSettings,
    pub gemini: ProviderSettings,
    pub grok: ProviderSettings,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openai: ProviderSettings::with_defaults(Provider::OpenAI),
            groq: ProviderSettings::with_defaults(Provider::Groq),
            gemini: ProviderSettings::with_defaults(Provider::Gemini),
            grok: ProviderSettings::with_defaults(Provider::Grok),
        }
    }
}

impl ProvidersConfig {
    pub fn get(&self, provider: Provider) -> &ProviderSettings {
        match provider {
            Provider::OpenAI => &self.openai,
            Provider::Groq => &self.groq,
            Provider::Gemini => &self.gemini,
            Provider::Grok => &self.grok,
        }
    }

    pub fn get_mut(&mut self, provider: Provider) -> &mut ProviderSettings {
        match provider {
            Provider::OpenAI => &mut self.openai,
            Provider::Groq => &mut self.groq,
            Provider::Gemini => &mut self.gemini,
            Provider::Grok => &mut self.grok,
        }
    }
}

/// Settings for a single provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// API key; the provider is skipped when absent
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Model names to register (intersected with the built-in catalog)
    pub models: Vec<String>,
    /// Base URL override
    pub base_url: Option<String>,
    /// Organization id (OpenAI-compatible only)
    pub organization: Option<String>,
    /// Project id (OpenAI-compatible only)
    pub project: Option<String>,
}

impl ProviderSettings {
    fn with_defaults(provider: Provider) -> Self {
        Self {
            models: provider.default_models().iter().map(|m| m.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Shorthand used by tests and embedding hosts
    pub fn with_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

/// Default generation parameters applied to every registered model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationDefaults {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationDefaults {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

impl GenerationDefaults {
    pub fn validate(&self) -> IntegratorResult<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(IntegratorError::Config(
                "defaults.temperature must be between 0.0 and 2.0".to_string(),
            ));
        }
        if self.max_tokens == 0 {
            return Err(IntegratorError::Config(
                "defaults.max_tokens must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Request tracker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Maximum number of stored request records
    pub max_stored: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self { max_stored: 1000 }
    }
}

/// HTTP transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 60,
            connect_timeout_secs: 10,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Enable telemetry
    pub enabled: bool,
    /// Log level
    pub log_level: String,
    /// Enable JSON logging
    pub json_logs: bool,
    /// Write logs to this file instead of stderr
    pub log_file: Option<PathBuf>,
    /// Service name for tracing
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_level: "info".to_string(),
            json_logs: false,
            log_file: None,
            service_name: "model-integrator".to_string(),
        }
    }
}

/// Boolean env values: true/false, 1/0, yes/no, on/off
fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
