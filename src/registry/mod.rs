//! Provider model registry
//!
//! An ordered catalog of `provider_model` keys to [`ModelConfig`], built once
//! from configuration and read-only afterwards. Insertion order is preserved
//! so that selection ties resolve deterministically.

mod selector;

pub use selector::*;

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::config::{IntegratorConfig, ModelConfig, Provider};

/// Read-only registry of model configurations
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelConfig>,
}

impl ModelRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from configuration.
    ///
    /// Providers without an API key contribute nothing. Requested model names
    /// that are not in the built-in catalog are dropped.
    pub fn load(config: &IntegratorConfig) -> Self {
        let mut registry = Self::new();

        for provider in Provider::ALL {
            let settings = config.providers.get(provider);
            let Some(api_key) = settings.api_key.as_deref() else {
                debug!(provider = %provider, "No API key configured, skipping provider");
                continue;
            };

            let requested: Vec<&str> = if settings.models.is_empty() {
                provider.default_models().to_vec()
            } else {
                settings.models.iter().map(String::as_str).collect()
            };

            for name in requested {
                let Some(entry) = provider.catalog_entry(name) else {
                    debug!(provider = %provider, model = %name, "Unknown model, not registered");
                    continue;
                };

                let mut model = ModelConfig::from_catalog(provider, entry).with_api_key(api_key);
                model.base_url = settings.base_url.clone();
                model.organization = settings.organization.clone();
                model.project = settings.project.clone();
                model.temperature = config.defaults.temperature;
                model.max_tokens = config.defaults.max_tokens;

                registry.insert(model);
            }
        }

        info!(
            models = registry.len(),
            keys = ?registry.keys().collect::<Vec<_>>(),
            "Model registry loaded"
        );
        registry
    }

    /// Build a registry from explicit configurations, keeping their order.
    ///
    /// Entries failing [`ModelConfig::validate`] are skipped with a warning.
    pub fn from_models<I>(models: I) -> Self
    where
        I: IntoIterator<Item = ModelConfig>,
    {
        let mut registry = Self::new();
        for model in models {
            match model.validate() {
                Ok(()) => registry.insert(model),
                Err(reason) => warn!(model = %model.key(), %reason, "Skipping invalid model configuration"),
            }
        }
        registry
    }

    fn insert(&mut self, model: ModelConfig) {
        self.models.insert(model.key(), model);
    }

    /// Look up a model by registry key
    pub fn get(&self, key: &str) -> Option<&ModelConfig> {
        self.models.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.models.contains_key(key)
    }

    /// Registry keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// All entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModelConfig)> {
        self.models.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Entries the selector may pick
    pub fn enabled(&self) -> impl Iterator<Item = (&str, &ModelConfig)> {
        self.iter().filter(|(_, model)| model.enabled)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
