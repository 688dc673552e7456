//! Provider and model configuration definitions

use serde::{Deserialize, Serialize};

/// Supported LLM providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAI,
    Groq,
    Gemini,
    Grok,
}

impl Provider {
    /// All providers, in registry load order
    pub const ALL: [Provider; 4] = [Self::OpenAI, Self::Groq, Self::Gemini, Self::Grok];

    /// Lowercase identifier used in registry keys and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Groq => "groq",
            Self::Gemini => "gemini",
            Self::Grok => "grok",
        }
    }

    /// Prefix of the environment variables configuring this provider
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI",
            Self::Groq => "GROQ",
            Self::Gemini => "GEMINI",
            Self::Grok => "GROK",
        }
    }

    /// Public API endpoint used when no base URL override is configured
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAI => "https://api.openai.com/v1",
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Self::Grok => "https://api.x.ai/v1",
        }
    }

    /// Models enabled when `<PROVIDER>_MODELS` is not set
    pub fn default_models(&self) -> &'static [&'static str] {
        match self {
            Self::OpenAI => &["gpt-4o-mini", "gpt-4o"],
            Self::Groq => &["llama-3.1-8b-instant", "llama-3.3-70b-versatile"],
            Self::Gemini => &["gemini-1.5-flash", "gemini-1.5-pro"],
            Self::Grok => &["grok-2"],
        }
    }

    /// Built-in pricing and rating table for this provider
    pub fn catalog(&self) -> &'static [CatalogEntry] {
        match self {
            Self::OpenAI => OPENAI_CATALOG,
            Self::Groq => GROQ_CATALOG,
            Self::Gemini => GEMINI_CATALOG,
            Self::Grok => GROK_CATALOG,
        }
    }

    /// Look up a model in the built-in catalog
    pub fn catalog_entry(&self, model: &str) -> Option<&'static CatalogEntry> {
        self.catalog().iter().find(|entry| entry.model == model)
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "groq" => Ok(Self::Groq),
            "gemini" | "google" => Ok(Self::Gemini),
            "grok" | "xai" => Ok(Self::Grok),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// Cost and rating data for a known model.
///
/// Costs are USD per 1000 tokens; ratings run from 1 (worst) to 10 (best).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogEntry {
    pub model: &'static str,
    pub cost_per_1k_input: f64,
    pub cost_per_1k_output: f64,
    pub speed: u8,
    pub quality: u8,
}

const fn entry(model: &'static str, input: f64, output: f64, speed: u8, quality: u8) -> CatalogEntry {
    CatalogEntry {
        model,
        cost_per_1k_input: input,
        cost_per_1k_output: output,
        speed,
        quality,
    }
}

static OPENAI_CATALOG: &[CatalogEntry] = &[
    entry("gpt-4o-mini", 0.000_15, 0.000_6, 9, 8),
    entry("gpt-4o", 0.002_5, 0.01, 7, 9),
    entry("gpt-4-turbo", 0.01, 0.03, 6, 9),
    entry("gpt-3.5-turbo", 0.000_5, 0.001_5, 9, 6),
];

static GROQ_CATALOG: &[CatalogEntry] = &[
    entry("llama-3.1-8b-instant", 0.000_05, 0.000_08, 10, 6),
    entry("llama-3.3-70b-versatile", 0.000_59, 0.000_79, 9, 8),
    entry("mixtral-8x7b-32768", 0.000_24, 0.000_24, 9, 7),
];

static GEMINI_CATALOG: &[CatalogEntry] = &[
    entry("gemini-1.5-flash", 0.000_075, 0.000_3, 9, 7),
    entry("gemini-1.5-pro", 0.001_25, 0.005, 6, 9),
    entry("gemini-2.0-flash", 0.000_1, 0.000_4, 9, 8),
];

static GROK_CATALOG: &[CatalogEntry] = &[
    entry("grok-2", 0.002, 0.01, 7, 8),
    entry("grok-beta", 0.005, 0.015, 7, 8),
];

/// Configuration for one registered (provider, model) pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider this model belongs to
    pub provider: Provider,
    /// Provider-side model name
    pub model_name: String,
    /// Credential used to call the provider
    #[serde(skip_serializing, default)]
    pub api_key: String,
    /// Base URL override
    pub base_url: Option<String>,
    /// Default sampling temperature
    pub temperature: f32,
    /// Default completion budget
    pub max_tokens: u32,
    /// USD per 1000 input tokens
    pub cost_per_1k_input: f64,
    /// USD per 1000 output tokens
    pub cost_per_1k_output: f64,
    /// Speed rating (1-10)
    pub speed_rating: u8,
    /// Quality rating (1-10)
    pub quality_rating: u8,
    /// Whether the selector may pick this model
    pub enabled: bool,
    /// OpenAI organization id
    pub organization: Option<String>,
    /// OpenAI project id
    pub project: Option<String>,
}

impl ModelConfig {
    /// Create a model with neutral ratings and zero cost
    pub fn new(provider: Provider, model_name: impl Into<String>) -> Self {
        Self {
            provider,
            model_name: model_name.into(),
            api_key: String::new(),
            base_url: None,
            temperature: 0.7,
            max_tokens: 1000,
            cost_per_1k_input: 0.0,
            cost_per_1k_output: 0.0,
            speed_rating: 5,
            quality_rating: 5,
            enabled: true,
            organization: None,
            project: None,
        }
    }

    /// Create a model from its built-in catalog entry
    pub fn from_catalog(provider: Provider, entry: &CatalogEntry) -> Self {
        Self::new(provider, entry.model)
            .with_costs(entry.cost_per_1k_input, entry.cost_per_1k_output)
            .with_ratings(entry.speed, entry.quality)
    }

    pub fn with_costs(mut self, input: f64, output: f64) -> Self {
        self.cost_per_1k_input = input;
        self.cost_per_1k_output = output;
        self
    }

    pub fn with_ratings(mut self, speed: u8, quality: u8) -> Self {
        self.speed_rating = speed;
        self.quality_rating = quality;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Synthetic registry key (`provider_modelname`)
    pub fn key(&self) -> String {
        registry_key(self.provider, &self.model_name)
    }

    /// Effective base URL without a trailing slash
    pub fn endpoint_base(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
            .trim_end_matches('/')
    }

    /// Cost of a call with the given token counts
    pub fn cost_for(&self, input_tokens: u32, output_tokens: u32) -> f64 {
        (input_tokens as f64 / 1000.0) * self.cost_per_1k_input
            + (output_tokens as f64 / 1000.0) * self.cost_per_1k_output
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.model_name.is_empty() {
            return Err("model_name cannot be empty".to_string());
        }
        if !(1..=10).contains(&self.speed_rating) || !(1..=10).contains(&self.quality_rating) {
            return Err("ratings must be between 1 and 10".to_string());
        }
        if self.cost_per_1k_input < 0.0 || self.cost_per_1k_output < 0.0 {
            return Err("costs cannot be negative".to_string());
        }
        Ok(())
    }
}

/// Build the registry key for a provider and model name
pub fn registry_key(provider: Provider, model_name: &str) -> String {
    format!("{}_{}", provider, model_name)
}
