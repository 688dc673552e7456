//! Generation results and reporting types

use serde::{Deserialize, Serialize};

use crate::config::{ModelConfig, Provider};
use crate::error::IntegratorError;
use crate::ratelimit::ProviderRateLimits;

/// Outcome of `UnifiedIntegrator::generate`; never a partial result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub success: bool,
    pub text: Option<String>,
    /// Provider-side model name
    pub model: Option<String>,
    /// Registry key of the model that produced this result
    pub model_key: Option<String>,
    pub provider: Option<Provider>,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
    /// Token counts are a chars/4 approximation
    pub tokens_estimated: bool,
    /// USD
    pub cost: f64,
    /// Seconds
    pub response_time: f64,
    pub request_id: Option<String>,
    pub client_request_id: Option<String>,
    pub provider_request_id: Option<String>,
    pub rate_limits: Option<ProviderRateLimits>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rate_limit_warnings: Vec<String>,
    pub error: Option<String>,
    pub error_type: Option<String>,
    /// Key of the model whose failure triggered the fallback
    pub fallback_from: Option<String>,
}

impl GenerationResult {
    /// Failure result carrying only the error
    pub fn failure(error: &IntegratorError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            error_type: Some(error.error_type().to_string()),
            ..Default::default()
        }
    }

    /// Generated text, empty on failure
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback_from.is_some()
    }
}

/// Item yielded by `UnifiedIntegrator::generate_stream`
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Slice of the completed text
    Chunk(String),
    /// Final result, always the last event
    Done(Box<GenerationResult>),
}

/// Registry entry as reported by `available_models`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub key: String,
    pub provider: Provider,
    pub model_name: String,
    pub enabled: bool,
    pub cost_per_1k_input: f64,
    pub cost_per_1k_output: f64,
    pub speed_rating: u8,
    pub quality_rating: u8,
    /// Score under the integrator's strategy
    pub score: f64,
}

impl ModelInfo {
    pub fn new(key: &str, model: &ModelConfig, score: f64) -> Self {
        Self {
            key: key.to_string(),
            provider: model.provider,
            model_name: model.model_name.clone(),
            enabled: model.enabled,
            cost_per_1k_input: model.cost_per_1k_input,
            cost_per_1k_output: model.cost_per_1k_output,
            speed_rating: model.speed_rating,
            quality_rating: model.quality_rating,
            score,
        }
    }
}

/// Split text into chunks of at most `chunk_chars` characters
pub fn chunk_text(text: &str, chunk_chars: usize) -> Vec<String> {
    let size = chunk_chars.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}
