//! Generation request builder

use serde::{Deserialize, Serialize};

/// A caller's generation request
///
/// # Example
///
/// ```rust
/// use model_integrator::GenerationRequest;
///
/// let request = GenerationRequest::new("¿Cuánto sale el isopanel de 100mm?")
///     .system("Sos el asistente de cotizaciones de BMC")
///     .temperature(0.3)
///     .max_tokens(400)
///     .client_request_id("quote-2024-0117");
///
/// assert_eq!(request.max_tokens, Some(400));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    /// Registry key (`provider_model`); `None` lets the selector choose
    pub model_id: Option<String>,
    /// Overrides the model's default temperature
    pub temperature: Option<f32>,
    /// Overrides the model's default completion budget
    pub max_tokens: Option<u32>,
    /// Caller correlation id
    pub client_request_id: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    /// Pin a registry key instead of using the selector
    pub fn model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn client_request_id(mut self, id: impl Into<String>) -> Self {
        self.client_request_id = Some(id.into());
        self
    }
}
