//! Google Gemini `generateContent` adapter

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{status_error, transport_error, AdapterKind, AdapterRequest, AdapterResponse, ProviderAdapter, CLIENT_REQUEST_ID_HEADER};
use crate::config::ModelConfig;
use crate::error::{IntegratorError, IntegratorResult};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiRequest<'a> {
    pub contents: Vec<GeminiContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiContent<'a>>,
    pub generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
pub(crate) struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'static str>,
    pub parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GeminiPart<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiGenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl<'a> GeminiRequest<'a> {
    pub fn from_adapter_request(request: &'a AdapterRequest) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: Some("user"),
                parts: vec![GeminiPart { text: &request.prompt }],
            }],
            system_instruction: request.system_prompt.as_deref().map(|text| GeminiContent {
                role: None,
                parts: vec![GeminiPart { text }],
            }),
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    pub usage_metadata: Option<GeminiUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiCandidate {
    pub content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiCandidateContent {
    #[serde(default)]
    pub parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiCandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GeminiUsage {
    pub prompt_token_count: Option<u32>,
    pub candidates_token_count: Option<u32>,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        Some(text)
    }

    /// Reported usage; `None` unless both counts are present
    pub fn usage(&self) -> Option<(u32, u32)> {
        let usage = self.usage_metadata.as_ref()?;
        Some((usage.prompt_token_count?, usage.candidates_token_count?))
    }
}

#[derive(Debug, Clone)]
pub struct GeminiAdapter {
    client: reqwest::Client,
}

impl GeminiAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Gemini
    }

    async fn call(&self, model: &ModelConfig, request: &AdapterRequest) -> IntegratorResult<AdapterResponse> {
        let provider = model.provider;
        let url = format!(
            "{}/models/{}:generateContent",
            model.endpoint_base(),
            request.model_name
        );
        let body = GeminiRequest::from_adapter_request(request);

        let mut req = self
            .client
            .post(&url)
            .header("x-goog-api-key", &model.api_key)
            .json(&body);
        if let Some(client_id) = &request.client_request_id {
            req = req.header(CLIENT_REQUEST_ID_HEADER, client_id);
        }

        debug!(provider = %provider, model = %request.model_name, "Calling generateContent");

        let response = req.send().await.map_err(|e| transport_error(provider, e))?;
        if !response.status().is_success() {
            return Err(status_error(provider, response).await);
        }

        let headers = response.headers().clone();
        let parsed: GeminiResponse = response.json().await.map_err(|e| {
            IntegratorError::provider(provider, format!("invalid response body: {}", e))
        })?;

        let text = parsed
            .text()
            .ok_or_else(|| IntegratorError::provider(provider, "response contained no candidates"))?;

        Ok(AdapterResponse::from_usage(text, parsed.usage(), request, headers))
    }
}
