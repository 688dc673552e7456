//! OpenAI-compatible chat completions adapter (OpenAI, Grok)

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{status_error, transport_error, AdapterKind, AdapterRequest, AdapterResponse, ProviderAdapter, CLIENT_REQUEST_ID_HEADER};
use crate::config::ModelConfig;
use crate::error::{IntegratorError, IntegratorResult};

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl<'a> ChatRequest<'a> {
    pub fn from_adapter_request(request: &'a AdapterRequest) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system_prompt.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        Self {
            model: &request.model_name,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    pub usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Adapter for any OpenAI chat-completions compatible endpoint
#[derive(Debug, Clone)]
pub struct OpenAICompatibleAdapter {
    client: reqwest::Client,
    /// Send `OpenAI-Organization` / `OpenAI-Project` headers when configured
    send_org_headers: bool,
}

impl OpenAICompatibleAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            send_org_headers: true,
        }
    }

    /// Variant that never sends organization headers (Groq)
    pub(crate) fn without_org_headers(client: reqwest::Client) -> Self {
        Self {
            client,
            send_org_headers: false,
        }
    }
}

#[async_trait]
impl ProviderAdapter for OpenAICompatibleAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::OpenAICompatible
    }

    async fn call(&self, model: &ModelConfig, request: &AdapterRequest) -> IntegratorResult<AdapterResponse> {
        let provider = model.provider;
        let url = format!("{}/chat/completions", model.endpoint_base());
        let body = ChatRequest::from_adapter_request(request);

        let mut req = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", model.api_key))
            .json(&body);

        if self.send_org_headers {
            if let Some(org) = &model.organization {
                req = req.header("OpenAI-Organization", org);
            }
            if let Some(project) = &model.project {
                req = req.header("OpenAI-Project", project);
            }
        }
        if let Some(client_id) = &request.client_request_id {
            req = req.header(CLIENT_REQUEST_ID_HEADER, client_id);
        }

        debug!(provider = %provider, model = %request.model_name, url = %url, "Calling chat completions");

        let response = req.send().await.map_err(|e| transport_error(provider, e))?;
        if !response.status().is_success() {
            return Err(status_error(provider, response).await);
        }

        let headers = response.headers().clone();
        let parsed: ChatResponse = response.json().await.map_err(|e| {
            IntegratorError::provider(provider, format!("invalid response body: {}", e))
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| IntegratorError::provider(provider, "response contained no choices"))?;

        let usage = parsed.usage.map(|u| (u.prompt_tokens, u.completion_tokens));
        Ok(AdapterResponse::from_usage(text, usage, request, headers))
    }
}
