//! Provider adapter layer
//!
//! Translates a normalized generation request into each provider's wire
//! format and the provider's reply back into a normalized response. The set
//! of adapter families is closed: OpenAI-compatible (OpenAI and Grok), Groq
//! and Gemini. Adapters never retry; retry policy lives in the integrator.

mod gemini;
mod groq;
pub mod mock;
mod openai;

pub use gemini::*;
pub use groq::*;
pub use openai::*;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use serde::Serialize;

use crate::config::{HttpConfig, ModelConfig, Provider};
use crate::error::{IntegratorError, IntegratorResult};

/// Header carrying the caller's correlation id to the provider
pub const CLIENT_REQUEST_ID_HEADER: &str = "x-client-request-id";

/// Response headers that may carry the provider's own request id
const PROVIDER_REQUEST_ID_HEADERS: [&str; 3] = ["x-request-id", "request-id", "x-goog-request-id"];

/// Normalized generation input
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdapterRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub model_name: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Forwarded as `X-Client-Request-Id`
    pub client_request_id: Option<String>,
}

/// Normalized provider reply
#[derive(Debug, Clone)]
pub struct AdapterResponse {
    pub text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    /// Token counts were approximated because the provider reported no usage
    pub tokens_estimated: bool,
    /// Raw response headers, forwarded to the rate limit monitor
    pub headers: HeaderMap,
}

impl AdapterResponse {
    /// Build a response, estimating token counts when the provider omitted them
    pub fn from_usage(
        text: String,
        usage: Option<(u32, u32)>,
        request: &AdapterRequest,
        headers: HeaderMap,
    ) -> Self {
        match usage {
            Some((input_tokens, output_tokens)) => Self {
                text,
                input_tokens,
                output_tokens,
                tokens_estimated: false,
                headers,
            },
            None => {
                let prompt_chars = request.prompt.chars().count()
                    + request.system_prompt.as_deref().map_or(0, |s| s.chars().count());
                let output_tokens = estimate_tokens(&text);
                Self {
                    text,
                    input_tokens: (prompt_chars / 4) as u32,
                    output_tokens,
                    tokens_estimated: true,
                    headers,
                }
            }
        }
    }

    /// The provider's request id, if one of the known headers is present
    pub fn provider_request_id(&self) -> Option<String> {
        provider_request_id(&self.headers)
    }
}

/// Approximate token count: characters / 4
pub fn estimate_tokens(text: &str) -> u32 {
    (text.chars().count() / 4) as u32
}

pub fn provider_request_id(headers: &HeaderMap) -> Option<String> {
    PROVIDER_REQUEST_ID_HEADERS
        .iter()
        .find_map(|name| headers.get(*name)?.to_str().ok().map(String::from))
}

/// Adapter families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterKind {
    OpenAICompatible,
    Groq,
    Gemini,
}

impl Provider {
    /// Wire format family used to talk to this provider
    pub fn adapter_kind(&self) -> AdapterKind {
        match self {
            Provider::OpenAI | Provider::Grok => AdapterKind::OpenAICompatible,
            Provider::Groq => AdapterKind::Groq,
            Provider::Gemini => AdapterKind::Gemini,
        }
    }
}

/// A provider backend
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Wire format family
    fn kind(&self) -> AdapterKind;

    /// Perform one generation call
    async fn call(&self, model: &ModelConfig, request: &AdapterRequest) -> IntegratorResult<AdapterResponse>;
}

/// Build the shared HTTP client used by all adapters
pub fn build_http_client(config: &HttpConfig) -> IntegratorResult<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("model-integrator/", env!("CARGO_PKG_VERSION"))),
    );

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .pool_max_idle_per_host(8)
        .build()
        .map_err(|e| IntegratorError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Turn a transport error into a provider error
pub(crate) fn transport_error(provider: Provider, err: reqwest::Error) -> IntegratorError {
    let message = if err.is_timeout() {
        format!("request timed out: {}", err)
    } else if err.is_connect() {
        format!("connection failed: {}", err)
    } else {
        err.to_string()
    };
    IntegratorError::ProviderCall {
        provider,
        status: err.status().map(|s| s.as_u16()),
        message,
    }
}

/// Turn a non-success HTTP response into a provider error carrying the
/// provider's own error text
pub(crate) async fn status_error(provider: Provider, response: reqwest::Response) -> IntegratorError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|json| {
            json["error"]["message"]
                .as_str()
                .or_else(|| json["message"].as_str())
                .or_else(|| json["error"].as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "empty error response".to_string()
            } else {
                trimmed.chars().take(500).collect()
            }
        });

    IntegratorError::ProviderCall {
        provider,
        status: Some(status),
        message,
    }
}

/// Exhaustive provider → adapter dispatch table
#[derive(Clone)]
pub struct AdapterSet {
    openai: Arc<dyn ProviderAdapter>,
    groq: Arc<dyn ProviderAdapter>,
    gemini: Arc<dyn ProviderAdapter>,
    grok: Arc<dyn ProviderAdapter>,
}

impl AdapterSet {
    /// Real HTTP adapters sharing one client
    pub fn http(config: &HttpConfig) -> IntegratorResult<Self> {
        let client = build_http_client(config)?;
        Ok(Self {
            openai: Arc::new(OpenAICompatibleAdapter::new(client.clone())),
            groq: Arc::new(GroqAdapter::new(client.clone())),
            gemini: Arc::new(GeminiAdapter::new(client.clone())),
            grok: Arc::new(OpenAICompatibleAdapter::new(client)),
        })
    }

    /// Use one adapter for every provider
    pub fn uniform(adapter: Arc<dyn ProviderAdapter>) -> Self {
        Self {
            openai: adapter.clone(),
            groq: adapter.clone(),
            gemini: adapter.clone(),
            grok: adapter,
        }
    }

    /// Replace the adapter for one provider
    pub fn with(mut self, provider: Provider, adapter: Arc<dyn ProviderAdapter>) -> Self {
        match provider {
            Provider::OpenAI => self.openai = adapter,
            Provider::Groq => self.groq = adapter,
            Provider::Gemini => self.gemini = adapter,
            Provider::Grok => self.grok = adapter,
        }
        self
    }

    pub fn for_provider(&self, provider: Provider) -> &dyn ProviderAdapter {
        match provider {
            Provider::OpenAI => self.openai.as_ref(),
            Provider::Groq => self.groq.as_ref(),
            Provider::Gemini => self.gemini.as_ref(),
            Provider::Grok => self.grok.as_ref(),
        }
    }
}

impl std::fmt::Debug for AdapterSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterSet")
            .field("openai", &self.openai.kind())
            .field("groq", &self.groq.kind())
            .field("gemini", &self.gemini.kind())
            .field("grok", &self.grok.kind())
            .finish()
    }
}
