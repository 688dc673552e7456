//! Groq adapter
//!
//! Groq speaks the OpenAI chat-completions wire format at its own base URL
//! and rejects OpenAI organization headers.

use async_trait::async_trait;

use super::{AdapterKind, AdapterRequest, AdapterResponse, OpenAICompatibleAdapter, ProviderAdapter};
use crate::config::ModelConfig;
use crate::error::IntegratorResult;

#[derive(Debug, Clone)]
pub struct GroqAdapter {
    inner: OpenAICompatibleAdapter,
}

impl GroqAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            inner: OpenAICompatibleAdapter::without_org_headers(client),
        }
    }
}

#[async_trait]
impl ProviderAdapter for GroqAdapter {
    fn kind(&self) -> AdapterKind {
        AdapterKind::Groq
    }

    async fn call(&self, model: &ModelConfig, request: &AdapterRequest) -> IntegratorResult<AdapterResponse> {
        self.inner.call(model, request).await
    }
}
