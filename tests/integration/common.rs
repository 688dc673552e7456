//! Common test utilities for integration tests

use std::collections::HashMap;

use serde_json::{json, Value};
use wiremock::MockServer;

use model_integrator::telemetry::StructuredLogger;
use model_integrator::{IntegratorConfig, ModelRegistry, UnifiedIntegrator};

pub const OPENAI_KEY: &str = "sk-test-openai";
pub const GROQ_KEY: &str = "gsk-test-groq";
pub const GEMINI_KEY: &str = "gm-test-gemini";
pub const GROK_KEY: &str = "xai-test-grok";

/// Build a config from environment-style pairs
pub fn config_from(vars: &[(&str, String)]) -> IntegratorConfig {
    let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
    IntegratorConfig::from_lookup(|key| map.get(key).cloned()).unwrap()
}

/// Integrator with real HTTP adapters and a capturing logger
pub fn integrator(config: &IntegratorConfig) -> UnifiedIntegrator {
    UnifiedIntegrator::builder()
        .registry(ModelRegistry::load(config))
        .strategy(config.strategy)
        .http(config.http.clone())
        .logger(StructuredLogger::capturing())
        .build()
        .unwrap()
}

/// OpenAI with `gpt-4o-mini` served by `server`
pub fn openai_vars(server: &MockServer) -> Vec<(&'static str, String)> {
    vec![
        ("OPENAI_API_KEY", OPENAI_KEY.to_string()),
        ("OPENAI_MODELS", "gpt-4o-mini".to_string()),
        ("OPENAI_BASE_URL", server.uri()),
    ]
}

/// Groq with `llama-3.1-8b-instant` served by `server`
pub fn groq_vars(server: &MockServer) -> Vec<(&'static str, String)> {
    vec![
        ("GROQ_API_KEY", GROQ_KEY.to_string()),
        ("GROQ_MODELS", "llama-3.1-8b-instant".to_string()),
        ("GROQ_BASE_URL", server.uri()),
    ]
}

/// Gemini with `gemini-1.5-flash` served by `server`
pub fn gemini_vars(server: &MockServer) -> Vec<(&'static str, String)> {
    vec![
        ("GEMINI_API_KEY", GEMINI_KEY.to_string()),
        ("GEMINI_MODELS", "gemini-1.5-flash".to_string()),
        ("GEMINI_BASE_URL", server.uri()),
    ]
}

/// Chat completions body
pub fn chat_completion(text: &str, prompt_tokens: u32, completion_tokens: u32) -> Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": text},
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": prompt_tokens,
            "completion_tokens": completion_tokens,
            "total_tokens": prompt_tokens + completion_tokens
        }
    })
}

/// Chat completions body without a usage block
pub fn chat_completion_without_usage(text: &str) -> Value {
    json!({
        "choices": [{"index": 0, "message": {"role": "assistant", "content": text}}]
    })
}

/// Gemini generateContent body
pub fn gemini_content(text: &str, usage: Option<(u32, u32)>) -> Value {
    let mut body = json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    });
    if let Some((prompt, candidates)) = usage {
        body["usageMetadata"] = json!({
            "promptTokenCount": prompt,
            "candidatesTokenCount": candidates,
            "totalTokenCount": prompt + candidates
        });
    }
    body
}

/// Provider-style error body
pub fn error_body(message: &str) -> Value {
    json!({"error": {"message": message, "type": "invalid_request_error"}})
}
