//! OpenAI-compatible adapter tests (OpenAI, Groq, Grok)

use super::common::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use model_integrator::{GenerationRequest, Provider, RequestStatus};

#[tokio::test]
async fn test_openai_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", format!("Bearer {}", OPENAI_KEY).as_str()))
        .and(header("openai-organization", "org-bmc"))
        .and(header("openai-project", "proj-quotes"))
        .and(header("x-client-request-id", "quote-001"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "messages": [
                {"role": "system", "content": "Sos el asistente de BMC"},
                {"role": "user", "content": "Precio isopanel 100mm"}
            ],
            "max_tokens": 250
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_completion("El isopanel de 100mm cuesta...", 1200, 300))
                .insert_header("x-request-id", "req_openai_1")
                .insert_header("x-ratelimit-limit-requests", "500")
                .insert_header("x-ratelimit-remaining-requests", "499"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut vars = openai_vars(&server);
    vars.push(("OPENAI_ORGANIZATION", "org-bmc".to_string()));
    vars.push(("OPENAI_PROJECT", "proj-quotes".to_string()));
    let integrator = integrator(&config_from(&vars));

    let result = integrator
        .generate(
            GenerationRequest::new("Precio isopanel 100mm")
                .system("Sos el asistente de BMC")
                .max_tokens(250)
                .client_request_id("quote-001"),
        )
        .await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.text(), "El isopanel de 100mm cuesta...");
    assert_eq!(result.model_key.as_deref(), Some("openai_gpt-4o-mini"));
    assert_eq!(result.provider, Some(Provider::OpenAI));
    assert_eq!((result.input_tokens, result.output_tokens), (1200, 300));
    assert!(!result.tokens_estimated);
    assert_eq!(result.provider_request_id.as_deref(), Some("req_openai_1"));
    assert_eq!(result.client_request_id.as_deref(), Some("quote-001"));

    let expected_cost = (1200.0 / 1000.0) * 0.000_15 + (300.0 / 1000.0) * 0.000_6;
    assert!((result.cost - expected_cost).abs() < 1e-12);

    let limits = result.rate_limits.expect("rate limits");
    assert_eq!(limits.organization.as_deref(), Some("org-bmc"));
    assert_eq!(limits.requests.remaining, Some(499));
    assert!(result.rate_limit_warnings.is_empty());
    assert_eq!(integrator.rate_limits().len(), 1);

    let record = integrator.tracker().get("quote-001").unwrap();
    assert_eq!(record.status, RequestStatus::Completed);
    assert_eq!(record.endpoint.as_deref(), Some("generate"));
}

#[tokio::test]
async fn test_openai_error_is_a_failure_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(error_body("Incorrect API key provided")))
        .expect(1)
        .mount(&server)
        .await;

    let integrator = integrator(&config_from(&openai_vars(&server)));
    let result = integrator.generate(GenerationRequest::new("hola")).await;

    assert!(!result.success);
    assert!(result.text.is_none());
    let error = result.error.unwrap();
    assert!(error.contains("401"), "{}", error);
    assert!(error.contains("Incorrect API key provided"), "{}", error);
    assert_eq!(result.error_type.as_deref(), Some("provider_call_error"));

    let record = integrator.tracker().get(result.request_id.as_deref().unwrap()).unwrap();
    assert_eq!(record.status, RequestStatus::Failed);

    let stats = integrator.usage_stats("openai_gpt-4o-mini").unwrap();
    assert_eq!((stats.requests, stats.errors), (1, 1));
}

#[tokio::test]
async fn test_missing_usage_is_estimated() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion_without_usage(&"x".repeat(80))))
        .mount(&server)
        .await;

    let integrator = integrator(&config_from(&openai_vars(&server)));
    let result = integrator.generate(GenerationRequest::new("a".repeat(40))).await;

    assert!(result.success);
    assert!(result.tokens_estimated);
    assert_eq!(result.input_tokens, 10);
    assert_eq!(result.output_tokens, 20);
}

#[tokio::test]
async fn test_invalid_caller_id_is_dropped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion("ok", 1, 1)))
        .mount(&server)
        .await;

    let integrator = integrator(&config_from(&openai_vars(&server)));
    let result = integrator
        .generate(GenerationRequest::new("hola").client_request_id("cotización-ñ"))
        .await;

    assert!(result.success);
    assert!(result.client_request_id.is_none());
    assert!(integrator.tracker().get("cotización-ñ").is_none());
}

#[tokio::test]
async fn test_groq_uses_chat_completions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", format!("Bearer {}", GROQ_KEY).as_str()))
        .and(body_partial_json(json!({"model": "llama-3.1-8b-instant"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion("rápido", 5, 2)))
        .expect(1)
        .mount(&server)
        .await;

    let integrator = integrator(&config_from(&groq_vars(&server)));
    let result = integrator.generate(GenerationRequest::new("hola")).await;

    assert!(result.success);
    assert_eq!(result.provider, Some(Provider::Groq));
    assert_eq!(result.model.as_deref(), Some("llama-3.1-8b-instant"));
}

#[tokio::test]
async fn test_grok_uses_openai_wire_format() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", format!("Bearer {}", GROK_KEY).as_str()))
        .and(body_partial_json(json!({"model": "grok-2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion("grok says hi", 3, 3)))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_from(&[
        ("GROK_API_KEY", GROK_KEY.to_string()),
        ("GROK_MODELS", "grok-2".to_string()),
        ("GROK_BASE_URL", server.uri()),
    ]);
    let integrator = integrator(&config);
    let result = integrator.generate(GenerationRequest::new("hola")).await;

    assert!(result.success);
    assert_eq!(result.model_key.as_deref(), Some("grok_grok-2"));
}
