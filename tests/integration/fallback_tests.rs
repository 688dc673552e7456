//! Fallback behavior across providers

use super::common::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use model_integrator::{GenerationRequest, RequestStatus};

async fn failing_server(status: u16, message: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(status).set_body_json(error_body(message)))
        .expect(1)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_fallback_to_second_provider() {
    let openai = failing_server(500, "internal error").await;
    let groq = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion("desde groq", 10, 5)))
        .expect(1)
        .mount(&groq)
        .await;

    let mut vars = openai_vars(&openai);
    vars.extend(groq_vars(&groq));
    let integrator = integrator(&config_from(&vars));

    let result = integrator
        .generate(GenerationRequest::new("hola").model("openai_gpt-4o-mini").client_request_id("conv-42"))
        .await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.text(), "desde groq");
    assert_eq!(result.model_key.as_deref(), Some("groq_llama-3.1-8b-instant"));
    assert_eq!(result.fallback_from.as_deref(), Some("openai_gpt-4o-mini"));
    assert_eq!(result.client_request_id.as_deref(), Some("conv-42"));

    let records = integrator.logger().records();
    assert_eq!(records.len(), 2);
    assert!(!records[0].success);
    assert!(records[1].success);
    assert_ne!(records[0].request_id, records[1].request_id);

    // Ledger reflects the terminal outcome only
    assert_eq!(integrator.usage_stats("openai_gpt-4o-mini").unwrap().requests, 0);
    assert_eq!(integrator.usage_stats("groq_llama-3.1-8b-instant").unwrap().requests, 1);

    let first = integrator.tracker().get(&records[0].request_id).unwrap();
    assert_eq!(first.status, RequestStatus::Failed);
    let second = integrator.tracker().get(&records[1].request_id).unwrap();
    assert_eq!(second.status, RequestStatus::Completed);
}

#[tokio::test]
async fn test_double_failure_logs_twice() {
    let openai = failing_server(500, "openai down").await;
    let groq = failing_server(429, "groq rate limited").await;

    let mut vars = openai_vars(&openai);
    vars.extend(groq_vars(&groq));
    let integrator = integrator(&config_from(&vars));

    let result = integrator.generate(GenerationRequest::new("hola").model("openai_gpt-4o-mini")).await;

    assert!(!result.success);
    assert!(result.text.is_none());
    assert!(result.error.as_deref().unwrap().contains("groq rate limited"));
    assert!(result.fallback_from.is_some());

    let records = integrator.logger().records();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| !r.success && r.error.is_some()));
    assert_eq!(integrator.logger().emitted(), 2);

    let summary = integrator.usage_summary();
    assert_eq!(summary.total_requests, 1);
    assert_eq!(summary.total_errors, 1);
}

#[tokio::test]
async fn test_single_model_failure_is_not_retried() {
    let openai = failing_server(500, "down").await;

    let integrator = integrator(&config_from(&openai_vars(&openai)));
    let result = integrator.generate(GenerationRequest::new("hola")).await;

    assert!(!result.success);
    assert!(result.fallback_from.is_none());
    assert_eq!(integrator.logger().records().len(), 1);
}
