//! Usage accounting and persistence

use super::common::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use model_integrator::{GenerationRequest, UnifiedIntegrator};

#[tokio::test]
async fn test_usage_accumulates_over_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion("ok", 700, 150)))
        .expect(5)
        .mount(&server)
        .await;

    let integrator = integrator(&config_from(&openai_vars(&server)));

    let mut expected_cost = 0.0;
    for _ in 0..5 {
        let result = integrator.generate(GenerationRequest::new("hola")).await;
        assert!(result.success);
        expected_cost += result.cost;
    }

    let stats = integrator.usage_stats("openai_gpt-4o-mini").unwrap();
    assert_eq!(stats.requests, 5);
    assert_eq!(stats.errors, 0);
    assert_eq!(stats.total_input_tokens, 3500);
    assert_eq!(stats.total_output_tokens, 750);
    assert!((stats.total_cost - expected_cost).abs() < 1e-12);
    assert!(stats.last_used.is_some());
}

#[tokio::test]
async fn test_usage_file_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion("ok", 100, 100)))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let usage_file = dir.path().join("stats").join("usage.json");

    let mut vars = openai_vars(&server);
    vars.push(("MODEL_INTEGRATOR_USAGE_FILE", usage_file.display().to_string()));
    let config = config_from(&vars);

    let first = UnifiedIntegrator::from_config(&config).unwrap();
    first.generate(GenerationRequest::new("uno")).await;
    first.generate(GenerationRequest::new("dos")).await;
    first.save_usage(&usage_file).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&usage_file).unwrap()).unwrap();
    assert_eq!(raw["openai_gpt-4o-mini"]["requests"], 2);

    // A fresh integrator seeds its counters from the configured file
    let second = UnifiedIntegrator::from_config(&config).unwrap();
    let stats = second.usage_stats("openai_gpt-4o-mini").unwrap();
    assert_eq!(stats.requests, 2);
    assert_eq!(stats.total_input_tokens, 200);
}

#[tokio::test]
async fn test_corrupt_usage_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let usage_file = dir.path().join("usage.json");
    std::fs::write(&usage_file, "{ not json").unwrap();

    let server = MockServer::start().await;
    let mut vars = openai_vars(&server);
    vars.push(("MODEL_INTEGRATOR_USAGE_FILE", usage_file.display().to_string()));

    let integrator = UnifiedIntegrator::from_config(&config_from(&vars)).unwrap();
    assert_eq!(integrator.usage_stats("openai_gpt-4o-mini").unwrap().requests, 0);
}
