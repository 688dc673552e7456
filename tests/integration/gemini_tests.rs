//! Gemini adapter tests

use super::common::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use model_integrator::{GenerationRequest, Provider};

#[tokio::test]
async fn test_gemini_generate_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .and(header("x-goog-api-key", GEMINI_KEY))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "Cotizar techo de 40 m²"}]}],
            "systemInstruction": {"parts": [{"text": "Asistente BMC"}]},
            "generationConfig": {"maxOutputTokens": 512}
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_content("Para 40 m² necesitás...", Some((40, 120))))
                .insert_header("x-goog-request-id", "goog-req-9"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let integrator = integrator(&config_from(&gemini_vars(&server)));
    let result = integrator
        .generate(
            GenerationRequest::new("Cotizar techo de 40 m²")
                .system("Asistente BMC")
                .max_tokens(512),
        )
        .await;

    assert!(result.success, "{:?}", result.error);
    assert_eq!(result.provider, Some(Provider::Gemini));
    assert_eq!(result.text(), "Para 40 m² necesitás...");
    assert_eq!((result.input_tokens, result.output_tokens), (40, 120));
    assert!(!result.tokens_estimated);
    assert_eq!(result.provider_request_id.as_deref(), Some("goog-req-9"));
    assert!(result.rate_limits.is_none());
}

#[tokio::test]
async fn test_gemini_without_usage_metadata() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_content("abcdefgh", None)))
        .mount(&server)
        .await;

    let integrator = integrator(&config_from(&gemini_vars(&server)));
    let result = integrator.generate(GenerationRequest::new("12345678").system("abcd")).await;

    assert!(result.success);
    assert!(result.tokens_estimated);
    assert_eq!(result.input_tokens, 3);
    assert_eq!(result.output_tokens, 2);

    let record = &integrator.logger().records()[0];
    assert!(record.tokens_estimated);
}

#[tokio::test]
async fn test_gemini_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-1.5-flash:generateContent"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({"error": {"code": 503, "message": "The model is overloaded."}})),
        )
        .mount(&server)
        .await;

    let integrator = integrator(&config_from(&gemini_vars(&server)));
    let result = integrator.generate(GenerationRequest::new("hola")).await;

    assert!(!result.success);
    assert!(result.error.unwrap().contains("The model is overloaded."));
}
