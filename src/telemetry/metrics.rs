//! Generation metrics via the `metrics` facade
//!
//! Nothing is exported unless the host installs a recorder.

use ::metrics::{counter, histogram};

pub const METRIC_REQUESTS_TOTAL: &str = "model_integrator_requests_total";
pub const METRIC_COST_USD_TOTAL: &str = "model_integrator_cost_usd_total";
pub const METRIC_RESPONSE_SECONDS: &str = "model_integrator_response_seconds";
pub const METRIC_TOKENS_TOTAL: &str = "model_integrator_tokens_total";
pub const METRIC_FALLBACKS_TOTAL: &str = "model_integrator_fallbacks_total";

/// Record one successful attempt
pub fn record_success(model_key: &str, provider: &str, input_tokens: u32, output_tokens: u32, cost: f64, response_time: f64) {
    counter!(
        METRIC_REQUESTS_TOTAL,
        "model" => model_key.to_string(),
        "provider" => provider.to_string(),
        "status" => "success"
    )
    .increment(1);
    counter!(METRIC_TOKENS_TOTAL, "model" => model_key.to_string(), "direction" => "input")
        .increment(input_tokens as u64);
    counter!(METRIC_TOKENS_TOTAL, "model" => model_key.to_string(), "direction" => "output")
        .increment(output_tokens as u64);
    // Counters are integral; cost is tracked in micro-dollars.
    counter!(METRIC_COST_USD_TOTAL, "model" => model_key.to_string())
        .increment((cost * 1_000_000.0).round() as u64);
    histogram!(METRIC_RESPONSE_SECONDS, "model" => model_key.to_string()).record(response_time);
}

/// Record one failed attempt
pub fn record_failure(model_key: &str, provider: &str, error_type: &'static str, response_time: f64) {
    counter!(
        METRIC_REQUESTS_TOTAL,
        "model" => model_key.to_string(),
        "provider" => provider.to_string(),
        "status" => "error",
        "error_type" => error_type
    )
    .increment(1);
    histogram!(METRIC_RESPONSE_SECONDS, "model" => model_key.to_string()).record(response_time);
}

pub fn record_fallback(from_key: &str) {
    counter!(METRIC_FALLBACKS_TOTAL, "from" => from_key.to_string()).increment(1);
}
