//! Structured request log
//!
//! One single-line JSON record per generation attempt, emitted through
//! `tracing` under the `model_integrator::requests` target so it inherits the
//! active request span and whatever subscriber the host installed.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// `tracing` target for request records
pub const REQUEST_LOG_TARGET: &str = "model_integrator::requests";

/// One generation attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub event: String,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_request_id: Option<String>,
    pub model: String,
    pub provider: String,
    /// 1 for the first attempt, 2 for the fallback
    pub attempt: u8,
    pub success: bool,
    pub response_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u32>,
    #[serde(default)]
    pub tokens_estimated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl LogRecord {
    pub fn generation(request_id: &str, model: &str, provider: &str, attempt: u8) -> Self {
        Self {
            timestamp: Utc::now(),
            event: "generation".to_string(),
            request_id: request_id.to_string(),
            client_request_id: None,
            provider_request_id: None,
            model: model.to_string(),
            provider: provider.to_string(),
            attempt,
            success: false,
            response_time: 0.0,
            input_tokens: None,
            output_tokens: None,
            tokens_estimated: false,
            cost: None,
            error: None,
            error_type: None,
        }
    }

    /// Render as one JSON line
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"event":"{}","request_id":"{}","serialization_error":"{}"}}"#,
                self.event, self.request_id, e
            )
        })
    }
}

/// Emits request records and optionally keeps them in memory
#[derive(Debug, Default)]
pub struct StructuredLogger {
    emitted: AtomicU64,
    captured: Option<Mutex<Vec<LogRecord>>>,
}

impl StructuredLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logger that also retains every record, for tests and inspection
    pub fn capturing() -> Self {
        Self {
            emitted: AtomicU64::new(0),
            captured: Some(Mutex::new(Vec::new())),
        }
    }

    pub fn emit(&self, record: LogRecord) {
        let line = record.to_line();
        if record.success {
            info!(target: REQUEST_LOG_TARGET, record = %line, "generation completed");
        } else {
            warn!(target: REQUEST_LOG_TARGET, record = %line, "generation failed");
        }

        self.emitted.fetch_add(1, Ordering::Relaxed);
        if let Some(captured) = &self.captured {
            captured.lock().push(record);
        }
    }

    /// Number of records emitted so far
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    /// Captured records; empty unless built with `capturing()`
    pub fn records(&self) -> Vec<LogRecord> {
        self.captured
            .as_ref()
            .map(|c| c.lock().clone())
            .unwrap_or_default()
    }
}
