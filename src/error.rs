//! Error types for the model integrator

use thiserror::Error;

use crate::config::Provider;

/// Result type alias for integrator operations
pub type IntegratorResult<T> = Result<T, IntegratorError>;

/// Main error type for integrator operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegratorError {
    // Selection errors
    #[error("No model available")]
    NoModelAvailable,

    #[error("Invalid model id: {0}")]
    InvalidModelId(String),

    // Provider errors
    #[error("{provider} call failed{}: {message}", format_status(.status))]
    ProviderCall {
        provider: Provider,
        status: Option<u16>,
        message: String,
    },

    // Correlation errors (never surfaced to callers, only logged)
    #[error("Invalid caller request id: {0}")]
    InvalidCallerId(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

fn format_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

impl IntegratorError {
    /// Build a provider error without an HTTP status
    pub fn provider(provider: Provider, message: impl Into<String>) -> Self {
        Self::ProviderCall {
            provider,
            status: None,
            message: message.into(),
        }
    }

    /// Stable label used in structured logs and metrics
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::NoModelAvailable => "no_model_available",
            Self::InvalidModelId(_) => "invalid_model_id",
            Self::ProviderCall { .. } => "provider_call_error",
            Self::InvalidCallerId(_) => "invalid_caller_id",
            Self::Config(_) => "configuration_error",
            Self::Io(_) => "io_error",
            Self::Serialization(_) => "serialization_error",
        }
    }
}

impl From<std::io::Error> for IntegratorError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for IntegratorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
