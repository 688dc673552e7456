//! # model-integrator
//!
//! Multi-provider LLM routing core for OpenAI, Groq, Gemini and Grok.
//!
//! ## Features
//!
//! - **Strategy-scored selection**: cost, speed, quality or balanced
//! - **Normalized adapters**: one request/response shape across providers
//! - **Correlation tracking**: server and caller request ids per call
//! - **Usage metering**: tokens, cost and latency per model, saved on demand
//! - **Rate-limit monitoring**: latest header snapshot per provider/organization
//! - **Single-level fallback**: one retry against the next-best model
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use model_integrator::{GenerationRequest, IntegratorConfig, UnifiedIntegrator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = IntegratorConfig::from_env()?;
//!     let integrator = UnifiedIntegrator::from_config(&config)?;
//!
//!     let result = integrator
//!         .generate(GenerationRequest::new("¿Qué espesor de isopanel me recomendás?"))
//!         .await;
//!     println!("{}", result.text());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod integrator;
pub mod providers;
pub mod ratelimit;
pub mod registry;
pub mod telemetry;
pub mod tracking;

pub use config::{IntegratorConfig, ModelConfig, Provider};
pub use error::{IntegratorError, IntegratorResult};
pub use integrator::{
    spawn_tracker_sweeper, GenerationRequest, GenerationResult, IntegratorBuilder, ModelInfo, StreamEvent,
    UnifiedIntegrator,
};
pub use ratelimit::{ProviderRateLimits, RateLimitInfo, RateLimitMonitor};
pub use registry::{ModelRegistry, ModelSelector, Strategy};
pub use tracking::{RequestMetadata, RequestStatus, RequestTracker, UsageLedger, UsageStats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
