//! Unified integrator
//!
//! The single entry point callers use. A generation runs
//! selection → tracker open → adapter call → cost → rate-limit ingest →
//! structured log → tracker close, with one fallback attempt against a
//! freshly selected model (the failed key excluded) if the first attempt
//! fails. `generate` never returns an error; failures come back as a
//! `GenerationResult` with `success == false`.

mod builder;
mod request;
mod result;

pub use builder::*;
pub use request::*;
pub use result::*;

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::Stream;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn, Instrument};

use crate::config::{IntegratorConfig, ModelConfig};
use crate::error::{IntegratorError, IntegratorResult};
use crate::providers::{AdapterRequest, AdapterSet};
use crate::ratelimit::{ProviderRateLimits, RateLimitMonitor};
use crate::registry::{score, ModelRegistry, ModelSelector, Strategy};
use crate::telemetry::{self, LogRecord, RequestSpan, StructuredLogger};
use crate::tracking::{RequestStatus, RequestTracker, UsageLedger, UsageStats, UsageSummary};

/// Tracker endpoint label for generation calls
const GENERATE_ENDPOINT: &str = "generate";

/// A failed attempt, carried back to `generate` for the fallback decision
struct AttemptFailure {
    error: IntegratorError,
    response_time: f64,
    request_id: String,
    client_request_id: Option<String>,
}

/// Multi-provider generation front end
#[derive(Debug)]
pub struct UnifiedIntegrator {
    registry: ModelRegistry,
    strategy: Strategy,
    adapters: AdapterSet,
    tracker: Arc<RequestTracker>,
    monitor: RateLimitMonitor,
    ledger: UsageLedger,
    logger: StructuredLogger,
}

impl UnifiedIntegrator {
    pub fn builder() -> IntegratorBuilder {
        IntegratorBuilder::new()
    }

    /// Composition root for hosts: registry, HTTP adapters and tracker from
    /// configuration. A configured usage file is loaded if present; a failed
    /// load is logged and counters start at zero.
    pub fn from_config(config: &IntegratorConfig) -> IntegratorResult<Self> {
        let integrator = IntegratorBuilder::new()
            .registry(ModelRegistry::load(config))
            .strategy(config.strategy)
            .tracker_capacity(config.tracker.max_stored)
            .http(config.http.clone())
            .build()?;

        if let Some(path) = &config.usage_file {
            if path.exists() {
                match integrator.load_usage(path) {
                    Ok(loaded) => info!(path = %path.display(), loaded, "Usage stats loaded"),
                    Err(e) => warn!(path = %path.display(), error = %e, "Ignoring unreadable usage file"),
                }
            }
        }

        Ok(integrator)
    }

    /// Generate a completion. Never fails; see `GenerationResult::success`.
    pub async fn generate(&self, request: GenerationRequest) -> GenerationResult {
        let first_key = match self.resolve_model(&request) {
            Ok(key) => key,
            Err(error) => {
                warn!(error = %error, "Generation rejected before dispatch");
                return GenerationResult::failure(&error);
            }
        };

        let failure = match self.attempt(&request, &first_key, 1).await {
            Ok(result) => return result,
            Err(failure) => failure,
        };

        let Some(fallback_key) = ModelSelector::select_excluding(&self.registry, self.strategy, &[first_key.as_str()])
        else {
            debug!(model = %first_key, "No fallback model available");
            self.ledger.record_failure(&first_key, failure.response_time);
            return self.failure_result(&first_key, failure, None);
        };

        warn!(from = %first_key, to = %fallback_key, error = %failure.error, "Falling back to another model");
        telemetry::record_fallback(&first_key);

        match self.attempt(&request, &fallback_key, 2).await {
            Ok(mut result) => {
                result.fallback_from = Some(first_key);
                result
            }
            Err(second) => {
                self.ledger.record_failure(&fallback_key, second.response_time);
                self.failure_result(&fallback_key, second, Some(first_key))
            }
        }
    }

    /// Generate, then replay the completed text as fixed-size chunks.
    ///
    /// The last event is always `StreamEvent::Done`. A failed generation
    /// yields only the `Done` event.
    pub fn generate_stream(
        &self,
        request: GenerationRequest,
        chunk_chars: usize,
    ) -> impl Stream<Item = StreamEvent> + Send + '_ {
        async_stream::stream! {
            let result = self.generate(request).await;
            if result.success {
                for chunk in chunk_text(result.text(), chunk_chars) {
                    yield StreamEvent::Chunk(chunk);
                }
            }
            yield StreamEvent::Done(Box::new(result));
        }
    }

    fn resolve_model(&self, request: &GenerationRequest) -> IntegratorResult<String> {
        match &request.model_id {
            Some(key) if self.registry.contains(key) => Ok(key.clone()),
            Some(key) => Err(IntegratorError::InvalidModelId(key.clone())),
            None => ModelSelector::select(&self.registry, self.strategy).ok_or(IntegratorError::NoModelAvailable),
        }
    }

    /// One adapter call against `key`, fully tracked and logged.
    ///
    /// Usage is recorded here only on success; failures are recorded by
    /// `generate` once the terminal outcome is known.
    async fn attempt(
        &self,
        request: &GenerationRequest,
        key: &str,
        attempt: u8,
    ) -> Result<GenerationResult, AttemptFailure> {
        let model = self.model(key)?;
        let provider = model.provider.as_str();

        let metadata = self.tracker.open(
            request.client_request_id.as_deref(),
            Some(key),
            Some(provider),
            Some(GENERATE_ENDPOINT),
        );
        let span = RequestSpan::new(
            &metadata.request_id,
            metadata.client_request_id.as_deref(),
            key,
            provider,
            attempt,
        );

        let adapter_request = AdapterRequest {
            prompt: request.prompt.clone(),
            system_prompt: request.system_prompt.clone(),
            model_name: model.model_name.clone(),
            temperature: request.temperature.unwrap_or(model.temperature),
            max_tokens: request.max_tokens.unwrap_or(model.max_tokens),
            client_request_id: metadata.client_request_id.clone(),
        };

        let started = Instant::now();
        let outcome = self
            .adapters
            .for_provider(model.provider)
            .call(model, &adapter_request)
            .instrument(span.span().clone())
            .await;
        let response_time = started.elapsed().as_secs_f64();

        let mut record = LogRecord::generation(&metadata.request_id, key, provider, attempt);
        record.client_request_id = metadata.client_request_id.clone();
        record.response_time = response_time;
        span.record_latency();

        span.span().in_scope(|| match outcome {
            Ok(response) => {
                let cost = model.cost_for(response.input_tokens, response.output_tokens);
                self.ledger
                    .record_success(key, response.input_tokens, response.output_tokens, cost, response_time);

                let rate_limits = self
                    .monitor
                    .ingest(&response.headers, model.provider, model.organization.as_deref());
                let rate_limit_warnings = rate_limits.as_ref().map(ProviderRateLimits::warnings).unwrap_or_default();
                for warning in &rate_limit_warnings {
                    warn!(model = %key, "{}", warning);
                }

                self.tracker
                    .close(&metadata.request_id, RequestStatus::Completed, Some(response_time), None);

                let provider_request_id = response.provider_request_id();
                record.success = true;
                record.provider_request_id = provider_request_id.clone();
                record.input_tokens = Some(response.input_tokens);
                record.output_tokens = Some(response.output_tokens);
                record.tokens_estimated = response.tokens_estimated;
                record.cost = Some(cost);
                self.logger.emit(record);

                span.record_tokens(response.input_tokens, response.output_tokens);
                span.record_outcome(true);
                telemetry::record_success(
                    key,
                    provider,
                    response.input_tokens,
                    response.output_tokens,
                    cost,
                    response_time,
                );

                Ok(GenerationResult {
                    success: true,
                    text: Some(response.text),
                    model: Some(model.model_name.clone()),
                    model_key: Some(key.to_string()),
                    provider: Some(model.provider),
                    input_tokens: response.input_tokens,
                    output_tokens: response.output_tokens,
                    total_tokens: response.input_tokens.saturating_add(response.output_tokens),
                    tokens_estimated: response.tokens_estimated,
                    cost,
                    response_time,
                    request_id: Some(metadata.request_id.clone()),
                    client_request_id: metadata.client_request_id.clone(),
                    provider_request_id,
                    rate_limits,
                    rate_limit_warnings,
                    error: None,
                    error_type: None,
                    fallback_from: None,
                })
            }
            Err(error) => {
                self.tracker.close(
                    &metadata.request_id,
                    RequestStatus::Failed,
                    Some(response_time),
                    Some(error.to_string()),
                );

                record.error = Some(error.to_string());
                record.error_type = Some(error.error_type().to_string());
                self.logger.emit(record);

                span.record_outcome(false);
                telemetry::record_failure(key, provider, error.error_type(), response_time);

                Err(AttemptFailure {
                    error,
                    response_time,
                    request_id: metadata.request_id.clone(),
                    client_request_id: metadata.client_request_id.clone(),
                })
            }
        })
    }

    fn model(&self, key: &str) -> Result<&ModelConfig, AttemptFailure> {
        self.registry.get(key).ok_or_else(|| AttemptFailure {
            error: IntegratorError::InvalidModelId(key.to_string()),
            response_time: 0.0,
            request_id: String::new(),
            client_request_id: None,
        })
    }

    fn failure_result(&self, key: &str, failure: AttemptFailure, fallback_from: Option<String>) -> GenerationResult {
        let model = self.registry.get(key);
        GenerationResult {
            model: model.map(|m| m.model_name.clone()),
            model_key: Some(key.to_string()),
            provider: model.map(|m| m.provider),
            response_time: failure.response_time,
            request_id: Some(failure.request_id).filter(|id| !id.is_empty()),
            client_request_id: failure.client_request_id,
            fallback_from,
            ..GenerationResult::failure(&failure.error)
        }
    }

    /// Every registry entry with its score under the current strategy
    pub fn available_models(&self) -> Vec<ModelInfo> {
        self.registry
            .iter()
            .map(|(key, model)| ModelInfo::new(key, model, score(model, self.strategy)))
            .collect()
    }

    /// Usage counters for one registry key
    pub fn usage_stats(&self, key: &str) -> Option<UsageStats> {
        self.ledger.get(key)
    }

    pub fn all_usage_stats(&self) -> indexmap::IndexMap<String, UsageStats> {
        self.ledger.snapshot()
    }

    pub fn usage_summary(&self) -> UsageSummary {
        self.ledger.summary()
    }

    /// Latest rate-limit snapshot per provider/organization
    pub fn rate_limits(&self) -> Vec<ProviderRateLimits> {
        self.monitor.all()
    }

    /// Persist usage counters as JSON
    pub fn save_usage<P: AsRef<Path>>(&self, path: P) -> IntegratorResult<()> {
        self.ledger.save(path)
    }

    /// Seed usage counters from a JSON file, returning the number of entries applied
    pub fn load_usage<P: AsRef<Path>>(&self, path: P) -> IntegratorResult<usize> {
        self.ledger.load(path)
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn tracker(&self) -> &Arc<RequestTracker> {
        &self.tracker
    }

    pub fn monitor(&self) -> &RateLimitMonitor {
        &self.monitor
    }

    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }
}

/// Periodically sweep old tracker records.
///
/// The tracker never schedules work itself; long-running hosts call this
/// once and keep (or abort) the handle.
pub fn spawn_tracker_sweeper(tracker: Arc<RequestTracker>, interval: Duration, max_age: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = tracker.sweep(max_age);
            if removed > 0 {
                debug!(removed, "Tracker sweep");
            }
        }
    })
}
