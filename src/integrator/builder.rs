//! Integrator builder
//!
//! Every collaborator is injected; anything left unset gets its default.

use std::sync::Arc;

use crate::config::HttpConfig;
use crate::error::IntegratorResult;
use crate::providers::AdapterSet;
use crate::ratelimit::RateLimitMonitor;
use crate::registry::{ModelRegistry, Strategy};
use crate::telemetry::StructuredLogger;
use crate::tracking::{RequestTracker, UsageLedger, DEFAULT_MAX_STORED};

use super::UnifiedIntegrator;

/// Builder for [`UnifiedIntegrator`]
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use model_integrator::{ModelConfig, ModelRegistry, Provider, Strategy, UnifiedIntegrator};
/// use model_integrator::providers::{AdapterSet, mock::MockAdapter};
///
/// let integrator = UnifiedIntegrator::builder()
///     .registry(ModelRegistry::from_models([ModelConfig::new(Provider::OpenAI, "gpt-4o-mini")]))
///     .strategy(Strategy::Cost)
///     .adapters(AdapterSet::uniform(Arc::new(MockAdapter::new("hola"))))
///     .build()
///     .unwrap();
///
/// assert_eq!(integrator.registry().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct IntegratorBuilder {
    registry: ModelRegistry,
    strategy: Strategy,
    adapters: Option<AdapterSet>,
    http: HttpConfig,
    tracker: Option<Arc<RequestTracker>>,
    tracker_capacity: Option<usize>,
    monitor: Option<RateLimitMonitor>,
    logger: Option<StructuredLogger>,
}

impl IntegratorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(mut self, registry: ModelRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Provider adapters; defaults to HTTP adapters built from `http`
    pub fn adapters(mut self, adapters: AdapterSet) -> Self {
        self.adapters = Some(adapters);
        self
    }

    pub fn http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    /// Share an existing tracker (e.g. one also handed to a sweeper)
    pub fn tracker(mut self, tracker: Arc<RequestTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Capacity of the tracker created when none is injected
    pub fn tracker_capacity(mut self, capacity: usize) -> Self {
        self.tracker_capacity = Some(capacity);
        self
    }

    pub fn monitor(mut self, monitor: RateLimitMonitor) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn build(self) -> IntegratorResult<UnifiedIntegrator> {
        let adapters = match self.adapters {
            Some(adapters) => adapters,
            None => AdapterSet::http(&self.http)?,
        };
        let tracker = self.tracker.unwrap_or_else(|| {
            Arc::new(RequestTracker::new(
                self.tracker_capacity.unwrap_or(DEFAULT_MAX_STORED),
            ))
        });
        let ledger = UsageLedger::for_registry(&self.registry);

        Ok(UnifiedIntegrator {
            registry: self.registry,
            strategy: self.strategy,
            adapters,
            tracker,
            monitor: self.monitor.unwrap_or_default(),
            ledger,
            logger: self.logger.unwrap_or_default(),
        })
    }
}
