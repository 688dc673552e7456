//! Per-model usage metering
//!
//! One [`UsageStats`] entry exists for every registry key. Entries are
//! updated once per terminal generation outcome and can be persisted to a
//! flat JSON file on request.

use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::IntegratorResult;
use crate::registry::ModelRegistry;

/// Accumulated counters for one registry key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageStats {
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    /// Terminal outcomes recorded (successes and failures)
    pub requests: u64,
    /// USD
    pub total_cost: f64,
    pub errors: u64,
    /// Running mean over all recorded outcomes, seconds
    pub avg_response_time: f64,
    pub last_used: Option<DateTime<Utc>>,
}

impl UsageStats {
    fn record_response_time(&mut self, response_time: f64) {
        self.requests += 1;
        let n = self.requests as f64;
        self.avg_response_time += (response_time - self.avg_response_time) / n;
        self.last_used = Some(Utc::now());
    }

    /// Share of recorded outcomes that failed
    pub fn error_rate(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.errors as f64 / self.requests as f64
        }
    }
}

/// Totals across every model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageSummary {
    pub total_requests: u64,
    pub total_errors: u64,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub total_cost: f64,
    /// Key with the highest cumulative cost
    pub most_expensive_model: Option<String>,
    /// Key with the most recorded requests
    pub most_used_model: Option<String>,
}

/// Thread-safe table of usage stats keyed by registry key
#[derive(Debug, Default)]
pub struct UsageLedger {
    stats: RwLock<IndexMap<String, UsageStats>>,
}

impl UsageLedger {
    /// Create a ledger with a zeroed entry for every registry key
    pub fn for_registry(registry: &ModelRegistry) -> Self {
        let stats = registry
            .keys()
            .map(|key| (key.to_string(), UsageStats::default()))
            .collect();
        Self {
            stats: RwLock::new(stats),
        }
    }

    /// Record a successful call; unknown keys are ignored
    pub fn record_success(
        &self,
        key: &str,
        input_tokens: u32,
        output_tokens: u32,
        cost: f64,
        response_time: f64,
    ) {
        let mut stats = self.stats.write();
        let Some(entry) = stats.get_mut(key) else {
            warn!(model = %key, "Usage recorded for unregistered model");
            return;
        };
        entry.total_input_tokens = entry.total_input_tokens.saturating_add(input_tokens as u64);
        entry.total_output_tokens = entry.total_output_tokens.saturating_add(output_tokens as u64);
        entry.total_cost += cost;
        entry.record_response_time(response_time);
    }

    /// Record a failed call; unknown keys are ignored
    pub fn record_failure(&self, key: &str, response_time: f64) {
        let mut stats = self.stats.write();
        let Some(entry) = stats.get_mut(key) else {
            warn!(model = %key, "Usage recorded for unregistered model");
            return;
        };
        entry.errors += 1;
        entry.record_response_time(response_time);
    }

    pub fn get(&self, key: &str) -> Option<UsageStats> {
        self.stats.read().get(key).cloned()
    }

    /// Copy of every entry in registry order
    pub fn snapshot(&self) -> IndexMap<String, UsageStats> {
        self.stats.read().clone()
    }

    pub fn summary(&self) -> UsageSummary {
        let stats = self.stats.read();
        let mut summary = UsageSummary::default();
        let mut top_cost: Option<(&str, f64)> = None;
        let mut top_requests: Option<(&str, u64)> = None;

        for (key, entry) in stats.iter() {
            summary.total_requests += entry.requests;
            summary.total_errors += entry.errors;
            summary.total_input_tokens = summary.total_input_tokens.saturating_add(entry.total_input_tokens);
            summary.total_output_tokens = summary.total_output_tokens.saturating_add(entry.total_output_tokens);
            summary.total_cost += entry.total_cost;

            if entry.total_cost > 0.0 && top_cost.map_or(true, |(_, c)| entry.total_cost > c) {
                top_cost = Some((key.as_str(), entry.total_cost));
            }
            if entry.requests > 0 && top_requests.map_or(true, |(_, r)| entry.requests > r) {
                top_requests = Some((key.as_str(), entry.requests));
            }
        }

        summary.most_expensive_model = top_cost.map(|(k, _)| k.to_string());
        summary.most_used_model = top_requests.map(|(k, _)| k.to_string());
        summary
    }


    /// Write all entries to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> IntegratorResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&*self.stats.read())?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        info!(path = %path.display(), "Usage statistics saved");
        Ok(())
    }

    /// Seed counters from a JSON file written by [`UsageLedger::save`].
    ///
    /// Entries for keys that are not registered are skipped. Returns the
    /// number of entries loaded.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> IntegratorResult<usize> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let persisted: IndexMap<String, UsageStats> = serde_json::from_str(&content)?;

        let mut stats = self.stats.write();
        let mut loaded = 0;
        for (key, entry) in persisted {
            match stats.get_mut(&key) {
                Some(slot) => {
                    *slot = entry;
                    loaded += 1;
                }
                None => debug!(model = %key, "Skipping usage for unregistered model"),
            }
        }

        info!(path = %path.display(), loaded, "Usage statistics loaded");
        Ok(loaded)
    }
}
