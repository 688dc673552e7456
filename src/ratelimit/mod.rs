//! Provider rate-limit monitoring
//!
//! Parses the `x-ratelimit-*` headers that OpenAI-compatible providers return
//! on every response and keeps the latest snapshot per provider and
//! organization. Nothing here blocks requests; the monitor only reports.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Provider;

/// Utilization at or above which a warning is produced
pub const WARNING_THRESHOLD_PERCENT: f64 = 80.0;

pub const HEADER_LIMIT_REQUESTS: &str = "x-ratelimit-limit-requests";
pub const HEADER_REMAINING_REQUESTS: &str = "x-ratelimit-remaining-requests";
pub const HEADER_RESET_REQUESTS: &str = "x-ratelimit-reset-requests";
pub const HEADER_LIMIT_TOKENS: &str = "x-ratelimit-limit-tokens";
pub const HEADER_REMAINING_TOKENS: &str = "x-ratelimit-remaining-tokens";
pub const HEADER_RESET_TOKENS: &str = "x-ratelimit-reset-tokens";

const ALL_HEADERS: [&str; 6] = [
    HEADER_LIMIT_REQUESTS,
    HEADER_REMAINING_REQUESTS,
    HEADER_RESET_REQUESTS,
    HEADER_LIMIT_TOKENS,
    HEADER_REMAINING_TOKENS,
    HEADER_RESET_TOKENS,
];

/// Limit state for one dimension (requests or tokens)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RateLimitInfo {
    pub limit: Option<u64>,
    pub remaining: Option<u64>,
    /// Unix timestamp (seconds)
    pub reset: Option<f64>,
}

impl RateLimitInfo {
    /// True when nothing is known about this dimension
    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.remaining.is_none() && self.reset.is_none()
    }

    /// Seconds until the window resets, never negative
    pub fn seconds_until_reset(&self) -> Option<f64> {
        self.reset.map(|reset| {
            let now = Utc::now().timestamp_millis() as f64 / 1000.0;
            (reset - now).max(0.0)
        })
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == Some(0)
    }

    /// Percentage of the limit already consumed.
    ///
    /// Only defined when both limit and remaining are known and limit > 0.
    pub fn utilization_percent(&self) -> Option<f64> {
        match (self.limit, self.remaining) {
            (Some(limit), Some(remaining)) if limit > 0 => {
                let used = limit.saturating_sub(remaining) as f64;
                Some(used / limit as f64 * 100.0)
            }
            _ => None,
        }
    }

    /// Fields present in `newer` replace ours
    fn overlay(&self, newer: &RateLimitInfo) -> RateLimitInfo {
        RateLimitInfo {
            limit: newer.limit.or(self.limit),
            remaining: newer.remaining.or(self.remaining),
            reset: newer.reset.or(self.reset),
        }
    }
}

/// Latest rate-limit snapshot for a provider/organization pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRateLimits {
    pub provider: Provider,
    pub organization: Option<String>,
    pub requests: RateLimitInfo,
    pub tokens: RateLimitInfo,
    pub updated_at: DateTime<Utc>,
}

impl ProviderRateLimits {
    pub fn key(&self) -> String {
        monitor_key(self.provider, self.organization.as_deref())
    }

    /// Warning strings for each dimension at or above the threshold
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for (dimension, info) in [("requests", &self.requests), ("tokens", &self.tokens)] {
            if let Some(percent) = info.utilization_percent() {
                if percent >= WARNING_THRESHOLD_PERCENT {
                    warnings.push(format!(
                        "High {} usage for {}: {:.1}% used ({}/{} remaining)",
                        dimension,
                        self.key(),
                        percent,
                        info.remaining.unwrap_or_default(),
                        info.limit.unwrap_or_default(),
                    ));
                }
            }
        }
        warnings
    }
}

/// Storage key: `provider:organization`, or `provider:default`
pub fn monitor_key(provider: Provider, organization: Option<&str>) -> String {
    format!("{}:{}", provider, organization.unwrap_or("default"))
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

fn header_f64(headers: &HeaderMap, name: &str) -> Option<f64> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Parse the six rate-limit headers; absent or non-numeric values are `None`
pub fn parse_rate_limit_headers(headers: &HeaderMap) -> (RateLimitInfo, RateLimitInfo) {
    let requests = RateLimitInfo {
        limit: header_u64(headers, HEADER_LIMIT_REQUESTS),
        remaining: header_u64(headers, HEADER_REMAINING_REQUESTS),
        reset: header_f64(headers, HEADER_RESET_REQUESTS),
    };
    let tokens = RateLimitInfo {
        limit: header_u64(headers, HEADER_LIMIT_TOKENS),
        remaining: header_u64(headers, HEADER_REMAINING_TOKENS),
        reset: header_f64(headers, HEADER_RESET_TOKENS),
    };
    (requests, tokens)
}

/// Latest-snapshot store of provider rate limits
#[derive(Debug, Default)]
pub struct RateLimitMonitor {
    snapshots: RwLock<HashMap<String, ProviderRateLimits>>,
}

impl RateLimitMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest response headers.
    ///
    /// Returns `None` and stores nothing when the response carries no
    /// rate-limit headers. Otherwise the parsed values are layered over the
    /// previous snapshot for the same key and the result is returned.
    pub fn ingest(
        &self,
        headers: &HeaderMap,
        provider: Provider,
        organization: Option<&str>,
    ) -> Option<ProviderRateLimits> {
        if !ALL_HEADERS.iter().any(|name| headers.contains_key(*name)) {
            return None;
        }

        let (requests, tokens) = parse_rate_limit_headers(headers);
        let key = monitor_key(provider, organization);

        let mut snapshots = self.snapshots.write();
        let snapshot = match snapshots.get(&key) {
            Some(previous) => ProviderRateLimits {
                requests: previous.requests.overlay(&requests),
                tokens: previous.tokens.overlay(&tokens),
                ..previous.clone()
            },
            None => ProviderRateLimits {
                provider,
                organization: organization.map(String::from),
                requests,
                tokens,
                updated_at: Utc::now(),
            },
        };
        let snapshot = ProviderRateLimits {
            updated_at: Utc::now(),
            ..snapshot
        };

        debug!(
            key = %key,
            requests_remaining = ?snapshot.requests.remaining,
            tokens_remaining = ?snapshot.tokens.remaining,
            "Rate limits updated"
        );
        snapshots.insert(key, snapshot.clone());
        Some(snapshot)
    }

    /// Latest snapshot for a provider/organization
    pub fn snapshot(&self, provider: Provider, organization: Option<&str>) -> Option<ProviderRateLimits> {
        self.snapshots
            .read()
            .get(&monitor_key(provider, organization))
            .cloned()
    }

    /// Human-readable warnings for utilization at or above 80%
    pub fn warnings(&self, provider: Provider, organization: Option<&str>) -> Vec<String> {
        self.snapshot(provider, organization)
            .map(|s| s.warnings())
            .unwrap_or_default()
    }

    /// Every stored snapshot, sorted by key
    pub fn all(&self) -> Vec<ProviderRateLimits> {
        let mut all: Vec<_> = self.snapshots.read().values().cloned().collect();
        all.sort_by_key(|s| s.key());
        all
    }
}
