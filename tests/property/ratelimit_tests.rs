//! Property-based tests for rate-limit warnings

use proptest::prelude::*;
use reqwest::header::HeaderMap;

use model_integrator::ratelimit::WARNING_THRESHOLD_PERCENT;
use model_integrator::{Provider, RateLimitMonitor};

fn headers(pairs: &[(&'static str, String)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        map.insert(*name, value.parse().unwrap());
    }
    map
}

proptest! {
    /// A warning is raised exactly when utilization reaches the threshold
    #[test]
    fn test_warning_threshold(limit in 1u64..100_000, remaining_frac in 0.0f64..=1.0) {
        let remaining = ((limit as f64) * remaining_frac).floor() as u64;
        let monitor = RateLimitMonitor::new();
        monitor.ingest(
            &headers(&[
                ("x-ratelimit-limit-tokens", limit.to_string()),
                ("x-ratelimit-remaining-tokens", remaining.to_string()),
            ]),
            Provider::Groq,
            None,
        );

        let used = (limit - remaining) as f64 / limit as f64 * 100.0;
        let warnings = monitor.warnings(Provider::Groq, None);
        prop_assert_eq!(!warnings.is_empty(), used >= WARNING_THRESHOLD_PERCENT);
        prop_assert!(warnings.iter().all(|w| w.contains("tokens")));
    }

    /// Snapshots are isolated per provider/organization
    #[test]
    fn test_organizations_are_isolated(org_a in "[a-z]{1,8}", org_b in "[A-Z]{1,8}") {
        let monitor = RateLimitMonitor::new();
        monitor.ingest(
            &headers(&[
                ("x-ratelimit-limit-requests", "100".to_string()),
                ("x-ratelimit-remaining-requests", "1".to_string()),
            ]),
            Provider::OpenAI,
            Some(&org_a),
        );

        prop_assert!(!monitor.warnings(Provider::OpenAI, Some(&org_a)).is_empty());
        prop_assert!(monitor.warnings(Provider::OpenAI, Some(&org_b)).is_empty());
        prop_assert!(monitor.snapshot(Provider::Groq, Some(&org_a)).is_none());
    }
}
