//! Property-based tests for caller id validation and tracker retention

use proptest::prelude::*;

use model_integrator::tracking::MAX_CALLER_ID_LEN;
use model_integrator::{RequestStatus, RequestTracker};

proptest! {
    /// Any ASCII id of 1..=512 chars is accepted and kept by `open`
    #[test]
    fn test_ascii_ids_accepted(id in "[\\x00-\\x7F]{1,512}") {
        prop_assert!(RequestTracker::validate_caller_id(&id));

        let tracker = RequestTracker::new(10);
        let record = tracker.open(Some(&id), None, None, None);
        prop_assert_eq!(record.client_request_id.as_deref(), Some(id.as_str()));
        prop_assert!(tracker.get(&id).is_some());
    }

    /// Over-long ids are rejected and silently dropped
    #[test]
    fn test_long_ids_rejected(extra in 1usize..64) {
        let id = "a".repeat(MAX_CALLER_ID_LEN + extra);
        prop_assert!(!RequestTracker::validate_caller_id(&id));

        let tracker = RequestTracker::new(10);
        let record = tracker.open(Some(&id), None, None, None);
        prop_assert!(record.client_request_id.is_none());
        prop_assert_eq!(tracker.len(), 1);
    }

    /// Any non-ASCII codepoint makes an id invalid
    #[test]
    fn test_non_ascii_rejected(
        prefix in "[a-z0-9-]{0,20}",
        c in any::<char>().prop_filter("non-ascii", |c| !c.is_ascii()),
        suffix in "[a-z0-9-]{0,20}",
    ) {
        let id = format!("{}{}{}", prefix, c, suffix);
        prop_assert!(!RequestTracker::validate_caller_id(&id));

        let tracker = RequestTracker::new(10);
        let record = tracker.open(Some(&id), None, None, None);
        prop_assert!(record.client_request_id.is_none());
    }

    /// Overflowing the table evicts exactly the oldest 10% and their ids
    /// become unknown to `close`
    #[test]
    fn test_eviction_drops_oldest_tenth(capacity in 10usize..200) {
        let tracker = RequestTracker::new(capacity);
        let ids: Vec<String> = (0..capacity)
            .map(|i| tracker.open(Some(&format!("caller-{}", i)), None, None, None).request_id)
            .collect();

        tracker.open(None, None, None, None);

        let evicted = capacity / 10;
        prop_assert_eq!(tracker.len(), capacity - evicted + 1);
        for (i, id) in ids.iter().enumerate() {
            let closed = tracker.close(id, RequestStatus::Completed, None, None);
            prop_assert_eq!(closed, i >= evicted);
            prop_assert_eq!(tracker.get(&format!("caller-{}", i)).is_some(), i >= evicted);
        }
    }
}
