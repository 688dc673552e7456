//! Property-based tests using proptest
//!
//! Invariants of selection, caller-id validation and rate-limit warnings.

pub mod caller_id_tests;
pub mod ratelimit_tests;
pub mod selection_tests;
