//! Request correlation and usage accounting
//!
//! - [`RequestTracker`]: correlation ids and per-call metadata with bounded retention
//! - [`UsageLedger`]: per-model token, cost and latency counters

mod request;
mod usage;

pub use request::*;
pub use usage::*;
