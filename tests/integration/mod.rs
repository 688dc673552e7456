//! Integration test module
//!
//! Each provider endpoint is a wiremock server; the integrator is built from
//! an environment-style lookup pointing the base URLs at it.

pub mod common;
pub mod fallback_tests;
pub mod gemini_tests;
pub mod openai_tests;
pub mod usage_tests;
