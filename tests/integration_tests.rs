//! End-to-end tests against wiremock provider endpoints

mod integration;
