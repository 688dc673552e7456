//! Scripted adapter for tests and offline demos
//!
//! Outcomes are served from a FIFO queue; once the queue is empty the
//! fallback reply is returned. Every call is recorded.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use super::{AdapterKind, AdapterRequest, AdapterResponse, ProviderAdapter};
use crate::config::ModelConfig;
use crate::error::{IntegratorError, IntegratorResult};

/// One scripted outcome
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Reply {
        text: String,
        /// Reported usage; `None` exercises the estimation path
        usage: Option<(u32, u32)>,
        headers: Vec<(String, String)>,
    },
    Fail {
        status: Option<u16>,
        message: String,
    },
}

impl MockOutcome {
    pub fn reply(text: impl Into<String>, input_tokens: u32, output_tokens: u32) -> Self {
        Self::Reply {
            text: text.into(),
            usage: Some((input_tokens, output_tokens)),
            headers: Vec::new(),
        }
    }

    pub fn reply_without_usage(text: impl Into<String>) -> Self {
        Self::Reply {
            text: text.into(),
            usage: None,
            headers: Vec::new(),
        }
    }

    pub fn fail(status: u16, message: impl Into<String>) -> Self {
        Self::Fail {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Attach a response header to a reply
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let Self::Reply { headers, .. } = &mut self {
            headers.push((name.to_string(), value.to_string()));
        }
        self
    }
}

/// A recorded call
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub model_key: String,
    pub request: AdapterRequest,
}

#[derive(Debug)]
pub struct MockAdapter {
    kind: AdapterKind,
    script: Mutex<VecDeque<MockOutcome>>,
    fallback: MockOutcome,
    calls: Mutex<Vec<MockCall>>,
}

impl MockAdapter {
    /// Adapter answering every call with `text`
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            kind: AdapterKind::OpenAICompatible,
            script: Mutex::new(VecDeque::new()),
            fallback: MockOutcome::reply(text, 10, 20),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Adapter failing every call
    pub fn always_fail(message: impl Into<String>) -> Self {
        Self {
            fallback: MockOutcome::fail(500, message),
            ..Self::new("")
        }
    }

    /// Queue an outcome ahead of the fallback reply
    pub fn push(&self, outcome: MockOutcome) -> &Self {
        self.script.lock().push_back(outcome);
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

fn header_map(pairs: &[(String, String)]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }
    headers
}

#[async_trait]
impl ProviderAdapter for MockAdapter {
    fn kind(&self) -> AdapterKind {
        self.kind
    }

    async fn call(&self, model: &ModelConfig, request: &AdapterRequest) -> IntegratorResult<AdapterResponse> {
        self.calls.lock().push(MockCall {
            model_key: model.key(),
            request: request.clone(),
        });

        let outcome = self
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match outcome {
            MockOutcome::Reply { text, usage, headers } => Ok(AdapterResponse::from_usage(
                text,
                usage,
                request,
                header_map(&headers),
            )),
            MockOutcome::Fail { status, message } => Err(IntegratorError::ProviderCall {
                provider: model.provider,
                status,
                message,
            }),
        }
    }
}
