//! Client for the hosted text-generation endpoint.
//!
//! One outbound request per invocation, fixed sampling parameters, no retry,
//! no caching. Transport and quota failures map to error variants and
//! propagate to the caller unchanged.

use crate::config::LlmConfig;
use crate::defaults;
use crate::error::{Result, SalesqlError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// Trait for text completion.
///
/// This trait allows swapping implementations (hosted endpoint vs mock).
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Submit an assembled prompt and return the generated continuation.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl<T: CompletionClient + ?Sized> CompletionClient for Arc<T> {
    async fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt).await
    }
}

/// Wire format of a completion request.
///
/// The sampling fields always carry the fixed values from [`defaults`];
/// they are part of the contract, not configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest<'a> {
    pub prompt: &'a str,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub top_p: f64,
    pub top_k: u32,
}

impl<'a> CompletionRequest<'a> {
    /// Wrap a prompt with the fixed sampling configuration.
    pub fn new(prompt: &'a str) -> Self {
        Self {
            prompt,
            temperature: defaults::TEMPERATURE,
            max_output_tokens: defaults::MAX_OUTPUT_TOKENS,
            top_p: defaults::TOP_P,
            top_k: defaults::TOP_K,
        }
    }
}

/// Wire format of a completion response.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    text: String,
}

/// HTTP implementation of [`CompletionClient`].
pub struct HttpCompletionClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpCompletionClient {
    /// Create a client for the given endpoint, with an optional bearer token.
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }

    /// Build a client from configuration.
    ///
    /// The API key is read from the environment variable named in
    /// `llm.api_key_env`; authentication beyond that bearer token is
    /// environment-level and out of scope here.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        if config.endpoint.is_empty() {
            return Err(SalesqlError::ConfigInvalidValue {
                key: "llm.endpoint".to_string(),
                message: "no completion endpoint configured (set llm.endpoint or SALESQL_ENDPOINT)"
                    .to_string(),
            });
        }

        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.is_empty());

        Ok(Self::new(config.endpoint.clone(), api_key))
    }

    /// The configured endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = CompletionRequest::new(prompt);

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SalesqlError::CompletionRequest {
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(SalesqlError::CompletionStatus { status, message });
        }

        let parsed: CompletionResponse =
            response
                .json()
                .await
                .map_err(|e| SalesqlError::CompletionResponse {
                    message: e.to_string(),
                })?;

        Ok(parsed.text)
    }
}

/// Mock completion client for testing.
///
/// Records every submitted prompt so tests can assert on the exact wire
/// content.
#[derive(Debug, Default)]
pub struct MockCompletionClient {
    response: String,
    should_fail: bool,
    prompts: Mutex<Vec<String>>,
}

impl MockCompletionClient {
    /// Create a mock that echoes a fixed response.
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            should_fail: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Configure the mock to fail on complete.
    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// All prompts submitted so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        if self.should_fail {
            Err(SalesqlError::CompletionRequest {
                message: "mock completion failure".to_string(),
            })
        } else {
            Ok(self.response.clone())
        }
    }
}
