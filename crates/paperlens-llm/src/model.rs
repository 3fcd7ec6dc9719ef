//! The model capability: one prompt in, one text response out.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tokio_stream::StreamExt;
use tracing::debug;

use crate::config::{LLMConfig, ResolvedModel};
use crate::providers::{self, StreamChunk, StreamRequest};
use crate::types::{ChatMessage, LLMProvider};

/// Upper bound on a single model call.
pub const MODEL_TIMEOUT_SECS: u64 = 300;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Stream read error: {0}")]
    Stream(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Model returned an empty response")]
    EmptyResponse,
}

/// Anything that can answer a prompt with text.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Human-readable model identifier.
    fn name(&self) -> &str;

    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}

/// [`LanguageModel`] backed by a provider's HTTP streaming API.
pub struct HttpModel {
    client: Client,
    provider: LLMProvider,
    model: String,
    api_key: String,
    base_url: String,
    temperature: f64,
    max_tokens: usize,
}

impl HttpModel {
    pub fn new(resolved: ResolvedModel, config: &LLMConfig) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(MODEL_TIMEOUT_SECS))
            .build()
            .map_err(|e| ModelError::Request(e.to_string()))?;
        Ok(Self {
            client,
            provider: resolved.provider,
            base_url: resolved.provider.default_base_url().to_string(),
            model: resolved.model,
            api_key: resolved.api_key,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Point at a different API root (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn provider(&self) -> LLMProvider {
        self.provider
    }
}

#[async_trait]
impl LanguageModel for HttpModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        let stream = providers::stream_llm(
            &self.client,
            self.provider,
            vec![ChatMessage::user(prompt)],
            StreamRequest {
                base_url: &self.base_url,
                model: &self.model,
                api_key: &self.api_key,
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            },
        );

        tokio::pin!(stream);

        let mut full_response = String::new();
        while let Some(chunk) = stream.next().await {
            match chunk {
                StreamChunk::Token(text) => full_response.push_str(&text),
                StreamChunk::Done { tokens_used } => {
                    debug!("{} streamed {} deltas", self.model, tokens_used);
                }
                StreamChunk::Error(e) => return Err(e),
            }
        }

        if full_response.trim().is_empty() {
            return Err(ModelError::EmptyResponse);
        }
        Ok(full_response)
    }
}

/// Deterministic model for tests: answers with a responder function and
/// records every prompt it receives.
#[cfg(any(test, feature = "fixtures"))]
pub struct StubModel {
    responder: Box<dyn Fn(&str) -> Result<String, ModelError> + Send + Sync>,
    prompts: parking_lot::Mutex<Vec<String>>,
}

#[cfg(any(test, feature = "fixtures"))]
impl StubModel {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Result<String, ModelError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            prompts: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Always answer with the same text.
    pub fn constant(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_| Ok(text.clone()))
    }

    /// Always fail.
    pub fn failing() -> Self {
        Self::new(|_| Err(ModelError::Request("connection refused".into())))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[cfg(any(test, feature = "fixtures"))]
#[async_trait]
impl LanguageModel for StubModel {
    fn name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        self.prompts.lock().push(prompt.to_string());
        (self.responder)(prompt)
    }
}
