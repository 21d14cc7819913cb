use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::errors::GridError;

#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: Option<String>,
    /// Input token count reported by the provider (if available).
    pub input_tokens: Option<u64>,
    /// Output token count reported by the provider (if available).
    pub output_tokens: Option<u64>,
}

impl LLMResponse {
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Default)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// Metrics for provider operations
#[derive(Debug, Clone, Default)]
pub struct ProviderMetrics {
    pub request_count: u64,
    pub token_count: u64,
    pub error_count: u64,
}

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 10000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Wait before retry number `attempt + 1`. A provider-supplied
    /// `retry_after` wins; otherwise exponential backoff, capped, plus up to
    /// 25% jitter.
    pub fn delay_for(&self, attempt: usize, retry_after: Option<u64>) -> Duration {
        if let Some(secs) = retry_after {
            return Duration::from_secs(secs);
        }
        let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base = (self.initial_delay_ms as f64 * self.backoff_multiplier.powi(exp))
            .min(self.max_delay_ms as f64);
        Duration::from_millis((base * (1.0 + 0.25 * fastrand::f64())) as u64)
    }
}

/// Response format constraint for LLM output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Free text.
    Text,
    /// A single JSON object (Gemini: `response_mime_type: application/json`).
    JsonObject,
}

/// Parameters for a chat request to an LLM provider.
#[derive(Debug, Clone)]
pub struct ChatRequest<'a> {
    pub messages: Vec<Message>,
    pub model: Option<&'a str>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub response_format: ResponseFormat,
}

#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn chat(&self, req: ChatRequest<'_>) -> anyhow::Result<LLMResponse>;

    fn default_model(&self) -> &str;

    /// Return accumulated provider metrics (requests, tokens, errors).
    /// Default returns zeroed metrics for providers that don't track them.
    fn metrics(&self) -> ProviderMetrics {
        ProviderMetrics::default()
    }

    /// `chat`, retried while the failure is transient. Untyped errors come
    /// from the transport and count as transient.
    async fn chat_with_retry(
        &self,
        req: ChatRequest<'_>,
        retry_config: Option<RetryConfig>,
    ) -> anyhow::Result<LLMResponse> {
        let config = retry_config.unwrap_or_default();
        let mut attempt = 0;
        loop {
            debug!("chat request to {} (attempt {})", self.default_model(), attempt);
            let err = match self.chat(req.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) => e,
            };
            let typed = err.downcast_ref::<GridError>();
            if !typed.is_none_or(GridError::is_retryable) || attempt >= config.max_retries {
                return Err(err);
            }
            let retry_after = match typed {
                Some(GridError::RateLimit { retry_after }) => *retry_after,
                _ => None,
            };
            let delay = config.delay_for(attempt, retry_after);
            warn!(
                "chat attempt {}/{} failed ({}), retrying in {:?}",
                attempt + 1,
                config.max_retries + 1,
                err,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}
