use crate::errors::GridError;
use crate::providers::base::ProviderMetrics;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tracing::{error, warn};

/// Common error handling utilities for LLM providers.
pub struct ProviderErrorHandler;

impl ProviderErrorHandler {
    /// Parse an API error body into a typed error.
    pub fn parse_api_error(status: u16, error_text: &str) -> GridError {
        let retryable = matches!(status, 500 | 502 | 503 | 504);

        // Gemini: {"error": {"code": 400, "message": "...", "status": "INVALID_ARGUMENT"}}
        if let Ok(error_json) = serde_json::from_str::<Value>(error_text)
            && let Some(err) = error_json.get("error")
        {
            let error_type = err
                .get("status")
                .or_else(|| err.get("type"))
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            let error_msg = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error");

            if error_type == "NOT_FOUND" && error_msg.contains("models/") {
                return GridError::Provider {
                    message: format!(
                        "{error_msg}\nCheck providers.gemini.model in config.json (default: gemini-2.5-flash-lite)."
                    ),
                    retryable: false,
                };
            }

            return GridError::Provider {
                message: format!("API error ({}): {}", error_type, error_msg),
                retryable,
            };
        }

        GridError::Provider {
            message: format!("API error ({}): {}", status, error_text),
            retryable,
        }
    }

    /// Check HTTP status and return a typed error if the response is not successful.
    /// On error, consumes the response body to extract error details.
    pub async fn check_http_status(
        resp: reqwest::Response,
        provider: &str,
    ) -> Result<reqwest::Response, GridError> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let retry_after = resp
            .headers()
            .get("retry-after")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());

        let error_text = resp
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());

        if status == 429 {
            warn!("{} rate limit hit (retry after {:?}s)", provider, retry_after);
            return Err(GridError::RateLimit { retry_after });
        }

        if status == 401 || status == 403 {
            error!("{} rejected credentials (status {})", provider, status);
            return Err(GridError::Auth(format!(
                "Authentication failed. Please check your API key. Error: {}",
                error_text
            )));
        }

        error!("{} provider error: HTTP {}", provider, status);
        Err(Self::parse_api_error(status.as_u16(), &error_text))
    }

    /// Check an HTTP response for errors and return the body as JSON on success.
    pub async fn check_response(
        resp: reqwest::Response,
        provider: &str,
        metrics: &Arc<Mutex<ProviderMetrics>>,
    ) -> anyhow::Result<Value> {
        let resp = match Self::check_http_status(resp, provider).await {
            Ok(resp) => resp,
            Err(e) => {
                Self::bump_errors(metrics);
                return Err(e.into());
            }
        };

        let json: Value = resp
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse {} API response: {}", provider, e))?;

        if let Some(error_val) = json.get("error") {
            Self::bump_errors(metrics);
            let error_text =
                serde_json::to_string(&serde_json::json!({ "error": error_val }))
                    .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Self::parse_api_error(200, &error_text).into());
        }

        Ok(json)
    }

    fn bump_errors(metrics: &Arc<Mutex<ProviderMetrics>>) {
        metrics
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .error_count += 1;
    }
}
