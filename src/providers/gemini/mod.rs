use crate::config::GeminiConfig;
use crate::providers::base::{
    ChatRequest, LLMProvider, LLMResponse, ProviderMetrics, ResponseFormat,
};
use crate::providers::errors::ProviderErrorHandler;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

const DEFAULT_MODEL: &str = "gemini-2.5-flash-lite";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiProvider {
    api_key: String,
    default_model: String,
    base_url: String,
    client: Client,
    metrics: Arc<Mutex<ProviderMetrics>>,
}

impl GeminiProvider {
    pub fn new(api_key: String, default_model: Option<String>) -> Self {
        Self::with_base_url(api_key, default_model, BASE_URL.to_string())
    }

    pub fn from_config(config: &GeminiConfig) -> Self {
        Self::with_base_url(
            config.api_key.clone(),
            Some(config.model.clone()),
            config.api_base.clone(),
        )
    }

    fn with_base_url(api_key: String, default_model: Option<String>, base_url: String) -> Self {
        Self {
            api_key,
            default_model: default_model
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: super::provider_http_client(),
            metrics: Arc::new(Mutex::new(ProviderMetrics::default())),
        }
    }

    fn build_payload(req: &ChatRequest<'_>) -> Value {
        let system_text = req
            .messages
            .iter()
            .filter(|m| m.role == "system")
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let contents: Vec<Value> = req
            .messages
            .iter()
            .filter(|m| m.role != "system")
            .map(|msg| {
                let role = if msg.role == "assistant" { "model" } else { "user" };
                json!({"role": role, "parts": [{"text": msg.content}]})
            })
            .collect();

        let mut generation_config = json!({
            "maxOutputTokens": req.max_tokens,
            "temperature": req.temperature,
        });
        if req.response_format == ResponseFormat::JsonObject {
            generation_config["response_mime_type"] = json!("application/json");
        }

        let mut payload = json!({
            "contents": contents,
            "generationConfig": generation_config,
        });
        if !system_text.is_empty() {
            payload["system_instruction"] = json!({"parts": [{"text": system_text}]});
        }
        payload
    }

    fn parse_response(json: &Value) -> Result<LLMResponse> {
        let candidate = json["candidates"]
            .as_array()
            .and_then(|arr| arr.first())
            .context("No candidates in Gemini response")?;

        let content = candidate["content"]["parts"].as_array().map(|parts| {
            parts
                .iter()
                .filter_map(|p| p["text"].as_str())
                .collect::<Vec<_>>()
                .concat()
        });

        let usage = &json["usageMetadata"];
        Ok(LLMResponse {
            content: content.filter(|c| !c.is_empty()),
            input_tokens: usage["promptTokenCount"].as_u64(),
            output_tokens: usage["candidatesTokenCount"].as_u64(),
        })
    }
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    async fn chat(&self, req: ChatRequest<'_>) -> Result<LLMResponse> {
        let payload = Self::build_payload(&req);
        let model_name = req.model.unwrap_or(&self.default_model);
        let url = format!("{}/models/{}:generateContent", self.base_url, model_name);

        let resp = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .send()
            .await
            .context("Failed to send request to Gemini API")?;

        let json = ProviderErrorHandler::check_response(resp, "Gemini", &self.metrics).await?;

        {
            let mut metrics = self
                .metrics
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            metrics.request_count += 1;
            if let Some(tokens) = json["usageMetadata"]["totalTokenCount"].as_u64() {
                metrics.token_count += tokens;
            }
        }

        Self::parse_response(&json)
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn metrics(&self) -> ProviderMetrics {
        self.metrics
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests;
