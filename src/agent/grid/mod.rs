//! The agent's view of the outside world: the hub plus the two services
//! it talks to directly (identity for login, echo for the shared feed).

use crate::config::Config;
use crate::errors::GridError;
use crate::hub::{ToolDescriptor, ToolResult};
use crate::services::{FeedItem, ServiceClient};
use crate::utils::http::http_client;
use crate::utils::truncate_chars;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait GridClient: Send + Sync {
    /// The hub's tool catalog.
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>>;

    /// Forward one call to the hub, authenticated with `credential`.
    async fn call_tool(
        &self,
        name: &str,
        arguments: &Value,
        credential: Option<&str>,
    ) -> Result<ToolResult>;

    /// Password grant against the identity service; returns a bearer token.
    async fn login(&self, username: &str, password: &str) -> Result<String, GridError>;

    /// Latest posts from the public feed.
    async fn recent_feed(&self, limit: usize) -> Result<Vec<FeedItem>>;
}

pub struct HttpGridClient {
    hub_url: String,
    http: Client,
    services: ServiceClient,
    login_client_id: String,
}

impl HttpGridClient {
    pub fn new(config: &Config) -> Self {
        let agents = &config.agents;
        Self {
            hub_url: agents.hub_url.trim_end_matches('/').to_string(),
            http: http_client(Duration::from_secs(agents.hub_timeout_secs)),
            services: ServiceClient::new(
                config.services.clone(),
                Duration::from_secs(config.hub.backend_timeout_secs),
            ),
            login_client_id: agents.login_client_id.clone(),
        }
    }
}

#[async_trait]
impl GridClient for HttpGridClient {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        let url = format!("{}/tools", self.hub_url);
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        if !resp.status().is_success() {
            bail!("hub returned {} for /tools", resp.status());
        }
        resp.json().await.context("hub sent an invalid tool catalog")
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: &Value,
        credential: Option<&str>,
    ) -> Result<ToolResult> {
        let url = format!("{}/call", self.hub_url);
        let mut req = self
            .http
            .post(&url)
            .json(&json!({"name": name, "arguments": arguments}));
        if let Some(token) = credential {
            req = req.bearer_auth(token);
        }
        debug!("forwarding {} to hub", name);
        let resp = req.send().await.with_context(|| format!("POST {url}"))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("hub returned {}: {}", status, truncate_chars(body.trim(), 300));
        }
        resp.json().await.context("hub sent an invalid call result")
    }

    async fn login(&self, username: &str, password: &str) -> Result<String, GridError> {
        self.services
            .password_token(username, password, &self.login_client_id)
            .await
    }

    async fn recent_feed(&self, limit: usize) -> Result<Vec<FeedItem>> {
        let limit = u32::try_from(limit).unwrap_or(u32::MAX);
        Ok(self.services.recent_posts(limit).await?)
    }
}
