//! Typed HTTP access to the grid's backend services.
//!
//! Every call goes through [`ServiceClient::send`], which maps transport
//! failures, timeouts and non-success statuses onto [`GridError`] so callers
//! never see a raw `reqwest::Error`.

mod aether;
mod bank;
mod echo;
mod forge;
mod identity;
mod mail;
mod nexus;

pub use echo::FeedItem;

use crate::config::ServicesConfig;
use crate::errors::GridError;
use crate::utils::truncate_chars;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Longest backend error body echoed back to callers.
const MAX_ERROR_DETAIL_CHARS: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Identity,
    Bank,
    Echo,
    Mail,
    Aether,
    Nexus,
    Forge,
}

impl Service {
    pub fn name(self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Bank => "bank",
            Self::Echo => "echo",
            Self::Mail => "mail",
            Self::Aether => "aether",
            Self::Nexus => "nexus",
            Self::Forge => "forge",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A successful backend response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    fn from_body(body: String) -> Self {
        match serde_json::from_str::<Value>(&body) {
            Ok(v) => Self::Json(v),
            Err(_) => Self::Text(body),
        }
    }
}

#[derive(Clone)]
pub struct ServiceClient {
    client: Client,
    endpoints: ServicesConfig,
}

impl ServiceClient {
    pub fn new(endpoints: ServicesConfig, timeout: Duration) -> Self {
        Self {
            client: crate::utils::http::http_client(timeout),
            endpoints,
        }
    }

    pub fn endpoints(&self) -> &ServicesConfig {
        &self.endpoints
    }

    pub fn base(&self, service: Service) -> &str {
        let base = match service {
            Service::Identity => &self.endpoints.identity,
            Service::Bank => &self.endpoints.bank,
            Service::Echo => &self.endpoints.echo,
            Service::Mail => &self.endpoints.mail,
            Service::Aether => &self.endpoints.aether,
            Service::Nexus => &self.endpoints.nexus,
            Service::Forge => &self.endpoints.forge,
        };
        base.trim_end_matches('/')
    }

    fn request(
        &self,
        method: Method,
        service: Service,
        path: &str,
        token: Option<&str>,
    ) -> RequestBuilder {
        let url = format!("{}{}", self.base(service), path);
        let builder = self.client.request(method, url);
        match token {
            Some(t) => builder.bearer_auth(t),
            None => builder,
        }
    }

    fn get(&self, service: Service, path: &str, token: Option<&str>) -> RequestBuilder {
        self.request(Method::GET, service, path, token)
    }

    fn post(&self, service: Service, path: &str, token: Option<&str>) -> RequestBuilder {
        self.request(Method::POST, service, path, token)
    }

    /// Send a prepared request and shape the outcome.
    async fn send(&self, service: Service, builder: RequestBuilder) -> Result<Payload, GridError> {
        let resp = builder
            .send()
            .await
            .map_err(|e| transport_error(service, &e))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| transport_error(service, &e))?;
        debug!("{} responded {} ({} bytes)", service, status, body.len());

        if !status.is_success() {
            return Err(GridError::Backend {
                service: service.name().to_string(),
                status: status.as_u16(),
                message: error_detail(&body),
            });
        }
        Ok(Payload::from_body(body))
    }

    /// Like [`send`](Self::send) but insists on a JSON body.
    async fn send_json(&self, service: Service, builder: RequestBuilder) -> Result<Value, GridError> {
        match self.send(service, builder).await? {
            Payload::Json(v) => Ok(v),
            Payload::Text(body) => Err(GridError::Backend {
                service: service.name().to_string(),
                status: 200,
                message: format!("expected JSON, got: {}", truncate_chars(&body, 80)),
            }),
        }
    }
}

fn transport_error(service: Service, err: &reqwest::Error) -> GridError {
    if err.is_timeout() {
        return GridError::Timeout {
            service: service.name().to_string(),
        };
    }
    GridError::Transport {
        service: service.name().to_string(),
        message: err.to_string(),
    }
}

/// FastAPI-style `{"detail": ...}` when present, else the raw body.
fn error_detail(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body)
        && let Some(detail) = json.get("detail")
    {
        return match detail {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "(empty response)".to_string();
    }
    truncate_chars(trimmed, MAX_ERROR_DETAIL_CHARS).to_string()
}

#[cfg(test)]
mod tests;
