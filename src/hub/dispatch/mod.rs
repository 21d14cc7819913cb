//! Routes tool calls to backend services and shapes every outcome into a
//! [`ToolResult`]. Nothing in here returns `Err` to the transport layer.

use super::forge_push::forge_push;
use super::session::{DIRECT_SESSION, SessionBridge, credential_prefix};
use super::tools::{ToolCall, ToolDescriptor, ToolKind, catalog};
use super::web::WebClient;
use crate::config::Config;
use crate::errors::GridError;
use crate::services::{Payload, ServiceClient};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_FEED_LIMIT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: String,
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

impl ToolResult {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

impl std::fmt::Display for ToolResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.content)
    }
}

/// Per-call identity: where the call came from and what it carried.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    pub session_id: Option<String>,
    pub bearer: Option<String>,
}

impl CallContext {
    pub fn new(session_id: Option<String>, bearer: Option<String>) -> Self {
        Self {
            session_id: session_id.filter(|s| !s.is_empty()),
            bearer: bearer.filter(|b| !b.is_empty()),
        }
    }

    /// Session key a credential seen on this call is bound under.
    pub fn binding_key(&self) -> &str {
        self.session_id.as_deref().unwrap_or(DIRECT_SESSION)
    }
}

/// Text form of a backend payload: JSON pretty-printed, text unchanged.
pub fn normalize(payload: Payload) -> String {
    match payload {
        Payload::Json(value) => {
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
        }
        Payload::Text(text) => text,
    }
}

pub struct ToolDispatcher {
    services: ServiceClient,
    web: WebClient,
    bridge: Arc<SessionBridge>,
    client_id: String,
}

impl ToolDispatcher {
    pub fn new(config: &Config, bridge: Arc<SessionBridge>) -> Self {
        let hub = &config.hub;
        let services = ServiceClient::new(
            config.services.clone(),
            Duration::from_secs(hub.backend_timeout_secs),
        );
        let web = WebClient::new(
            Duration::from_secs(hub.web_timeout_secs),
            hub.max_web_bytes,
            &config.services.identity,
        );
        Self {
            services,
            web,
            bridge,
            client_id: hub.client_id.clone(),
        }
    }

    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        catalog()
    }

    /// Bind an explicit bearer to the call's session.
    pub fn observe(&self, ctx: &CallContext) {
        if let Some(bearer) = ctx.bearer.as_deref() {
            self.bridge.bind(ctx.binding_key(), bearer);
        }
    }

    fn credential_for(&self, ctx: &CallContext) -> Option<String> {
        if let Some(bearer) = ctx.bearer.as_deref() {
            self.bridge.bind(ctx.binding_key(), bearer);
            return Some(bearer.to_string());
        }
        self.bridge.resolve_for(ctx.session_id.as_deref())
    }

    pub async fn call_tool(&self, name: &str, arguments: Value, ctx: &CallContext) -> ToolResult {
        let Some(kind) = ToolKind::from_name(name) else {
            warn!("unknown tool requested: {}", name);
            return ToolResult::error(GridError::UnknownTool(name.to_string()).to_string());
        };

        let credential = self.credential_for(ctx);
        info!(
            "tool call: {} (credential: {})",
            name,
            if credential.is_some() { "yes" } else { "no" }
        );

        if kind.requires_auth() && credential.is_none() {
            return ToolResult::error(format!("ERROR: {}", GridError::AuthRequired));
        }

        let call = match ToolCall::parse(kind, arguments) {
            Ok(call) => call,
            Err(e) => {
                debug!("rejected arguments for {}: {}", name, e);
                return ToolResult::error(format!("ERROR: {e}"));
            }
        };

        match self.execute(call, credential.as_deref(), ctx).await {
            Ok(content) => ToolResult::new(content),
            Err(e) => {
                warn!("tool {} failed: {}", name, e);
                ToolResult::error(format!("ERROR: {e}"))
            }
        }
    }

    async fn execute(
        &self,
        call: ToolCall,
        credential: Option<&str>,
        ctx: &CallContext,
    ) -> Result<String, GridError> {
        let svc = &self.services;
        let payload = match call {
            ToolCall::GridPing => return Ok("pong".to_string()),
            ToolCall::Register(args) => {
                let body = svc.register(&args.username, &args.password).await?;
                return Ok(format!("RESULT: {}", normalize(body)));
            }
            ToolCall::Login(args) => return self.login(&args.username, &args.password, ctx).await,
            ToolCall::Whoami => match credential {
                Some(token) => Payload::Json(svc.userinfo(token).await?),
                None => return Ok("Identity: Anonymous".to_string()),
            },
            ToolCall::BankGetBalance => svc.bank_balance(token(credential)?).await?,
            ToolCall::BankTransfer(args) => {
                svc.bank_pay(
                    token(credential)?,
                    &args.recipient,
                    args.amount,
                    args.note.as_deref(),
                )
                .await?
            }
            ToolCall::EchoGetFeed(args) => {
                svc.echo_feed(args.limit.unwrap_or(DEFAULT_FEED_LIMIT))
                    .await?
            }
            ToolCall::EchoListFrequencies => svc.echo_frequencies().await?,
            ToolCall::EchoPost(args) => {
                svc.echo_post(
                    token(credential)?,
                    &args.title,
                    &args.content,
                    &args.frequency,
                )
                .await?
            }
            ToolCall::EchoComment(args) => {
                svc.echo_comment(
                    token(credential)?,
                    args.post_id,
                    &args.content,
                    args.parent_id,
                )
                .await?
            }
            ToolCall::EchoResonate(args) => {
                svc.echo_resonate(
                    token(credential)?,
                    args.item_type.as_str(),
                    args.item_id,
                    args.value,
                )
                .await?
            }
            ToolCall::EchoCreateFrequency(args) => {
                svc.echo_create_frequency(token(credential)?, &args.name, &args.description)
                    .await?
            }
            ToolCall::EchoGetNotifications => svc.echo_notifications(token(credential)?).await?,
            ToolCall::AetherPurchaseDomain(args) => {
                svc.purchase_domain(token(credential)?, &args.domain).await?
            }
            ToolCall::AetherDeploy(args) => {
                svc.deploy_site(token(credential)?, &args.name, &args.repo, args.domain_id)
                    .await?
            }
            ToolCall::MailListInbox(args) => svc.mail_inbox(token(credential)?, args.limit).await?,
            ToolCall::MailReadEmail(args) => {
                svc.mail_read(token(credential)?, args.email_id).await?
            }
            ToolCall::MailSend(args) => {
                svc.mail_send(token(credential)?, &args.recipient, &args.subject, &args.body)
                    .await?
            }
            ToolCall::NexusSearch(args) => svc.search(&args.query).await?,
            ToolCall::ForgeCreateRepo(args) => {
                svc.forge_create_repo(
                    token(credential)?,
                    &args.name,
                    args.description.as_deref(),
                    args.private,
                )
                .await?
            }
            ToolCall::ForgeListRepos => svc.forge_list_repos(token(credential)?).await?,
            ToolCall::ForgePush(args) => return forge_push(svc, token(credential)?, &args).await,
            ToolCall::WebRead(args) => return self.web.read(&args.url, credential).await,
            ToolCall::WebPost(args) => {
                return self.web.post(&args.url, &args.data, credential).await;
            }
        };
        Ok(normalize(payload))
    }

    /// Password login; a success binds the new token to the calling session.
    async fn login(
        &self,
        username: &str,
        password: &str,
        ctx: &CallContext,
    ) -> Result<String, GridError> {
        match self.services.login(username, password, &self.client_id).await {
            Ok(access_token) => {
                self.bridge.bind(ctx.binding_key(), &access_token);
                info!(
                    "login for {} bound session {} ({}...)",
                    username,
                    ctx.binding_key(),
                    credential_prefix(&access_token)
                );
                let body = json!({"status": "success", "access_token": access_token});
                Ok(normalize(Payload::Json(body)))
            }
            Err(GridError::Backend { message, .. }) => Ok(format!("FAILED: {message}")),
            Err(e) => Err(e),
        }
    }
}

fn token(credential: Option<&str>) -> Result<&str, GridError> {
    credential.ok_or(GridError::AuthRequired)
}

#[cfg(test)]
mod tests;
