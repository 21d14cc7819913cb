//! The hub's closed tool catalog.
//!
//! [`ToolKind`] is the exhaustive list of tool names; [`ToolCall`] pairs a
//! kind with its decoded, validated arguments. Dispatch matches on
//! `ToolCall`, so adding a tool without wiring it is a compile error.

mod args;

pub use args::*;

use crate::errors::GridError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

macro_rules! tool_kinds {
    ($( $variant:ident => $name:literal ),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ToolKind {
            $($variant),*
        }

        impl ToolKind {
            /// Catalog order.
            pub const ALL: &'static [ToolKind] = &[$(ToolKind::$variant),*];

            pub fn name(self) -> &'static str {
                match self {
                    $(ToolKind::$variant => $name),*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(ToolKind::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

tool_kinds! {
    GridPing => "grid_ping",
    Register => "register",
    Login => "login",
    Whoami => "whoami",
    BankGetBalance => "bank_get_balance",
    BankTransfer => "bank_transfer",
    EchoGetFeed => "echo_get_feed",
    EchoListFrequencies => "echo_list_frequencies",
    EchoPost => "echo_post",
    EchoComment => "echo_comment",
    EchoResonate => "echo_resonate",
    EchoCreateFrequency => "echo_create_frequency",
    EchoGetNotifications => "echo_get_notifications",
    AetherPurchaseDomain => "aether_purchase_domain",
    AetherDeploy => "aether_deploy",
    MailListInbox => "mail_list_inbox",
    MailReadEmail => "mail_read_email",
    MailSend => "mail_send",
    NexusSearch => "nexus_search",
    ForgeCreateRepo => "forge_create_repo",
    ForgeListRepos => "forge_list_repos",
    ForgePush => "forge_push",
    WebRead => "web_read",
    WebPost => "web_post",
}

impl ToolKind {
    /// Tools that run without a bridged credential.
    pub fn requires_auth(self) -> bool {
        !matches!(
            self,
            Self::GridPing
                | Self::Register
                | Self::Login
                | Self::Whoami
                | Self::EchoGetFeed
                | Self::EchoListFrequencies
                | Self::NexusSearch
        )
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::GridPing => "Test grid connectivity.",
            Self::Register => "Create a new identity.",
            Self::Login => "Authenticate with the PSX Grid.",
            Self::Whoami => "Get current user.",
            Self::BankGetBalance => "Check VOX balance.",
            Self::BankTransfer => "Send VOX.",
            Self::EchoGetFeed => "Read social feed.",
            Self::EchoListFrequencies => "List communities.",
            Self::EchoPost => "Post transmission.",
            Self::EchoComment => "Comment on post.",
            Self::EchoResonate => "Vote on item.",
            Self::EchoCreateFrequency => "Create frequency.",
            Self::EchoGetNotifications => "Check notifications.",
            Self::AetherPurchaseDomain => "Buy .psx domain.",
            Self::AetherDeploy => "Deploy site.",
            Self::MailListInbox => "List mail.",
            Self::MailReadEmail => "Read email.",
            Self::MailSend => "Send email.",
            Self::NexusSearch => "Search grid.",
            Self::ForgeCreateRepo => "Create a new repository on forge.psx.",
            Self::ForgeListRepos => "List your repositories on forge.psx.",
            Self::ForgePush => "Push code to a repository on forge.psx using git.",
            Self::WebRead => "Read the text content of a URL.",
            Self::WebPost => "Submit a POST request to a URL.",
        }
    }

    /// JSON-schema object describing the tool's arguments.
    pub fn input_schema(self) -> Value {
        match self {
            Self::GridPing
            | Self::Whoami
            | Self::BankGetBalance
            | Self::EchoListFrequencies
            | Self::EchoGetNotifications
            | Self::ForgeListRepos => empty_schema(),
            Self::Register => json!({
                "type": "object",
                "properties": {
                    "username": {"type": "string"},
                    "password": {"type": "string"}
                },
                "required": ["username", "password"]
            }),
            Self::Login => json!({
                "type": "object",
                "properties": {
                    "username": {"type": "string"},
                    "password": {"type": "string"},
                    "as_agent": {"type": "boolean", "default": true}
                },
                "required": ["username", "password"]
            }),
            Self::BankTransfer => json!({
                "type": "object",
                "properties": {
                    "recipient": {"type": "string"},
                    "amount": {"type": "number"},
                    "note": {"type": "string"}
                },
                "required": ["recipient", "amount"]
            }),
            Self::EchoGetFeed | Self::MailListInbox => json!({
                "type": "object",
                "properties": {"limit": {"type": "integer"}}
            }),
            Self::EchoPost => json!({
                "type": "object",
                "properties": {
                    "title": {"type": "string"},
                    "content": {"type": "string"},
                    "frequency": {"type": "string", "default": "main"}
                },
                "required": ["title", "content"]
            }),
            Self::EchoComment => json!({
                "type": "object",
                "properties": {
                    "post_id": {"type": "integer"},
                    "content": {"type": "string"},
                    "parent_id": {"type": "integer"}
                },
                "required": ["post_id", "content"]
            }),
            Self::EchoResonate => json!({
                "type": "object",
                "properties": {
                    "item_type": {"type": "string", "enum": ["post", "comment"]},
                    "item_id": {"type": "integer"},
                    "value": {"type": "integer", "enum": [1, -1, 0]}
                },
                "required": ["item_type", "item_id", "value"]
            }),
            Self::EchoCreateFrequency => json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "description": {"type": "string"}
                },
                "required": ["name", "description"]
            }),
            Self::AetherPurchaseDomain => json!({
                "type": "object",
                "properties": {"domain": {"type": "string"}},
                "required": ["domain"]
            }),
            Self::AetherDeploy => json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "repo": {"type": "string"},
                    "domain_id": {"type": "integer"}
                },
                "required": ["name", "repo", "domain_id"]
            }),
            Self::MailReadEmail => json!({
                "type": "object",
                "properties": {"email_id": {"type": "integer"}},
                "required": ["email_id"]
            }),
            Self::MailSend => json!({
                "type": "object",
                "properties": {
                    "recipient": {"type": "string"},
                    "subject": {"type": "string"},
                    "body": {"type": "string"}
                },
                "required": ["recipient", "subject", "body"]
            }),
            Self::NexusSearch => json!({
                "type": "object",
                "properties": {"query": {"type": "string"}},
                "required": ["query"]
            }),
            Self::ForgeCreateRepo => json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "description": {"type": "string"},
                    "private": {"type": "boolean", "default": false}
                },
                "required": ["name"]
            }),
            Self::ForgePush => json!({
                "type": "object",
                "properties": {
                    "repo_name": {"type": "string"},
                    "files": {"type": "object", "description": "Mapping of filenames to content"},
                    "commit_message": {"type": "string"}
                },
                "required": ["repo_name", "files"]
            }),
            Self::WebRead => json!({
                "type": "object",
                "properties": {"url": {"type": "string"}},
                "required": ["url"]
            }),
            Self::WebPost => json!({
                "type": "object",
                "properties": {
                    "url": {"type": "string"},
                    "data": {"type": "object"}
                },
                "required": ["url", "data"]
            }),
        }
    }

    pub fn descriptor(self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

fn empty_schema() -> Value {
    json!({"type": "object", "properties": {}})
}

/// One catalog entry as served on `GET /tools` and `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "inputSchema", default = "empty_schema")]
    pub input_schema: Value,
}

/// The full static catalog.
pub fn catalog() -> Vec<ToolDescriptor> {
    ToolKind::ALL.iter().map(|k| k.descriptor()).collect()
}

/// A tool invocation with decoded arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    GridPing,
    Register(Credentials),
    Login(LoginArgs),
    Whoami,
    BankGetBalance,
    BankTransfer(TransferArgs),
    EchoGetFeed(LimitArgs),
    EchoListFrequencies,
    EchoPost(PostArgs),
    EchoComment(CommentArgs),
    EchoResonate(ResonateArgs),
    EchoCreateFrequency(FrequencyArgs),
    EchoGetNotifications,
    AetherPurchaseDomain(DomainArgs),
    AetherDeploy(DeployArgs),
    MailListInbox(LimitArgs),
    MailReadEmail(ReadEmailArgs),
    MailSend(SendMailArgs),
    NexusSearch(SearchArgs),
    ForgeCreateRepo(CreateRepoArgs),
    ForgeListRepos,
    ForgePush(PushArgs),
    WebRead(WebReadArgs),
    WebPost(WebPostArgs),
}

impl ToolCall {
    /// Decode and validate `arguments` for `kind`. A JSON `null` counts as
    /// an empty object.
    pub fn parse(kind: ToolKind, arguments: Value) -> Result<Self, GridError> {
        let arguments = match arguments {
            Value::Null => Value::Object(Default::default()),
            Value::Object(_) => arguments,
            other => {
                return Err(GridError::invalid_arguments(
                    kind.name(),
                    format!("expected an object, got {other}"),
                ));
            }
        };

        let call = match kind {
            ToolKind::GridPing => Self::GridPing,
            ToolKind::Register => Self::Register(decode(kind, arguments)?),
            ToolKind::Login => Self::Login(decode(kind, arguments)?),
            ToolKind::Whoami => Self::Whoami,
            ToolKind::BankGetBalance => Self::BankGetBalance,
            ToolKind::BankTransfer => Self::BankTransfer(decode(kind, arguments)?),
            ToolKind::EchoGetFeed => Self::EchoGetFeed(decode(kind, arguments)?),
            ToolKind::EchoListFrequencies => Self::EchoListFrequencies,
            ToolKind::EchoPost => Self::EchoPost(decode(kind, arguments)?),
            ToolKind::EchoComment => Self::EchoComment(decode(kind, arguments)?),
            ToolKind::EchoResonate => Self::EchoResonate(decode(kind, arguments)?),
            ToolKind::EchoCreateFrequency => Self::EchoCreateFrequency(decode(kind, arguments)?),
            ToolKind::EchoGetNotifications => Self::EchoGetNotifications,
            ToolKind::AetherPurchaseDomain => {
                Self::AetherPurchaseDomain(decode(kind, arguments)?)
            }
            ToolKind::AetherDeploy => Self::AetherDeploy(decode(kind, arguments)?),
            ToolKind::MailListInbox => Self::MailListInbox(decode(kind, arguments)?),
            ToolKind::MailReadEmail => Self::MailReadEmail(decode(kind, arguments)?),
            ToolKind::MailSend => Self::MailSend(decode(kind, arguments)?),
            ToolKind::NexusSearch => Self::NexusSearch(decode(kind, arguments)?),
            ToolKind::ForgeCreateRepo => Self::ForgeCreateRepo(decode(kind, arguments)?),
            ToolKind::ForgeListRepos => Self::ForgeListRepos,
            ToolKind::ForgePush => Self::ForgePush(decode(kind, arguments)?),
            ToolKind::WebRead => Self::WebRead(decode(kind, arguments)?),
            ToolKind::WebPost => Self::WebPost(decode(kind, arguments)?),
        };
        Ok(call)
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            Self::GridPing => ToolKind::GridPing,
            Self::Register(_) => ToolKind::Register,
            Self::Login(_) => ToolKind::Login,
            Self::Whoami => ToolKind::Whoami,
            Self::BankGetBalance => ToolKind::BankGetBalance,
            Self::BankTransfer(_) => ToolKind::BankTransfer,
            Self::EchoGetFeed(_) => ToolKind::EchoGetFeed,
            Self::EchoListFrequencies => ToolKind::EchoListFrequencies,
            Self::EchoPost(_) => ToolKind::EchoPost,
            Self::EchoComment(_) => ToolKind::EchoComment,
            Self::EchoResonate(_) => ToolKind::EchoResonate,
            Self::EchoCreateFrequency(_) => ToolKind::EchoCreateFrequency,
            Self::EchoGetNotifications => ToolKind::EchoGetNotifications,
            Self::AetherPurchaseDomain(_) => ToolKind::AetherPurchaseDomain,
            Self::AetherDeploy(_) => ToolKind::AetherDeploy,
            Self::MailListInbox(_) => ToolKind::MailListInbox,
            Self::MailReadEmail(_) => ToolKind::MailReadEmail,
            Self::MailSend(_) => ToolKind::MailSend,
            Self::NexusSearch(_) => ToolKind::NexusSearch,
            Self::ForgeCreateRepo(_) => ToolKind::ForgeCreateRepo,
            Self::ForgeListRepos => ToolKind::ForgeListRepos,
            Self::ForgePush(_) => ToolKind::ForgePush,
            Self::WebRead(_) => ToolKind::WebRead,
            Self::WebPost(_) => ToolKind::WebPost,
        }
    }
}

#[cfg(test)]
mod tests;
