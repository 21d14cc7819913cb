use std::fmt;
use thiserror::Error;

/// Typed error hierarchy for gridhub.
///
/// Use at module boundaries (tool dispatch, provider calls, config validation).
/// Internal/leaf functions can continue using `anyhow::Result`; the `Internal`
/// variant allows seamless conversion via the `?` operator.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("{service} unreachable: {message}")]
    Transport { service: String, message: String },

    #[error("{service} timed out")]
    Timeout { service: String },

    #[error("Authentication required.")]
    AuthRequired,

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("malformed model output: {0}")]
    MalformedOutput(String),

    #[error("{service} returned {status}: {message}")]
    Backend {
        service: String,
        status: u16,
        message: String,
    },

    #[error("push failed during {stage}: {message}")]
    Push { stage: PushStage, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider error: {message}")]
    Provider { message: String, retryable: bool },

    #[error("Rate limit exceeded")]
    RateLimit { retry_after: Option<u64> },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl GridError {
    /// Whether this error is transient and the operation should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Provider { retryable, .. } => *retryable,
            Self::Backend { status, .. } => *status >= 500,
            Self::RateLimit { .. }
            | Self::Transport { .. }
            | Self::Timeout { .. }
            | Self::Internal(_) => true,
            Self::AuthRequired
            | Self::UnknownTool(_)
            | Self::InvalidArguments { .. }
            | Self::MalformedOutput(_)
            | Self::Push { .. }
            | Self::Config(_)
            | Self::Auth(_) => false,
        }
    }

    pub fn invalid_arguments(tool: &str, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.to_string(),
            message: message.into(),
        }
    }
}

/// Ordered stages of a repository push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushStage {
    ResolveIdentity,
    Init,
    Materialize,
    Commit,
    Push,
}

impl fmt::Display for PushStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ResolveIdentity => "resolve_identity",
            Self::Materialize => "materialize",
            Self::Init => "init",
            Self::Commit => "commit",
            Self::Push => "push",
        })
    }
}
