use serde::{Deserialize, Serialize};

use crate::errors::GridError;

/// Generates a `Debug` impl that redacts secret fields.
///
/// Field specifiers:
/// - `field_name`: printed normally via `&self.field_name`
/// - `redact(field_name)`: `String` field, shows `[empty]` or `[REDACTED]`
macro_rules! redact_debug {
    (@field $builder:ident, $self:ident, redact($field:ident)) => {
        $builder.field(
            stringify!($field),
            &if $self.$field.is_empty() {
                "[empty]"
            } else {
                "[REDACTED]"
            },
        );
    };
    (@field $builder:ident, $self:ident, $field:ident) => {
        $builder.field(stringify!($field), &$self.$field);
    };

    (@fields $builder:ident, $self:ident,) => {};
    (@fields $builder:ident, $self:ident, redact($field:ident), $($rest:tt)*) => {
        redact_debug!(@field $builder, $self, redact($field));
        redact_debug!(@fields $builder, $self, $($rest)*);
    };
    (@fields $builder:ident, $self:ident, $field:ident, $($rest:tt)*) => {
        redact_debug!(@field $builder, $self, $field);
        redact_debug!(@fields $builder, $self, $($rest)*);
    };

    ($struct_name:ident, $($fields:tt)*) => {
        impl std::fmt::Debug for $struct_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let mut builder = f.debug_struct(stringify!($struct_name));
                redact_debug!(@fields builder, self, $($fields)*);
                builder.finish()
            }
        }
    };
}

// Declared after the macro so they can use `redact_debug!`
mod agent;
mod providers;
mod services;

pub use agent::*;
pub use providers::*;
pub use services::*;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub services: ServicesConfig,
    #[serde(default)]
    pub hub: HubConfig,
    #[serde(default)]
    pub agents: AgentsConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub provisioning: ProvisioningConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), GridError> {
        self.validate_services()?;
        self.validate_hub()?;
        self.validate_agents()?;
        Ok(())
    }

    /// Fail fast when the agent runtime is started without a model key.
    pub fn require_gemini_key(&self) -> Result<&str, GridError> {
        let key = self.providers.gemini.api_key.as_str();
        if key.is_empty() {
            return Err(GridError::Config(
                "providers.gemini.apiKey is empty; set GRIDHUB_GEMINI_API_KEY or edit config.json"
                    .into(),
            ));
        }
        Ok(key)
    }

    fn validate_services(&self) -> Result<(), GridError> {
        for (name, base) in self.services.named() {
            let parsed = url::Url::parse(base).map_err(|e| {
                GridError::Config(format!("services.{name} is not a valid URL ({base}): {e}"))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(GridError::Config(format!(
                    "services.{name} must use http or https, got {}",
                    parsed.scheme()
                )));
            }
        }
        Ok(())
    }

    fn validate_hub(&self) -> Result<(), GridError> {
        let h = &self.hub;
        if h.port == 0 {
            return Err(GridError::Config("hub.port must be > 0".into()));
        }
        if h.backend_timeout_secs == 0 {
            return Err(GridError::Config("hub.backendTimeoutSecs must be > 0".into()));
        }
        if h.web_timeout_secs == 0 {
            return Err(GridError::Config("hub.webTimeoutSecs must be > 0".into()));
        }
        if h.max_web_bytes == 0 {
            return Err(GridError::Config("hub.maxWebBytes must be > 0".into()));
        }
        if h.client_id.is_empty() {
            return Err(GridError::Config("hub.clientId must not be empty".into()));
        }
        Ok(())
    }

    fn validate_agents(&self) -> Result<(), GridError> {
        let a = &self.agents;
        if a.max_tokens == 0 {
            return Err(GridError::Config("agents.maxTokens must be > 0".into()));
        }
        if a.temperature.is_nan() || a.temperature < 0.0 || a.temperature > 2.0 {
            return Err(GridError::Config(
                "agents.temperature must be a finite number between 0.0 and 2.0".into(),
            ));
        }
        for (field, value) in [
            ("memoryWindowChars", a.memory_window_chars),
            ("resultRecordChars", a.result_record_chars),
            ("lastResultChars", a.last_result_chars),
            ("actionRecordChars", a.action_record_chars),
            ("feedLimit", a.feed_limit),
        ] {
            if value == 0 {
                return Err(GridError::Config(format!("agents.{field} must be > 0")));
            }
        }
        if a.hub_timeout_secs == 0 || a.loop_interval_secs == 0 {
            return Err(GridError::Config(
                "agents.hubTimeoutSecs and agents.loopIntervalSecs must be > 0".into(),
            ));
        }
        url::Url::parse(&a.hub_url)
            .map_err(|e| GridError::Config(format!("agents.hubUrl is not a valid URL: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
