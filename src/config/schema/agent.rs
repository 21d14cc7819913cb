use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::default_true;

fn default_hub_url() -> String {
    "http://mcp.psx".to_string()
}

fn default_login_client_id() -> String {
    "mcp_hub".to_string()
}

fn default_temperature() -> f32 {
    0.9
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_memory_window() -> usize {
    2000
}

fn default_result_record() -> usize {
    1000
}

fn default_bounded_text() -> usize {
    4000
}

fn default_pacing_secs() -> u64 {
    15
}

fn default_feed_limit() -> usize {
    10
}

fn default_loop_interval() -> u64 {
    60
}

fn default_hub_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentsConfig {
    /// Agent directories live here. Empty means `$GRIDHUB_HOME/agents`.
    #[serde(default, rename = "dataDir")]
    pub data_dir: String,
    #[serde(default = "default_hub_url", rename = "hubUrl")]
    pub hub_url: String,
    #[serde(default = "default_login_client_id", rename = "loginClientId")]
    pub login_client_id: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens", rename = "maxTokens")]
    pub max_tokens: u32,
    /// Trailing memory characters shown to the model.
    #[serde(default = "default_memory_window", rename = "memoryWindowChars")]
    pub memory_window_chars: usize,
    /// Characters of each tool result written to memory.
    #[serde(default = "default_result_record", rename = "resultRecordChars")]
    pub result_record_chars: usize,
    #[serde(default = "default_bounded_text", rename = "lastResultChars")]
    pub last_result_chars: usize,
    #[serde(default = "default_bounded_text", rename = "actionRecordChars")]
    pub action_record_chars: usize,
    /// Delay between two agents within one cycle.
    #[serde(default = "default_pacing_secs", rename = "pacingSecs")]
    pub pacing_secs: u64,
    #[serde(default = "default_feed_limit", rename = "feedLimit")]
    pub feed_limit: usize,
    #[serde(default = "default_loop_interval", rename = "loopIntervalSecs")]
    pub loop_interval_secs: u64,
    #[serde(default = "default_hub_timeout", rename = "hubTimeoutSecs")]
    pub hub_timeout_secs: u64,
}

impl AgentsConfig {
    pub fn data_path(&self) -> Result<PathBuf> {
        if self.data_dir.is_empty() {
            return Ok(crate::utils::get_gridhub_home()?.join("agents"));
        }
        Ok(crate::utils::expand_home(&self.data_dir))
    }
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            data_dir: String::new(),
            hub_url: default_hub_url(),
            login_client_id: default_login_client_id(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            memory_window_chars: default_memory_window(),
            result_record_chars: default_result_record(),
            last_result_chars: default_bounded_text(),
            action_record_chars: default_bounded_text(),
            pacing_secs: default_pacing_secs(),
            feed_limit: default_feed_limit(),
            loop_interval_secs: default_loop_interval(),
            hub_timeout_secs: default_hub_timeout(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProvisioningConfig {
    /// Shared secret for the identity service's system token endpoint.
    #[serde(default, rename = "systemSecret")]
    pub system_secret: String,
    #[serde(default = "default_true", rename = "issueSystemToken")]
    pub issue_system_token: bool,
}

redact_debug!(ProvisioningConfig, redact(system_secret), issue_system_token,);

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            system_secret: String::new(),
            issue_system_token: true,
        }
    }
}
