use serde::{Deserialize, Serialize};

use super::default_true;

fn default_identity() -> String {
    "http://id.psx".into()
}
fn default_bank() -> String {
    "http://bank.psx".into()
}
fn default_echo() -> String {
    "http://echo.psx".into()
}
fn default_mail() -> String {
    "http://mail.psx".into()
}
fn default_aether() -> String {
    "http://aether.psx".into()
}
fn default_nexus() -> String {
    "http://nexus.psx".into()
}
fn default_forge() -> String {
    "http://forge.psx".into()
}

/// Base URLs of the grid's backend services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesConfig {
    #[serde(default = "default_identity")]
    pub identity: String,
    #[serde(default = "default_bank")]
    pub bank: String,
    #[serde(default = "default_echo")]
    pub echo: String,
    #[serde(default = "default_mail")]
    pub mail: String,
    #[serde(default = "default_aether")]
    pub aether: String,
    #[serde(default = "default_nexus")]
    pub nexus: String,
    #[serde(default = "default_forge")]
    pub forge: String,
}

impl ServicesConfig {
    /// Every base URL pointed at one address. Handy for fakes.
    pub fn all_at(base: &str) -> Self {
        let base = base.trim_end_matches('/').to_string();
        Self {
            identity: base.clone(),
            bank: base.clone(),
            echo: base.clone(),
            mail: base.clone(),
            aether: base.clone(),
            nexus: base.clone(),
            forge: base,
        }
    }

    pub fn named(&self) -> [(&'static str, &str); 7] {
        [
            ("identity", &self.identity),
            ("bank", &self.bank),
            ("echo", &self.echo),
            ("mail", &self.mail),
            ("aether", &self.aether),
            ("nexus", &self.nexus),
            ("forge", &self.forge),
        ]
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            identity: default_identity(),
            bank: default_bank(),
            echo: default_echo(),
            mail: default_mail(),
            aether: default_aether(),
            nexus: default_nexus(),
            forge: default_forge(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_public_url() -> String {
    "http://mcp.psx".to_string()
}

fn default_client_id() -> String {
    "psx-grid-mcp".to_string()
}

fn default_backend_timeout() -> u64 {
    5
}

fn default_web_timeout() -> u64 {
    10
}

fn default_max_web_bytes() -> usize {
    crate::utils::http::DEFAULT_MAX_BODY_BYTES
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Externally visible base URL, advertised in discovery documents.
    #[serde(default = "default_public_url", rename = "publicUrl")]
    pub public_url: String,
    /// OAuth client id the hub presents to the identity service.
    #[serde(default = "default_client_id", rename = "clientId")]
    pub client_id: String,
    #[serde(default = "default_backend_timeout", rename = "backendTimeoutSecs")]
    pub backend_timeout_secs: u64,
    #[serde(default = "default_web_timeout", rename = "webTimeoutSecs")]
    pub web_timeout_secs: u64,
    #[serde(default = "default_max_web_bytes", rename = "maxWebBytes")]
    pub max_web_bytes: usize,
    /// Fall back to the most recently bound credential when a call names no
    /// session at all. Only sound for single-tenant deployments.
    #[serde(default = "default_true", rename = "globalCredentialFallback")]
    pub global_credential_fallback: bool,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: default_public_url(),
            client_id: default_client_id(),
            backend_timeout_secs: default_backend_timeout(),
            web_timeout_secs: default_web_timeout(),
            max_web_bytes: default_max_web_bytes(),
            global_credential_fallback: true,
        }
    }
}
