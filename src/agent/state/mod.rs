use crate::utils::atomic_write;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const INITIAL_LAST_RESULT: &str = "No actions performed yet.";

/// Mutable per-agent state, persisted as `state.json` after every change.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentState {
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub dormant_until: Option<DateTime<Utc>>,
    #[serde(default = "default_last_result")]
    pub last_action_result: String,
    /// Bearer token from the last successful login or provisioning.
    #[serde(default)]
    pub credential: Option<String>,
}

fn default_active() -> bool {
    true
}

fn default_last_result() -> String {
    INITIAL_LAST_RESULT.to_string()
}

impl Default for AgentState {
    fn default() -> Self {
        Self {
            active: true,
            dormant_until: None,
            last_action_result: default_last_result(),
            credential: None,
        }
    }
}

impl fmt::Debug for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentState")
            .field("active", &self.active)
            .field("dormant_until", &self.dormant_until)
            .field("last_action_result", &self.last_action_result)
            .field(
                "credential",
                &self.credential.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl AgentState {
    /// Load `state.json`, or the initial state when it doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("invalid state {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        atomic_write(path, &serde_json::to_string_pretty(self)?)
    }

    pub fn is_dormant_at(&self, now: DateTime<Utc>) -> bool {
        self.dormant_until.is_some_and(|until| now < until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_initial_state() {
        let dir = TempDir::new().unwrap();
        let state = AgentState::load(&dir.path().join("state.json")).unwrap();
        assert!(state.active);
        assert_eq!(state.last_action_result, INITIAL_LAST_RESULT);
    }

    #[test]
    fn persists_in_camel_case() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        let until = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let state = AgentState {
            dormant_until: Some(until),
            credential: Some("jwt".into()),
            ..Default::default()
        };
        state.save(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("dormantUntil"));
        assert!(raw.contains("lastActionResult"));
        assert_eq!(AgentState::load(&path).unwrap(), state);
    }

    #[test]
    fn dormancy_window_is_exclusive_at_the_end() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let state = AgentState {
            dormant_until: Some(now + Duration::seconds(300)),
            ..Default::default()
        };
        assert!(state.is_dormant_at(now + Duration::seconds(100)));
        assert!(!state.is_dormant_at(now + Duration::seconds(300)));
        assert!(!AgentState::default().is_dormant_at(now));
    }

    #[test]
    fn debug_hides_credential() {
        let state = AgentState {
            credential: Some("secret-token".into()),
            ..Default::default()
        };
        assert!(!format!("{state:?}").contains("secret-token"));
    }
}
