use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, warn};

/// Session key used for bearer credentials that arrive without a session id.
pub const DIRECT_SESSION: &str = "direct";

/// Maps session ids to the bearer credential last seen on them.
///
/// Bindings are last-write-wins and live for the process lifetime. Expiry
/// is the identity service's business: a stale token surfaces as a backend
/// authentication error on the next call.
pub struct SessionBridge {
    state: Mutex<BridgeState>,
    global_fallback: bool,
}

#[derive(Default)]
struct BridgeState {
    bindings: HashMap<String, String>,
    latest: Option<String>,
}

impl SessionBridge {
    pub fn new(global_fallback: bool) -> Self {
        Self {
            state: Mutex::new(BridgeState::default()),
            global_fallback,
        }
    }

    pub fn bind(&self, session_id: &str, credential: &str) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        debug!(
            "binding session {} to credential {}...",
            session_id,
            credential_prefix(credential)
        );
        state
            .bindings
            .insert(session_id.to_string(), credential.to_string());
        state.latest = Some(credential.to_string());
    }

    pub fn resolve(&self, session_id: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .bindings
            .get(session_id)
            .cloned()
    }

    /// Most recently bound credential across all sessions.
    pub fn latest(&self) -> Option<String> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .latest
            .clone()
    }

    /// Resolve the credential for a call.
    ///
    /// With a session id only that session's binding counts. Without one,
    /// the process-wide latest credential is used when global fallback is
    /// enabled.
    pub fn resolve_for(&self, session_id: Option<&str>) -> Option<String> {
        match session_id {
            Some(id) => self.resolve(id),
            None if self.global_fallback => {
                let latest = self.latest();
                if latest.is_some() {
                    warn!("no session id on call; falling back to the latest bound credential");
                }
                latest
            }
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .bindings
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// First few characters of a credential, safe to log.
pub fn credential_prefix(credential: &str) -> &str {
    crate::utils::truncate_chars(credential, 8)
}
