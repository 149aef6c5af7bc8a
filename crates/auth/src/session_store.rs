//! Durable session persistence
//!
//! A single origin-scoped slot holding the authenticated identity across
//! page loads. It is the sole source of truth for "is someone signed in"
//! between navigations; corrupt contents degrade silently to signed-out.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::KeyValueStorage;
use crate::types::AuthenticatedUser;

/// Fixed key for the durable session slot.
pub const SESSION_SLOT_KEY: &str = "portico.auth.session";

/// On-disk shape of a persisted session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    /// Access token from the completed exchange.
    pub access_token: String,
    /// Normalized identity at the time of sign-in.
    pub user: AuthenticatedUser,
    /// Milliseconds since the epoch at which the session was stored.
    pub stored_at: i64,
}

/// Durable storage for the authenticated session.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl SessionStore {
    /// Create a session store over the durable storage slot.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Persist the session, overwriting prior contents.
    pub fn save(&self, access_token: &str, user: &AuthenticatedUser) {
        let record = StoredSession {
            access_token: access_token.to_string(),
            user: user.clone(),
            stored_at: Utc::now().timestamp_millis(),
        };
        match serde_json::to_string(&record) {
            Ok(encoded) => {
                self.storage.set(SESSION_SLOT_KEY, &encoded);
                debug!("persisted session");
            }
            Err(e) => warn!(error = %e, "failed to encode session"),
        }
    }

    /// Load the persisted session.
    ///
    /// Returns `None` when the slot is missing or its contents fail to
    /// parse; the parse failure is swallowed and the caller behaves as
    /// freshly unauthenticated.
    #[must_use]
    pub fn load(&self) -> Option<StoredSession> {
        let raw = self.storage.get(SESSION_SLOT_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(error = %e, "session slot contained malformed data");
                None
            }
        }
    }

    /// Remove the session slot; idempotent.
    pub fn clear(&self) {
        self.storage.remove(SESSION_SLOT_KEY);
    }
}
