//! Transient PKCE proof persistence
//!
//! One slot, overwritten by every new sign-in. The slot is read by callback
//! processing and deleted by the orchestrator once the callback sequence
//! settles; this module only deletes on its own when a proof has outlived
//! its freshness window.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::pkce::ProofBundle;
use crate::storage::KeyValueStorage;

/// Fixed key for the transient proof slot.
pub const PROOF_SLOT_KEY: &str = "portico.auth.proof";

/// Proofs expire 10 minutes after creation.
pub const PROOF_TTL_MS: i64 = 10 * 60 * 1000;

/// On-disk shape of a persisted proof.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredProof {
    state: String,
    code_verifier: String,
    created_at: i64,
}

/// The still-secret half of a proof, as read back for callback processing.
#[derive(Debug, Clone)]
pub struct PendingProof {
    /// State generated at sign-in, to compare against the callback URL.
    pub state: String,
    /// Verifier to present at token exchange.
    pub code_verifier: String,
}

/// Time-boxed storage for PKCE proof material.
pub struct ProofStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl ProofStore {
    /// Create a proof store over the transient storage slot.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Persist a proof bundle, overwriting any prior unconsumed proof.
    pub fn persist(&self, bundle: &ProofBundle) {
        self.persist_at(bundle, Utc::now().timestamp_millis());
    }

    fn persist_at(&self, bundle: &ProofBundle, created_at: i64) {
        let record = StoredProof {
            state: bundle.state.clone(),
            code_verifier: bundle.code_verifier.clone(),
            created_at,
        };
        match serde_json::to_string(&record) {
            Ok(encoded) => {
                self.storage.set(PROOF_SLOT_KEY, &encoded);
                debug!("persisted PKCE proof material");
            }
            Err(e) => warn!(error = %e, "failed to encode PKCE proof material"),
        }
    }

    /// Read the persisted proof.
    ///
    /// Returns `None` when the slot is missing, malformed, or older than the
    /// freshness window. An expired proof is cleared as a side effect.
    /// A valid proof is *not* deleted here: consumption is the caller's
    /// responsibility, so that a failed exchange can still report the proof
    /// as having been present.
    #[must_use]
    pub fn retrieve(&self) -> Option<PendingProof> {
        let raw = self.storage.get(PROOF_SLOT_KEY)?;

        let record: StoredProof = match serde_json::from_str(&raw) {
            Ok(record) => record,
            Err(e) => {
                debug!(error = %e, "proof slot contained malformed data");
                return None;
            }
        };

        let age_ms = Utc::now().timestamp_millis() - record.created_at;
        if age_ms > PROOF_TTL_MS {
            debug!(age_ms, "persisted proof expired; clearing slot");
            self.clear();
            return None;
        }

        Some(PendingProof { state: record.state, code_verifier: record.code_verifier })
    }

    /// Remove the proof slot unconditionally; idempotent.
    pub fn clear(&self) {
        self.storage.remove(PROOF_SLOT_KEY);
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for proof_store.
    use super::*;
    use crate::testing::MemoryStorage;

    fn store() -> (ProofStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (ProofStore::new(storage.clone()), storage)
    }

    #[test]
    fn persist_then_retrieve_round_trips() {
        let (proofs, _) = store();
        let bundle = ProofBundle::generate();

        proofs.persist(&bundle);
        let pending = proofs.retrieve().unwrap();

        assert_eq!(pending.state, bundle.state);
        assert_eq!(pending.code_verifier, bundle.code_verifier);
    }

    #[test]
    fn retrieve_does_not_consume() {
        let (proofs, _) = store();
        proofs.persist(&ProofBundle::generate());

        assert!(proofs.retrieve().is_some());
        assert!(proofs.retrieve().is_some());
    }

    #[test]
    fn a_new_sign_in_overwrites_the_prior_proof() {
        let (proofs, _) = store();
        let first = ProofBundle::generate();
        let second = ProofBundle::generate();

        proofs.persist(&first);
        proofs.persist(&second);

        let pending = proofs.retrieve().unwrap();
        assert_eq!(pending.state, second.state);
    }

    #[test]
    fn expired_proof_is_absent_and_slot_is_cleared() {
        let (proofs, storage) = store();
        let bundle = ProofBundle::generate();

        // 11 minutes in the past, one past the 10-minute window.
        let created_at = Utc::now().timestamp_millis() - 11 * 60 * 1000;
        proofs.persist_at(&bundle, created_at);

        assert!(proofs.retrieve().is_none());
        assert!(storage.get(PROOF_SLOT_KEY).is_none());
    }

    #[test]
    fn malformed_slot_yields_absent() {
        let (proofs, storage) = store();
        storage.set(PROOF_SLOT_KEY, "{not json");

        assert!(proofs.retrieve().is_none());
    }

    #[test]
    fn slot_missing_either_field_yields_absent() {
        let (proofs, storage) = store();
        storage.set(PROOF_SLOT_KEY, r#"{"state":"st","createdAt":0}"#);

        assert!(proofs.retrieve().is_none());
    }

    #[test]
    fn clear_is_idempotent() {
        let (proofs, _) = store();
        proofs.clear();

        proofs.persist(&ProofBundle::generate());
        proofs.clear();
        proofs.clear();

        assert!(proofs.retrieve().is_none());
    }
}
