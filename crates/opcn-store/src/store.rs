//! # Onchain Store
//!
//! All three collections live behind one `RwLock`: binding upserts and
//! capsule verification are read-modify-write sequences whose key lookup and
//! mutation must be atomic, and a single lock over the snapshot gives every
//! operation compare-and-swap semantics without per-collection coordination.
//!
//! Lock scope stays inside each method; nothing returned borrows the guard.

use std::sync::Arc;

use parking_lot::RwLock;

use opcn_core::{
    record_id, Binding, BindingDraft, Capsule, CapsuleDraft, Credential, VerifyStatus,
    WalletAddress,
};
use opcn_crypto::{digests_match, mock_tx_hash, proof_hash};

use crate::snapshot::{OnchainSnapshot, StoreCounts};

/// Shared handle over the onchain collections. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct OnchainStore {
    inner: Arc<RwLock<OnchainSnapshot>>,
}

/// Result of verifying a capsule against its agent's current binding.
#[derive(Debug, Clone, PartialEq)]
pub enum VerifyOutcome {
    /// No capsule with the given id. Nothing was mutated.
    NotFound,
    /// The agent slug has no binding to verify against. Nothing was mutated.
    BindingMissing,
    /// The digest was recomputed and the capsule's status updated.
    Checked { ok: bool, capsule: Capsule },
}

/// Per-status capsule counts, scraped into metrics gauges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapsuleStatusCounts {
    pub unverified: usize,
    pub ok: usize,
    pub failed: usize,
}

impl OnchainStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated from a persisted snapshot.
    pub fn from_snapshot(snapshot: OnchainSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(snapshot)),
        }
    }

    // ---- bindings ----

    /// Insert or overwrite the binding for `(agent_slug, address)`.
    ///
    /// The key compares the address lower-cased. An overwrite keeps the
    /// existing record's id; a fresh binding gets a new id and goes to the
    /// front of the list. The whole sequence runs under one write lock.
    pub fn upsert_binding(&self, draft: BindingDraft) -> Binding {
        let mut guard = self.inner.write();
        let existing = guard
            .bindings
            .iter()
            .position(|b| b.is_for(&draft.agent_slug, &draft.address));
        match existing {
            Some(pos) => {
                let id = guard.bindings[pos].id.clone();
                let binding = draft.into_binding(id);
                guard.bindings[pos] = binding.clone();
                binding
            }
            None => {
                let binding = draft.into_binding(record_id("bind"));
                guard.bindings.insert(0, binding.clone());
                binding
            }
        }
    }

    /// All bindings held by the address, newest first.
    pub fn bindings_by_address(&self, address: &str) -> Vec<Binding> {
        self.inner
            .read()
            .bindings
            .iter()
            .filter(|b| b.address.matches_str(address))
            .cloned()
            .collect()
    }

    /// The first binding recorded for the agent slug, regardless of who
    /// holds it. This is what the capsule verifier resolves against.
    pub fn binding_by_agent(&self, agent_slug: &str) -> Option<Binding> {
        self.inner
            .read()
            .bindings
            .iter()
            .find(|b| b.agent_slug == agent_slug)
            .cloned()
    }

    // ---- credentials ----

    /// Mint a credential for the address, or return the existing one.
    ///
    /// Idempotent per lower-cased address: the second mint hands back the
    /// first record unchanged, token id and all.
    pub fn mint_credential(&self, address: WalletAddress) -> Credential {
        let mut guard = self.inner.write();
        if let Some(existing) = guard.credentials.iter().find(|c| c.address.matches(&address)) {
            return existing.clone();
        }
        let credential = Credential::mint(address);
        guard.credentials.insert(0, credential.clone());
        credential
    }

    pub fn credential_by_address(&self, address: &str) -> Option<Credential> {
        self.inner
            .read()
            .credentials
            .iter()
            .find(|c| c.address.matches_str(address))
            .cloned()
    }

    // ---- capsules ----

    /// Store a submitted capsule: assigns its id and mock transaction hash,
    /// starts it `unverified`, and puts it at the front of the list.
    pub fn create_capsule(&self, draft: CapsuleDraft) -> Capsule {
        let capsule = draft.into_capsule(record_id("capsule"), mock_tx_hash());
        self.inner.write().capsules.insert(0, capsule.clone());
        capsule
    }

    /// Capsules published against the agent slug, newest first.
    pub fn capsules_by_slug(&self, agent_slug: &str) -> Vec<Capsule> {
        self.inner
            .read()
            .capsules
            .iter()
            .filter(|c| c.agent_slug == agent_slug)
            .cloned()
            .collect()
    }

    pub fn capsule(&self, id: &str) -> Option<Capsule> {
        self.inner.read().capsules.iter().find(|c| c.id == id).cloned()
    }

    /// Re-verify a capsule against the agent's current binding.
    ///
    /// Recomputes the proof digest from the binding's claim hash at the
    /// moment of the call, so verification is live: a `failed` capsule flips
    /// to `ok` once the binding is corrected and this is invoked again.
    /// Digest comparison ignores hex case.
    pub fn verify_capsule(&self, id: &str, agent_slug: &str) -> VerifyOutcome {
        let mut guard = self.inner.write();
        let Some(pos) = guard.capsules.iter().position(|c| c.id == id) else {
            return VerifyOutcome::NotFound;
        };
        let Some(claim_hash) = guard
            .bindings
            .iter()
            .find(|b| b.agent_slug == agent_slug)
            .map(|b| b.claim_hash.clone())
        else {
            return VerifyOutcome::BindingMissing;
        };

        let capsule = &mut guard.capsules[pos];
        let expected = proof_hash(&capsule.result, &claim_hash, &capsule.created_at);
        let ok = digests_match(&expected, &capsule.proof_hash);
        capsule.verify_status = if ok { VerifyStatus::Ok } else { VerifyStatus::Failed };
        VerifyOutcome::Checked {
            ok,
            capsule: capsule.clone(),
        }
    }

    // ---- snapshot / reset / counts ----

    /// A deep copy of the current state, for persistence write-back.
    pub fn snapshot(&self) -> OnchainSnapshot {
        self.inner.read().clone()
    }

    /// Replace the entire state with a persisted snapshot.
    pub fn restore(&self, snapshot: OnchainSnapshot) {
        *self.inner.write() = snapshot;
    }

    /// Empty all collections, returning how many records each held.
    pub fn reset(&self) -> StoreCounts {
        let mut guard = self.inner.write();
        let counts = guard.counts();
        *guard = OnchainSnapshot::default();
        counts
    }

    pub fn counts(&self) -> StoreCounts {
        self.inner.read().counts()
    }

    pub fn capsule_status_counts(&self) -> CapsuleStatusCounts {
        let guard = self.inner.read();
        let mut counts = CapsuleStatusCounts::default();
        for capsule in &guard.capsules {
            match capsule.verify_status {
                VerifyStatus::Unverified => counts.unverified += 1,
                VerifyStatus::Ok => counts.ok += 1,
                VerifyStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opcn_core::{BindingStatus, CapsuleType};

    fn binding_draft(slug: &str, address: &str, claim_hash: &str) -> BindingDraft {
        BindingDraft {
            address: WalletAddress::new(address),
            chain_id: 11155111,
            agent_slug: slug.into(),
            claim_hash: claim_hash.into(),
            signature: "0xsig".into(),
            created_at: "2024-01-01T00:00:00.000Z".into(),
            status: BindingStatus::Verified,
        }
    }

    fn capsule_draft(slug: &str, result: &str, proof_hash: &str) -> CapsuleDraft {
        CapsuleDraft {
            agent_slug: slug.into(),
            owner_address: WalletAddress::new("0xOwner"),
            capsule_type: CapsuleType::DeliveryProof,
            result: result.into(),
            proof_hash: proof_hash.into(),
            created_at: "2024-01-02T00:00:00.000Z".into(),
        }
    }

    #[test]
    fn upsert_overwrites_keeping_original_id() {
        let store = OnchainStore::new();
        let first = store.upsert_binding(binding_draft("agent-a", "0xAbc", "0x111"));
        let second = store.upsert_binding(binding_draft("agent-a", "0xABC", "0x222"));
        assert_eq!(second.id, first.id);
        assert_eq!(second.claim_hash, "0x222");
        assert_eq!(store.counts().bindings, 1);
    }

    #[test]
    fn distinct_keys_insert_at_front() {
        let store = OnchainStore::new();
        store.upsert_binding(binding_draft("agent-a", "0xaaa", "0x1"));
        store.upsert_binding(binding_draft("agent-b", "0xaaa", "0x2"));
        store.upsert_binding(binding_draft("agent-a", "0xbbb", "0x3"));
        let by_address = store.bindings_by_address("0xAAA");
        assert_eq!(by_address.len(), 2);
        assert_eq!(by_address[0].agent_slug, "agent-b");
        assert_eq!(store.counts().bindings, 3);
    }

    #[test]
    fn binding_by_agent_returns_first_match() {
        let store = OnchainStore::new();
        store.upsert_binding(binding_draft("agent-a", "0xolder", "0xold"));
        store.upsert_binding(binding_draft("agent-a", "0xnewer", "0xnew"));
        let found = store.binding_by_agent("agent-a").unwrap();
        assert_eq!(found.claim_hash, "0xnew");
        assert!(store.binding_by_agent("missing").is_none());
    }

    #[test]
    fn mint_is_idempotent_per_address_case_insensitive() {
        let store = OnchainStore::new();
        let first = store.mint_credential(WalletAddress::new("0xAbC"));
        let second = store.mint_credential(WalletAddress::new("0xabc"));
        assert_eq!(second, first);
        assert_eq!(store.counts().credentials, 1);
        assert_eq!(
            store.credential_by_address("0xABC").unwrap().token_id,
            first.token_id
        );
    }

    #[test]
    fn create_capsule_assigns_id_tx_hash_and_unverified() {
        let store = OnchainStore::new();
        let capsule = store.create_capsule(capsule_draft("agent-a", "done", "0xproof"));
        assert!(capsule.id.starts_with("capsule-"));
        assert_eq!(capsule.verify_status, VerifyStatus::Unverified);
        let tx = capsule.tx_hash.as_deref().unwrap();
        assert_eq!(tx.len(), 66);
        assert!(tx.starts_with("0x"));
        assert_eq!(store.capsules_by_slug("agent-a"), vec![capsule]);
    }

    #[test]
    fn verify_unknown_capsule_is_not_found() {
        let store = OnchainStore::new();
        assert_eq!(store.verify_capsule("capsule-missing", "agent-a"), VerifyOutcome::NotFound);
    }

    #[test]
    fn verify_without_binding_reports_binding_missing_and_mutates_nothing() {
        let store = OnchainStore::new();
        let capsule = store.create_capsule(capsule_draft("agent-a", "done", "0xproof"));
        assert_eq!(
            store.verify_capsule(&capsule.id, "agent-a"),
            VerifyOutcome::BindingMissing
        );
        assert_eq!(
            store.capsule(&capsule.id).unwrap().verify_status,
            VerifyStatus::Unverified
        );
    }

    #[test]
    fn verify_matches_recomputed_digest() {
        let store = OnchainStore::new();
        store.upsert_binding(binding_draft("agent-a", "0xabc", "0xclaim"));
        let good = proof_hash("done", "0xclaim", "2024-01-02T00:00:00.000Z");
        let capsule = store.create_capsule(capsule_draft("agent-a", "done", &good));

        match store.verify_capsule(&capsule.id, "agent-a") {
            VerifyOutcome::Checked { ok, capsule } => {
                assert!(ok);
                assert_eq!(capsule.verify_status, VerifyStatus::Ok);
            }
            other => panic!("expected Checked, got {other:?}"),
        }
    }

    #[test]
    fn digest_comparison_ignores_hex_case() {
        let store = OnchainStore::new();
        store.upsert_binding(binding_draft("agent-a", "0xabc", "0xclaim"));
        let good = proof_hash("done", "0xclaim", "2024-01-02T00:00:00.000Z").to_uppercase();
        let capsule = store.create_capsule(capsule_draft("agent-a", "done", &good));
        match store.verify_capsule(&capsule.id, "agent-a") {
            VerifyOutcome::Checked { ok, .. } => assert!(ok),
            other => panic!("expected Checked, got {other:?}"),
        }
    }

    #[test]
    fn failed_capsule_flips_to_ok_after_binding_corrected() {
        let store = OnchainStore::new();
        store.upsert_binding(binding_draft("agent-a", "0xabc", "0xwrong"));
        let good = proof_hash("done", "0xright", "2024-01-02T00:00:00.000Z");
        let capsule = store.create_capsule(capsule_draft("agent-a", "done", &good));

        match store.verify_capsule(&capsule.id, "agent-a") {
            VerifyOutcome::Checked { ok, capsule } => {
                assert!(!ok);
                assert_eq!(capsule.verify_status, VerifyStatus::Failed);
            }
            other => panic!("expected Checked, got {other:?}"),
        }

        // Correct the binding's claim hash and re-verify.
        store.upsert_binding(binding_draft("agent-a", "0xabc", "0xright"));
        match store.verify_capsule(&capsule.id, "agent-a") {
            VerifyOutcome::Checked { ok, capsule } => {
                assert!(ok);
                assert_eq!(capsule.verify_status, VerifyStatus::Ok);
            }
            other => panic!("expected Checked, got {other:?}"),
        }
    }

    #[test]
    fn status_counts_track_verification() {
        let store = OnchainStore::new();
        store.upsert_binding(binding_draft("agent-a", "0xabc", "0xclaim"));
        let good = proof_hash("r", "0xclaim", "2024-01-02T00:00:00.000Z");
        let ok = store.create_capsule(capsule_draft("agent-a", "r", &good));
        let bad = store.create_capsule(capsule_draft("agent-a", "r", "0xnotit"));
        store.create_capsule(capsule_draft("agent-a", "r", "0xuntouched"));
        store.verify_capsule(&ok.id, "agent-a");
        store.verify_capsule(&bad.id, "agent-a");

        let counts = store.capsule_status_counts();
        assert_eq!(counts.ok, 1);
        assert_eq!(counts.failed, 1);
        assert_eq!(counts.unverified, 1);
    }

    #[test]
    fn reset_empties_everything_and_reports_prior_counts() {
        let store = OnchainStore::new();
        store.upsert_binding(binding_draft("agent-a", "0xabc", "0x1"));
        store.mint_credential(WalletAddress::new("0xabc"));
        store.create_capsule(capsule_draft("agent-a", "r", "0xp"));

        let counts = store.reset();
        assert_eq!(counts.bindings, 1);
        assert_eq!(counts.credentials, 1);
        assert_eq!(counts.capsules, 1);
        assert_eq!(store.counts(), StoreCounts::default());
    }

    #[test]
    fn snapshot_restore_roundtrip() {
        let store = OnchainStore::new();
        store.upsert_binding(binding_draft("agent-a", "0xabc", "0x1"));
        store.mint_credential(WalletAddress::new("0xabc"));
        let snapshot = store.snapshot();

        let restored = OnchainStore::new();
        restored.restore(snapshot.clone());
        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.counts().bindings, 1);
    }

    #[test]
    fn clones_share_state() {
        let store = OnchainStore::new();
        let handle = store.clone();
        handle.mint_credential(WalletAddress::new("0xabc"));
        assert_eq!(store.counts().credentials, 1);
    }
}
