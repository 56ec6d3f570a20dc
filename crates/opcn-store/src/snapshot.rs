//! The persistable shape of the whole onchain store.

use opcn_core::{Binding, Capsule, Credential};
use serde::{Deserialize, Serialize};

/// Every collection the onchain layer holds, as one serializable blob.
///
/// This is both the in-memory layout and the persistence format: the store
/// guards one of these behind a lock, and the optional database backend
/// writes the whole snapshot as a single JSON document. `#[serde(default)]`
/// lets older blobs missing a collection load as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OnchainSnapshot {
    pub bindings: Vec<Binding>,
    pub credentials: Vec<Credential>,
    pub capsules: Vec<Capsule>,
}

/// Record counts per collection, reported by reset and the metrics scrape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreCounts {
    pub bindings: usize,
    pub credentials: usize,
    pub capsules: usize,
}

impl OnchainSnapshot {
    pub fn counts(&self) -> StoreCounts {
        StoreCounts {
            bindings: self.bindings.len(),
            credentials: self.credentials.len(),
            capsules: self.capsules.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_blob_loads_with_defaults() {
        let snapshot: OnchainSnapshot = serde_json::from_str(r#"{"bindings": []}"#).unwrap();
        assert!(snapshot.credentials.is_empty());
        assert!(snapshot.capsules.is_empty());
    }

    #[test]
    fn empty_snapshot_roundtrips() {
        let snapshot = OnchainSnapshot::default();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: OnchainSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
        assert_eq!(back.counts(), StoreCounts::default());
    }
}
