//! Document addressing, snapshots, and write modes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The address of one document: a collection name and a key within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    collection: String,
    key: String,
}

impl DocumentRef {
    /// Address a document.
    #[must_use]
    pub fn new(collection: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            key: key.into(),
        }
    }

    /// The collection name.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// The document key within the collection.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl std::fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.collection, self.key)
    }
}

/// How a write combines with the existing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Overwrite the whole document (last writer wins).
    Replace,
    /// Shallow field-wise merge into the existing document. Fields absent
    /// from the patch retain their prior value. Merging into a missing
    /// document creates it.
    Merge,
}

/// The observed state of a document at some revision.
///
/// Revisions increase monotonically per document as the store observes
/// writes. A document that has never been written is `rev = 0` with no
/// body; a deleted document keeps advancing its revision with no body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Store-assigned revision, monotonic per document.
    pub rev: u64,
    /// Document body, `None` when the document does not exist.
    pub body: Option<Value>,
}

impl Snapshot {
    /// The snapshot of a document that has never been written.
    #[must_use]
    pub const fn missing() -> Self {
        Self { rev: 0, body: None }
    }

    /// Whether the document exists at this revision.
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.body.is_some()
    }
}

/// Shallow field-wise merge of `patch` into `base`.
///
/// When both are JSON objects, top-level fields from `patch` override the
/// corresponding fields of `base` and all other fields survive. In every
/// other case the patch replaces the base wholesale.
#[must_use]
pub fn merge_fields(base: Option<Value>, patch: Value) -> Value {
    match (base, patch) {
        (Some(Value::Object(mut base)), Value::Object(patch)) => {
            for (key, value) in patch {
                base.insert(key, value);
            }
            Value::Object(base)
        }
        (_, patch) => patch,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_ref_display() {
        let doc = DocumentRef::new("carts", "buyer-1");
        assert_eq!(doc.to_string(), "carts/buyer-1");
    }

    #[test]
    fn test_missing_snapshot() {
        let snap = Snapshot::missing();
        assert_eq!(snap.rev, 0);
        assert!(!snap.exists());
    }

    #[test]
    fn test_merge_overrides_and_keeps_fields() {
        let base = json!({"shop_name": "Kampala Crafts", "location": "Kampala"});
        let patch = json!({"location": "Entebbe", "description": "Crafts"});

        let merged = merge_fields(Some(base), patch);
        assert_eq!(
            merged,
            json!({
                "shop_name": "Kampala Crafts",
                "location": "Entebbe",
                "description": "Crafts"
            })
        );
    }

    #[test]
    fn test_merge_into_missing_creates() {
        let merged = merge_fields(None, json!({"a": 1}));
        assert_eq!(merged, json!({"a": 1}));
    }

    #[test]
    fn test_merge_non_object_replaces() {
        let merged = merge_fields(Some(json!({"a": 1})), json!([1, 2]));
        assert_eq!(merged, json!([1, 2]));
    }
}
