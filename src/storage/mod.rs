//! # Backend Contracts
//!
//! The two collaborators the lookup orchestrator talks to:
//!
//! | Trait | Role | Reference impl |
//! |-------|------|----------------|
//! | `DictionaryStore` | Authoritative JMdict documents, OR-query on `readings`/`kanji` | `MemoryStore` |
//! | `Cache` | Byte-blob get/set keyed by plain UTF-8 strings | `MemoryCache` |
//!
//! Both are shared across concurrent queries and must be safe for that by
//! themselves; nothing above this layer takes a lock on their behalf.

pub mod memory;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::json;

use crate::Result;

pub use memory::{MemoryCache, MemoryStore};

/// A raw store document. Decoding into `Entry` happens in the orchestrator so
/// that one bad document can be skipped without failing the batch.
pub type Document = serde_json::Value;

// ============================================================================
// Query
// ============================================================================

/// An indexed string-list field of a dictionary document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryField {
    Readings,
    Kanji,
}

impl EntryField {
    pub fn name(self) -> &'static str {
        match self {
            EntryField::Readings => "readings",
            EntryField::Kanji => "kanji",
        }
    }
}

/// Disjunction of exact-membership clauses: a document matches if any listed
/// field contains the given string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryQuery {
    any_of: Vec<(EntryField, String)>,
}

impl EntryQuery {
    /// `readings ∋ key OR kanji ∋ key`
    pub fn exact(key: &str) -> Self {
        Self {
            any_of: vec![
                (EntryField::Readings, key.to_string()),
                (EntryField::Kanji, key.to_string()),
            ],
        }
    }

    pub fn clauses(&self) -> &[(EntryField, String)] {
        &self.any_of
    }

    /// Evaluate against a raw document.
    pub fn matches(&self, doc: &Document) -> bool {
        self.any_of.iter().any(|(field, value)| {
            doc.get(field.name())
                .and_then(|v| v.as_array())
                .is_some_and(|items| items.iter().any(|item| item.as_str() == Some(value)))
        })
    }

    /// Document-database filter form: `{"$or": [{"readings": k}, {"kanji": k}]}`.
    pub fn to_filter(&self) -> serde_json::Value {
        let clauses: Vec<serde_json::Value> = self
            .any_of
            .iter()
            .map(|(field, value)| json!({ field.name(): value }))
            .collect();
        json!({ "$or": clauses })
    }
}

// ============================================================================
// Traits
// ============================================================================

/// The persistent dictionary store.
#[async_trait]
pub trait DictionaryStore: Send + Sync + 'static {
    /// All documents matching `query`, in store order. Connectivity failures
    /// are `Error::Store`.
    async fn find(&self, query: &EntryQuery) -> Result<Vec<Document>>;
}

/// The key-value cache in front of the store.
#[async_trait]
pub trait Cache: Send + Sync + 'static {
    /// `Ok(None)` is a miss. Any `Err` is a cache failure, never a miss.
    async fn get(&self, key: &str) -> Result<Option<Bytes>>;

    /// Store `value` under `key`, overwriting whatever was there.
    async fn set(&self, key: &str, value: Bytes) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_matches_either_field() {
        let q = EntryQuery::exact("猫");
        assert!(q.matches(&json!({"kanji": ["猫"], "readings": ["ねこ"]})));
        assert!(q.matches(&json!({"readings": ["猫"]})));
        assert!(!q.matches(&json!({"kanji": ["犬"], "readings": ["いぬ"]})));
        // Substrings and non-list fields do not count.
        assert!(!q.matches(&json!({"kanji": ["子猫"]})));
        assert!(!q.matches(&json!({"kanji": "猫"})));
    }

    #[test]
    fn test_filter_document_shape() {
        let q = EntryQuery::exact("とても");
        assert_eq!(
            q.to_filter(),
            json!({"$or": [{"readings": "とても"}, {"kanji": "とても"}]})
        );
    }
}
