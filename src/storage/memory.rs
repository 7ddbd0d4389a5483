//! In-memory backends.
//!
//! Reference implementations of `DictionaryStore` and `Cache`, backed by
//! HashMaps behind `parking_lot::RwLock`. Handles are cheap to clone and
//! share the same data, so a test can keep one handle while the orchestrator
//! owns another.
//!
//! Use these for:
//! - Testing the lookup orchestrator and the enrichment pass
//! - Embedding with a dictionary loaded from a JSON export
//! - Running the CLI without external services

use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use hashbrown::HashMap;
use parking_lot::RwLock;

use crate::model::Entry;
use crate::Result;
use super::{Cache, DictionaryStore, Document, EntryField, EntryQuery};

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory dictionary store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    docs: RwLock<Vec<Document>>,
    /// (field, value) → document positions, ascending
    index: RwLock<HashMap<(EntryField, String), Vec<usize>>>,
    queries: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON array of dictionary documents.
    pub fn from_json_reader(reader: impl Read) -> Result<Self> {
        let docs: Vec<Document> = serde_json::from_reader(reader)?;
        let store = Self::new();
        for doc in docs {
            store.insert(doc);
        }
        Ok(store)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_json_reader(std::io::BufReader::new(file))
    }

    /// Add a raw document. It is indexed under every string in its
    /// `readings` and `kanji` lists; anything else about it is left unchecked.
    pub fn insert(&self, doc: Document) {
        let mut docs = self.inner.docs.write();
        let pos = docs.len();
        {
            let mut index = self.inner.index.write();
            for field in [EntryField::Readings, EntryField::Kanji] {
                let values = doc.get(field.name()).and_then(|v| v.as_array());
                for value in values.into_iter().flatten().filter_map(|v| v.as_str()) {
                    let slot = index.entry((field, value.to_string())).or_default();
                    if slot.last() != Some(&pos) {
                        slot.push(pos);
                    }
                }
            }
        }
        docs.push(doc);
    }

    pub fn insert_entry(&self, entry: &Entry) -> Result<()> {
        self.insert(serde_json::to_value(entry)?);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `find` calls served so far.
    pub fn query_count(&self) -> u64 {
        self.inner.queries.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DictionaryStore for MemoryStore {
    async fn find(&self, query: &EntryQuery) -> Result<Vec<Document>> {
        self.inner.queries.fetch_add(1, Ordering::Relaxed);

        let mut hits: Vec<usize> = {
            let index = self.inner.index.read();
            query
                .clauses()
                .iter()
                .filter_map(|(field, value)| index.get(&(*field, value.clone())))
                .flatten()
                .copied()
                .collect()
        };
        hits.sort_unstable();
        hits.dedup();

        let docs = self.inner.docs.read();
        Ok(hits.into_iter().filter_map(|pos| docs.get(pos).cloned()).collect())
    }
}

// ============================================================================
// MemoryCache
// ============================================================================

/// In-memory byte cache. No eviction; a `set` overwrites.
#[derive(Clone, Default)]
pub struct MemoryCache {
    inner: Arc<CacheInner>,
}

#[derive(Default)]
struct CacheInner {
    blobs: RwLock<HashMap<String, Bytes>>,
    gets: AtomicU64,
    sets: AtomicU64,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current blob under `key`, bypassing the counters.
    pub fn peek(&self, key: &str) -> Option<Bytes> {
        self.inner.blobs.read().get(key).cloned()
    }

    /// Write a blob directly, bypassing the counters.
    pub fn put(&self, key: impl Into<String>, value: impl Into<Bytes>) {
        self.inner.blobs.write().insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.inner.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_count(&self) -> u64 {
        self.inner.gets.load(Ordering::Relaxed)
    }

    pub fn set_count(&self) -> u64 {
        self.inner.sets.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        self.inner.gets.fetch_add(1, Ordering::Relaxed);
        Ok(self.inner.blobs.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<()> {
        self.inner.sets.fetch_add(1, Ordering::Relaxed);
        self.inner.blobs.write().insert(key.to_string(), value);
        Ok(())
    }
}
