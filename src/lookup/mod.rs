//! # Lookup Orchestrator
//!
//! Cache-aside access to the dictionary:
//!
//! ```text
//! lookup(key)
//!   ├─ cache.get(key) ── Err ─────────────▶ Err (no fallback to the store)
//!   │         ├─ Some(blob) ─ decode ─────▶ Ok(entries) / Err(corrupt)
//!   │         └─ None
//!   ├─ store.find(readings ∋ key ∨ kanji ∋ key) ── Err ──▶ Err
//!   ├─ decode each document (bad ones skipped)
//!   ├─ spawn: cache.set(key, json(entries))   (detached, never awaited)
//!   └─▶ Ok(entries)
//! ```
//!
//! Concurrent lookups of the same key are not coalesced: both may miss, both
//! query the store, both fill the cache. Last writer wins.

mod fill;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::model::Entry;
use crate::storage::{Cache, DictionaryStore, Document, EntryQuery};
use crate::{Error, Result};

pub use fill::CacheFill;

/// Anything that can turn a key into dictionary entries.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn lookup(&self, key: &str) -> Result<Vec<Entry>>;
}

/// Cache-aside dictionary over a store and a cache.
pub struct Dictionary<S: DictionaryStore, C: Cache> {
    store: Arc<S>,
    cache: Arc<C>,
    fill_reports: Option<mpsc::UnboundedSender<CacheFill>>,
}

impl<S: DictionaryStore, C: Cache> Dictionary<S, C> {
    pub fn new(store: S, cache: C) -> Self {
        Self {
            store: Arc::new(store),
            cache: Arc::new(cache),
            fill_reports: None,
        }
    }

    /// Report the outcome of every background cache fill on `sink`.
    pub fn with_fill_reports(mut self, sink: mpsc::UnboundedSender<CacheFill>) -> Self {
        self.fill_reports = Some(sink);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    async fn cached(&self, key: &str) -> Result<Option<Vec<Entry>>> {
        let blob = match self.cache.get(key).await {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                tracing::debug!(key = %key, "cache miss");
                return Ok(None);
            }
            Err(e) => {
                tracing::error!(key = %key, error = %e, "cache read failed");
                return Err(e);
            }
        };
        serde_json::from_slice(&blob)
            .map(Some)
            .map_err(|source| {
                tracing::error!(key = %key, error = %source, "cached payload is not an entry list");
                Error::CorruptCacheEntry { key: key.to_string(), source }
            })
    }
}

#[async_trait]
impl<S: DictionaryStore, C: Cache> Repository for Dictionary<S, C> {
    async fn lookup(&self, key: &str) -> Result<Vec<Entry>> {
        if let Some(entries) = self.cached(key).await? {
            return Ok(entries);
        }

        let docs = self
            .store
            .find(&EntryQuery::exact(key))
            .await
            .inspect_err(|e| tracing::error!(key = %key, error = %e, "store query failed"))?;
        let entries = decode_documents(key, docs);

        fill::spawn(
            Arc::clone(&self.cache),
            key.to_string(),
            entries.clone(),
            self.fill_reports.clone(),
        );

        Ok(entries)
    }
}

/// Decode store documents, skipping the ones that are not entries.
fn decode_documents(key: &str, docs: Vec<Document>) -> Vec<Entry> {
    docs.into_iter()
        .filter_map(|doc| match serde_json::from_value::<Entry>(doc) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "skipping malformed dictionary document");
                None
            }
        })
        .collect()
}
