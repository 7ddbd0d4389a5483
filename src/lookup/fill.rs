//! Detached cache fill.
//!
//! Runs on its own tokio task with no handle kept anywhere: the request that
//! triggered it has already returned. Failures go to the log and, when a
//! report sink is attached, to that channel. Nothing else ever sees them.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::model::Entry;
use crate::storage::Cache;
use crate::Result;

/// Outcome of one background cache fill.
#[derive(Debug)]
pub struct CacheFill {
    pub key: String,
    pub entries: usize,
    pub result: Result<()>,
}

pub(super) fn spawn<C: Cache>(
    cache: Arc<C>,
    key: String,
    entries: Vec<Entry>,
    reports: Option<mpsc::UnboundedSender<CacheFill>>,
) {
    tokio::spawn(async move {
        let count = entries.len();
        let result = write(cache.as_ref(), &key, &entries).await;
        if let Err(e) = &result {
            tracing::warn!(key = %key, error = %e, "cache fill failed");
        }
        if let Some(reports) = reports {
            // Receiver gone means nobody is listening any more.
            let _ = reports.send(CacheFill { key, entries: count, result });
        }
    });
}

async fn write<C: Cache>(cache: &C, key: &str, entries: &[Entry]) -> Result<()> {
    let blob = serde_json::to_vec(entries)?;
    cache.set(key, Bytes::from(blob)).await
}
