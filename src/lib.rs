//! # seibiki: Japanese reading assistant core
//!
//! Turns a Japanese query into words annotated with dictionary entries that
//! fit the grammatical role each word plays in the sentence.
//!
//! ## Pipeline
//!
//! ```text
//! query ──▶ Analyzer ──▶ tokens ──▶ segment() ──▶ words ──▶ enrich() ──▶ annotated words
//!                                                             │
//!                                     Dictionary (cache-aside over store)
//!                                     TagRelevanceTable (IPADIC → JMdict)
//! ```
//!
//! ## Design Principles
//!
//! 1. **Trait seams**: `Analyzer`, `DictionaryStore`, `Cache`, `Repository` are the contracts with the outside world
//! 2. **Clean DTOs**: `Token`, `Word`, `Entry`, `Meaning` cross all boundaries
//! 3. **Reference data is data**: the relevance table is an embedded file, parsed once
//! 4. **Degrade, don't fail**: a dead backend yields bare tokens, not an error
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use seibiki::{Seibiki, Dictionary, MecabProcess, MemoryCache, MemoryStore};
//!
//! # async fn example() -> seibiki::Result<()> {
//! let store = MemoryStore::from_path("jmdict.json")?;
//! let dictionary = Dictionary::new(store, MemoryCache::new());
//! let seibiki = Seibiki::new(MecabProcess::default(), dictionary)?;
//!
//! for word in seibiki.process("とても良かったです。").await? {
//!     println!("{} ({} entries)", word.surface(), word.entries().len());
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod tags;
pub mod segment;
pub mod analyzer;
pub mod storage;
pub mod lookup;
pub mod enrich;
pub mod audit;
pub mod config;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{Entry, Meaning, Token, TokenClass, Word};
pub use tags::{TagRelevanceTable, TagTableError};
pub use segment::segment;
pub use analyzer::{Analyzer, CannedAnalyzer, MecabProcess};
pub use storage::{Cache, DictionaryStore, EntryQuery, MemoryCache, MemoryStore};
pub use lookup::{CacheFill, Dictionary, Repository};
pub use enrich::enrich;
pub use config::SeibikiConfig;

// ============================================================================
// Top-level handle
// ============================================================================

/// The primary entry point: analyzer + dictionary + relevance table.
pub struct Seibiki<A: Analyzer, R: Repository> {
    analyzer: A,
    repo: R,
    table: Arc<TagRelevanceTable>,
}

impl<A: Analyzer, R: Repository> Seibiki<A, R> {
    /// Use the embedded IPADIC → JMdict relevance table.
    pub fn new(analyzer: A, repo: R) -> Result<Self> {
        Ok(Self::with_table(analyzer, repo, TagRelevanceTable::ipadic()?))
    }

    /// Use a custom relevance table. The handle keeps its own reference, so
    /// the caller may keep one too and read `coverage_misses()` later.
    pub fn with_table(analyzer: A, repo: R, table: Arc<TagRelevanceTable>) -> Self {
        Self { analyzer, repo, table }
    }

    /// Analyze, segment and annotate `query`. Words come back in text order.
    ///
    /// Only an empty query or an analyzer failure is an error; dictionary
    /// failures leave the affected words without entries.
    pub async fn process(&self, query: &str) -> Result<Vec<Word>> {
        if query.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }
        let tokens = self.analyzer.analyze(query).await?;

        let mut words = Vec::new();
        for word in segment(tokens) {
            words.push(enrich(&self.repo, &self.table, word).await);
        }
        Ok(words)
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn table(&self) -> &TagRelevanceTable {
        &self.table
    }
}

/// The configured stack: mecab + in-memory store + in-memory cache.
impl Seibiki<MecabProcess, Dictionary<MemoryStore, MemoryCache>> {
    pub fn from_config(config: &SeibikiConfig) -> Result<Self> {
        let store = config.store.open()?;
        let dictionary = Dictionary::new(store, MemoryCache::new());
        Self::new(config.analyzer.build(), dictionary)
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Query is empty")]
    EmptyQuery,

    #[error("Analyzer error: {0}")]
    Analyzer(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Cached value for {key:?} is not an entry list: {source}")]
    CorruptCacheEntry {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    TagTable(#[from] TagTableError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
