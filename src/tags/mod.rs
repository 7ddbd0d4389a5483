//! # Tag Relevance Table
//!
//! Cross-walk from IPADIC part-of-speech tuples (what the analyzer says a
//! token *is* in context) to the JMdict part-of-speech entities a dictionary
//! sense may carry. A sense is shown for a token only if the two agree.
//!
//! ```text
//! 形容詞,自立,*,*  ──table──▶  {adj-i, adj-ix, adj-ku, adj-shiku}
//!                                   │
//!        Meaning { partofspeech: ["&adj-i;"] }  ✔ kept
//!        Meaning { partofspeech: ["&n;"] }      ✘ dropped
//! ```
//!
//! The table is reference data, not logic: it lives in
//! `data/ipadic-jmdict.tsv`, is embedded at compile time and parsed once.
//! Coverage is partial on purpose. A tuple the table does not know filters
//! everything out, and every such lookup is counted so the gap is visible.

pub mod parse;

use std::sync::{Arc, OnceLock};
use std::sync::atomic::{AtomicU64, Ordering};

use hashbrown::{HashMap, HashSet};

use crate::model::{Meaning, POS_WILDCARD};

pub use parse::TagTableError;

/// Number of IPADIC tag levels that take part in the lookup key.
pub const TUPLE_LEVELS: usize = 4;

/// Delimiter between levels in a lookup key.
pub const TUPLE_DELIMITER: char = ',';

const IPADIC_JMDICT: &str = include_str!("../../data/ipadic-jmdict.tsv");

static IPADIC: OnceLock<std::result::Result<Arc<TagRelevanceTable>, TagTableError>> = OnceLock::new();

/// What the table allows for one context.
#[derive(Debug, Clone, Copy)]
pub enum Permitted<'t> {
    /// No context available: everything passes.
    Any,
    /// Known tuple: only these JMdict tags pass.
    Tags(&'t HashSet<String>),
    /// Unknown tuple: nothing passes.
    Gap,
}

impl Permitted<'_> {
    pub fn allows(&self, meaning: &Meaning) -> bool {
        match self {
            Permitted::Any => true,
            Permitted::Gap => false,
            Permitted::Tags(set) => meaning
                .part_of_speech
                .iter()
                .any(|tag| set.contains(normalize_tag(tag))),
        }
    }
}

/// Immutable tuple → permitted-tag mapping.
#[derive(Debug, Default)]
pub struct TagRelevanceTable {
    entries: HashMap<String, HashSet<String>>,
    misses: AtomicU64,
}

impl TagRelevanceTable {
    /// The embedded IPADIC → JMdict table, parsed on first use. Every caller
    /// shares the same table, coverage counter included.
    pub fn ipadic() -> std::result::Result<Arc<TagRelevanceTable>, TagTableError> {
        IPADIC
            .get_or_init(|| parse::parse_table(IPADIC_JMDICT).map(Arc::new))
            .clone()
    }

    pub(crate) fn from_entries(entries: HashMap<String, HashSet<String>>) -> Self {
        Self { entries, misses: AtomicU64::new(0) }
    }

    /// Parse a table from its text form (see `data/ipadic-jmdict.tsv`).
    pub fn parse(source: &str) -> std::result::Result<Self, TagTableError> {
        parse::parse_table(source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Permitted tags for an already-joined key.
    pub fn get(&self, key: &str) -> Option<&HashSet<String>> {
        self.entries.get(key)
    }

    /// Lookups that hit a tuple missing from the table.
    pub fn coverage_misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Resolve a token's tag sequence to what it permits.
    pub fn permitted<S: AsRef<str>>(&self, context: &[S]) -> Permitted<'_> {
        if context.is_empty() {
            return Permitted::Any;
        }
        let key = tuple_key(context);
        match self.entries.get(&key) {
            Some(set) => Permitted::Tags(set),
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %key, "tag tuple not covered by relevance table");
                Permitted::Gap
            }
        }
    }

    /// Does `meaning` fit the grammatical role described by `context`?
    pub fn matches<S: AsRef<str>>(&self, context: &[S], meaning: &Meaning) -> bool {
        self.permitted(context).allows(meaning)
    }

    /// Keep the meanings that fit `context`, in their original order.
    pub fn filter<S: AsRef<str>>(&self, context: &[S], meanings: Vec<Meaning>) -> Vec<Meaning> {
        let permitted = self.permitted(context);
        meanings.into_iter().filter(|m| permitted.allows(m)).collect()
    }
}

/// Join the first four levels, padding missing ones with `*`.
pub fn tuple_key<S: AsRef<str>>(tags: &[S]) -> String {
    let mut key = String::new();
    for level in 0..TUPLE_LEVELS {
        if level > 0 {
            key.push(TUPLE_DELIMITER);
        }
        key.push_str(tags.get(level).map_or(POS_WILDCARD, |t| t.as_ref()));
    }
    key
}

/// `&adj-i;` → `adj-i`. Undecorated tags pass through.
pub fn normalize_tag(tag: &str) -> &str {
    let tag = tag.trim();
    let tag = tag.strip_prefix('&').unwrap_or(tag);
    tag.strip_suffix(';').unwrap_or(tag)
}
