//! # Enrichment Pass
//!
//! Attaches dictionary entries to a segmented word.
//!
//! 1. Periods pass through untouched.
//! 2. The whole surface is looked up first. Any hit is attached to the word
//!    as-is, without POS filtering: a multi-token match is already specific.
//! 3. Otherwise every token's base form is looked up and each entry's
//!    meanings are filtered against the token's POS tags. Entries left with
//!    no meaning are dropped.
//!
//! A failed lookup is logged and treated as "no entries". A backend outage
//! therefore yields bare tokens, not a failed query.

use crate::lookup::Repository;
use crate::model::{Entry, Token, Word};
use crate::tags::TagRelevanceTable;

/// Enrich one word.
pub async fn enrich<R>(repo: &R, table: &TagRelevanceTable, word: Word) -> Word
where
    R: Repository + ?Sized,
{
    if word.is_punctuation() {
        return word;
    }

    let surface = word.surface();
    let entries = lookup_or_empty(repo, &surface).await;
    if !entries.is_empty() {
        return word.with_entries(entries);
    }

    let mut word = word;
    for token in word.tokens_mut() {
        attach_filtered(repo, table, token).await;
    }
    word
}

/// Enrich a single token on its own.
pub async fn enrich_token<R>(repo: &R, table: &TagRelevanceTable, mut token: Token) -> Token
where
    R: Repository + ?Sized,
{
    attach_filtered(repo, table, &mut token).await;
    token
}

async fn attach_filtered<R>(repo: &R, table: &TagRelevanceTable, token: &mut Token)
where
    R: Repository + ?Sized,
{
    if token.is_punctuation() {
        return;
    }

    let entries = lookup_or_empty(repo, &token.base).await;
    if entries.is_empty() {
        token.entries = entries;
        return;
    }

    let permitted = table.permitted(token.pos.as_slice());
    token.entries = entries
        .into_iter()
        .filter_map(|mut entry: Entry| {
            entry.meanings.retain(|m| permitted.allows(m));
            (!entry.meanings.is_empty()).then_some(entry)
        })
        .collect();
}

async fn lookup_or_empty<R>(repo: &R, key: &str) -> Vec<Entry>
where
    R: Repository + ?Sized,
{
    match repo.lookup(key).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "lookup failed, continuing without entries");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Meaning;
    use crate::{Error, Result};
    use async_trait::async_trait;
    use hashbrown::HashMap;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    /// Canned repository that records every key it was asked for.
    #[derive(Default)]
    struct Canned {
        entries: HashMap<String, Vec<Entry>>,
        failing: Vec<String>,
        asked: Mutex<Vec<String>>,
    }

    impl Canned {
        fn with(mut self, key: &str, entries: Vec<Entry>) -> Self {
            self.entries.insert(key.to_string(), entries);
            self
        }

        fn failing(mut self, key: &str) -> Self {
            self.failing.push(key.to_string());
            self
        }

        fn asked(&self) -> Vec<String> {
            self.asked.lock().clone()
        }
    }

    #[async_trait]
    impl Repository for Canned {
        async fn lookup(&self, key: &str) -> Result<Vec<Entry>> {
            self.asked.lock().push(key.to_string());
            if self.failing.iter().any(|k| k == key) {
                return Err(Error::Store("connection refused".into()));
            }
            Ok(self.entries.get(key).cloned().unwrap_or_default())
        }
    }

    fn table() -> Arc<TagRelevanceTable> {
        TagRelevanceTable::ipadic().unwrap()
    }

    fn entry(seq: u64, pos: &[&str]) -> Entry {
        pos.iter().fold(Entry::new(seq), |e, p| {
            e.with_meaning(Meaning::new(format!("sense {p}")).with_pos(*p))
        })
    }

    fn adjective_word() -> Word {
        Word::new(vec![
            Token::new(0, "良", "良い").with_pos(["形容詞", "自立", "*", "*"]),
            Token::new(1, "かった", "た").with_pos(["助動詞", "*", "*", "*"]),
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_punctuation_skips_lookup() {
        let repo = Canned::default();
        let word = Word::single(Token::new(0, "。", "。").with_pos(["記号", "句点", "*", "*"]));
        let out = enrich(&repo, &table(), word.clone()).await;
        assert_eq!(out, word);
        assert!(repo.asked().is_empty());
    }

    #[tokio::test]
    async fn test_whole_surface_hit_is_unfiltered() {
        // A verb sense would be filtered for an adjective token; on a
        // whole-surface hit it is kept.
        let repo = Canned::default().with("良かった", vec![entry(1, &["&v1;", "&exp;"])]);
        let out = enrich(&repo, &table(), adjective_word()).await;
        assert_eq!(out.entries().len(), 1);
        assert_eq!(out.entries()[0].meanings.len(), 2);
        assert!(out.tokens().iter().all(|t| t.entries.is_empty()));
        assert_eq!(repo.asked(), vec!["良かった"]);
    }

    #[tokio::test]
    async fn test_per_token_lookup_filters_by_pos() {
        let repo = Canned::default()
            .with("良い", vec![entry(1, &["&adj-i;", "&n;"]), entry(2, &["&n;"])])
            .with("た", vec![entry(3, &["&aux-v;"])]);
        let out = enrich(&repo, &table(), adjective_word()).await;

        assert!(out.entries().is_empty());
        let first = &out.tokens()[0];
        assert_eq!(first.entries.len(), 1);
        assert_eq!(first.entries[0].sequence, 1);
        assert_eq!(first.entries[0].meanings.len(), 1);
        assert_eq!(first.entries[0].meanings[0].part_of_speech, vec!["&adj-i;"]);
        assert_eq!(out.tokens()[1].entries[0].sequence, 3);
        assert_eq!(repo.asked(), vec!["良かった", "良い", "た"]);
    }

    #[tokio::test]
    async fn test_failed_lookups_degrade_to_empty() {
        let repo = Canned::default()
            .failing("良かった")
            .failing("良い")
            .with("た", vec![entry(3, &["&aux-v;"])]);
        let out = enrich(&repo, &table(), adjective_word()).await;
        assert_eq!(out.tokens().len(), 2);
        assert!(out.tokens()[0].entries.is_empty());
        assert_eq!(out.tokens()[1].entries.len(), 1);
    }

    #[tokio::test]
    async fn test_uncovered_tuple_drops_everything() {
        let repo = Canned::default().with("ｘ", vec![entry(1, &["&n;"])]);
        let token = Token::new(0, "ｘ", "ｘ").with_pos(["未定義", "*", "*", "*"]);
        let out = enrich_token(&repo, &table(), token).await;
        assert!(out.entries.is_empty());
    }

    #[tokio::test]
    async fn test_gap_counted_only_when_there_is_something_to_filter() {
        let table = TagRelevanceTable::parse("名詞,一般,*,*\tn\n").unwrap();
        let repo = Canned::default()
            .with("ある", vec![entry(1, &["&v5r;"])])
            .failing("ない");
        let token = |base: &str| Token::new(0, base, base).with_pos(["動詞", "自立", "*", "*"]);

        enrich_token(&repo, &table, token("なし")).await;
        enrich_token(&repo, &table, token("ない")).await;
        assert_eq!(table.coverage_misses(), 0);

        let out = enrich_token(&repo, &table, token("ある")).await;
        assert!(out.entries.is_empty());
        assert_eq!(table.coverage_misses(), 1);
    }

    #[tokio::test]
    async fn test_token_without_pos_keeps_everything() {
        let repo = Canned::default().with("ｘ", vec![entry(1, &["&n;", "&v1;"])]);
        let out = enrich_token(&repo, &table(), Token::new(0, "ｘ", "ｘ")).await;
        assert_eq!(out.entries[0].meanings.len(), 2);
    }
}
