//! Relevance-table coverage audit.
//!
//! Walks an IPADIC lexicon and flags every row the dictionary knows about but
//! for which the relevance filter keeps nothing. The report groups those rows
//! by tag tuple together with the JMdict tags their entries actually carry,
//! which is what you need to extend `data/ipadic-jmdict.tsv`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analyzer::mecab::parse_csv_row;
use crate::lookup::Repository;
use crate::model::{PosTags, Token, TokenClass};
use crate::tags::{TagRelevanceTable, tuple_key};

// IPADIC lexicon CSV columns.
const COL_SURFACE: usize = 0;
const COL_POS: std::ops::Range<usize> = 4..8;
const COL_BASE: usize = 10;

/// One flagged lexicon row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    pub surface: String,
    /// Distinct JMdict tags over all matched entries, first-seen order.
    pub pos: Vec<String>,
}

/// Audit outcome.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditReport {
    pub rows_checked: usize,
    pub rows_with_entries: usize,
    pub lookup_errors: usize,
    /// Joined tag tuple → rows whose every meaning was filtered out.
    pub uncovered: BTreeMap<String, Vec<AuditRecord>>,
}

impl AuditReport {
    pub fn flagged(&self) -> usize {
        self.uncovered.values().map(Vec::len).sum()
    }
}

/// Parse one IPADIC lexicon CSV row into a token. Rows too short to carry a
/// base form are rejected.
pub fn parse_lexicon_row(row: &str) -> Option<Token> {
    let cols = parse_csv_row(row);
    if cols.len() <= COL_BASE {
        return None;
    }
    Some(Token {
        id: 0,
        class: TokenClass::Known,
        surface: cols[COL_SURFACE].clone(),
        pos: cols[COL_POS].iter().cloned().collect::<PosTags>(),
        base: cols[COL_BASE].clone(),
        reading: None,
        pron: None,
        entries: Vec::new(),
    })
}

/// Check every lexicon row against the dictionary and the relevance table.
pub async fn audit_lexicon<R, I>(repo: &R, table: &TagRelevanceTable, rows: I) -> AuditReport
where
    R: Repository + ?Sized,
    I: IntoIterator<Item = Token>,
{
    let mut report = AuditReport::default();
    for token in rows {
        if token.is_punctuation() {
            continue;
        }
        report.rows_checked += 1;

        let entries = match repo.lookup(&token.base).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(base = %token.base, error = %e, "audit lookup failed");
                report.lookup_errors += 1;
                continue;
            }
        };
        if entries.is_empty() {
            continue;
        }
        report.rows_with_entries += 1;

        let permitted = table.permitted(token.pos.as_slice());
        let survivors = entries
            .iter()
            .flat_map(|e| &e.meanings)
            .filter(|m| permitted.allows(m))
            .count();
        if survivors > 0 {
            continue;
        }

        let mut pos: Vec<String> = Vec::new();
        for tag in entries.iter().flat_map(|e| &e.meanings).flat_map(|m| &m.part_of_speech) {
            if !pos.contains(tag) {
                pos.push(tag.clone());
            }
        }
        report
            .uncovered
            .entry(tuple_key(token.pos.as_slice()))
            .or_default()
            .push(AuditRecord { surface: token.surface, pos });
    }
    report
}
