//! Morphological token as produced by the analyzer.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{Entry, POS_PERIOD, POS_SYMBOL};

/// Ordered POS tag hierarchy (IPADIC has four levels, sparse rows are valid).
pub type PosTags = SmallVec<[String; 4]>;

/// Where the analyzer found the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenClass {
    /// Sentence boundary marker (BOS/EOS). Never reaches the segmenter output.
    Dummy,
    /// Found in the system dictionary.
    Known,
    /// Produced by the unknown-word handler.
    Unknown,
    /// Found in a user dictionary.
    User,
}

impl TokenClass {
    pub fn is_boundary(self) -> bool {
        matches!(self, TokenClass::Dummy)
    }
}

impl std::fmt::Display for TokenClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TokenClass::Dummy => "DUMMY",
            TokenClass::Known => "KNOWN",
            TokenClass::Unknown => "UNKNOWN",
            TokenClass::User => "USER",
        };
        f.write_str(s)
    }
}

/// A single morphological unit plus any dictionary entries attached to it.
///
/// Everything except `entries` is fixed by the analyzer. `entries` is only
/// filled by the enrichment pass when the whole-word lookup came back empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: usize,
    pub class: TokenClass,
    pub surface: String,
    pub pos: PosTags,
    pub base: String,
    #[serde(default)]
    pub reading: Option<String>,
    #[serde(default)]
    pub pron: Option<String>,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

impl Token {
    pub fn new(id: usize, surface: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            id,
            class: TokenClass::Known,
            surface: surface.into(),
            pos: PosTags::new(),
            base: base.into(),
            reading: None,
            pron: None,
            entries: Vec::new(),
        }
    }

    /// Sentence boundary marker with empty surface.
    pub fn boundary(id: usize) -> Self {
        Self::new(id, "", "").with_class(TokenClass::Dummy)
    }

    pub fn with_class(mut self, class: TokenClass) -> Self {
        self.class = class;
        self
    }

    pub fn with_pos(mut self, pos: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.pos = pos.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_reading(mut self, reading: impl Into<String>) -> Self {
        self.reading = Some(reading.into());
        self
    }

    pub fn with_pron(mut self, pron: impl Into<String>) -> Self {
        self.pron = Some(pron.into());
        self
    }

    /// True for a sentence-terminal period (`記号,句点`).
    pub fn is_punctuation(&self) -> bool {
        self.pos.len() >= 2 && self.pos[0] == POS_SYMBOL && self.pos[1] == POS_PERIOD
    }

    /// Surface equals base: the uninflected, terminal part of a word.
    pub fn is_terminal(&self) -> bool {
        self.surface == self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punctuation_needs_both_levels() {
        let period = Token::new(0, "。", "。").with_pos(["記号", "句点", "*", "*"]);
        let comma = Token::new(1, "、", "、").with_pos(["記号", "読点", "*", "*"]);
        let sparse = Token::new(2, "。", "。").with_pos(["記号"]);
        assert!(period.is_punctuation());
        assert!(!comma.is_punctuation());
        assert!(!sparse.is_punctuation());
    }

    #[test]
    fn test_class_wire_format() {
        let json = serde_json::to_string(&TokenClass::Unknown).unwrap();
        assert_eq!(json, "\"UNKNOWN\"");
        let back: TokenClass = serde_json::from_str("\"DUMMY\"").unwrap();
        assert!(back.is_boundary());
        assert_eq!(TokenClass::User.to_string(), "USER");
    }

    #[test]
    fn test_token_decodes_without_optional_fields() {
        let t: Token = serde_json::from_str(
            r#"{"id":3,"class":"KNOWN","surface":"猫","pos":["名詞","一般"],"base":"猫"}"#,
        )
        .unwrap();
        assert_eq!(t.pos.len(), 2);
        assert!(t.reading.is_none());
        assert!(t.entries.is_empty());
        assert!(t.is_terminal());
    }
}
