//! A human-meaningful word: one or more consecutive tokens.

use serde::ser::{Serialize, Serializer};

use super::{Entry, Token};

/// One or more tokens that read as a single word.
///
/// The token list is never empty. The surface is not stored; it is rebuilt
/// from the tokens every time it is asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    tokens: Vec<Token>,
    entries: Vec<Entry>,
}

impl Word {
    /// Returns `None` for an empty token list.
    pub fn new(tokens: Vec<Token>) -> Option<Self> {
        if tokens.is_empty() {
            return None;
        }
        Some(Self { tokens, entries: Vec::new() })
    }

    pub fn single(token: Token) -> Self {
        Self { tokens: vec![token], entries: Vec::new() }
    }

    /// Concatenation of the token surfaces, in order.
    pub fn surface(&self) -> String {
        self.tokens.iter().map(|t| t.surface.as_str()).collect()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Tokens can be updated in place but never added or removed.
    pub(crate) fn tokens_mut(&mut self) -> &mut [Token] {
        &mut self.tokens
    }

    /// Entries matched against the whole surface.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// True if the first token is a sentence-terminal period.
    pub fn is_punctuation(&self) -> bool {
        self.tokens[0].is_punctuation()
    }

    /// Attach whole-surface entries. Per-token entries are cleared so the
    /// two never coexist.
    pub fn with_entries(mut self, entries: Vec<Entry>) -> Self {
        for token in &mut self.tokens {
            token.entries.clear();
        }
        self.entries = entries;
        self
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }
}

impl Serialize for Word {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(serde::Serialize)]
        struct Repr<'a> {
            surface: String,
            entries: &'a [Entry],
            tokens: &'a [Token],
        }
        Repr {
            surface: self.surface(),
            entries: &self.entries,
            tokens: &self.tokens,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_word_rejected() {
        assert!(Word::new(Vec::new()).is_none());
    }

    #[test]
    fn test_surface_is_derived() {
        let word = Word::new(vec![
            Token::new(0, "良", "良い"),
            Token::new(1, "かった", "た"),
        ])
        .unwrap();
        assert_eq!(word.surface(), "良かった");

        let mut tokens = word.into_tokens();
        tokens.pop();
        let word = Word::new(tokens).unwrap();
        assert_eq!(word.surface(), "良");
    }

    #[test]
    fn test_whole_surface_entries_clear_token_entries() {
        let mut token = Token::new(0, "猫", "猫");
        token.entries.push(Entry::new(1));
        let word = Word::single(token).with_entries(vec![Entry::new(2)]);
        assert_eq!(word.entries().len(), 1);
        assert!(word.tokens()[0].entries.is_empty());
    }

    #[test]
    fn test_serializes_surface() {
        let word = Word::single(Token::new(0, "猫", "猫"));
        let json = serde_json::to_value(&word).unwrap();
        assert_eq!(json["surface"], "猫");
        assert_eq!(json["tokens"][0]["class"], "KNOWN");
        assert!(json["entries"].as_array().unwrap().is_empty());
    }
}
