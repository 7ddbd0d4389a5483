//! # Word Segmenter
//!
//! Morphological analyzers over-segment: `良かった` comes out as `良` + `かっ` + `た`.
//! This pass glues tokens back into words in a single left-to-right sweep with
//! one pending accumulator:
//!
//! - boundary markers are dropped;
//! - a sentence-terminal period flushes the accumulator and becomes its own word;
//! - a token whose surface equals its base form is the uninflected tail of a
//!   word: it joins the accumulator, which is then flushed;
//! - anything else is an inflected stem and stays pending.
//!
//! Whatever is still pending at the end becomes the last word, so no token is
//! ever lost.

use crate::model::{Token, Word};

/// Group an analyzer token stream into words, preserving order.
pub fn segment(tokens: impl IntoIterator<Item = Token>) -> Vec<Word> {
    let mut words = Vec::new();
    let mut pending: Vec<Token> = Vec::new();

    for token in tokens {
        if token.class.is_boundary() {
            continue;
        }

        if token.is_punctuation() {
            flush(&mut words, &mut pending);
            words.push(Word::single(token));
        } else if token.is_terminal() {
            pending.push(token);
            flush(&mut words, &mut pending);
        } else {
            pending.push(token);
        }
    }
    flush(&mut words, &mut pending);

    words
}

fn flush(words: &mut Vec<Word>, pending: &mut Vec<Token>) {
    if let Some(word) = Word::new(std::mem::take(pending)) {
        words.push(word);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TokenClass;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn tok(id: usize, surface: &str, base: &str) -> Token {
        Token::new(id, surface, base).with_pos(["名詞", "一般", "*", "*"])
    }

    fn period(id: usize) -> Token {
        Token::new(id, "。", "。").with_pos(["記号", "句点", "*", "*"])
    }

    fn surfaces(words: &[Word]) -> Vec<String> {
        words.iter().map(Word::surface).collect()
    }

    #[test]
    fn test_inflected_stem_joins_terminal() {
        let words = segment(vec![
            tok(0, "良", "良い"),
            tok(1, "かった", "良い"),
            tok(2, "です", "です"),
        ]);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].tokens().len(), 3);
        assert_eq!(words[0].surface(), "良かったです");
    }

    #[test]
    fn test_period_is_its_own_word() {
        let words = segment(vec![
            tok(0, "寒", "寒い"),
            tok(1, "い", "い"),
            tok(2, "です", "です"),
            period(3),
        ]);
        assert_eq!(surfaces(&words), vec!["寒い", "です", "。"]);
        assert!(words[2].is_punctuation());
        assert_eq!(words[2].tokens().len(), 1);
    }

    #[test]
    fn test_period_flushes_pending_stem() {
        let words = segment(vec![tok(0, "書か", "書く"), period(1), tok(2, "猫", "猫")]);
        assert_eq!(surfaces(&words), vec!["書か", "。", "猫"]);
    }

    #[test]
    fn test_boundary_markers_are_dropped() {
        let words = segment(vec![
            Token::boundary(0),
            tok(1, "猫", "猫"),
            Token::boundary(2).with_class(TokenClass::Dummy),
        ]);
        assert_eq!(surfaces(&words), vec!["猫"]);
    }

    #[test]
    fn test_no_terminal_collapses_into_one_word() {
        let words = segment(vec![tok(0, "a", "x"), tok(1, "b", "y"), tok(2, "c", "z")]);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].surface(), "abc");
    }

    #[test]
    fn test_consecutive_periods() {
        let words = segment(vec![period(0), period(1), period(2)]);
        assert_eq!(words.len(), 3);
        assert!(words.iter().all(Word::is_punctuation));
    }

    #[test]
    fn test_empty_stream() {
        assert!(segment(Vec::new()).is_empty());
        assert!(segment(vec![Token::boundary(0)]).is_empty());
    }

    fn arb_token() -> impl Strategy<Value = Token> {
        (
            prop::sample::select(vec!["あ", "か", "た", "。", "猫", "す"]),
            prop::sample::select(vec!["あ", "か", "た", "。", "猫", "する"]),
            prop::sample::select(vec![
                vec!["名詞", "一般", "*", "*"],
                vec!["記号", "句点", "*", "*"],
                vec!["記号"],
                vec![],
            ]),
            prop::bool::weighted(0.1),
        )
            .prop_map(|(surface, base, pos, boundary)| {
                let t = Token::new(0, surface, base).with_pos(pos);
                if boundary { t.with_class(TokenClass::Dummy) } else { t }
            })
    }

    proptest! {
        #[test]
        fn prop_segmentation_is_lossless(tokens in prop::collection::vec(arb_token(), 0..40)) {
            let expected: String = tokens
                .iter()
                .filter(|t| !t.class.is_boundary())
                .map(|t| t.surface.as_str())
                .collect();
            let expected_count = tokens.iter().filter(|t| !t.class.is_boundary()).count();

            let words = segment(tokens);
            let joined: String = words.iter().map(Word::surface).collect();
            let count: usize = words.iter().map(|w| w.tokens().len()).sum();

            prop_assert_eq!(joined, expected);
            prop_assert_eq!(count, expected_count);
        }

        #[test]
        fn prop_words_are_non_empty_and_periods_stand_alone(
            tokens in prop::collection::vec(arb_token(), 0..40)
        ) {
            for word in segment(tokens) {
                prop_assert!(!word.tokens().is_empty());
                if word.tokens().iter().any(Token::is_punctuation) {
                    prop_assert_eq!(word.tokens().len(), 1);
                }
            }
        }
    }
}
