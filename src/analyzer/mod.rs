//! # Morphological Analyzer Contract
//!
//! The analyzer itself is external. This module fixes what we consume from it
//! (an ordered `Token` stream, boundary markers included) and ships two
//! adapters:
//!
//! | Analyzer | Description |
//! |----------|-------------|
//! | `MecabProcess` | Pipes text through a `mecab` binary with an IPADIC dictionary |
//! | `CannedAnalyzer` | Pre-recorded MeCab output keyed by input text, for tests and demos |

pub mod mecab;

use async_trait::async_trait;
use hashbrown::HashMap;

use crate::model::Token;
use crate::{Error, Result};

pub use mecab::{MecabProcess, parse_mecab_output};

/// Turns raw text into tagged tokens.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<Vec<Token>>;
}

/// Analyzer that replays recorded MeCab output.
#[derive(Debug, Clone, Default)]
pub struct CannedAnalyzer {
    outputs: HashMap<String, String>,
}

impl CannedAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the MeCab output to return for `text`.
    pub fn with(mut self, text: impl Into<String>, mecab_output: impl Into<String>) -> Self {
        self.outputs.insert(text.into(), mecab_output.into());
        self
    }
}

#[async_trait]
impl Analyzer for CannedAnalyzer {
    async fn analyze(&self, text: &str) -> Result<Vec<Token>> {
        let output = self
            .outputs
            .get(text)
            .ok_or_else(|| Error::Analyzer(format!("no recorded analysis for {text:?}")))?;
        parse_mecab_output(output)
    }
}
