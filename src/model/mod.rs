//! # Lexical Model
//!
//! Clean DTOs that cross every boundary: analyzer → segmenter → enrichment → caller.
//!
//! Design rule: NO store documents, NO cache blobs, NO analyzer handles here.
//! This module is pure data: no I/O and no async.

pub mod token;
pub mod word;
pub mod entry;

pub use token::{Token, TokenClass, PosTags};
pub use word::Word;
pub use entry::{Entry, Meaning};

/// Top-level IPADIC tag for symbols.
pub const POS_SYMBOL: &str = "記号";

/// Second-level IPADIC tag for a sentence-terminal period.
pub const POS_PERIOD: &str = "句点";

/// Wildcard marker for an unused tag level.
pub const POS_WILDCARD: &str = "*";
