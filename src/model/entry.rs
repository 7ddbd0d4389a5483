//! Dictionary records as stored in the JMdict-derived document store.

use serde::{Deserialize, Serialize};

/// One dictionary record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub sequence: u64,
    #[serde(default)]
    pub kanji: Vec<String>,
    #[serde(default)]
    pub readings: Vec<String>,
    #[serde(default)]
    pub meanings: Vec<Meaning>,
}

/// One glossed sense of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meaning {
    pub gloss: String,
    /// JMdict POS entities, e.g. `&adj-i;`.
    #[serde(rename = "partofspeech", default)]
    pub part_of_speech: Vec<String>,
    #[serde(default)]
    pub misc: Vec<String>,
}

impl Entry {
    pub fn new(sequence: u64) -> Self {
        Self {
            sequence,
            kanji: Vec::new(),
            readings: Vec::new(),
            meanings: Vec::new(),
        }
    }

    pub fn with_kanji(mut self, kanji: impl Into<String>) -> Self {
        self.kanji.push(kanji.into());
        self
    }

    pub fn with_reading(mut self, reading: impl Into<String>) -> Self {
        self.readings.push(reading.into());
        self
    }

    pub fn with_meaning(mut self, meaning: Meaning) -> Self {
        self.meanings.push(meaning);
        self
    }
}

impl Meaning {
    pub fn new(gloss: impl Into<String>) -> Self {
        Self {
            gloss: gloss.into(),
            part_of_speech: Vec::new(),
            misc: Vec::new(),
        }
    }

    pub fn with_pos(mut self, tag: impl Into<String>) -> Self {
        self.part_of_speech.push(tag.into());
        self
    }

    pub fn with_misc(mut self, tag: impl Into<String>) -> Self {
        self.misc.push(tag.into());
        self
    }
}
