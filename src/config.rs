//! Runtime configuration.

use std::path::PathBuf;

use crate::analyzer::MecabProcess;
use crate::storage::MemoryStore;
use crate::Result;

/// Where dictionary documents come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Empty in-memory store.
    Memory,

    /// In-memory store loaded from a JSON array of entry documents.
    JsonFile { path: PathBuf },
}

/// How text is analyzed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyzerConfig {
    /// External `mecab` binary with an IPADIC dictionary.
    Mecab {
        program: PathBuf,
        dicdir: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeibikiConfig {
    pub store: StoreConfig,
    pub analyzer: AnalyzerConfig,
}

impl Default for SeibikiConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::Memory,
            analyzer: AnalyzerConfig::Mecab {
                program: PathBuf::from("mecab"),
                dicdir: None,
            },
        }
    }
}

impl SeibikiConfig {
    /// Load from environment variables
    ///
    /// - `SEIBIKI_DICTIONARY`: JSON entries file (default: empty in-memory store)
    /// - `SEIBIKI_MECAB`: mecab binary (default: `mecab` on `PATH`)
    /// - `SEIBIKI_MECAB_DICDIR`: mecab system dictionary directory
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let set = |name: &str| var(name).filter(|v| !v.trim().is_empty());
        Self {
            store: match set("SEIBIKI_DICTIONARY") {
                Some(path) => StoreConfig::JsonFile { path: path.into() },
                None => StoreConfig::Memory,
            },
            analyzer: AnalyzerConfig::Mecab {
                program: set("SEIBIKI_MECAB").unwrap_or_else(|| "mecab".into()).into(),
                dicdir: set("SEIBIKI_MECAB_DICDIR").map(PathBuf::from),
            },
        }
    }
}

impl StoreConfig {
    pub fn open(&self) -> Result<MemoryStore> {
        match self {
            StoreConfig::Memory => Ok(MemoryStore::new()),
            StoreConfig::JsonFile { path } => {
                let store = MemoryStore::from_path(path)?;
                tracing::debug!(path = %path.display(), documents = store.len(), "loaded dictionary");
                Ok(store)
            }
        }
    }
}

impl AnalyzerConfig {
    pub fn build(&self) -> MecabProcess {
        match self {
            AnalyzerConfig::Mecab { program, dicdir } => {
                let mecab = MecabProcess::new(program);
                match dicdir {
                    Some(dir) => mecab.with_dicdir(dir),
                    None => mecab,
                }
            }
        }
    }
}
