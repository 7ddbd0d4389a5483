//! MeCab / IPADIC output format.
//!
//! ```text
//! 寒い\t形容詞,自立,*,*,形容詞・アウオ段,基本形,寒い,サムイ,サムイ
//! です\t助動詞,*,*,*,特殊・デス,基本形,です,デス,デス
//! 。\t記号,句点,*,*,*,*,。,。,。
//! EOS
//! ```
//!
//! Feature columns: 0-3 POS levels, 4 conjugation type, 5 conjugation form,
//! 6 base form, 7 reading, 8 pronunciation. Unknown words carry only the first
//! seven columns and `*` as their base form.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use csv_core::ReadFieldResult;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::model::{POS_WILDCARD, PosTags, Token, TokenClass};
use crate::{Error, Result};
use super::Analyzer;

const EOS: &str = "EOS";
const BOS_EOS_FEATURE: &str = "BOS/EOS";

const FEATURE_BASE: usize = 6;
const FEATURE_READING: usize = 7;
const FEATURE_PRON: usize = 8;
const POS_LEVELS: usize = 4;

/// Parse MeCab's default output into tokens. `EOS` lines become boundary
/// markers; ids count up from 0 in output order.
pub fn parse_mecab_output(output: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    for (line_no, line) in output.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }
        let id = tokens.len();
        if line == EOS {
            tokens.push(Token::boundary(id));
            continue;
        }
        let (surface, features) = line.split_once('\t').ok_or_else(|| {
            Error::Analyzer(format!("mecab output line {}: no feature column", line_no + 1))
        })?;
        tokens.push(token_from_features(id, surface, &parse_csv_row(features)));
    }
    Ok(tokens)
}

fn token_from_features(id: usize, surface: &str, features: &[String]) -> Token {
    if features.first().is_some_and(|f| f == BOS_EOS_FEATURE) {
        return Token::boundary(id);
    }

    let column = |idx: usize| {
        features
            .get(idx)
            .filter(|f| !f.is_empty() && f.as_str() != POS_WILDCARD)
            .cloned()
    };

    let class = if features.len() > FEATURE_PRON {
        TokenClass::Known
    } else {
        TokenClass::Unknown
    };

    Token {
        id,
        class,
        surface: surface.to_string(),
        pos: features.iter().take(POS_LEVELS).cloned().collect::<PosTags>(),
        base: column(FEATURE_BASE).unwrap_or_else(|| surface.to_string()),
        reading: column(FEATURE_READING),
        pron: column(FEATURE_PRON),
        entries: Vec::new(),
    }
}

/// Split one CSV row; quoted fields may contain commas.
pub(crate) fn parse_csv_row(row: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut rdr = csv_core::Reader::new();
    let mut input = row.as_bytes();
    let mut field = Vec::new();
    let mut buf = [0u8; 256];
    loop {
        let (result, nin, nout) = rdr.read_field(input, &mut buf);
        input = &input[nin..];
        field.extend_from_slice(&buf[..nout]);
        match result {
            // Next call sees empty input, which csv-core reads as end of data.
            ReadFieldResult::InputEmpty | ReadFieldResult::OutputFull => {}
            ReadFieldResult::Field { record_end } => {
                fields.push(String::from_utf8_lossy(&field).into_owned());
                field.clear();
                if record_end {
                    break;
                }
            }
            ReadFieldResult::End => break,
        }
    }
    fields
}

// ============================================================================
// MecabProcess
// ============================================================================

/// Runs an external `mecab` binary per query.
#[derive(Debug, Clone)]
pub struct MecabProcess {
    program: PathBuf,
    dicdir: Option<PathBuf>,
}

impl MecabProcess {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), dicdir: None }
    }

    /// Use an explicit system dictionary directory (`mecab -d`).
    pub fn with_dicdir(mut self, dicdir: impl Into<PathBuf>) -> Self {
        self.dicdir = Some(dicdir.into());
        self
    }
}

impl Default for MecabProcess {
    fn default() -> Self {
        Self::new("mecab")
    }
}

#[async_trait]
impl Analyzer for MecabProcess {
    async fn analyze(&self, text: &str) -> Result<Vec<Token>> {
        let mut cmd = Command::new(&self.program);
        if let Some(dicdir) = &self.dicdir {
            cmd.arg("-d").arg(dicdir);
        }
        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Error::Analyzer(format!("cannot start {}: {e}", self.program.display())))?;

        // Feed stdin from its own task: mecab writes as it reads, and a full
        // stdout pipe would otherwise stall both sides.
        let writer = child.stdin.take().map(|mut stdin| {
            let input = format!("{text}\n");
            tokio::spawn(async move { stdin.write_all(input.as_bytes()).await })
        });

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(Error::Analyzer(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim(),
            )));
        }
        if let Some(writer) = writer {
            writer
                .await
                .map_err(|e| Error::Analyzer(format!("mecab stdin writer failed: {e}")))??;
        }
        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| Error::Analyzer(format!("mecab output is not UTF-8: {e}")))?;
        parse_mecab_output(&stdout)
    }
}
