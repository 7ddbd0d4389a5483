//! Text format of the relevance table.

use hashbrown::{HashMap, HashSet};

use super::{TUPLE_DELIMITER, TUPLE_LEVELS, TagRelevanceTable, normalize_tag};

/// A malformed line in a relevance table source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("relevance table line {line}: {message}")]
pub struct TagTableError {
    /// 1-based line number.
    pub line: usize,
    pub message: String,
}

impl TagTableError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self { line, message: message.into() }
    }
}

pub(super) fn parse_table(source: &str) -> Result<TagRelevanceTable, TagTableError> {
    let mut aliases: HashMap<String, Vec<String>> = HashMap::new();
    let mut legends: HashMap<String, String> = HashMap::new();
    let mut entries: HashMap<String, HashSet<String>> = HashMap::new();

    for (idx, raw) in source.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end_matches(['\r', ' ']);
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        if let Some(decl) = line.strip_prefix(ENTITY_OPEN) {
            let (tag, legend) = parse_entity(decl, line_no)?;
            if legends.insert(tag.clone(), legend).is_some() {
                return Err(TagTableError::new(line_no, format!("duplicate entity {tag:?}")));
            }
            continue;
        }

        if let Some(def) = line.strip_prefix('@') {
            let (name, body) = def
                .split_once('=')
                .ok_or_else(|| TagTableError::new(line_no, "alias without '='"))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(TagTableError::new(line_no, "alias without a name"));
            }
            let tags = expand(body, &aliases, line_no)?;
            if tags.is_empty() {
                return Err(TagTableError::new(line_no, format!("alias @{name} is empty")));
            }
            aliases.insert(name.to_string(), tags);
            continue;
        }

        let (tuple, body) = line
            .split_once('\t')
            .ok_or_else(|| TagTableError::new(line_no, "expected <tuple>\\t<tags>"))?;
        let tuple = tuple.trim();
        let levels = tuple.split(TUPLE_DELIMITER).count();
        if levels != TUPLE_LEVELS {
            return Err(TagTableError::new(
                line_no,
                format!("tuple {tuple:?} has {levels} levels, expected {TUPLE_LEVELS}"),
            ));
        }
        let tags = expand(body, &aliases, line_no)?;
        if tags.is_empty() {
            return Err(TagTableError::new(line_no, format!("tuple {tuple:?} has no tags")));
        }
        if entries.contains_key(tuple) {
            return Err(TagTableError::new(line_no, format!("duplicate tuple {tuple:?}")));
        }
        entries.insert(tuple.to_string(), tags.into_iter().collect());
    }

    for permitted in entries.values_mut() {
        let expanded: Vec<String> = permitted
            .iter()
            .filter_map(|tag| legends.get(tag).cloned())
            .collect();
        permitted.extend(expanded);
    }

    Ok(TagRelevanceTable::from_entries(entries))
}

const ENTITY_OPEN: &str = "<!ENTITY";

/// `<!ENTITY tag "legend">`, as the JMdict DTD declares its entities.
fn parse_entity(decl: &str, line_no: usize) -> Result<(String, String), TagTableError> {
    let malformed = || TagTableError::new(line_no, "expected <!ENTITY tag \"legend\">");
    let decl = decl.trim().strip_suffix('>').ok_or_else(malformed)?;
    let (tag, legend) = decl.split_once(char::is_whitespace).ok_or_else(malformed)?;
    let legend = legend
        .trim()
        .strip_prefix('"')
        .and_then(|l| l.strip_suffix('"'))
        .ok_or_else(malformed)?
        .trim();
    if legend.is_empty() {
        return Err(TagTableError::new(line_no, format!("entity {tag:?} has an empty legend")));
    }
    Ok((normalize_tag(tag).to_string(), legend.to_string()))
}

fn expand(
    body: &str,
    aliases: &HashMap<String, Vec<String>>,
    line_no: usize,
) -> Result<Vec<String>, TagTableError> {
    let mut tags = Vec::new();
    for word in body.split_whitespace() {
        match word.strip_prefix('@') {
            Some(name) => {
                let group = aliases
                    .get(name)
                    .ok_or_else(|| TagTableError::new(line_no, format!("unknown alias @{name}")))?;
                tags.extend(group.iter().cloned());
            }
            None => tags.push(normalize_tag(word).to_string()),
        }
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_expansion() {
        let src = "# comment\n\n@adj = adj-i &adj-ku;\n形容詞,自立,*,*\t@adj suf\n";
        let table = parse_table(src).unwrap();
        let set = table.get("形容詞,自立,*,*").unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.contains("adj-ku"));
        assert!(set.contains("suf"));
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let err = parse_table("名詞,一般,*,*\t@missing\n").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("@missing"));

        let err = parse_table("# x\n名詞,一般\tn\n").unwrap_err();
        assert_eq!(err.line, 2);

        let err = parse_table("名詞,一般,*,*\tn\n名詞,一般,*,*\tpn\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("duplicate"));

        let err = parse_table("名詞,一般,*,*\t\n").unwrap_err();
        assert!(err.message.contains("no tags"));

        let err = parse_table("名詞 一般\n").unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_entity_legend_joins_permitted_set() {
        let src = "<!ENTITY v1 \"Ichidan verb\">\n<!ENTITY n \"noun (common) (futsuumeishi)\">\n\
                   動詞,自立,*,*\tv1 vt\n";
        let table = parse_table(src).unwrap();
        let set = table.get("動詞,自立,*,*").unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.contains("Ichidan verb"));
        assert!(!set.contains("noun (common) (futsuumeishi)"));
    }

    #[test]
    fn test_malformed_entities_rejected() {
        let err = parse_table("<!ENTITY v1 Ichidan verb>\n").unwrap_err();
        assert_eq!(err.line, 1);

        let err = parse_table("<!ENTITY v1 \"\">\n").unwrap_err();
        assert!(err.message.contains("empty legend"));

        let err = parse_table("<!ENTITY v1 \"a\">\n<!ENTITY v1 \"b\">\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(err.message.contains("duplicate"));
    }

    #[test]
    fn test_alias_must_precede_use() {
        let src = "名詞,一般,*,*\t@noun\n@noun = n\n";
        assert!(parse_table(src).is_err());
    }
}
