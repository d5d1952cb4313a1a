//! Dialect keyword table
//!
//! Maps dialect spellings to the canonical keywords they stand for. Several
//! spellings may share one canonical keyword. The built-in table can be
//! replaced, or extended, by a TOML document:
//!
//! ```toml
//! extend = true
//!
//! [keywords]
//! "打印" = "print"
//! ```

use crate::lexical::is_identifier;
use crate::logging::{codes, Code};
use crate::{log_error, log_success, log_warning};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Built-in dialect spellings and their canonical keywords
pub const DEFAULT_KEYWORDS: [(&str, &str); 23] = [
    ("导入", "import"),
    ("从", "from"),
    ("定义", "def"),
    ("迭代", "for"),
    ("之于", "in"),
    ("当", "while"),
    ("循环", "while"),
    ("结果为", "return"),
    ("恒久", "True"),
    ("恒久的", "True"),
    ("对的", "True"),
    ("真的", "True"),
    ("真", "True"),
    ("从不", "False"),
    ("错的", "False"),
    ("假的", "False"),
    ("假", "False"),
    ("全局的", "global"),
    ("全局", "global"),
    ("若", "if"),
    ("如果", "if"),
    ("不行就", "elif"),
    ("否则", "else"),
];

#[derive(Debug, thiserror::Error)]
pub enum KeywordTableError {
    #[error("cannot read keyword table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed keyword table: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("keyword '{key}' is not a single identifier")]
    InvalidKey { key: String },

    #[error("keyword '{key}' has an empty replacement")]
    EmptyValue { key: String },
}

impl KeywordTableError {
    pub fn error_code(&self) -> Code {
        match self {
            KeywordTableError::Io { .. } => codes::configuration::KEYWORD_TABLE_UNREADABLE,
            KeywordTableError::Parse(_) => codes::configuration::KEYWORD_TABLE_INVALID,
            KeywordTableError::InvalidKey { .. } | KeywordTableError::EmptyValue { .. } => {
                codes::configuration::INVALID_KEYWORD_ENTRY
            }
        }
    }
}

/// On-disk shape of a keyword table document
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct KeywordTableFile {
    #[serde(default)]
    extend: bool,
    #[serde(default)]
    keywords: BTreeMap<String, String>,
}

/// Immutable dialect-to-canonical keyword mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTable {
    entries: BTreeMap<String, String>,
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl KeywordTable {
    pub fn builtin() -> Self {
        Self {
            entries: DEFAULT_KEYWORDS
                .iter()
                .map(|(dialect, canonical)| (dialect.to_string(), canonical.to_string()))
                .collect(),
        }
    }

    /// Build a table from explicit entries, validating each one
    pub fn from_entries<I, K, V>(entries: I) -> Result<Self, KeywordTableError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect::<BTreeMap<_, _>>();

        for (key, value) in &entries {
            validate_entry(key, value)?;
        }
        Ok(Self { entries })
    }

    /// Parse a TOML keyword table. With `extend = true` the document's
    /// entries are laid over the built-in table, otherwise they replace it.
    pub fn from_toml_str(content: &str) -> Result<Self, KeywordTableError> {
        let file: KeywordTableFile = toml::from_str(content)?;
        let custom = Self::from_entries(file.keywords)?;

        if !file.extend {
            return Ok(custom);
        }
        let mut table = Self::builtin();
        table.entries.extend(custom.entries);
        Ok(table)
    }

    pub fn from_file(path: &Path) -> Result<Self, KeywordTableError> {
        let result = std::fs::read_to_string(path)
            .map_err(|source| KeywordTableError::Io {
                path: path.to_path_buf(),
                source,
            })
            .and_then(|content| Self::from_toml_str(&content));

        match &result {
            Ok(table) => {
                if table.is_empty() {
                    log_warning!("Keyword table is empty; sources will pass through unchanged",
                        "path" => path.display()
                    );
                }
                log_success!(codes::success::KEYWORD_TABLE_LOADED, "Loaded keyword table",
                    "path" => path.display(),
                    "entries" => table.len()
                );
            }
            Err(error) => log_error!(error.error_code(), &error.to_string(),
                "path" => path.display()
            ),
        }
        result
    }

    /// Canonical keyword for a dialect spelling
    pub fn get(&self, word: &str) -> Option<&str> {
        self.entries.get(word).map(String::as_str)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(word)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in dialect-spelling order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(dialect, canonical)| (dialect.as_str(), canonical.as_str()))
    }

    /// All dialect spellings that translate to `canonical`
    pub fn synonyms_of<'a>(&'a self, canonical: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.iter()
            .filter(move |(_, value)| *value == canonical)
            .map(|(dialect, _)| dialect)
    }
}

fn validate_entry(key: &str, value: &str) -> Result<(), KeywordTableError> {
    if !is_identifier(key) {
        return Err(KeywordTableError::InvalidKey {
            key: key.to_string(),
        });
    }
    if value.trim().is_empty() {
        return Err(KeywordTableError::EmptyValue {
            key: key.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_builtin_table() {
        let table = KeywordTable::builtin();
        assert_eq!(table.len(), DEFAULT_KEYWORDS.len());
        assert_eq!(table.get("若"), Some("if"));
        assert_eq!(table.get("不行就"), Some("elif"));
        assert_eq!(table.get("恒久的"), Some("True"));
        assert_eq!(table.get("若干"), None);
    }

    #[test]
    fn test_synonyms() {
        let table = KeywordTable::builtin();
        let truthy: Vec<_> = table.synonyms_of("True").collect();
        assert_eq!(truthy.len(), 5);
        assert!(truthy.contains(&"真的"));
        let looping: Vec<_> = table.synonyms_of("while").collect();
        assert_eq!(looping.len(), 2);
    }

    #[test]
    fn test_builtin_keys_are_identifiers() {
        for (dialect, canonical) in DEFAULT_KEYWORDS {
            assert!(is_identifier(dialect), "{dialect}");
            assert!(!canonical.is_empty());
        }
    }

    #[test]
    fn test_replace_from_toml() {
        let table = KeywordTable::from_toml_str("[keywords]\n\"打印\" = \"print\"\n").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("打印"), Some("print"));
        assert_eq!(table.get("若"), None);
    }

    #[test]
    fn test_extend_from_toml() {
        let content = "extend = true\n[keywords]\n\"打印\" = \"print\"\n\"若\" = \"IF\"\n";
        let table = KeywordTable::from_toml_str(content).unwrap();
        assert_eq!(table.len(), DEFAULT_KEYWORDS.len() + 1);
        assert_eq!(table.get("若"), Some("IF"));
        assert_eq!(table.get("打印"), Some("print"));
    }

    #[test]
    fn test_invalid_entries() {
        let err = KeywordTable::from_toml_str("[keywords]\n\"若 如果\" = \"if\"\n").unwrap_err();
        assert_matches!(err, KeywordTableError::InvalidKey { ref key } if key == "若 如果");
        assert_eq!(err.error_code(), codes::configuration::INVALID_KEYWORD_ENTRY);

        let err = KeywordTable::from_toml_str("[keywords]\n\"若\" = \" \"\n").unwrap_err();
        assert_matches!(err, KeywordTableError::EmptyValue { .. });

        let err = KeywordTable::from_entries([("1abc", "x")]).unwrap_err();
        assert_matches!(err, KeywordTableError::InvalidKey { .. });
    }

    #[test]
    fn test_malformed_toml() {
        let err = KeywordTable::from_toml_str("[keywords\n").unwrap_err();
        assert_matches!(err, KeywordTableError::Parse(_));
        let err = KeywordTable::from_toml_str("unknown = 1\n").unwrap_err();
        assert_matches!(err, KeywordTableError::Parse(_));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[keywords]\n\"函数\" = \"def\"").unwrap();

        let table = KeywordTable::from_file(file.path()).unwrap();
        assert_eq!(table.get("函数"), Some("def"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = KeywordTable::from_file(&dir.path().join("missing.toml")).unwrap_err();
        assert_matches!(err, KeywordTableError::Io { .. });
        assert_eq!(err.error_code(), codes::configuration::KEYWORD_TABLE_UNREADABLE);
    }

    #[test]
    fn test_shipped_table_matches_builtin() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/keywords.toml");
        let table = KeywordTable::from_file(&path).unwrap();
        assert_eq!(table, KeywordTable::builtin());
    }
}
