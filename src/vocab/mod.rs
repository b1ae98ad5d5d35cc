//! Controlled vocabulary: the allow-list of valid select/multi-select
//! values and the department alias table.
//!
//! Both sources are immutable snapshots for the duration of a batch. A
//! missing source degrades to an empty map; validation then flags every
//! present value with no suggestions.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::config::Settings;
use crate::record::Field;

/// Lowercase alias -> canonical department name.
pub type AliasMap = HashMap<String, String>;

/// Closed universe of values the datastore accepts, keyed by column name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllowedMap {
    #[serde(default)]
    pub selects: HashMap<String, BTreeSet<String>>,
    #[serde(default)]
    pub multiselects: HashMap<String, BTreeSet<String>>,
}

impl AllowedMap {
    pub fn parse(json: &str) -> Result<Self> {
        let mut map: AllowedMap = serde_json::from_str(json)?;
        map.tidy();
        Ok(map)
    }

    pub fn select_options(&self, field: Field) -> Option<&BTreeSet<String>> {
        self.selects.get(field.column())
    }

    pub fn multi_options(&self, field: Field) -> Option<&BTreeSet<String>> {
        self.multiselects.get(field.column())
    }

    fn tidy(&mut self) {
        for options in self
            .selects
            .values_mut()
            .chain(self.multiselects.values_mut())
        {
            *options = options
                .iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect();
        }
    }
}

/// Parse the line-oriented `key: value` alias source. Blank lines and `#`
/// comments are skipped, quotes around the value are stripped, keys are
/// lowercased.
pub fn parse_aliases(text: &str) -> AliasMap {
    let mut out = AliasMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().trim_matches('"').trim_matches('\'');
        out.insert(key.trim().to_lowercase(), value.to_string());
    }
    out
}

pub fn load_aliases(path: &Path) -> AliasMap {
    match fs::read_to_string(path) {
        Ok(text) => parse_aliases(&text),
        Err(_) => {
            warn!(
                "alias file {} is missing, using an empty alias map",
                path.display()
            );
            AliasMap::new()
        }
    }
}

pub fn load_allowed_map(path: &Path) -> Result<AllowedMap> {
    if !path.exists() {
        warn!(
            "allow-list map {} is missing, validation will flag every value",
            path.display()
        );
        return Ok(AllowedMap::default());
    }
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    AllowedMap::parse(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// The two lookup tables the pipeline reads. Loaded once per batch and
/// passed down explicitly; the pipeline holds no global state.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    pub allowed: AllowedMap,
    pub aliases: AliasMap,
}

impl Vocabulary {
    pub fn load(settings: &Settings) -> Result<Self> {
        Ok(Vocabulary {
            allowed: load_allowed_map(Path::new(&settings.map_path))?,
            aliases: load_aliases(Path::new(&settings.aliases_path)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases_skips_comments_and_strips_quotes() {
        let text = "\
# сокращения отделений
опер блок: \"Операционный блок\"

ДС ДОГ: 'Дневной стационар детской онкологии и гематологии'
строка без разделителя
";
        let aliases = parse_aliases(text);
        assert_eq!(aliases.len(), 2);
        assert_eq!(
            aliases.get("опер блок").map(String::as_str),
            Some("Операционный блок")
        );
        assert_eq!(
            aliases.get("дс дог").map(String::as_str),
            Some("Дневной стационар детской онкологии и гематологии")
        );
    }

    #[test]
    fn test_allowed_map_trims_and_dedups() {
        let map = AllowedMap::parse(
            r#"{"selects": {"Статус": [" Открыта", "Открыта ", "Закрыта"]}, "multiselects": {}}"#,
        )
        .unwrap();
        let options = map.select_options(crate::record::Field::Status).unwrap();
        assert_eq!(options.len(), 2);
        assert!(options.contains("Открыта"));
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let map = AllowedMap::parse("{}").unwrap();
        assert!(map.selects.is_empty());
        assert!(map.multiselects.is_empty());
    }

    #[test]
    fn test_load_allowed_map_absent_file_is_empty() {
        let map = load_allowed_map(Path::new("/nonexistent/agent-map.json")).unwrap();
        assert!(map.selects.is_empty());
    }

    #[test]
    fn test_load_aliases_absent_file_is_empty() {
        assert!(load_aliases(Path::new("/nonexistent/aliases.yml")).is_empty());
    }
}
