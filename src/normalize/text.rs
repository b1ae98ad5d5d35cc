use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use unicode_normalization::UnicodeNormalization;

use super::synonyms::{CANONICAL_SHIFTS, DEPT_TYPOS, ROLE_SYNONYMS, SHIFT_SYNONYMS};
use crate::vocab::AliasMap;

lazy_static! {
    // Time intervals like "8:00 - 20:00", "8.00-20.00", "800 - 2000".
    // Dash variants are folded to ASCII hyphen before matching.
    static ref TIME_RE: Regex = Regex::new(
        r"(?P<h1>\d{1,2})[:.\-]?(?P<m1>\d{2})\s*-\s*(?P<h2>\d{1,2})[:.\-]?(?P<m2>\d{2})"
    )
    .unwrap();
    // A bare shift length ("8 часов", "12ч...") with no interval. The regex
    // crate has no lookbehind; the leading group forbids a preceding digit.
    static ref ONLY_HOURS_RE: Regex =
        Regex::new(r"(?i)(?:^|[^0-9])(8|12|24)\s*час").unwrap();
    // Schedule ratios like "2/2", "1 / 3".
    static ref RATIO_RE: Regex = Regex::new(r"\b\d\s*/\s*\d\b").unwrap();
    static ref DEPT_TYPO_RES: Vec<(Regex, &'static str)> = DEPT_TYPOS
        .iter()
        .map(|(bad, good)| {
            (
                Regex::new(&format!("(?i){}", regex::escape(bad))).unwrap(),
                *good,
            )
        })
        .collect();
}

/// NFC-normalize and collapse runs of whitespace into single spaces.
pub fn collapse_ws(raw: &str) -> String {
    raw.nfc()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn canon_time(h1: u32, m1: u32, h2: u32, m2: u32) -> String {
    format!("{h1:02}:{m1:02} - {h2:02}:{m2:02}")
}

/// Extract every time interval from free text as canonical
/// `HH:MM - HH:MM` strings, deduplicated and sorted.
///
/// When no interval is found but a bare hour count is present, returns an
/// advisory note instead of a value.
pub fn normalize_time_tokens(raw: &str) -> (Vec<String>, Vec<String>) {
    let s = raw.replace(['—', '–', '‐'], "-");
    let mut found = BTreeSet::new();
    for cap in TIME_RE.captures_iter(&s) {
        let h1: u32 = cap["h1"].parse().unwrap_or(0);
        let m1: u32 = cap["m1"].parse().unwrap_or(0);
        let h2: u32 = cap["h2"].parse().unwrap_or(0);
        let m2: u32 = cap["m2"].parse().unwrap_or(0);
        found.insert(canon_time(h1, m1, h2, m2));
    }
    let mut notes = Vec::new();
    if found.is_empty() && ONLY_HOURS_RE.is_match(&s) {
        notes.push("Указаны только часы без интервала".to_string());
    }
    (found.into_iter().collect(), notes)
}

/// Map a free-form shift description onto the canonical shift labels.
/// Returns a sorted set; empty when nothing matches, in which case the
/// caller keeps the original value.
pub fn normalize_shift(raw: &str) -> Vec<String> {
    let s = collapse_ws(raw).to_lowercase();
    let mut out = BTreeSet::new();
    for (key, canon) in SHIFT_SYNONYMS {
        if s.contains(key) {
            out.insert((*canon).to_string());
        }
    }
    for (exact, canon) in CANONICAL_SHIFTS {
        if s == *exact {
            out.insert((*canon).to_string());
        }
    }
    out.into_iter().collect()
}

/// Extract schedule ratios ("2/2", "1/3") from free text, deduplicated and
/// sorted. Connector words are treated as separators; tokens that are not
/// ratio-shaped are dropped.
pub fn normalize_schedule(raw: &str) -> Vec<String> {
    let s = collapse_ws(raw).replace("или", ",").replace("возможны", ",");
    let mut out = BTreeSet::new();
    for m in RATIO_RE.find_iter(&s) {
        out.insert(
            m.as_str()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>(),
        );
    }
    out.into_iter().collect()
}

/// Canonicalize a role name via exact case-insensitive synonym lookup;
/// unmatched input passes through whitespace-collapsed.
pub fn normalize_role(raw: &str) -> String {
    let s = collapse_ws(raw);
    let lower = s.to_lowercase();
    for (syn, canon) in ROLE_SYNONYMS {
        if lower == *syn {
            return (*canon).to_string();
        }
    }
    s
}

/// Canonicalize a department name: fix known typos, then try an exact
/// case-insensitive alias lookup. Misses return the typo-corrected string.
pub fn normalize_dept(raw: &str, aliases: &AliasMap) -> String {
    let mut base = collapse_ws(raw);
    for (re, good) in DEPT_TYPO_RES.iter() {
        base = re.replace_all(&base, *good).into_owned();
    }
    if let Some(canon) = aliases.get(&base.to_lowercase()) {
        return canon.clone();
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_em_dash_interval() {
        let (times, notes) = normalize_time_tokens("8:00—20:00");
        assert_eq!(times, vec!["08:00 - 20:00".to_string()]);
        assert!(notes.is_empty());
    }

    #[test]
    fn test_time_interval_inside_text() {
        let (times, notes) = normalize_time_tokens("12 часов (8:00-20:00)");
        assert_eq!(times, vec!["08:00 - 20:00".to_string()]);
        assert!(notes.is_empty());
    }

    #[test]
    fn test_time_multiple_intervals() {
        let (times, _) = normalize_time_tokens("8.00-17.00 либо 17:00 – 08:00");
        assert_eq!(
            times,
            vec!["08:00 - 17:00".to_string(), "17:00 - 08:00".to_string()]
        );
    }

    #[test]
    fn test_bare_hours_produce_note_and_no_value() {
        let (times, notes) = normalize_time_tokens("12 часов");
        assert!(times.is_empty());
        assert_eq!(notes, vec!["Указаны только часы без интервала".to_string()]);
    }

    #[test]
    fn test_unrelated_text_is_silent() {
        let (times, notes) = normalize_time_tokens("график обсуждается");
        assert!(times.is_empty());
        assert!(notes.is_empty());
    }

    #[test]
    fn test_shift_synonyms() {
        assert_eq!(
            normalize_shift("дневная 12-часовая"),
            vec!["Дневные смены".to_string()]
        );
        assert!(normalize_shift("24ч").contains(&"Суточные смены".to_string()));
        assert_eq!(
            normalize_shift("Суточные смены"),
            vec!["Суточные смены".to_string()]
        );
        assert!(normalize_shift("по договорённости").is_empty());
    }

    #[test]
    fn test_shift_union_over_one_string() {
        let out = normalize_shift("дневная или вечерняя");
        assert_eq!(
            out,
            vec!["Вечерние смены".to_string(), "Дневные смены".to_string()]
        );
    }

    #[test]
    fn test_schedule_extraction() {
        let vals = normalize_schedule("2/2 (возможны 1/3 1/2), 5/2");
        for expected in ["1/2", "1/3", "2/2", "5/2"] {
            assert!(vals.contains(&expected.to_string()), "missing {expected}");
        }
    }

    #[test]
    fn test_schedule_strips_inner_whitespace() {
        assert_eq!(normalize_schedule("1 / 3"), vec!["1/3".to_string()]);
    }

    #[test]
    fn test_schedule_drops_non_ratio_tokens() {
        assert!(normalize_schedule("гибкий график").is_empty());
    }

    #[test]
    fn test_role_exact_alias() {
        assert_eq!(
            normalize_role("процедурная медсестра"),
            "Процедурная медицинская сестра"
        );
        assert_eq!(
            normalize_role("ПРОЦЕДУРНАЯ   МЕДСЕСТРА"),
            "Процедурная медицинская сестра"
        );
    }

    #[test]
    fn test_role_passthrough_is_collapsed() {
        assert_eq!(normalize_role("  старшая  медсестра "), "старшая медсестра");
    }

    #[test]
    fn test_dept_typo_then_alias() {
        let mut aliases = AliasMap::new();
        aliases.insert(
            "отделение анестезиологии".to_string(),
            "Отделение анестезиологии и реанимации".to_string(),
        );
        assert_eq!(
            normalize_dept("Отделение анестезиолгии", &aliases),
            "Отделение анестезиологии и реанимации"
        );
    }

    #[test]
    fn test_dept_miss_keeps_corrected_string() {
        let aliases = AliasMap::new();
        assert_eq!(
            normalize_dept("  Отделение   анестезиолоии ", &aliases),
            "Отделение анестезиологии"
        );
    }

    #[test]
    fn test_empty_input_is_total() {
        assert!(normalize_shift("").is_empty());
        assert!(normalize_schedule("").is_empty());
        assert_eq!(normalize_role(""), "");
        let (times, notes) = normalize_time_tokens("");
        assert!(times.is_empty() && notes.is_empty());
    }
}
