use std::cmp::Ordering;
use strsim::jaro_winkler;

// Minimum similarity for a "did you mean" candidate.
const SUGGEST_THRESHOLD: f64 = 0.55;
const MAX_SUGGESTIONS: usize = 3;

/// Rank allow-list options by similarity to `value` and return up to three
/// candidates clearing the threshold, best first. Ties break
/// alphabetically so the output is deterministic.
///
/// Callers check exact membership before calling this; it is the miss path
/// that produces correction suggestions.
pub fn suggest_close<'a, I>(value: &str, options: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut scored: Vec<(f64, &'a String)> = options
        .into_iter()
        .map(|opt| (jaro_winkler(value, opt), opt))
        .filter(|(score, _)| *score >= SUGGEST_THRESHOLD)
        .collect();
    scored.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.cmp(b.1))
    });
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, opt)| opt.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_close_match_ranked_first() {
        let opts = options(&["Открыта", "Закрыта"]);
        let suggest = suggest_close("открыта", &opts);
        assert_eq!(suggest.first().map(String::as_str), Some("Открыта"));
    }

    #[test]
    fn test_caps_at_three_suggestions() {
        let opts = options(&["1/2", "1/3", "1/4", "1/5"]);
        assert_eq!(suggest_close("1/6", &opts).len(), 3);
    }

    #[test]
    fn test_dissimilar_strings_give_nothing() {
        let opts = options(&["Открыта"]);
        assert!(suggest_close("xyz", &opts).is_empty());
    }

    #[test]
    fn test_empty_options_give_nothing() {
        let opts: Vec<String> = Vec::new();
        assert!(suggest_close("что-нибудь", &opts).is_empty());
    }

    #[test]
    fn test_near_department_name_is_suggested() {
        let opts = options(&[
            "Операционный блок",
            "Дневной стационар детской онкологии и гематологии",
        ]);
        let suggest = suggest_close(
            "Дневной стационар онкологического и гематологического центра",
            &opts,
        );
        assert_eq!(
            suggest.first().map(String::as_str),
            Some("Дневной стационар детской онкологии и гематологии")
        );
    }
}
