use std::collections::BTreeSet;

use crate::normalize::matching::suggest_close;
use crate::record::{Field, Uncertain};
use crate::vocab::AllowedMap;

/// Exact-membership check for a single-select field. Returns an uncertainty
/// entry with ranked suggestions on a miss, `None` on a hit.
pub fn validate_select(field: Field, value: &str, allowed: &AllowedMap) -> Option<Uncertain> {
    let options = allowed.select_options(field);
    if let Some(options) = options {
        if options.contains(value) {
            return None;
        }
    }
    Some(Uncertain {
        field,
        value: value.to_string(),
        suggest: options
            .map(|options| suggest_close(value, options))
            .unwrap_or_default(),
    })
}

/// Partition multi-select candidates into allow-list members (sorted,
/// deduplicated) and uncertainty entries, one per rejected value.
pub fn validate_multi(
    field: Field,
    values: &[String],
    allowed: &AllowedMap,
) -> (Vec<String>, Vec<Uncertain>) {
    let options = allowed.multi_options(field);
    let mut valid = BTreeSet::new();
    let mut uncertain = Vec::new();
    for value in values {
        match options {
            Some(options) if options.contains(value) => {
                valid.insert(value.clone());
            }
            _ => uncertain.push(Uncertain {
                field,
                value: value.clone(),
                suggest: options
                    .map(|options| suggest_close(value, options))
                    .unwrap_or_default(),
            }),
        }
    }
    (valid.into_iter().collect(), uncertain)
}
