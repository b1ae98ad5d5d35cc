//! The preview pipeline: canonicalize a batch of records, validate them
//! against the allow-list, and score the result.
//!
//! Each record is processed independently and always yields a
//! `PreviewItem`, even when every field is uncertain; one bad record never
//! fails a batch. The pipeline is synchronous and re-entrant: it reads the
//! shared vocabulary and mutates only its own record.

pub mod validate;

use std::collections::BTreeSet;
use tracing::debug;

use crate::normalize::{
    normalize_dept, normalize_role, normalize_schedule, normalize_shift, normalize_time_tokens,
};
use crate::record::{PreviewItem, Record, MULTI_FIELDS, SINGLE_FIELDS};
use crate::vocab::Vocabulary;
use crate::TARGET_PIPELINE;

use self::validate::{validate_multi, validate_select};

// 1 + the six validated select-type fields. A heuristic normalizer, not a
// calibrated score; keep the formula as-is.
pub const CONFIDENCE_DENOMINATOR: f64 = 7.0;

/// Confidence in [0, 1], rounded to two decimals, non-increasing in the
/// number of uncertain entries.
pub fn confidence_score(uncertain_count: usize) -> f64 {
    let conf = (1.0 - uncertain_count as f64 / CONFIDENCE_DENOMINATOR).max(0.0);
    (conf * 100.0).round() / 100.0
}

/// Run the full pipeline over a batch, order-preserving.
pub fn preview_records(records: Vec<Record>, vocab: &Vocabulary) -> Vec<PreviewItem> {
    records
        .into_iter()
        .map(|record| preview_record(record, vocab))
        .collect()
}

fn preview_record(mut rec: Record, vocab: &Vocabulary) -> PreviewItem {
    let mut notes: Vec<String> = Vec::new();
    let mut uncertain = Vec::new();

    // --- canonicalization ---
    if let Some(role) = rec.role.take() {
        rec.role = Some(normalize_role(&role));
    }

    if let Some(values) = rec.shift_type.take() {
        let mut acc: BTreeSet<String> = BTreeSet::new();
        for value in &values {
            acc.extend(normalize_shift(value));
        }
        // keep the original set when nothing matched
        rec.shift_type = Some(if acc.is_empty() {
            values
        } else {
            acc.into_iter().collect()
        });
    }

    if let Some(values) = rec.schedule.take() {
        let mut acc: BTreeSet<String> = BTreeSet::new();
        for value in &values {
            acc.extend(normalize_schedule(value));
        }
        rec.schedule = Some(if acc.is_empty() {
            values
        } else {
            acc.into_iter().collect()
        });
    }

    if let Some(values) = rec.work_hours.take() {
        let mut acc: BTreeSet<String> = BTreeSet::new();
        for value in &values {
            let (times, mut time_notes) = normalize_time_tokens(value);
            notes.append(&mut time_notes);
            acc.extend(times);
        }
        rec.work_hours = Some(if acc.is_empty() {
            values
        } else {
            acc.into_iter().collect()
        });
    }

    if let Some(dept) = rec.department.take() {
        rec.department = Some(normalize_dept(&dept, &vocab.aliases));
    }

    // --- validation against the allow-list ---
    for field in SINGLE_FIELDS {
        let Some(value) = rec.select(field) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        if let Some(entry) = validate_select(field, value, &vocab.allowed) {
            debug!(
                target: TARGET_PIPELINE,
                "{} '{}' is not a known option ({} suggestions)",
                field,
                entry.value,
                entry.suggest.len()
            );
            uncertain.push(entry);
        }
    }

    for field in MULTI_FIELDS {
        let values = match rec.multi(field) {
            Some(values) if !values.is_empty() => values.to_vec(),
            _ => continue,
        };
        let (valid, mut entries) = validate_multi(field, &values, &vocab.allowed);
        rec.set_multi(field, valid);
        uncertain.append(&mut entries);
    }

    let confidence = confidence_score(uncertain.len());
    PreviewItem {
        record: rec,
        uncertain,
        notes,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Field;
    use crate::vocab::{parse_aliases, AllowedMap, Vocabulary};

    fn vocabulary() -> Vocabulary {
        let allowed = AllowedMap::parse(
            r#"{
                "selects": {
                    "Должность": [
                        "Процедурная медицинская сестра",
                        "Палатная медицинская сестра",
                        "Операционная медицинская сестра"
                    ],
                    "Статус": ["Открыта", "Закрыта"],
                    "Отделение": [
                        "Операционный блок",
                        "Дневной стационар детской онкологии и гематологии"
                    ]
                },
                "multiselects": {
                    "Время_работы": [
                        "08:00 - 17:00",
                        "08:00 - 20:00",
                        "17:00 - 08:00",
                        "08:00 - 08:00"
                    ],
                    "Работник": [
                        "Студент УГМУ",
                        "Студент СОМК",
                        "Основной сотрудник",
                        "Студент УРГУПС"
                    ],
                    "Тип_смены": ["Суточные смены", "Дневные смены", "Вечерние смены"],
                    "График": ["5/2", "1/3", "2/2", "Смешанный"]
                }
            }"#,
        )
        .unwrap();
        let aliases = parse_aliases("опер блок: Операционный блок\n");
        Vocabulary { allowed, aliases }
    }

    fn sample_record() -> Record {
        Record {
            title: Some("Процедурная медсестра".to_string()),
            role: Some("процедурная медсестра".to_string()),
            department: Some(
                "Дневной стационар онкологического и гематологического центра".to_string(),
            ),
            schedule: Some(vec!["2/2 (возможны 1/3)".to_string()]),
            shift_type: Some(vec!["дневная 12-часовая".to_string()]),
            work_hours: Some(vec!["12 часов (8:00-20:00)".to_string()]),
            status: Some("Открыта".to_string()),
            ..Record::default()
        }
    }

    #[test]
    fn test_confidence_formula() {
        assert_eq!(confidence_score(0), 1.0);
        assert_eq!(confidence_score(1), 0.86);
        assert_eq!(confidence_score(3), 0.57);
        assert_eq!(confidence_score(7), 0.0);
        assert_eq!(confidence_score(20), 0.0);
    }

    #[test]
    fn test_confidence_is_non_increasing() {
        let mut last = f64::INFINITY;
        for count in 0..10 {
            let conf = confidence_score(count);
            assert!((0.0..=1.0).contains(&conf));
            assert!(conf <= last);
            last = conf;
        }
    }

    #[test]
    fn test_preview_with_allowed_map() {
        let vocab = vocabulary();
        let items = preview_records(vec![sample_record()], &vocab);
        assert_eq!(items.len(), 1);
        let item = &items[0];

        // Normalized values resolved against the allow-list.
        let shifts = item.record.shift_type.as_deref().unwrap();
        assert!(shifts.contains(&"Дневные смены".to_string()));
        let schedule = item.record.schedule.as_deref().unwrap();
        assert!(schedule.contains(&"2/2".to_string()));
        assert!(schedule.contains(&"1/3".to_string()));
        let hours = item.record.work_hours.as_deref().unwrap();
        assert!(hours.contains(&"08:00 - 20:00".to_string()));

        // The department is off-vocabulary and must be flagged with at
        // least one suggestion.
        let dept_entries: Vec<_> = item
            .uncertain
            .iter()
            .filter(|u| u.field == Field::Department)
            .collect();
        assert_eq!(dept_entries.len(), 1);
        assert!(!dept_entries[0].suggest.is_empty());

        // No other field is uncertain.
        assert_eq!(item.uncertain.len(), 1);
        assert_eq!(item.confidence, 0.86);
        assert!(item.notes.is_empty());
    }

    #[test]
    fn test_department_alias_resolves_cleanly() {
        let vocab = vocabulary();
        let rec = Record {
            department: Some("Опер  блок".to_string()),
            ..Record::default()
        };
        let items = preview_records(vec![rec], &vocab);
        let item = &items[0];
        assert_eq!(item.record.department.as_deref(), Some("Операционный блок"));
        assert!(item.uncertain.is_empty());
        assert_eq!(item.confidence, 1.0);
    }

    #[test]
    fn test_multi_pruning_invariant() {
        let vocab = vocabulary();
        let rec = Record {
            schedule: Some(vec!["2/2, 7/0".to_string()]),
            ..Record::default()
        };
        let items = preview_records(vec![rec], &vocab);
        let item = &items[0];
        let schedule = item.record.schedule.as_deref().unwrap();
        let options = vocab.allowed.multi_options(Field::Schedule).unwrap();
        assert!(schedule.iter().all(|v| options.contains(v)));
        // 7/0 survives extraction but is pruned by validation.
        assert!(item
            .uncertain
            .iter()
            .any(|u| u.field == Field::Schedule && u.value == "7/0"));
    }

    #[test]
    fn test_unmatched_shift_keeps_original_value() {
        let vocab = vocabulary();
        let rec = Record {
            shift_type: Some(vec!["по договорённости".to_string()]),
            ..Record::default()
        };
        let items = preview_records(vec![rec], &vocab);
        let item = &items[0];
        assert!(item
            .uncertain
            .iter()
            .any(|u| u.field == Field::ShiftType && u.value == "по договорённости"));
        // The rejected value is pruned from the record itself.
        assert_eq!(item.record.shift_type.as_deref(), Some(&[][..]));
    }

    #[test]
    fn test_bare_hours_note_is_collected() {
        let vocab = vocabulary();
        let rec = Record {
            work_hours: Some(vec!["12 часов".to_string()]),
            ..Record::default()
        };
        let items = preview_records(vec![rec], &vocab);
        let item = &items[0];
        assert_eq!(
            item.notes,
            vec!["Указаны только часы без интервала".to_string()]
        );
    }

    #[test]
    fn test_empty_vocabulary_flags_everything_without_suggestions() {
        let vocab = Vocabulary::default();
        let items = preview_records(vec![sample_record()], &vocab);
        let item = &items[0];
        // role, status, department + four multiselect values (1/3, 2/2,
        // Дневные смены, 08:00 - 20:00)
        assert_eq!(item.uncertain.len(), 7);
        assert!(item.uncertain.iter().all(|u| u.suggest.is_empty()));
        assert_eq!(item.confidence, 0.0);
    }

    #[test]
    fn test_preview_is_near_idempotent() {
        let vocab = vocabulary();
        let first = preview_records(vec![sample_record()], &vocab)
            .pop()
            .unwrap();
        let second = preview_records(vec![first.record.clone()], &vocab)
            .pop()
            .unwrap();
        assert_eq!(first.record.schedule, second.record.schedule);
        assert_eq!(first.record.shift_type, second.record.shift_type);
        assert_eq!(first.record.work_hours, second.record.work_hours);
        assert!(second.confidence >= first.confidence);
    }

    #[test]
    fn test_batch_order_is_preserved() {
        let vocab = vocabulary();
        let first = Record {
            title: Some("first".to_string()),
            ..Record::default()
        };
        let second = Record {
            title: Some("second".to_string()),
            ..Record::default()
        };
        let items = preview_records(vec![first, second], &vocab);
        assert_eq!(items[0].record.title.as_deref(), Some("first"));
        assert_eq!(items[1].record.title.as_deref(), Some("second"));
    }

    #[test]
    fn test_determinism() {
        let vocab = vocabulary();
        let a = preview_records(vec![sample_record()], &vocab);
        let b = preview_records(vec![sample_record()], &vocab);
        assert_eq!(a[0].record, b[0].record);
        assert_eq!(a[0].uncertain, b[0].uncertain);
        assert_eq!(a[0].confidence, b[0].confidence);
    }
}
