use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::TableClient;
use crate::pipeline::preview_records;
use crate::record::{Field, Record};
use crate::vocab::Vocabulary;
use crate::TARGET_STORE;

/// Per-record result of a write attempt.
#[derive(Debug, Serialize)]
pub struct WriteOutcome {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Write confirmed records to the datastore.
///
/// Safety gate: each record is re-run through the full pipeline right
/// before persisting — the allow-list may have changed since the preview —
/// and is skipped when any uncertain field remains. The normalized record
/// is what gets written; `requirements` is excluded from the create
/// payload and linked afterwards under the named relation.
pub async fn write_records(
    client: &TableClient,
    records: Vec<Record>,
    table_id: &str,
    rel_name: Option<&str>,
    vocab: &Vocabulary,
) -> Result<Vec<WriteOutcome>> {
    let mut results = Vec::with_capacity(records.len());
    for rec in records {
        let Some(item) = preview_records(vec![rec], vocab).pop() else {
            continue;
        };
        if !item.uncertain.is_empty() {
            info!(
                target: TARGET_STORE,
                "skipping record with {} uncertain fields", item.uncertain.len()
            );
            results.push(WriteOutcome {
                status: "skip",
                id: None,
                reason: Some("uncertain_fields".to_string()),
            });
            continue;
        }

        let payload = record_payload(&item.record)?;
        let created = client.create_record(table_id, &payload).await?;
        let new_id = extract_row_id(&created);

        if let (Some(row_id), Some(rel)) = (new_id, rel_name) {
            if let Some(req_ids) = item.record.requirements.as_deref() {
                if !req_ids.is_empty()
                    && !client.link_requirements(table_id, rel, row_id, req_ids).await
                {
                    warn!(
                        target: TARGET_STORE,
                        "failed to link requirements for row {}", row_id
                    );
                }
            }
        }

        results.push(WriteOutcome {
            status: "ok",
            id: new_id,
            reason: None,
        });
    }
    Ok(results)
}

// The relation is linked separately, never sent as a column value.
fn record_payload(record: &Record) -> Result<Value> {
    let mut value = serde_json::to_value(record)?;
    if let Value::Object(map) = &mut value {
        map.remove(Field::Requirements.column());
    }
    Ok(value)
}

// Row id casing differs between datastore versions.
fn extract_row_id(created: &Value) -> Option<i64> {
    ["Id", "id", "ID"]
        .iter()
        .find_map(|key| created.get(*key).and_then(Value::as_i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_excludes_requirements_and_nulls() {
        let record = Record {
            title: Some("Вакансия".to_string()),
            requirements: Some(vec![1, 2]),
            ..Record::default()
        };
        let payload = record_payload(&record).unwrap();
        let map = payload.as_object().unwrap();
        assert_eq!(map.get("Title"), Some(&json!("Вакансия")));
        assert!(!map.contains_key("Требования"));
        assert!(!map.contains_key("Статус"));
    }

    #[test]
    fn test_extract_row_id_casings() {
        assert_eq!(extract_row_id(&json!({"Id": 5})), Some(5));
        assert_eq!(extract_row_id(&json!({"id": 6})), Some(6));
        assert_eq!(extract_row_id(&json!({"ID": 7})), Some(7));
        assert_eq!(extract_row_id(&json!({"row": 8})), None);
    }
}
