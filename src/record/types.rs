use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One column of the vacancy table.
///
/// Serializes as the datastore column name, so the same tag is usable in
/// JSON payloads, CSV headers, and uncertainty reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Department,
    Role,
    WorkerType,
    Schedule,
    ShiftType,
    WorkHours,
    Salary,
    Contact,
    Status,
    Requirements,
}

/// Select fields validated against the allow-list, in validation order.
pub const SINGLE_FIELDS: [Field; 3] = [Field::Role, Field::Status, Field::Department];

/// Multi-select fields validated against the allow-list, in validation order.
pub const MULTI_FIELDS: [Field; 4] = [
    Field::WorkerType,
    Field::Schedule,
    Field::ShiftType,
    Field::WorkHours,
];

impl Field {
    /// The column name used by the datastore and the CSV header row.
    pub fn column(&self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Department => "Отделение",
            Field::Role => "Должность",
            Field::WorkerType => "Работник",
            Field::Schedule => "График",
            Field::ShiftType => "Тип_смены",
            Field::WorkHours => "Время_работы",
            Field::Salary => "Зарплата",
            Field::Contact => "Контактное_лицо",
            Field::Status => "Статус",
            Field::Requirements => "Требования",
        }
    }

    pub fn from_column(name: &str) -> Option<Field> {
        match name {
            "Title" => Some(Field::Title),
            "Отделение" => Some(Field::Department),
            "Должность" => Some(Field::Role),
            "Работник" => Some(Field::WorkerType),
            "График" => Some(Field::Schedule),
            "Тип_смены" => Some(Field::ShiftType),
            "Время_работы" => Some(Field::WorkHours),
            "Зарплата" => Some(Field::Salary),
            "Контактное_лицо" => Some(Field::Contact),
            "Статус" => Some(Field::Status),
            "Требования" => Some(Field::Requirements),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl Serialize for Field {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.column())
    }
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Field::from_column(&name)
            .ok_or_else(|| de::Error::custom(format!("unknown column: {name}")))
    }
}

/// One vacancy submission candidate. Every field is optional; multi-select
/// fields accept either a list or a delimited scalar string on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Title", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(rename = "Отделение", default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    #[serde(rename = "Должность", default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(
        rename = "Работник",
        default,
        deserialize_with = "de_multi",
        skip_serializing_if = "Option::is_none"
    )]
    pub worker_type: Option<Vec<String>>,

    #[serde(
        rename = "График",
        default,
        deserialize_with = "de_multi",
        skip_serializing_if = "Option::is_none"
    )]
    pub schedule: Option<Vec<String>>,

    #[serde(
        rename = "Тип_смены",
        default,
        deserialize_with = "de_multi",
        skip_serializing_if = "Option::is_none"
    )]
    pub shift_type: Option<Vec<String>>,

    #[serde(
        rename = "Время_работы",
        default,
        deserialize_with = "de_multi",
        skip_serializing_if = "Option::is_none"
    )]
    pub work_hours: Option<Vec<String>>,

    #[serde(rename = "Зарплата", default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,

    #[serde(
        rename = "Контактное_лицо",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub contact: Option<String>,

    #[serde(rename = "Статус", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(rename = "Требования", default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Vec<i64>>,
}

impl Record {
    /// Current value of a single-select field; `None` for any other field.
    pub fn select(&self, field: Field) -> Option<&str> {
        match field {
            Field::Role => self.role.as_deref(),
            Field::Department => self.department.as_deref(),
            Field::Status => self.status.as_deref(),
            _ => None,
        }
    }

    /// Current values of a multi-select field; `None` for any other field.
    pub fn multi(&self, field: Field) -> Option<&[String]> {
        match field {
            Field::WorkerType => self.worker_type.as_deref(),
            Field::Schedule => self.schedule.as_deref(),
            Field::ShiftType => self.shift_type.as_deref(),
            Field::WorkHours => self.work_hours.as_deref(),
            _ => None,
        }
    }

    /// Overwrite a multi-select field. No-op for non-multi fields.
    pub fn set_multi(&mut self, field: Field, values: Vec<String>) {
        match field {
            Field::WorkerType => self.worker_type = Some(values),
            Field::Schedule => self.schedule = Some(values),
            Field::ShiftType => self.shift_type = Some(values),
            Field::WorkHours => self.work_hours = Some(values),
            _ => {}
        }
    }

    /// Assign a raw cell value to a column, applying the per-column coercion
    /// rules. Empty cells leave the field absent.
    pub fn set_column_text(&mut self, field: Field, raw: &str) {
        let value = raw.trim();
        if value.is_empty() {
            return;
        }
        match field {
            Field::Title => self.title = Some(value.to_string()),
            Field::Department => self.department = Some(value.to_string()),
            Field::Role => self.role = Some(value.to_string()),
            Field::Salary => self.salary = Some(value.to_string()),
            Field::Contact => self.contact = Some(value.to_string()),
            Field::Status => self.status = Some(value.to_string()),
            Field::WorkerType
            | Field::Schedule
            | Field::ShiftType
            | Field::WorkHours => self.set_multi(field, split_multi(value)),
            Field::Requirements => self.requirements = parse_requirement_ids(value),
        }
    }
}

/// Split a scalar multi-select value on `,`/`;` into nonempty trimmed
/// tokens. Falls back to the single trimmed literal when splitting yields
/// nothing.
pub fn split_multi(raw: &str) -> Vec<String> {
    let parts: Vec<String> = raw
        .replace(';', ",")
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect();
    if parts.is_empty() {
        vec![raw.trim().to_string()]
    } else {
        parts
    }
}

/// Parse a requirement id list, keeping only purely-decimal tokens.
/// Returns `None` when no valid id remains.
pub fn parse_requirement_ids(raw: &str) -> Option<Vec<i64>> {
    let ids: Vec<i64> = raw
        .replace(';', ",")
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty() && t.chars().all(|c| c.is_ascii_digit()))
        .filter_map(|t| t.parse().ok())
        .collect();
    if ids.is_empty() {
        None
    } else {
        Some(ids)
    }
}

fn de_multi<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<String>),
        One(String),
    }

    Ok(Option::<OneOrMany>::deserialize(deserializer)?.map(|v| match v {
        OneOrMany::Many(values) => values,
        OneOrMany::One(raw) => split_multi(&raw),
    }))
}

/// A field value absent from the allow-list, with ranked correction
/// suggestions (best first, at most three).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Uncertain {
    pub field: Field,
    pub value: String,
    pub suggest: Vec<String>,
}

/// Transient preview of one record: the normalized record, its unresolved
/// fields, advisory notes, and the confidence score. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewItem {
    pub record: Record,
    #[serde(default)]
    pub uncertain: Vec<Uncertain>,
    #[serde(default)]
    pub notes: Vec<String>,
    pub confidence: f64,
}
