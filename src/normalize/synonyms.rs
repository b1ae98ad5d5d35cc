//! Synonym and typo tables for field canonicalization.

/// Substring -> canonical shift label. Matched against lowercased,
/// whitespace-collapsed input; all matches are unioned.
pub const SHIFT_SYNONYMS: &[(&str, &str)] = &[
    ("сутки", "Суточные смены"),
    ("24ч", "Суточные смены"),
    ("24 ч", "Суточные смены"),
    ("круглосуточно", "Суточные смены"),
    ("дневная", "Дневные смены"),
    ("дневн", "Дневные смены"),
    ("вечерняя", "Вечерние смены"),
    ("вечерн", "Вечерние смены"),
];

/// Exact lowercase forms recognized as canonical shift labels directly.
pub const CANONICAL_SHIFTS: &[(&str, &str)] = &[
    ("суточные", "Суточные смены"),
    ("суточные смены", "Суточные смены"),
    ("дневные", "Дневные смены"),
    ("дневные смены", "Дневные смены"),
    ("вечерние", "Вечерние смены"),
    ("вечерние смены", "Вечерние смены"),
];

/// Exact lowercase role name -> canonical role name.
pub const ROLE_SYNONYMS: &[(&str, &str)] = &[
    ("палатная медсестра", "Палатная медицинская сестра"),
    ("процедурная медсестра", "Процедурная медицинская сестра"),
    ("операционная медсестра", "Операционная медицинская сестра"),
];

/// Recurring department-name typos, applied as case-insensitive substring
/// substitutions before the alias lookup.
pub const DEPT_TYPOS: &[(&str, &str)] = &[
    ("анестезиолгии", "анестезиологии"),
    ("анестезиолоии", "анестезиологии"),
];
