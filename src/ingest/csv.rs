use anyhow::{bail, Result};
use std::mem::take;

use crate::record::{Field, Record};

// Delimiter detection samples at most this many leading characters.
const SNIFF_WINDOW: usize = 1024;

/// Decode raw CSV bytes: UTF-8 first, Windows-1251 fallback for files
/// exported from older office tooling.
pub fn decode_csv_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => sanitize_csv_text(text),
        Err(_) => {
            let (text, _, _) = encoding_rs::WINDOWS_1251.decode(bytes);
            sanitize_csv_text(&text)
        }
    }
}

/// Strip the BOM, normalize line endings, and trim surrounding whitespace.
pub fn sanitize_csv_text(text: &str) -> String {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    text.replace("\r\n", "\n").replace('\r', "\n").trim().to_string()
}

/// Pick the delimiter by counting `,` vs `;` outside quotes in the leading
/// sample. Falls back to comma.
fn sniff_delimiter(text: &str) -> char {
    let mut commas = 0usize;
    let mut semis = 0usize;
    let mut in_quotes = false;
    for ch in text.chars().take(SNIFF_WINDOW) {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => commas += 1,
            ';' if !in_quotes => semis += 1,
            _ => {}
        }
    }
    if semis > commas {
        ';'
    } else {
        ','
    }
}

/// Quote- and CRLF-tolerant row splitter. Empty lines are dropped.
fn parse_rows(text: &str, sep: char) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next();
                        cell.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            c if c == sep && !in_quotes => row.push(take(&mut cell)),
            '\n' if !in_quotes => {
                row.push(take(&mut cell));
                if row.iter().any(|c| !c.is_empty()) {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => cell.push(ch),
        }
    }

    // flush the trailing row, even with an unterminated quote
    row.push(cell);
    if row.iter().any(|c| !c.is_empty()) {
        rows.push(row);
    }
    rows
}

/// Parse delimited text into records. The header row maps columns onto the
/// fixed schema; unknown columns are dropped. Input that has no header row
/// matching any known column is malformed and aborts the batch.
pub fn parse_csv_text(text: &str) -> Result<Vec<Record>> {
    let text = sanitize_csv_text(text);
    if text.is_empty() {
        bail!("empty CSV input");
    }
    let sep = sniff_delimiter(&text);
    let mut rows = parse_rows(&text, sep);
    if rows.is_empty() {
        bail!("CSV input has no rows");
    }

    let header = rows.remove(0);
    let columns: Vec<Option<Field>> = header
        .iter()
        .map(|name| Field::from_column(name.trim()))
        .collect();
    if columns.iter().all(Option::is_none) {
        bail!("CSV header does not match any known column");
    }

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let mut rec = Record::default();
        for (idx, cell) in row.iter().enumerate() {
            let Some(Some(field)) = columns.get(idx) else {
                continue;
            };
            rec.set_column_text(*field, cell);
        }
        records.push(rec);
    }
    Ok(records)
}
