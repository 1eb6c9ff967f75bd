use csv::{ErrorKind, ReaderBuilder, StringRecord};
use thiserror::Error;

use super::model::{CellValue, ColumnKind, Table};

/// File extension a resource must carry to be listed.
pub const TABULAR_EXTENSION: &str = ".csv";

/// Whether `name` looks like a tabular resource.
pub fn is_tabular_name(name: &str) -> bool {
    name.ends_with(TABULAR_EXTENSION)
}

/// Why a resource's content could not be turned into a [`Table`].
#[derive(Debug, Error)]
pub enum TableError {
    #[error("line {line}: expected {expected} fields, found {found}")]
    RowWidth {
        line: u64,
        expected: u64,
        found: u64,
    },
    #[error("{0}")]
    Csv(#[from] csv::Error),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parse CSV text into a [`Table`].
///
/// Layout: one header row of column names followed by one record per data
/// row. Quoted fields may contain commas, newlines and doubled quotes. Every
/// record must have exactly as many fields as the header; a short or long row
/// fails the whole parse instead of being padded or dropped.
pub fn parse_table(text: &str) -> Result<Table, TableError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(text.as_bytes());

    let column_names: Vec<String> = reader
        .headers()
        .map_err(classify)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut records: Vec<StringRecord> = Vec::new();
    for result in reader.records() {
        records.push(result.map_err(classify)?);
    }

    let row_count = records.len();
    let mut kinds = Vec::with_capacity(column_names.len());
    let mut columns = Vec::with_capacity(column_names.len());

    for col_idx in 0..column_names.len() {
        let cells: Vec<&str> = records
            .iter()
            .map(|r| r.get(col_idx).unwrap_or(""))
            .collect();
        let (kind, values) = coerce_column(&cells);
        kinds.push(kind);
        columns.push(values);
    }

    Ok(Table::new(column_names, kinds, columns, row_count))
}

fn classify(err: csv::Error) -> TableError {
    if let ErrorKind::UnequalLengths {
        pos,
        expected_len,
        len,
    } = err.kind()
    {
        return TableError::RowWidth {
            line: pos.as_ref().map(|p| p.line()).unwrap_or(0),
            expected: *expected_len,
            found: *len,
        };
    }
    TableError::Csv(err)
}

// ---------------------------------------------------------------------------
// Type inference
// ---------------------------------------------------------------------------

/// Decide a single scalar type for a whole column and convert its cells.
///
/// Only non-empty cells vote, compared after trimming whitespace:
/// * all parse as `i64`            → [`ColumnKind::Integer`]
/// * all parse as finite `f64`     → [`ColumnKind::Float`]
/// * all are `true` / `false`      → [`ColumnKind::Bool`] (case-insensitive)
/// * anything else                 → [`ColumnKind::Text`] (cell kept verbatim)
///
/// Empty cells become [`CellValue::Null`] regardless of the column kind.
pub fn coerce_column(cells: &[&str]) -> (ColumnKind, Vec<CellValue>) {
    let kind = infer_kind(cells);
    let values = cells
        .iter()
        .map(|raw| {
            let s = raw.trim();
            if s.is_empty() {
                return CellValue::Null;
            }
            // The kind was chosen so that every non-empty cell converts.
            match kind {
                ColumnKind::Integer => s.parse().map(CellValue::Integer).unwrap_or(CellValue::Null),
                ColumnKind::Float => s.parse().map(CellValue::Float).unwrap_or(CellValue::Null),
                ColumnKind::Bool => CellValue::Bool(s.eq_ignore_ascii_case("true")),
                ColumnKind::Text => CellValue::String(raw.to_string()),
                ColumnKind::Empty => CellValue::Null,
            }
        })
        .collect();
    (kind, values)
}

fn infer_kind(cells: &[&str]) -> ColumnKind {
    let mut present = cells.iter().map(|c| c.trim()).filter(|c| !c.is_empty()).peekable();
    if present.peek().is_none() {
        return ColumnKind::Empty;
    }
    let present: Vec<&str> = present.collect();

    if present.iter().all(|s| s.parse::<i64>().is_ok()) {
        return ColumnKind::Integer;
    }
    // `inf` / `NaN` would serialise as JSON null; keep them as text instead.
    if present
        .iter()
        .all(|s| s.parse::<f64>().is_ok_and(f64::is_finite))
    {
        return ColumnKind::Float;
    }
    if present
        .iter()
        .all(|s| s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false"))
    {
        return ColumnKind::Bool;
    }
    ColumnKind::Text
}
