use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single cell in a column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value. Every cell of a column carries the same
/// variant apart from `Null`, which marks an empty cell.
///
/// Serialises as a bare JSON scalar (`1`, `2.5`, `true`, `"abc"`, `null`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Null,
}

// ---------------------------------------------------------------------------
// ColumnKind – the type inferred for a whole column
// ---------------------------------------------------------------------------

/// The scalar type a column was coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Bool,
    Text,
    /// Every cell was empty.
    Empty,
}

// ---------------------------------------------------------------------------
// Table – the parsed resource
// ---------------------------------------------------------------------------

/// A parsed tabular resource stored column-major.
///
/// `column_names[i]` labels `columns[i]`; every column holds exactly
/// `row_count` values. Duplicate header names are kept as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Header names in file order.
    pub column_names: Vec<String>,
    /// Inferred kind per column, parallel to `column_names`.
    pub kinds: Vec<ColumnKind>,
    /// Cell values per column, parallel to `column_names`.
    pub columns: Vec<Vec<CellValue>>,
    row_count: usize,
}

impl Table {
    pub(crate) fn new(
        column_names: Vec<String>,
        kinds: Vec<ColumnKind>,
        columns: Vec<Vec<CellValue>>,
        row_count: usize,
    ) -> Self {
        debug_assert_eq!(column_names.len(), columns.len());
        debug_assert_eq!(column_names.len(), kinds.len());
        debug_assert!(columns.iter().all(|c| c.len() == row_count));
        Table {
            column_names,
            kinds,
            columns,
            row_count,
        }
    }

    /// Values of the first column named `name`.
    pub fn column(&self, name: &str) -> Option<&[CellValue]> {
        self.column_index(name).map(|i| self.columns[i].as_slice())
    }

    /// Position of the first column named `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names.iter().position(|c| c == name)
    }

    /// Number of data rows (header excluded).
    pub fn len(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn width(&self) -> usize {
        self.column_names.len()
    }

    /// Consume the table and take ownership of one column's values.
    pub fn into_column(mut self, name: &str) -> Option<Vec<CellValue>> {
        let idx = self.column_index(name)?;
        Some(self.columns.swap_remove(idx))
    }
}
