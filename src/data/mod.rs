/// Data layer: table model and CSV parsing.
///
/// Architecture:
/// ```text
///   raw CSV text (from a storage backend)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse text → Table, infer one scalar type per column
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  header names + column-major CellValues
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
