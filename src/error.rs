use thiserror::Error;

/// Everything that can go wrong while answering a tabular query.
///
/// Each variant maps to exactly one HTTP status in the server layer; none are
/// retried.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested data type has no directory / key prefix.
    #[error("data type not found: {0}")]
    CategoryNotFound(String),

    /// The requested file or blob does not exist.
    #[error("file not found: {0}")]
    ResourceNotFound(String),

    /// The file exists but has no column with this name.
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// The file exists but is not valid CSV (bad row width, bad encoding).
    #[error("malformed resource {resource}: {reason}")]
    MalformedResource { resource: String, reason: String },

    /// A required query parameter was missing or empty.
    #[error("missing required parameter: {0}")]
    BadRequest(String),

    /// The query string could not be decoded at all.
    #[error("invalid query string: {0}")]
    InvalidQuery(String),

    /// The backend itself failed (I/O error, object store unavailable).
    #[error("storage backend error: {0}")]
    Storage(String),
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}

impl From<object_store::Error> for StoreError {
    fn from(err: object_store::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}
