//! Where resource bytes live.
//!
//! The tabular store only ever talks to a [`StorageBackend`]; the backends
//! decide how a `(category, filename)` pair maps to a file path or object key.

pub mod local;
pub mod object;

use async_trait::async_trait;

use crate::error::{Result, StoreError};

pub use local::LocalBackend;
pub use object::ObjectBackend;

/// How resources are grouped inside a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One subdirectory / key prefix per category.
    PerCategory,
    /// All resources side by side; the category is ignored.
    Flat,
}

/// Read-only access to tabular resources.
///
/// Implementations must list only names ending in `.csv` and must never
/// mutate the underlying storage.
#[async_trait]
pub trait StorageBackend: Send + Sync + std::fmt::Debug {
    fn layout(&self) -> Layout;

    /// Names of the tabular resources in `category`, sorted.
    ///
    /// Fails with [`StoreError::CategoryNotFound`] when the category does not
    /// exist. An existing category without CSV files yields an empty list.
    async fn list_resources(&self, category: Option<&str>) -> Result<Vec<String>>;

    async fn resource_exists(&self, category: Option<&str>, filename: &str) -> Result<bool>;

    /// Full text of a resource. Fails with [`StoreError::ResourceNotFound`]
    /// when absent.
    async fn read_resource(&self, category: Option<&str>, filename: &str) -> Result<String>;
}

/// A name usable as a single path segment: non-empty, no separators, not a
/// relative reference.
pub(crate) fn is_plain_component(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

pub(crate) fn decode_text(resource: &str, bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|e| StoreError::MalformedResource {
        resource: resource.to_string(),
        reason: format!("invalid UTF-8: {e}"),
    })
}

pub(crate) fn display_name(category: Option<&str>, filename: &str) -> String {
    match category {
        Some(c) => format!("{c}/{filename}"),
        None => filename.to_string(),
    }
}
