use std::sync::Arc;

use crate::data::loader::parse_table;
use crate::data::model::{CellValue, Table};
use crate::error::{Result, StoreError};
use crate::storage::{display_name, Layout, StorageBackend};

/// Data types served when none are configured.
pub const DEFAULT_CATEGORIES: [&str; 2] = ["telem", "fpga"];

// ---------------------------------------------------------------------------
// Tabular store service
// ---------------------------------------------------------------------------

/// Answers the category / file / column queries on top of a storage backend.
///
/// Holds no per-request state: every call re-reads and re-parses the resource,
/// so concurrent calls never observe each other and always see the current
/// content of the file.
#[derive(Debug, Clone)]
pub struct TabularStore {
    backend: Arc<dyn StorageBackend>,
    categories: Vec<String>,
}

impl TabularStore {
    pub fn new(backend: Arc<dyn StorageBackend>, categories: Vec<String>) -> Self {
        TabularStore {
            backend,
            categories,
        }
    }

    /// A store over `backend` exposing the default `telem` / `fpga` data types.
    pub fn with_default_categories(backend: Arc<dyn StorageBackend>) -> Self {
        Self::new(
            backend,
            DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        )
    }

    /// Whether requests must name a category.
    pub fn uses_categories(&self) -> bool {
        self.backend.layout() == Layout::PerCategory
    }

    /// The advertised data types; empty when the backend is flat.
    pub fn list_categories(&self) -> Vec<String> {
        if self.uses_categories() {
            self.categories.clone()
        } else {
            Vec::new()
        }
    }

    pub async fn list_resources(&self, category: Option<&str>) -> Result<Vec<String>> {
        self.backend.list_resources(category).await
    }

    /// Header names of a resource, in file order.
    pub async fn list_columns(&self, category: Option<&str>, filename: &str) -> Result<Vec<String>> {
        let table = self.load(category, filename).await?;
        Ok(table.column_names)
    }

    /// Values of one column, one per data row.
    pub async fn get_column_data(
        &self,
        category: Option<&str>,
        filename: &str,
        column: &str,
    ) -> Result<Vec<CellValue>> {
        let table = self.load(category, filename).await?;
        table
            .into_column(column)
            .ok_or_else(|| StoreError::ColumnNotFound(column.to_string()))
    }

    /// Resolve and parse a resource into a fresh [`Table`].
    pub async fn load(&self, category: Option<&str>, filename: &str) -> Result<Table> {
        let name = display_name(category, filename);
        if !self.backend.resource_exists(category, filename).await? {
            return Err(StoreError::ResourceNotFound(name));
        }
        let text = self.backend.read_resource(category, filename).await?;
        let table = parse_table(&text).map_err(|e| StoreError::MalformedResource {
            resource: name.clone(),
            reason: e.to_string(),
        })?;
        log::debug!(
            "parsed {name}: {} rows x {} columns",
            table.len(),
            table.width()
        );
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LocalBackend, ObjectBackend};
    use object_store::memory::InMemory;
    use object_store::path::Path as ObjectPath;
    use object_store::{ObjectStore, PutPayload};

    fn store_over(files: &[(&str, &str)], layout: Layout) -> (tempfile::TempDir, TabularStore) {
        let dir = tempfile::tempdir().unwrap();
        for category in DEFAULT_CATEGORIES {
            std::fs::create_dir(dir.path().join(category)).unwrap();
        }
        for (path, body) in files {
            std::fs::write(dir.path().join(path), body).unwrap();
        }
        let backend = Arc::new(LocalBackend::new(dir.path(), layout));
        (dir, TabularStore::with_default_categories(backend))
    }

    fn telem_store() -> (tempfile::TempDir, TabularStore) {
        store_over(
            &[
                ("telem/run1.csv", "time,value\n0,1.5\n1,2.75\n"),
                ("telem/broken.csv", "a,b\n1,2\n3\n"),
                ("telem/dup.csv", "x,y,x\n1,2,3\n4,5,6\n"),
            ],
            Layout::PerCategory,
        )
    }

    #[tokio::test]
    async fn run1_scenario() {
        let (_dir, store) = telem_store();
        assert_eq!(store.list_categories(), vec!["telem", "fpga"]);
        assert_eq!(
            store.list_resources(Some("telem")).await.unwrap(),
            vec!["broken.csv", "dup.csv", "run1.csv"]
        );
        assert_eq!(
            store.list_columns(Some("telem"), "run1.csv").await.unwrap(),
            vec!["time", "value"]
        );
        assert_eq!(
            store
                .get_column_data(Some("telem"), "run1.csv", "value")
                .await
                .unwrap(),
            vec![CellValue::Float(1.5), CellValue::Float(2.75)]
        );
    }

    #[tokio::test]
    async fn unknown_column_is_column_not_found() {
        let (_dir, store) = telem_store();
        let err = store
            .get_column_data(Some("telem"), "run1.csv", "pressure")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ColumnNotFound(ref c) if c == "pressure"));
    }

    #[tokio::test]
    async fn unknown_category_is_category_not_found() {
        let (_dir, store) = telem_store();
        let err = store.list_resources(Some("unknown_type")).await.unwrap_err();
        assert!(matches!(err, StoreError::CategoryNotFound(_)));
    }

    #[tokio::test]
    async fn empty_category_lists_nothing() {
        let (_dir, store) = telem_store();
        assert!(store.list_resources(Some("fpga")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_resource_not_found() {
        let (_dir, store) = telem_store();
        let err = store.list_columns(Some("telem"), "run9.csv").await.unwrap_err();
        assert!(matches!(err, StoreError::ResourceNotFound(ref n) if n == "telem/run9.csv"));

        let err = store
            .get_column_data(Some("fpga"), "run1.csv", "time")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ResourceNotFound(_)));
    }

    #[tokio::test]
    async fn ragged_file_is_malformed() {
        let (_dir, store) = telem_store();
        let err = store.list_columns(Some("telem"), "broken.csv").await.unwrap_err();
        assert!(matches!(err, StoreError::MalformedResource { .. }));
    }

    #[tokio::test]
    async fn duplicate_headers_are_listed_and_first_wins() {
        let (_dir, store) = telem_store();
        assert_eq!(
            store.list_columns(Some("telem"), "dup.csv").await.unwrap(),
            vec!["x", "y", "x"]
        );
        assert_eq!(
            store.get_column_data(Some("telem"), "dup.csv", "x").await.unwrap(),
            vec![CellValue::Integer(1), CellValue::Integer(4)]
        );
    }

    #[tokio::test]
    async fn repeated_queries_are_identical() {
        let (_dir, store) = telem_store();
        let first = store.get_column_data(Some("telem"), "run1.csv", "time").await.unwrap();
        let second = store.get_column_data(Some("telem"), "run1.csv", "time").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[tokio::test]
    async fn reads_reflect_current_file_content() {
        let (dir, store) = telem_store();
        std::fs::write(dir.path().join("telem/run1.csv"), "time,value,extra\n0,1,2\n").unwrap();
        assert_eq!(
            store.list_columns(Some("telem"), "run1.csv").await.unwrap(),
            vec!["time", "value", "extra"]
        );
    }

    #[tokio::test]
    async fn flat_store_has_no_categories() {
        let (_dir, store) = store_over(&[("top.csv", "a,b\n1,x\n")], Layout::Flat);
        assert!(!store.uses_categories());
        assert!(store.list_categories().is_empty());
        assert_eq!(store.list_resources(None).await.unwrap(), vec!["top.csv"]);
        assert_eq!(
            store.get_column_data(None, "top.csv", "b").await.unwrap(),
            vec![CellValue::String("x".into())]
        );
    }

    #[tokio::test]
    async fn queries_through_object_store() {
        let bucket = InMemory::new();
        for (key, body) in [
            ("clicka-data/telem/run1.csv", "time,value\n0,1.5\n1,2.75\n"),
            ("clicka-data/telem/ragged.csv", "a,b\n1\n"),
        ] {
            bucket
                .put(&ObjectPath::from(key), PutPayload::from(body.as_bytes().to_vec()))
                .await
                .unwrap();
        }
        let backend = Arc::new(ObjectBackend::new(
            Arc::new(bucket),
            "clicka-data",
            Layout::PerCategory,
        ));
        let store = TabularStore::with_default_categories(backend);

        assert_eq!(
            store.list_resources(Some("telem")).await.unwrap(),
            vec!["ragged.csv", "run1.csv"]
        );
        assert_eq!(
            store.list_columns(Some("telem"), "run1.csv").await.unwrap(),
            vec!["time", "value"]
        );
        assert_eq!(
            store
                .get_column_data(Some("telem"), "run1.csv", "value")
                .await
                .unwrap(),
            vec![CellValue::Float(1.5), CellValue::Float(2.75)]
        );

        let err = store
            .get_column_data(Some("telem"), "run1.csv", "pressure")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ColumnNotFound(_)));
        let err = store.list_columns(Some("telem"), "run9.csv").await.unwrap_err();
        assert!(matches!(err, StoreError::ResourceNotFound(_)));
        let err = store.list_columns(Some("telem"), "ragged.csv").await.unwrap_err();
        assert!(matches!(err, StoreError::MalformedResource { .. }));
        let err = store.list_resources(Some("unknown_type")).await.unwrap_err();
        assert!(matches!(err, StoreError::CategoryNotFound(_)));
    }
}
