use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use super::{decode_text, display_name, is_plain_component, Layout, StorageBackend};
use crate::data::loader::is_tabular_name;
use crate::error::{Result, StoreError};

/// Resources stored as files under a base directory.
///
/// With [`Layout::PerCategory`] a category is a subdirectory of `root`
/// (`<root>/telem/run1.csv`); with [`Layout::Flat`] every file sits directly
/// in `root`.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    root: PathBuf,
    layout: Layout,
}

impl LocalBackend {
    pub fn new(root: impl Into<PathBuf>, layout: Layout) -> Self {
        LocalBackend {
            root: root.into(),
            layout,
        }
    }

    /// Directory holding `category`'s files, or `None` when the category
    /// cannot name a directory under `root`.
    fn category_dir(&self, category: Option<&str>) -> Option<PathBuf> {
        match self.layout {
            Layout::Flat => Some(self.root.clone()),
            Layout::PerCategory => category
                .filter(|c| is_plain_component(c))
                .map(|c| self.root.join(c)),
        }
    }

    fn resource_path(&self, category: Option<&str>, filename: &str) -> Option<PathBuf> {
        if !is_plain_component(filename) {
            return None;
        }
        self.category_dir(category).map(|dir| dir.join(filename))
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn layout(&self) -> Layout {
        self.layout
    }

    async fn list_resources(&self, category: Option<&str>) -> Result<Vec<String>> {
        let not_found = || StoreError::CategoryNotFound(category.unwrap_or_default().to_string());
        let dir = self.category_dir(category).ok_or_else(not_found)?;

        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(not_found()),
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        }

        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                log::debug!("skipping non UTF-8 file name in {}", dir.display());
                continue;
            };
            if !is_tabular_name(&name) {
                continue;
            }
            // Follows symlinks, unlike `DirEntry::file_type`.
            match tokio::fs::metadata(entry.path()).await {
                Ok(meta) if meta.is_file() => names.push(name),
                _ => {}
            }
        }
        names.sort();
        Ok(names)
    }

    async fn resource_exists(&self, category: Option<&str>, filename: &str) -> Result<bool> {
        let Some(path) = self.resource_path(category, filename) else {
            return Ok(false);
        };
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_resource(&self, category: Option<&str>, filename: &str) -> Result<String> {
        let name = display_name(category, filename);
        let path = self
            .resource_path(category, filename)
            .ok_or_else(|| StoreError::ResourceNotFound(name.clone()))?;

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::ResourceNotFound(name))
            }
            Err(e) => return Err(e.into()),
        };
        decode_text(&name, bytes)
    }
}
