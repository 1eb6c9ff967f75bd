use std::sync::Arc;

use async_trait::async_trait;
use object_store::{path::Path as ObjectPath, Error as ObjectError, ObjectStore};

use super::{decode_text, display_name, is_plain_component, Layout, StorageBackend};
use crate::data::loader::is_tabular_name;
use crate::error::{Result, StoreError};

/// Resources stored as objects in a bucket.
///
/// Every key lives under `prefix`. With [`Layout::PerCategory`] the category
/// is the next key segment (`<prefix>/telem/run1.csv`); with [`Layout::Flat`]
/// objects sit directly under `prefix`. Listing is not recursive.
#[derive(Debug)]
pub struct ObjectBackend {
    store: Arc<dyn ObjectStore>,
    prefix: ObjectPath,
    layout: Layout,
}

impl ObjectBackend {
    pub fn new(store: Arc<dyn ObjectStore>, prefix: &str, layout: Layout) -> Self {
        ObjectBackend {
            store,
            prefix: ObjectPath::from(prefix),
            layout,
        }
    }

    fn category_prefix(&self, category: Option<&str>) -> Option<ObjectPath> {
        match self.layout {
            Layout::Flat => Some(self.prefix.clone()),
            Layout::PerCategory => category
                .filter(|c| is_plain_component(c))
                .map(|c| self.prefix.child(c)),
        }
    }

    fn object_path(&self, category: Option<&str>, filename: &str) -> Option<ObjectPath> {
        if !is_plain_component(filename) {
            return None;
        }
        self.category_prefix(category).map(|p| p.child(filename))
    }
}

#[async_trait]
impl StorageBackend for ObjectBackend {
    fn layout(&self) -> Layout {
        self.layout
    }

    async fn list_resources(&self, category: Option<&str>) -> Result<Vec<String>> {
        let not_found = || StoreError::CategoryNotFound(category.unwrap_or_default().to_string());
        let prefix = self.category_prefix(category).ok_or_else(not_found)?;

        // The bucket root is listed with no prefix at all.
        let listing_prefix = (!prefix.as_ref().is_empty()).then_some(&prefix);
        let listing = self.store.list_with_delimiter(listing_prefix).await?;

        // Object stores have no directories: a category exists once any key
        // lives under its prefix.
        if self.layout == Layout::PerCategory
            && listing.objects.is_empty()
            && listing.common_prefixes.is_empty()
        {
            return Err(not_found());
        }

        let mut names: Vec<String> = listing
            .objects
            .iter()
            .filter_map(|meta| meta.location.filename())
            .filter(|name| is_tabular_name(name))
            .map(str::to_string)
            .collect();
        names.sort();
        Ok(names)
    }

    async fn resource_exists(&self, category: Option<&str>, filename: &str) -> Result<bool> {
        let Some(path) = self.object_path(category, filename) else {
            return Ok(false);
        };
        match self.store.head(&path).await {
            Ok(_) => Ok(true),
            Err(ObjectError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_resource(&self, category: Option<&str>, filename: &str) -> Result<String> {
        let name = display_name(category, filename);
        let path = self
            .object_path(category, filename)
            .ok_or_else(|| StoreError::ResourceNotFound(name.clone()))?;

        let result = match self.store.get(&path).await {
            Ok(result) => result,
            Err(ObjectError::NotFound { .. }) => return Err(StoreError::ResourceNotFound(name)),
            Err(e) => return Err(e.into()),
        };
        let bytes = result.bytes().await?;
        decode_text(&name, bytes.to_vec())
    }
}
