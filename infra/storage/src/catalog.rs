//! Category/collection layer over any [`FileStorage`] backend.

use crate::backend::FileStorage;
use crate::category::{self, CategoryPath, CollectionId};
use crate::engine::TMP_MARKER;
use crate::error::StorageError;
use std::fmt;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

/// A validated file name inside a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileName(String);

impl TryFrom<&str> for FileName {
    type Error = StorageError;

    fn try_from(value: &str) -> Result<Self, StorageError> {
        if value.is_empty() || value == "." || value == ".." {
            return Err(StorageError::invalid_name(value, "File name cannot be empty or relative"));
        }
        if value.chars().any(|c| c == '/' || c == '\\' || c.is_control()) {
            return Err(StorageError::invalid_name(value, "File name contains illegal characters"));
        }
        if value.contains(TMP_MARKER) {
            return Err(StorageError::invalid_name(value, "File name contains a reserved marker"));
        }
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for FileName {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, StorageError> {
        Self::try_from(value.as_str())
    }
}

impl AsRef<str> for FileName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Two-tier catalog of categories and collections.
///
/// Categories nest arbitrarily and are stored marked; a collection is the unmarked directory
/// directly holding files. The catalog never touches the filesystem itself, every call goes
/// through the wrapped [`FileStorage`].
#[derive(Debug, Clone)]
pub struct Catalog<S> {
    storage: S,
}

impl<S: FileStorage> Catalog<S> {
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns the encoded storage path of a collection, e.g. `_apparel/_shoes/sku123`.
    #[must_use]
    pub fn collection_path(category: &CategoryPath, id: &CollectionId) -> String {
        format!("{}/{id}", category.encoded())
    }

    /// Returns the encoded storage path of a file, e.g. `_apparel/_shoes/sku123/photo.png`.
    #[must_use]
    pub fn file_path(category: &CategoryPath, id: &CollectionId, file: &FileName) -> String {
        format!("{}/{file}", Self::collection_path(category, id))
    }

    pub async fn create_category(&self, path: &CategoryPath) -> Result<(), StorageError> {
        self.storage.create_directory(path.encoded()).await?;
        debug!(category = %path, "Category created");
        Ok(())
    }

    /// Deletes an empty category.
    ///
    /// # Errors
    /// Returns [`StorageError::DirNotEmpty`] while any subcategory or collection remains.
    pub async fn delete_category(&self, path: &CategoryPath) -> Result<(), StorageError> {
        self.storage.delete_directory(path.encoded()).await?;
        debug!(category = %path, "Category deleted");
        Ok(())
    }

    /// Renames the last segment of a category, keeping its parent.
    pub async fn rename_category(
        &self,
        path: &CategoryPath,
        new_name: &str,
    ) -> Result<CategoryPath, StorageError> {
        let renamed = match path.parent() {
            Some(parent) => parent.child(new_name)?,
            None => CategoryPath::try_from(new_name)?,
        };
        if renamed.name() != new_name {
            return Err(StorageError::invalid_name(new_name, "Category name must be one segment"));
        }

        self.storage.change_directory(path.encoded(), renamed.encoded()).await?;
        debug!(from = %path, to = %renamed, "Category renamed");
        Ok(renamed)
    }

    /// Moves a category, with everything under it, to a new location.
    pub async fn move_category(
        &self,
        from: &CategoryPath,
        to: &CategoryPath,
    ) -> Result<(), StorageError> {
        self.storage.change_directory(from.encoded(), to.encoded()).await?;
        debug!(from = %from, to = %to, "Category moved");
        Ok(())
    }

    /// Lists the decoded names of the categories under `parent`, or the top-level ones.
    pub async fn list_categories(
        &self,
        parent: Option<&CategoryPath>,
    ) -> Result<Vec<String>, StorageError> {
        let encoded = parent.map(CategoryPath::encoded).unwrap_or_default();
        let dirs = self.storage.list_directories(encoded).await?;
        Ok(dirs
            .iter()
            .filter_map(|dir| category::decode_segment(dir).ok())
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .collect())
    }

    pub async fn list_collections(&self, category: &CategoryPath) -> Result<Vec<String>, StorageError> {
        let dirs = self.storage.list_directories(category.encoded()).await?;
        Ok(dirs.into_iter().filter(|dir| category::is_collection_path(dir)).collect())
    }

    /// Creates a collection inside an existing category.
    ///
    /// # Errors
    /// Returns [`StorageError::NotFound`] if the category is missing and
    /// [`StorageError::AlreadyExists`] if the collection is already there.
    pub async fn create_collection(
        &self,
        category: &CategoryPath,
        id: &CollectionId,
    ) -> Result<(), StorageError> {
        self.require_category(category).await?;
        self.storage.create_directory(Self::collection_path(category, id)).await?;
        debug!(category = %category, collection = %id, "Collection created");
        Ok(())
    }

    pub async fn verify_collection(
        &self,
        category: &CategoryPath,
        id: &CollectionId,
    ) -> Result<(), StorageError> {
        self.verify_collection_path(&Self::collection_path(category, id)).await
    }

    /// Checks that an encoded storage path names an existing collection.
    ///
    /// # Errors
    /// Returns [`StorageError::NotCollection`] if the last segment is marked or names a file,
    /// [`StorageError::NotCategoryPath`] if any leading segment is unmarked and
    /// [`StorageError::NotFound`] if the directory does not exist.
    pub async fn verify_collection_path(&self, path: &str) -> Result<(), StorageError> {
        let trimmed = path.trim_matches('/');
        if !category::is_collection_path(trimmed) {
            return Err(StorageError::NotCollection { message: trimmed.to_owned().into(), context: None });
        }
        if let Some((categories, _)) = trimmed.rsplit_once('/') {
            category::decode_path(categories)?;
        }

        match self.storage.list_files(trimmed).await {
            Ok(_) => Ok(()),
            Err(StorageError::NotDirectory { message, .. }) => {
                Err(StorageError::NotCollection { message, context: Some("Not a directory".into()) })
            },
            Err(e) => Err(e),
        }
    }

    /// Moves a collection to another existing category, optionally under a new id.
    pub async fn move_collection(
        &self,
        category: &CategoryPath,
        id: &CollectionId,
        new_category: &CategoryPath,
        new_id: &CollectionId,
    ) -> Result<(), StorageError> {
        self.require_category(new_category).await?;
        self.storage
            .change_directory(
                Self::collection_path(category, id),
                Self::collection_path(new_category, new_id),
            )
            .await?;
        debug!(
            from = %format!("{category}/{id}"),
            to = %format!("{new_category}/{new_id}"),
            "Collection moved"
        );
        Ok(())
    }

    /// Deletes a collection, first removing its files when `clear_files` is set.
    ///
    /// Without `clear_files` a non-empty collection fails with [`StorageError::DirNotEmpty`].
    pub async fn delete_collection(
        &self,
        category: &CategoryPath,
        id: &CollectionId,
        clear_files: bool,
    ) -> Result<(), StorageError> {
        let path = Self::collection_path(category, id);
        if clear_files {
            self.storage.delete_files(&path).await?;
        }
        self.storage.delete_directory(&path).await?;
        debug!(category = %category, collection = %id, clear_files, "Collection deleted");
        Ok(())
    }

    pub async fn write_file<R>(
        &self,
        category: &CategoryPath,
        id: &CollectionId,
        file: &FileName,
        source: R,
    ) -> Result<u64, StorageError>
    where
        R: AsyncRead + Unpin + Send,
    {
        self.storage.write_file(Self::file_path(category, id, file), source).await
    }

    pub async fn overwrite_file<R>(
        &self,
        category: &CategoryPath,
        id: &CollectionId,
        file: &FileName,
        source: R,
    ) -> Result<u64, StorageError>
    where
        R: AsyncRead + Unpin + Send,
    {
        self.storage.overwrite_file(Self::file_path(category, id, file), source).await
    }

    pub async fn read_file<W>(
        &self,
        category: &CategoryPath,
        id: &CollectionId,
        file: &FileName,
        sink: &mut W,
    ) -> Result<u64, StorageError>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        self.storage.read_file(Self::file_path(category, id, file), sink).await
    }

    pub async fn delete_file(
        &self,
        category: &CategoryPath,
        id: &CollectionId,
        file: &FileName,
    ) -> Result<(), StorageError> {
        self.storage.delete_file(Self::file_path(category, id, file)).await
    }

    pub async fn list_files(
        &self,
        category: &CategoryPath,
        id: &CollectionId,
    ) -> Result<Vec<String>, StorageError> {
        self.storage.list_files(Self::collection_path(category, id)).await
    }

    async fn require_category(&self, category: &CategoryPath) -> Result<(), StorageError> {
        let encoded = category.encoded();
        if self.storage.exists(&encoded).await? {
            Ok(())
        } else {
            Err(StorageError::NotFound { message: encoded.into(), context: Some("Category".into()) })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> (CategoryPath, CollectionId, FileName) {
        (
            CategoryPath::try_from("apparel/shoes").unwrap(),
            CollectionId::try_from("sku123").unwrap(),
            FileName::try_from("photo.png").unwrap(),
        )
    }

    #[test]
    fn builds_encoded_paths() {
        let (category, id, file) = names();
        assert_eq!(
            Catalog::<crate::LocalStorage>::collection_path(&category, &id),
            "_apparel/_shoes/sku123"
        );
        assert_eq!(
            Catalog::<crate::LocalStorage>::file_path(&category, &id, &file),
            "_apparel/_shoes/sku123/photo.png"
        );
    }

    #[test]
    fn file_name_validation() {
        assert!(FileName::try_from("photo.png").is_ok());
        assert!(FileName::try_from("").is_err());
        assert!(FileName::try_from("..").is_err());
        assert!(FileName::try_from("a/b.png").is_err());
        assert!(FileName::try_from("photo.png.fhubtmp.3").is_err());
    }
}
