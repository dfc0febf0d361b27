//! Local-filesystem storage engine.
//!
//! [`LocalStorage`] implements [`FileStorage`] on top of a canonical root directory. Every
//! path passes through the resolver in [`security`](crate::security) before any syscall, and
//! every operation that creates something before a possible failure point removes it again
//! before returning the error.

use crate::backend::FileStorage;
use crate::builder::StorageBuilder;
use crate::error::StorageError;
use crate::maintenance;
use crate::security;
use std::io::ErrorKind;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tracing::{debug, warn};

/// Marker embedded in temporary file names used by [`LocalStorage::overwrite_file`].
pub(crate) const TMP_MARKER: &str = ".fhubtmp.";

/// The internal shared state of a [`LocalStorage`] instance.
#[derive(Debug)]
pub struct StorageInner {
    /// The canonicalized physical path on the disk where all data is stored.
    pub(crate) root: PathBuf,
    /// Upper bound for a single file, in bytes.
    pub(crate) max_file_size: u64,
    /// A unique counter used to generate temporary file names.
    pub(crate) tmp_counter: AtomicU64,
}

impl StorageInner {
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub const fn max_file_size(&self) -> u64 {
        self.max_file_size
    }
}

/// A thread-safe handle to the local storage engine.
///
/// The handle is reference-counted and can be cloned cheaply across tasks.
///
/// # Example
///
/// ```rust
/// use fhub_storage::{FileStorage, LocalStorage, StorageError};
///
/// #[tokio::main]
/// async fn main() -> Result<(), StorageError> {
///     # let tmp = tempfile::tempdir().unwrap();
///     # let root = tmp.path().join("data");
///     let storage = LocalStorage::builder()
///         .root(&root)
///         .max_file_size(1024)
///         .connect()
///         .await?;
///
///     storage.create_directory("_docs/readme").await?;
///     storage.write_file("_docs/readme/intro.txt", &b"hello"[..]).await?;
///
///     let mut out = Vec::new();
///     storage.read_file("_docs/readme/intro.txt", &mut out).await?;
///     assert_eq!(out, b"hello");
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct LocalStorage {
    pub(crate) inner: Arc<StorageInner>,
}

impl Deref for LocalStorage {
    type Target = StorageInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Directory,
}

impl LocalStorage {
    #[must_use = "The storage engine is not initialized until you call .connect()"]
    pub fn builder() -> StorageBuilder {
        StorageBuilder::new()
    }

    /// Resolves a relative path to a physical path inside the storage root.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::PathTraversalAttempt`] for absolute paths, `..` segments and
    /// symlinks that lead outside the root.
    /// Returns [`StorageError::Stat`] if an ancestor cannot be inspected.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        security::resolve_path(&self.root, path)
    }

    /// Removes stale temporary files left behind by interrupted overwrites.
    pub async fn purge_tmp(&self) {
        maintenance::purge_tmp(&self.root).await;
    }

    /// Creates `target` exclusively and fills it from `source`, capped at `max_file_size`.
    ///
    /// The partial file is removed on every failure path.
    async fn copy_new<R>(&self, target: &Path, source: R) -> Result<u64, StorageError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(target)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => StorageError::already_exists(target),
                ErrorKind::NotFound => StorageError::not_found(target.parent().unwrap_or(target)),
                _ => StorageError::create(target, e),
            })?;

        let limit = self.max_file_size;
        let mut capped = source.take(limit.saturating_add(1));

        let outcome = match tokio::io::copy(&mut capped, &mut file).await {
            Ok(written) if written > limit => Err(StorageError::size_exceeded(target, limit)),
            Ok(written) => file.sync_all().await.map(|()| written).map_err(|e| StorageError::write(target, e)),
            Err(e) => Err(StorageError::write(target, e)),
        };

        drop(file);
        if outcome.is_err() {
            discard(target).await;
        }
        outcome
    }

    /// Lists the immediate children of `dir` of one kind, sorted by name. Temporary files are
    /// included only when `with_tmp` is set.
    async fn children(
        &self,
        dir: &Path,
        kind: EntryKind,
        with_tmp: bool,
    ) -> Result<Vec<(String, PathBuf)>, StorageError> {
        let mut entries = fs::read_dir(dir).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::not_found(dir),
            ErrorKind::NotADirectory => StorageError::not_directory(dir),
            _ => StorageError::read(dir, e),
        })?;

        let mut children = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| StorageError::read(dir, e))? {
            let file_type = entry.file_type().await.map_err(|e| StorageError::stat(&entry.path(), e))?;
            let matches = match kind {
                EntryKind::File => file_type.is_file(),
                EntryKind::Directory => file_type.is_dir(),
            };
            if !matches {
                continue;
            }

            match entry.file_name().into_string() {
                Ok(name) if !with_tmp && kind == EntryKind::File && name.contains(TMP_MARKER) => {},
                Ok(name) => children.push((name, entry.path())),
                Err(name) => warn!(dir = %dir.display(), name = ?name, "Skipping non UTF-8 entry"),
            }
        }

        children.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        Ok(children)
    }

    async fn sync_dir(path: &Path) {
        match fs::File::open(path).await {
            Ok(dir) => {
                if let Err(err) = dir.sync_all().await {
                    warn!(path = %path.display(), error = %err, "Directory sync failed");
                }
            },
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Directory open failed");
            },
        }
    }
}

impl FileStorage for LocalStorage {
    async fn exists(&self, path: impl AsRef<Path> + Send) -> Result<bool, StorageError> {
        let resolved = self.resolve(path)?;
        match fs::symlink_metadata(&resolved).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::stat(&resolved, e)),
        }
    }

    async fn read_file<W>(
        &self,
        path: impl AsRef<Path> + Send,
        sink: &mut W,
    ) -> Result<u64, StorageError>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let resolved = self.resolve(path)?;

        let mut file = match fs::File::open(&resolved).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::not_found(&resolved));
            },
            Err(e) => return Err(StorageError::read(&resolved, e)),
        };

        let metadata = file.metadata().await.map_err(|e| StorageError::stat(&resolved, e))?;
        if !metadata.is_file() {
            return Err(StorageError::not_file(&resolved));
        }

        let copied =
            tokio::io::copy(&mut file, sink).await.map_err(|e| StorageError::read(&resolved, e))?;

        debug!(path = %resolved.display(), bytes = copied, "File read");
        Ok(copied)
    }

    async fn write_file<R>(
        &self,
        path: impl AsRef<Path> + Send,
        source: R,
    ) -> Result<u64, StorageError>
    where
        R: AsyncRead + Unpin + Send,
    {
        reject_tmp_name(path.as_ref())?;
        let resolved = self.resolve(path)?;
        let written = self.copy_new(&resolved, source).await?;

        if let Some(parent) = resolved.parent() {
            Self::sync_dir(parent).await;
        }

        debug!(path = %resolved.display(), bytes = written, "File created");
        Ok(written)
    }

    async fn overwrite_file<R>(
        &self,
        path: impl AsRef<Path> + Send,
        source: R,
    ) -> Result<u64, StorageError>
    where
        R: AsyncRead + Unpin + Send,
    {
        reject_tmp_name(path.as_ref())?;
        let resolved = self.resolve(path)?;

        match fs::metadata(&resolved).await {
            Ok(meta) if meta.is_file() => {},
            Ok(_) => return Err(StorageError::not_file(&resolved)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::not_found(&resolved));
            },
            Err(e) => return Err(StorageError::stat(&resolved, e)),
        }

        let temp = unique_tmp_path(&resolved, &self.tmp_counter);
        let written = self.copy_new(&temp, source).await?;

        if let Err(e) = fs::rename(&temp, &resolved).await {
            discard(&temp).await;
            return Err(StorageError::rename(&temp, &resolved, e));
        }

        if let Some(parent) = resolved.parent() {
            Self::sync_dir(parent).await;
        }

        debug!(path = %resolved.display(), bytes = written, "File replaced atomically");
        Ok(written)
    }

    async fn delete_file(&self, path: impl AsRef<Path> + Send) -> Result<(), StorageError> {
        let resolved = self.resolve(path)?;

        match fs::remove_file(&resolved).await {
            Ok(()) => {},
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::not_found(&resolved));
            },
            Err(e) if e.kind() == ErrorKind::IsADirectory => {
                return Err(StorageError::not_file(&resolved));
            },
            Err(e) => return Err(StorageError::delete(&resolved, e)),
        }

        debug!(path = %resolved.display(), "File deleted");
        Ok(())
    }

    async fn create_directory(&self, path: impl AsRef<Path> + Send) -> Result<(), StorageError> {
        let resolved = self.resolve(path)?;

        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent).await.map_err(|e| StorageError::create(parent, e))?;
        }

        match fs::create_dir(&resolved).await {
            Ok(()) => {},
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StorageError::already_exists(&resolved));
            },
            Err(e) => return Err(StorageError::create(&resolved, e)),
        }

        debug!(path = %resolved.display(), "Directory created");
        Ok(())
    }

    async fn change_directory(
        &self,
        old: impl AsRef<Path> + Send,
        new: impl AsRef<Path> + Send,
    ) -> Result<(), StorageError> {
        let from = self.resolve(old)?;
        let to = self.resolve(new)?;

        if from == self.root || to == self.root {
            return Err(StorageError::traversal(&from, "The storage root cannot be moved"));
        }

        match fs::metadata(&from).await {
            Ok(meta) if meta.is_dir() => {},
            Ok(_) => return Err(StorageError::not_directory(&from)),
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StorageError::not_found(&from)),
            Err(e) => return Err(StorageError::stat(&from, e)),
        }

        // A plain rename silently replaces an empty target directory on most platforms.
        match fs::symlink_metadata(&to).await {
            Ok(_) => return Err(StorageError::already_exists(&to)),
            Err(e) if e.kind() == ErrorKind::NotFound => {},
            Err(e) => return Err(StorageError::stat(&to, e)),
        }

        match fs::rename(&from, &to).await {
            Ok(()) => {},
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::not_found(to.parent().unwrap_or(&to)));
            },
            Err(e) => return Err(StorageError::rename(&from, &to, e)),
        }

        debug!(from = %from.display(), to = %to.display(), "Directory moved");
        Ok(())
    }

    async fn delete_files(&self, path: impl AsRef<Path> + Send) -> Result<(), StorageError> {
        let resolved = self.resolve(path)?;

        for (_, file) in self.children(&resolved, EntryKind::File, true).await? {
            match fs::remove_file(&file).await {
                Ok(()) => {},
                Err(e) if e.kind() == ErrorKind::NotFound => {},
                Err(e) => return Err(StorageError::delete(&file, e)),
            }
        }

        debug!(path = %resolved.display(), "Directory files cleared");
        Ok(())
    }

    async fn delete_subdirectories(
        &self,
        path: impl AsRef<Path> + Send,
    ) -> Result<(), StorageError> {
        let resolved = self.resolve(path)?;

        for (_, dir) in self.children(&resolved, EntryKind::Directory, false).await? {
            match fs::remove_dir_all(&dir).await {
                Ok(()) => {},
                Err(e) if e.kind() == ErrorKind::NotFound => {},
                Err(e) => return Err(StorageError::delete(&dir, e)),
            }
        }

        debug!(path = %resolved.display(), "Subdirectories cleared");
        Ok(())
    }

    async fn delete_directory(&self, path: impl AsRef<Path> + Send) -> Result<(), StorageError> {
        let resolved = self.resolve(path)?;

        if resolved == self.root {
            return Err(StorageError::traversal(&resolved, "The storage root cannot be deleted"));
        }

        match fs::remove_dir(&resolved).await {
            Ok(()) => {},
            Err(e) => {
                return Err(match e.kind() {
                    ErrorKind::NotFound => StorageError::not_found(&resolved),
                    ErrorKind::DirectoryNotEmpty => StorageError::dir_not_empty(&resolved),
                    ErrorKind::NotADirectory => StorageError::not_directory(&resolved),
                    _ => StorageError::delete(&resolved, e),
                });
            },
        }

        debug!(path = %resolved.display(), "Directory deleted");
        Ok(())
    }

    async fn list_files(&self, path: impl AsRef<Path> + Send) -> Result<Vec<String>, StorageError> {
        let resolved = self.resolve(path)?;
        let files = self.children(&resolved, EntryKind::File, false).await?;
        Ok(files.into_iter().map(|(name, _)| name).collect())
    }

    async fn list_directories(
        &self,
        path: impl AsRef<Path> + Send,
    ) -> Result<Vec<String>, StorageError> {
        let resolved = self.resolve(path)?;
        let dirs = self.children(&resolved, EntryKind::Directory, false).await?;
        Ok(dirs.into_iter().map(|(name, _)| name).collect())
    }
}

/// Best-effort removal of a file this engine created.
async fn discard(path: &Path) {
    if let Err(err) = fs::remove_file(path).await {
        if err.kind() != ErrorKind::NotFound {
            warn!(path = %path.display(), error = %err, "Failed to remove partial file");
        }
    }
}

/// Temporary names are reserved: such files are hidden from listings and purged on start-up.
fn reject_tmp_name(path: &Path) -> Result<(), StorageError> {
    match path.file_name().and_then(|name| name.to_str()) {
        Some(name) if name.contains(TMP_MARKER) => {
            Err(StorageError::invalid_name(name, "File name contains a reserved marker"))
        },
        _ => Ok(()),
    }
}

fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let counter = counter.fetch_add(1, Ordering::Relaxed);
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("storage");
    target.with_file_name(format!("{file_name}{TMP_MARKER}{counter}"))
}
