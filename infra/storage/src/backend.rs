use crate::error::StorageError;
use std::future::Future;
use std::path::Path;
use tokio::io::{AsyncRead, AsyncWrite};

/// The operation set every storage backend provides.
///
/// Paths are slash-delimited and relative to the backend's root. Callers above this trait
/// (the catalog, the link service) never touch the filesystem directly, so a remote backend
/// can be added later without changing them. [`LocalStorage`](crate::LocalStorage) is the
/// only implementation.
pub trait FileStorage: Send + Sync {
    /// Returns whether anything exists at `path`.
    fn exists(
        &self,
        path: impl AsRef<Path> + Send,
    ) -> impl Future<Output = Result<bool, StorageError>> + Send;

    /// Streams the file at `path` into `sink`, returning the number of bytes copied.
    fn read_file<W>(
        &self,
        path: impl AsRef<Path> + Send,
        sink: &mut W,
    ) -> impl Future<Output = Result<u64, StorageError>> + Send
    where
        W: AsyncWrite + Unpin + Send + ?Sized;

    /// Creates a new file from `source`. Never overwrites.
    fn write_file<R>(
        &self,
        path: impl AsRef<Path> + Send,
        source: R,
    ) -> impl Future<Output = Result<u64, StorageError>> + Send
    where
        R: AsyncRead + Unpin + Send;

    /// Replaces the content of an existing file.
    fn overwrite_file<R>(
        &self,
        path: impl AsRef<Path> + Send,
        source: R,
    ) -> impl Future<Output = Result<u64, StorageError>> + Send
    where
        R: AsyncRead + Unpin + Send;

    fn delete_file(
        &self,
        path: impl AsRef<Path> + Send,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    fn create_directory(
        &self,
        path: impl AsRef<Path> + Send,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Renames or moves a directory.
    fn change_directory(
        &self,
        old: impl AsRef<Path> + Send,
        new: impl AsRef<Path> + Send,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Removes the immediate files of a directory, leftover temporary files included, leaving
    /// subdirectories untouched.
    fn delete_files(
        &self,
        path: impl AsRef<Path> + Send,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Removes the immediate subdirectories of a directory, leaving files untouched.
    fn delete_subdirectories(
        &self,
        path: impl AsRef<Path> + Send,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Removes an empty directory.
    fn delete_directory(
        &self,
        path: impl AsRef<Path> + Send,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    fn list_files(
        &self,
        path: impl AsRef<Path> + Send,
    ) -> impl Future<Output = Result<Vec<String>, StorageError>> + Send;

    fn list_directories(
        &self,
        path: impl AsRef<Path> + Send,
    ) -> impl Future<Output = Result<Vec<String>, StorageError>> + Send;
}
