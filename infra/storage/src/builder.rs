use crate::engine::{LocalStorage, StorageInner};
use crate::error::{StorageError, StorageErrorExt};
use private::Sealed;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tokio::fs;
use tracing::info;

/// Default upper bound for a single stored file (5 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

#[derive(Debug, Clone)]
struct StorageConfig {
    max_file_size: u64,
    create: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { max_file_size: DEFAULT_MAX_FILE_SIZE, create: true }
    }
}

#[derive(Debug, Default)]
pub struct NoRoot;
#[derive(Debug)]
pub struct WithRoot(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoRoot {}
impl Sealed for WithRoot {}

#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct StorageBuilder<S: Sealed = NoRoot> {
    state: S,
    config: StorageConfig,
}

#[allow(private_bounds)]
impl<S: Sealed> StorageBuilder<S> {
    #[must_use = "Sets the per-file size limit in bytes"]
    pub const fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    #[must_use = "Sets whether the root directory should be created if it does not exist"]
    pub const fn create(mut self, enable: bool) -> Self {
        self.config.create = enable;
        self
    }

    fn transition<N: Sealed>(self, state: N) -> StorageBuilder<N> {
        StorageBuilder { state, config: self.config }
    }
}

impl StorageBuilder<NoRoot> {
    #[must_use = "Creates a new storage builder with default configuration"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Sets the root directory path for the storage engine"]
    pub fn root(self, path: impl Into<PathBuf>) -> StorageBuilder<WithRoot> {
        self.transition(WithRoot(path.into()))
    }
}

impl StorageBuilder<WithRoot> {
    /// Consumes the configuration and initializes the storage engine.
    ///
    /// The root is created when `create(true)` was set, then canonicalized so that every later
    /// containment check compares physical paths. Temporary files orphaned by an interrupted
    /// overwrite are purged before the handle is returned; a failed purge is logged and does
    /// not abort start-up.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the root is missing and `create` is false, or if the
    /// process cannot create or resolve it.
    /// Returns [`StorageError::NotDirectory`] if the root exists but is a regular file.
    pub async fn connect(self) -> Result<LocalStorage, StorageError> {
        let root = &self.state.0;

        if self.config.create {
            fs::create_dir_all(root)
                .await
                .context(format!("Failed to bootstrap storage root: {}", root.display()))?;
            info!(path = %root.display(), "Bootstrapped storage root directory");
        }

        let canonical = fs::canonicalize(root)
            .await
            .context(format!("Failed to resolve storage root: {}", root.display()))?;

        let meta = fs::metadata(&canonical)
            .await
            .context(format!("Failed to inspect storage root: {}", canonical.display()))?;
        if !meta.is_dir() {
            return Err(StorageError::not_directory(&canonical));
        }

        let storage = LocalStorage {
            inner: Arc::new(StorageInner {
                root: canonical,
                max_file_size: self.config.max_file_size,
                tmp_counter: AtomicU64::new(1),
            }),
        };

        storage.purge_tmp().await;

        info!(
            root = %storage.root().display(),
            max_file_size = storage.max_file_size(),
            "Storage engine ready"
        );

        Ok(storage)
    }
}
