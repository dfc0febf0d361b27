use serde::Deserialize;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level configuration of the file service.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilesConfigInner {
    pub storage: StorageConfig,
    pub links: LinksConfig,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct FilesConfig {
    #[serde(flatten, default)]
    inner: Arc<FilesConfigInner>,
}

impl Deref for FilesConfig {
    type Target = FilesConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for FilesConfig {
    fn deref_mut(&mut self) -> &mut FilesConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Storage root and limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub root: PathBuf,
    /// Upper bound for a single file, in bytes.
    pub max_file_size: u64,
    /// Create the root directory on start-up when it is missing.
    pub create: bool,
}

/// Signed retrieval link settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    /// HMAC key. Must be replaced outside development.
    pub secret: String,
    /// Prefix of every issued link, without a trailing slash.
    pub base_url: String,
    pub ttl_seconds: u64,
    /// Lifetime of the id-to-path mapping. `None` ties it to the link lifetime.
    pub cache_ttl_seconds: Option<u64>,
}

/// Correlation cache bounds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of live entries.
    pub capacity: u64,
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    /// Log directory. Console-only logging when absent.
    pub path: Option<PathBuf>,
}

// --- Default ---

impl Default for StorageConfig {
    fn default() -> Self {
        Self { root: PathBuf::from("data"), max_file_size: 5 * 1024 * 1024, create: true }
    }
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            secret: "dev-only-change-me".to_owned(),
            base_url: "http://localhost:9090/files".to_owned(),
            ttl_seconds: 300,
            cache_ttl_seconds: None,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { capacity: 10_000, ttl_seconds: 120 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), json: false, path: None }
    }
}

impl fmt::Debug for LinksConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinksConfig")
            .field("secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("ttl_seconds", &self.ttl_seconds)
            .field("cache_ttl_seconds", &self.cache_ttl_seconds)
            .finish()
    }
}
