//! Facade crate for the file service.
//! Re-exports the subsystem crates and assembles them from a [`FilesConfig`].
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! ```rust,no_run
//! # async fn run() -> Result<(), fhub::FilesError> {
//! let config = fhub::load_config(Some("fhub"))?;
//! let _logger = fhub::logger(&config.logging)?;
//! let files = fhub::init(&config).await?;
//!
//! let link = files.links().issue("_apparel/_shoes/sku123/photo.png").await;
//! # drop(link);
//! # Ok(())
//! # }
//! ```

mod error;

pub use crate::error::{FilesError, FilesErrorExt};
pub use fhub_cache as cache;
pub use fhub_domain as domain;
pub use fhub_kernel as kernel;
pub use fhub_links as links;
pub use fhub_logger::{Logger, LoggerError};
pub use fhub_storage as storage;

use fhub_cache::TtlCache;
use fhub_domain::config::{FilesConfig, LoggingConfig};
use fhub_links::{LinkService, LinkSigner};
use fhub_storage::{Catalog, LocalStorage};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

const SERVICE_NAME: &str = "fhub";
const DEV_SECRET: &str = "dev-only-change-me";

/// The assembled service. Every component shares the same storage handle.
#[derive(Debug, Clone)]
pub struct Files {
    config: FilesConfig,
    storage: LocalStorage,
    catalog: Catalog<LocalStorage>,
    links: LinkService<LocalStorage, TtlCache>,
}

impl Files {
    #[must_use]
    pub const fn config(&self) -> &FilesConfig {
        &self.config
    }

    #[must_use]
    pub const fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog<LocalStorage> {
        &self.catalog
    }

    #[must_use]
    pub const fn links(&self) -> &LinkService<LocalStorage, TtlCache> {
        &self.links
    }
}

/// Loads [`FilesConfig`] from a file plus `FHUB__` environment overrides.
///
/// # Errors
/// Returns [`FilesError::Config`] if the file is missing or malformed.
pub fn load_config(path: Option<impl AsRef<Path>>) -> Result<FilesConfig, FilesError> {
    Ok(fhub_kernel::config::load_config(path)?)
}

/// Installs the global logger described by `config`.
///
/// # Errors
/// Returns [`FilesError::Logger`] for an unknown level, an unusable log directory, or when a
/// subscriber is already installed.
pub fn logger(config: &LoggingConfig) -> Result<Logger, FilesError> {
    let level = fhub_logger::parse_level(&config.level)?;
    let builder = Logger::builder().name(SERVICE_NAME).level(level);

    let logger = match &config.path {
        Some(path) => builder.path(path).json(config.json).init()?,
        None => builder.init()?,
    };
    Ok(logger)
}

/// Builds every subsystem from configuration.
///
/// # Errors
/// Returns [`FilesError::InvalidConfiguration`] for an empty link secret or a zero-sized cache,
/// and [`FilesError::Storage`] if the storage root cannot be prepared.
pub async fn init(config: &FilesConfig) -> Result<Files, FilesError> {
    validate(config)?;

    let storage = LocalStorage::builder()
        .root(&config.storage.root)
        .max_file_size(config.storage.max_file_size)
        .create(config.storage.create)
        .connect()
        .await
        .context("Storage root")?;

    let cache = TtlCache::new(config.cache.capacity, Duration::from_secs(config.cache.ttl_seconds));
    let signer = LinkSigner::new(
        config.links.secret.as_bytes(),
        config.links.base_url.as_str(),
        Duration::from_secs(config.links.ttl_seconds),
    );
    let cache_ttl = config.links.cache_ttl_seconds.map(Duration::from_secs);

    let files = Files {
        config: config.clone(),
        catalog: Catalog::new(storage.clone()),
        links: LinkService::new(storage.clone(), cache, signer, cache_ttl),
        storage,
    };

    info!(
        root = %files.storage.root().display(),
        base_url = %config.links.base_url,
        link_ttl_secs = config.links.ttl_seconds,
        "File service initialized"
    );
    Ok(files)
}

fn validate(config: &FilesConfig) -> Result<(), FilesError> {
    if config.links.secret.is_empty() {
        return Err(FilesError::InvalidConfiguration {
            message: "links.secret cannot be empty".into(),
            context: None,
        });
    }
    if config.links.secret == DEV_SECRET {
        warn!("Using the development link secret; set FHUB__LINKS__SECRET");
    }
    if config.cache.capacity == 0 {
        return Err(FilesError::InvalidConfiguration {
            message: "cache.capacity must be greater than zero".into(),
            context: None,
        });
    }
    Ok(())
}
