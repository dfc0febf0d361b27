//! # Correlation Cache
//!
//! Maps opaque, short-lived ids to values (storage paths, in practice) for a bounded time.
//!
//! [`TtlCache`] is the in-process implementation of [`CorrelationStore`], built on
//! `moka::sync::Cache`: bounded by entry count, with a default TTL and optional per-entry
//! TTLs. Every handle is cheap to clone and safe to share between tasks.
//!
//! # Example
//!
//! ```rust
//! use fhub_cache::{CacheError, CorrelationStore, TtlCache};
//! use std::time::Duration;
//!
//! let cache = TtlCache::new(1_000, Duration::from_secs(120));
//! cache.set("tmp123", "_apparel/_shoes/sku123/photo.png");
//!
//! assert_eq!(cache.get("tmp123").unwrap(), "_apparel/_shoes/sku123/photo.png");
//! assert!(matches!(cache.get("unknown"), Err(CacheError::Miss { .. })));
//! ```

mod error;
mod store;
mod ttl;

pub use error::{CacheError, CacheErrorExt};
pub use store::CorrelationStore;
pub use ttl::TtlCache;
