//! A sandboxed, hierarchical file store.
//!
//! Files live in collections, collections live in categories, and categories nest. All of it
//! maps onto plain directories below one root: category directories carry a `_` marker,
//! collection directories don't.
//!
//! # Core Features
//!
//! - **Sandbox Security**: every path is lexically checked and canonicalized against the root,
//!   so `..` segments, absolute paths and symlink escapes are rejected.
//! - **Create-once Writes**: new files are opened exclusively and size-capped while streaming.
//! - **Atomic Overwrites**: replacement content goes to a unique temp file that is renamed onto
//!   the target only after a complete, in-limit copy.
//! - **Self-Healing**: temp files orphaned by a crash are purged on start-up.
//!
//! # Architectural Overview
//!
//! 1.  **[`FileStorage`]**: the backend operation set.
//! 2.  **[`LocalStorage`]**: the local-filesystem backend and its [`StorageBuilder`].
//! 3.  **[`Catalog`]**: the category/collection layer on top of any backend.
//! 4.  **[`category`]**: the directory-name codec the catalog uses.
//!
//! # Examples
//!
//! ```rust
//! use fhub_storage::{Catalog, CategoryPath, CollectionId, FileName, LocalStorage, StorageError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), StorageError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     # let root = tmp.path().join("data");
//!     let storage = LocalStorage::builder().root(&root).connect().await?;
//!     let catalog = Catalog::new(storage);
//!
//!     let shoes = CategoryPath::try_from("apparel/shoes")?;
//!     let sku = CollectionId::try_from("sku123")?;
//!     let photo = FileName::try_from("photo.png")?;
//!
//!     catalog.create_category(&shoes).await?;
//!     catalog.create_collection(&shoes, &sku).await?;
//!     catalog.write_file(&shoes, &sku, &photo, &b"\x89PNG"[..]).await?;
//!
//!     assert_eq!(catalog.list_files(&shoes, &sku).await?, vec!["photo.png"]);
//!     Ok(())
//! }
//! ```

mod backend;
mod builder;
mod catalog;
pub mod category;
mod engine;
mod error;
mod maintenance;
mod security;

pub use backend::FileStorage;
pub use builder::{DEFAULT_MAX_FILE_SIZE, NoRoot, StorageBuilder, WithRoot};
pub use catalog::{Catalog, FileName};
pub use category::{CategoryPath, CollectionId};
pub use engine::{LocalStorage, StorageInner};
pub use error::{StorageError, StorageErrorExt};
