//! # Signed Links
//!
//! Short-lived, tamper-evident links to stored files.
//!
//! ## Architecture
//!
//! 1.  **[`LinkSigner`]**: stateless HMAC-SHA256 issuing and validation of link parameters.
//! 2.  **[`SignedToken`]**: extraction of those parameters from a received link.
//! 3.  **[`LinkService`]**: the full flow. Issuing maps a fresh random id to the storage path
//!     in a [`CorrelationStore`](fhub_cache::CorrelationStore) and signs the id; redeeming
//!     validates the signature, looks the path up and streams the file.
//!
//! ## Example
//!
//! ```rust
//! use fhub_links::LinkSigner;
//! use std::time::Duration;
//!
//! let signer = LinkSigner::new("secret", "https://cdn.example.com/files", Duration::from_secs(300));
//! let link = signer.generate_at("tmp42", Duration::from_secs(60), 1_700_000_000).unwrap();
//! assert!(link.starts_with("https://cdn.example.com/files/?id=tmp42&expires=1700000060&signature="));
//! ```

mod error;
mod service;
mod signer;
mod token;

pub use crate::error::{LinkError, LinkErrorExt};
pub use crate::service::LinkService;
pub use crate::signer::LinkSigner;
pub use crate::token::SignedToken;
