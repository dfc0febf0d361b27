use fhub_cache::CacheError;
use fhub_storage::StorageError;
use std::borrow::Cow;

/// Error types of the signed link feature.
#[fhub_derive::fhub_error]
pub enum LinkError {
    #[error("URL has expired{}: {message}", format_context(.context))]
    UrlExpired { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid signature{}: {message}", format_context(.context))]
    InvalidSignature { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid expiration timestamp{}: {message}", format_context(.context))]
    InvalidTimestamp { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Malformed link{}: {message}", format_context(.context))]
    InvalidUrl { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The link is authentic but its id no longer maps to a path.
    #[error("Link target unavailable{}: {source}", format_context(.context))]
    Cache { source: CacheError, context: Option<Cow<'static, str>> },

    #[error("Storage failure{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },

    /// Internal fallback for clock or MAC initialisation failures.
    #[error("Internal link error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
