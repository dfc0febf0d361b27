use std::borrow::Cow;

/// Errors returned by a correlation store.
#[fhub_derive::fhub_error]
pub enum CacheError {
    /// The key was never stored, was removed, or its TTL elapsed.
    #[error("Cache miss{}: {message}", format_context(.context))]
    Miss { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl CacheError {
    pub(crate) fn miss(key: &str) -> Self {
        Self::Miss { message: key.to_owned().into(), context: None }
    }
}
