use crate::error::LinkError;
use crate::signer::LinkSigner;
use crate::token::SignedToken;
use fhub_cache::CorrelationStore;
use fhub_kernel::safe_nanoid;
use fhub_storage::{FileStorage, StorageError};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWrite;
use tracing::debug;

/// Length of the opaque ids handed out in links.
const TEMP_ID_LEN: usize = 21;

/// Issues links for stored files and serves the files behind them.
///
/// The storage path never leaves the service: a link names a random id, and the id maps to
/// the path through the correlation store for as long as the cache entry lives.
#[derive(Debug, Clone)]
pub struct LinkService<S, C> {
    storage: S,
    cache: C,
    signer: Arc<LinkSigner>,
    cache_ttl: Option<Duration>,
}

impl<S, C> LinkService<S, C>
where
    S: FileStorage,
    C: CorrelationStore,
{
    /// `cache_ttl` fixes the lifetime of every id-to-path entry. With `None` each entry lives
    /// as long as the link it belongs to, including the link's final second.
    pub fn new(storage: S, cache: C, signer: impl Into<Arc<LinkSigner>>, cache_ttl: Option<Duration>) -> Self {
        Self { storage, cache, signer: signer.into(), cache_ttl }
    }

    pub fn signer(&self) -> &LinkSigner {
        &self.signer
    }

    /// Issues a link to the file at `path` valid for the signer's default TTL.
    ///
    /// # Errors
    /// Returns [`LinkError::Storage`] wrapping [`StorageError::NotFound`] if nothing is stored
    /// at `path`, or any resolver error for a path outside the root.
    pub async fn issue(&self, path: &str) -> Result<String, LinkError> {
        self.issue_with_ttl(path, self.signer.default_ttl()).await
    }

    /// Issues a link to the file at `path` valid for `ttl`.
    ///
    /// # Errors
    /// See [`LinkService::issue`].
    pub async fn issue_with_ttl(&self, path: &str, ttl: Duration) -> Result<String, LinkError> {
        if !self.storage.exists(path).await? {
            return Err(StorageError::NotFound {
                message: path.to_owned().into(),
                context: Some("Link target".into()),
            }
            .into());
        }

        let temp_id = safe_nanoid!(TEMP_ID_LEN);
        self.cache.set_with_ttl(&temp_id, path, entry_ttl(self.cache_ttl, ttl));
        let link = self.signer.generate_with_ttl(&temp_id, ttl)?;

        debug!(path, temp_id = %temp_id, ttl_secs = ttl.as_secs(), "Link issued");
        Ok(link)
    }

    /// Validates a link's parameters and streams the file it points to into `sink`.
    ///
    /// # Errors
    /// Signature errors come first (see [`LinkSigner::validate`]); an authentic link whose id
    /// is unknown or expired in the cache returns [`LinkError::Cache`]; read failures return
    /// [`LinkError::Storage`].
    pub async fn redeem<W>(
        &self,
        id: &str,
        expires: &str,
        signature: &str,
        sink: &mut W,
    ) -> Result<u64, LinkError>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        self.signer.validate(id, expires, signature)?;
        let path = self.cache.get(id)?;
        let bytes = self.storage.read_file(&path, sink).await?;

        debug!(path = %path, temp_id = id, bytes, "Link redeemed");
        Ok(bytes)
    }

    /// Parses a full link and redeems it.
    ///
    /// # Errors
    /// Returns [`LinkError::InvalidUrl`] for a malformed link, otherwise see
    /// [`LinkService::redeem`].
    pub async fn redeem_url<W>(&self, link: &str, sink: &mut W) -> Result<u64, LinkError>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let token = SignedToken::from_url(link)?;
        self.redeem(&token.id, &token.expires, &token.signature, sink).await
    }
}

/// Links are checked in whole seconds and stay valid through `expires`, so a tied entry gets
/// one extra second over the link TTL.
fn entry_ttl(cache_ttl: Option<Duration>, link_ttl: Duration) -> Duration {
    cache_ttl.unwrap_or_else(|| link_ttl.saturating_add(Duration::from_secs(1)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tied_entries_cover_the_final_second() {
        assert_eq!(entry_ttl(None, Duration::from_secs(300)), Duration::from_secs(301));
        assert_eq!(entry_ttl(None, Duration::ZERO), Duration::from_secs(1));
        assert_eq!(
            entry_ttl(Some(Duration::from_secs(60)), Duration::from_secs(300)),
            Duration::from_secs(60)
        );
    }
}
