//! # Link Signing
//!
//! A link carries an opaque temporary id, an absolute expiry (Unix seconds) and an
//! HMAC-SHA256 signature over `"{id}:{expires}"`, hex encoded:
//!
//! ```text
//! {base_url}/?id={id}&expires={expires}&signature={hex}
//! ```
//!
//! Links are stateless: validation needs only the secret and the clock. Nothing prevents a
//! valid link from being used more than once before it expires.

use crate::error::LinkError;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use url::form_urlencoded;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Issues and validates signed links. Immutable after construction.
pub struct LinkSigner {
    secret: Zeroizing<Vec<u8>>,
    base_url: String,
    default_ttl: Duration,
}

impl fmt::Debug for LinkSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkSigner")
            .field("secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl LinkSigner {
    /// Creates a signer. A trailing slash on `base_url` is dropped.
    #[must_use]
    pub fn new(secret: impl AsRef<[u8]>, base_url: impl Into<String>, default_ttl: Duration) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { secret: Zeroizing::new(secret.as_ref().to_vec()), base_url, default_ttl }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Generates a link for `temp_id` valid for the default TTL.
    ///
    /// # Errors
    /// Returns [`LinkError::Internal`] if the system clock is before the Unix epoch.
    pub fn generate(&self, temp_id: &str) -> Result<String, LinkError> {
        self.generate_with_ttl(temp_id, self.default_ttl)
    }

    /// Generates a link for `temp_id` valid for `ttl`.
    ///
    /// # Errors
    /// Returns [`LinkError::Internal`] if the system clock is before the Unix epoch or the
    /// expiry overflows.
    pub fn generate_with_ttl(&self, temp_id: &str, ttl: Duration) -> Result<String, LinkError> {
        self.generate_at(temp_id, ttl, unix_now()?)
    }

    /// Generates a link as if the current time were `now` (Unix seconds).
    ///
    /// # Errors
    /// Returns [`LinkError::Internal`] if the expiry overflows.
    pub fn generate_at(&self, temp_id: &str, ttl: Duration, now: i64) -> Result<String, LinkError> {
        let expires = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or_else(|| LinkError::Internal {
                message: format!("Link TTL of {}s overflows the expiry", ttl.as_secs()).into(),
                context: Some("Link generation".into()),
            })?;

        let signature = hex::encode(self.mac(temp_id, expires)?.finalize().into_bytes());
        let id = query_escape(temp_id);

        Ok(format!("{}/?id={id}&expires={expires}&signature={signature}", self.base_url))
    }

    /// Validates the three link parameters against the current time.
    ///
    /// # Errors
    /// See [`LinkSigner::validate_at`].
    pub fn validate(&self, temp_id: &str, expires: &str, signature: &str) -> Result<(), LinkError> {
        self.validate_at(temp_id, expires, signature, unix_now()?)
    }

    /// Validates the three link parameters as if the current time were `now`.
    ///
    /// Checks run in a fixed order and the first failure is returned.
    ///
    /// # Errors
    /// * [`LinkError::InvalidTimestamp`] if `expires` is not a base-10 integer.
    /// * [`LinkError::UrlExpired`] if `now` is past `expires`.
    /// * [`LinkError::InvalidSignature`] if `signature` is not hex or does not match.
    pub fn validate_at(
        &self,
        temp_id: &str,
        expires: &str,
        signature: &str,
        now: i64,
    ) -> Result<(), LinkError> {
        let expires = expires.parse::<i64>().map_err(|e| LinkError::InvalidTimestamp {
            message: e.to_string().into(),
            context: Some(expires.to_owned().into()),
        })?;

        if now > expires {
            return Err(LinkError::UrlExpired {
                message: format!("Link expired at Unix timestamp {expires}").into(),
                context: None,
            });
        }

        let provided = hex::decode(signature).map_err(|e| LinkError::InvalidSignature {
            message: e.to_string().into(),
            context: Some("Signature is not hex".into()),
        })?;

        self.mac(temp_id, expires)?.verify_slice(&provided).map_err(|_| LinkError::InvalidSignature {
            message: "Signature does not match".into(),
            context: None,
        })
    }

    fn mac(&self, temp_id: &str, expires: i64) -> Result<HmacSha256, LinkError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret).map_err(|e| LinkError::Internal {
            message: e.to_string().into(),
            context: Some("HMAC key setup".into()),
        })?;
        mac.update(temp_id.as_bytes());
        mac.update(b":");
        mac.update(expires.to_string().as_bytes());
        Ok(mac)
    }
}

/// Query-component escaping with `~` kept and `*` encoded, so ids render identically to other
/// issuers of the same link format.
fn query_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for chunk in form_urlencoded::byte_serialize(value.as_bytes()) {
        if chunk == "%7E" {
            escaped.push('~');
        } else {
            escaped.push_str(&chunk.replace('*', "%2A"));
        }
    }
    escaped
}

fn unix_now() -> Result<i64, LinkError> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| LinkError::Internal {
            message: e.to_string().into(),
            context: Some("Failed to get current system time".into()),
        })?
        .as_secs()
        .cast_signed())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn signer() -> LinkSigner {
        LinkSigner::new("Secret key my boy", "http://localhost:9090/files/", Duration::from_secs(300))
    }

    fn params(url: &str) -> (String, String, String) {
        let query = url.split_once("/?").unwrap().1;
        let mut parts = query.split('&').map(|kv| kv.split_once('=').unwrap().1.to_owned());
        (parts.next().unwrap(), parts.next().unwrap(), parts.next().unwrap())
    }

    #[test]
    fn url_layout_is_stable() {
        let url = signer().generate_at("abc", Duration::from_secs(300), NOW).unwrap();
        let (id, expires, signature) = params(&url);

        assert!(url.starts_with("http://localhost:9090/files/?id=abc&expires=1700000300&signature="));
        assert_eq!(id, "abc");
        assert_eq!(expires, "1700000300");
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn id_is_query_escaped() {
        let url = signer().generate_at("a b&c", Duration::from_secs(1), NOW).unwrap();
        assert!(url.contains("?id=a+b%26c&"));
    }

    #[test]
    fn escapes_tilde_and_star_like_query_escape() {
        assert_eq!(query_escape("a~b"), "a~b");
        assert_eq!(query_escape("a*b"), "a%2Ab");
        assert_eq!(query_escape("x y/z"), "x+y%2Fz");

        let url = signer().generate_at("id~*", Duration::from_secs(1), NOW).unwrap();
        assert!(url.contains("?id=id~%2A&"));
    }

    #[test]
    fn accepts_until_expiry_inclusive() {
        let signer = signer();
        let url = signer.generate_at("abc", Duration::from_secs(300), NOW).unwrap();
        let (id, expires, signature) = params(&url);

        signer.validate_at(&id, &expires, &signature, NOW).unwrap();
        signer.validate_at(&id, &expires, &signature, NOW + 300).unwrap();
        assert!(matches!(
            signer.validate_at(&id, &expires, &signature, NOW + 301),
            Err(LinkError::UrlExpired { .. })
        ));
    }

    #[test]
    fn rejects_tampering() {
        let signer = signer();
        let url = signer.generate_at("abc", Duration::from_secs(300), NOW).unwrap();
        let (id, expires, signature) = params(&url);

        let mut flipped = signature.into_bytes();
        flipped[0] = if flipped[0] == b'0' { b'1' } else { b'0' };
        let flipped = String::from_utf8(flipped).unwrap();
        assert!(matches!(
            signer.validate_at(&id, &expires, &flipped, NOW),
            Err(LinkError::InvalidSignature { .. })
        ));

        let (_, _, signature) = params(&url);
        assert!(matches!(
            signer.validate_at("abd", &expires, &signature, NOW),
            Err(LinkError::InvalidSignature { .. })
        ));
        assert!(matches!(
            signer.validate_at(&id, &expires, "not-hex", NOW),
            Err(LinkError::InvalidSignature { .. })
        ));

        let other = LinkSigner::new("another key", "http://x", Duration::from_secs(1));
        assert!(matches!(
            other.validate_at(&id, &expires, &signature, NOW),
            Err(LinkError::InvalidSignature { .. })
        ));
    }

    #[test]
    fn checks_run_in_order() {
        let signer = signer();
        assert!(matches!(
            signer.validate_at("abc", "soon", "zz", NOW),
            Err(LinkError::InvalidTimestamp { .. })
        ));
        assert!(matches!(
            signer.validate_at("abc", "1", "zz", NOW),
            Err(LinkError::UrlExpired { .. })
        ));
    }

    #[test]
    fn debug_hides_secret() {
        let rendered = format!("{:?}", signer());
        assert!(!rendered.contains("Secret key my boy"));
    }
}
