use crate::error::LinkError;
use url::Url;

/// The three parameters carried by a signed link, as received from a client.
///
/// Values are kept verbatim (after URL decoding); nothing is validated here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    pub id: String,
    pub expires: String,
    pub signature: String,
}

impl SignedToken {
    /// Extracts `id`, `expires` and `signature` from a full link.
    ///
    /// # Errors
    /// Returns [`LinkError::InvalidUrl`] if the link does not parse or a parameter is missing.
    pub fn from_url(link: &str) -> Result<Self, LinkError> {
        let url = Url::parse(link).map_err(|e| LinkError::InvalidUrl {
            message: e.to_string().into(),
            context: Some(link.to_owned().into()),
        })?;

        let (mut id, mut expires, mut signature) = (None, None, None);
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "id" => id = Some(value.into_owned()),
                "expires" => expires = Some(value.into_owned()),
                "signature" => signature = Some(value.into_owned()),
                _ => {},
            }
        }

        Ok(Self {
            id: required(id, "id")?,
            expires: required(expires, "expires")?,
            signature: required(signature, "signature")?,
        })
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, LinkError> {
    value.ok_or_else(|| LinkError::InvalidUrl {
        message: format!("Missing `{name}` parameter").into(),
        context: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_decodes_parameters() {
        let token =
            SignedToken::from_url("http://localhost:9090/files/?id=a+b%26c&expires=17&signature=ff00")
                .unwrap();
        assert_eq!(token.id, "a b&c");
        assert_eq!(token.expires, "17");
        assert_eq!(token.signature, "ff00");
    }

    #[test]
    fn rejects_malformed_links() {
        assert!(matches!(SignedToken::from_url("not a url"), Err(LinkError::InvalidUrl { .. })));
        assert!(matches!(
            SignedToken::from_url("http://h/?id=x&expires=1"),
            Err(LinkError::InvalidUrl { .. })
        ));
    }
}
