use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Credentials presented to the data service.
///
/// The identity provider is external: it hands us a bearer token (or
/// nothing, for anonymous browsing) and we attach it to every request.
#[derive(Debug, Clone, Default)]
pub enum Credentials {
    /// No identity. Read-only endpoints may still answer.
    #[default]
    Anonymous,
    /// Bearer token issued by the identity provider.
    Bearer { token: SecretString },
}

impl Credentials {
    /// Build a bearer credential from a raw token string.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: SecretString::from(token.into()),
        }
    }

    /// Whether these credentials identify a caller.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Bearer { .. })
    }

    /// Default headers to install on the HTTP client.
    ///
    /// The `Authorization` value is marked sensitive so it never shows
    /// up in debug output.
    pub fn headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        if let Self::Bearer { token } = self {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| Error::Authentication {
                    message: format!("invalid bearer token header value: {e}"),
                })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_has_no_authorization_header() {
        let headers = Credentials::Anonymous.headers().unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn bearer_sets_sensitive_header() {
        let headers = Credentials::bearer("abc123").headers().unwrap();
        let value = headers.get(AUTHORIZATION).unwrap();
        assert!(value.is_sensitive());
        assert_eq!(value.to_str().unwrap(), "Bearer abc123");
    }

    #[test]
    fn bearer_rejects_control_characters() {
        let result = Credentials::bearer("bad\ntoken").headers();
        assert!(matches!(result, Err(Error::Authentication { .. })));
    }
}
