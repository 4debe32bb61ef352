// ── Runtime session configuration ──
//
// These types describe *how* to reach the bird data service and its blob
// store. They carry credential data and cache tuning, but never touch
// disk. The CLI constructs a `SessionConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::model::Identity;

/// How the caller authenticates with the backend.
#[derive(Debug, Clone, Default)]
pub enum AuthCredentials {
    /// No identity. Reads that the backend allows anonymously still work;
    /// the admin gate resolves to `Unauthenticated`.
    #[default]
    Anonymous,
    /// A principal with a bearer token issued by the identity provider.
    Token {
        principal: String,
        token: SecretString,
    },
}

impl AuthCredentials {
    /// The caller identity these credentials carry, if any.
    pub fn identity(&self) -> Option<Identity> {
        match self {
            Self::Anonymous => None,
            Self::Token { principal, .. } => Some(Identity::new(principal.clone())),
        }
    }
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-hosted test deployments).
    DangerAcceptInvalid,
}

/// Configuration for one backend session.
///
/// Built by the CLI and passed to `Session`. Core never reads config files.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Data service URL (e.g., `https://birds.example.org`).
    pub backend_url: Url,
    /// Blob storage base URL. Media operations are unavailable without it.
    pub storage_url: Option<Url>,
    /// Authentication method and credentials.
    pub auth: AuthCredentials,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// How long fetched data is served without a refetch.
    pub stale_time: Duration,
}

impl SessionConfig {
    pub fn new(backend_url: Url) -> Self {
        Self {
            backend_url,
            storage_url: None,
            auth: AuthCredentials::Anonymous,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            stale_time: Duration::from_secs(60),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_has_no_identity() {
        assert!(AuthCredentials::Anonymous.identity().is_none());
    }

    #[test]
    fn token_carries_principal() {
        let auth = AuthCredentials::Token {
            principal: "aisha@field".into(),
            token: SecretString::from("t".to_owned()),
        };
        assert_eq!(auth.identity().unwrap().principal(), "aisha@field");
    }

    #[test]
    fn new_config_has_defaults() {
        let config = SessionConfig::new("https://birds.example.org".parse().unwrap());
        assert!(config.storage_url.is_none());
        assert_eq!(config.stale_time, Duration::from_secs(60));
        assert_eq!(config.tls, TlsVerification::SystemDefaults);
    }
}
