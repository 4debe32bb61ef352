use thiserror::Error;

/// Top-level error type for the `birdwatch-api` crate.
///
/// Covers every failure mode of both API surfaces: authentication,
/// transport, backend responses, blob storage, and decoding.
/// `birdwatch-core` folds these into a generic remote failure.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The backend rejected the caller's credentials (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The caller is authenticated but not allowed to perform the call (HTTP 403).
    #[error("Access denied: {message}")]
    Forbidden { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Backend ─────────────────────────────────────────────────────
    /// Non-success response from the data service.
    #[error("Backend error (HTTP {status}): {message}")]
    Remote {
        message: String,
        code: Option<String>,
        status: u16,
    },

    // ── Blob storage ────────────────────────────────────────────────
    /// Non-success response from the blob store.
    #[error("Blob storage error (HTTP {status}): {message}")]
    Storage { message: String, status: u16 },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the session has lapsed and re-authentication
    /// might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// Reads may be retried by the caller; writes never are.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Remote { status, .. } | Self::Storage { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Remote { status: 404, .. } | Self::Storage { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { .. } => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::Remote { status, .. } | Self::Storage { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Extract the backend error code, if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Remote { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn not_found_detects_remote_404() {
        let err = Error::Remote {
            message: "no such bird".into(),
            code: None,
            status: 404,
        };
        assert!(err.is_not_found());
        assert!(!err.is_transient());
    }

    #[test]
    fn server_errors_are_transient() {
        let err = Error::Storage {
            message: "bad gateway".into(),
            status: 502,
        };
        assert!(err.is_transient());
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn authentication_reports_expired() {
        let err = Error::Authentication {
            message: "token expired".into(),
        };
        assert!(err.is_auth_expired());
        assert_eq!(err.status(), Some(401));
    }
}
