// ── Core error types ──
//
// User-facing errors from birdwatch-core. Consumers never see raw HTTP
// responses or JSON parse failures. The `From<birdwatch_api::Error>` impl
// folds transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error("No backend session is attached")]
    NotReady,

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Backend unreachable at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Bird not found: {identifier}")]
    BirdNotFound { identifier: String },

    #[error("Invalid {entity} record from backend: {reason}")]
    InvalidRecord {
        entity: &'static str,
        reason: String,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    /// Any rejection from the backend. The service carries no structured
    /// error codes, so callers treat every variant of this as one failure.
    #[error("Backend call failed: {message}")]
    Remote {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    #[error("Blob storage error: {message}")]
    Storage { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Status code of a backend rejection, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => *status,
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<birdwatch_api::Error> for CoreError {
    fn from(err: birdwatch_api::Error) -> Self {
        match err {
            birdwatch_api::Error::Authentication { message }
            | birdwatch_api::Error::Forbidden { message } => {
                CoreError::AuthenticationFailed { message }
            }
            birdwatch_api::Error::Transport(ref e) => {
                if e.is_connect() || e.is_timeout() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Remote {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            birdwatch_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            birdwatch_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            birdwatch_api::Error::Remote {
                message, status, ..
            } => CoreError::Remote {
                message,
                status: Some(status),
            },
            birdwatch_api::Error::Storage { message, status } => CoreError::Storage {
                message: format!("{message} (HTTP {status})"),
            },
            birdwatch_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
