//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

use birdwatch_config::ConfigError;
use birdwatch_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the data service at {url}: {reason}")]
    #[diagnostic(
        code(birdwatch::connection_failed),
        help(
            "Check that the service is running and accessible.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(birdwatch::auth_failed),
        help("Refresh your token with: birdwatch config set-token")
    )]
    AuthFailed { message: String },

    #[error("No token configured for profile '{profile}'")]
    #[diagnostic(
        code(birdwatch::no_credentials),
        help(
            "Store one with: birdwatch config set-token\n\
             Or set the BIRDWATCH_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    #[error("'{action}' requires admin rights")]
    #[diagnostic(
        code(birdwatch::not_admin),
        help("Run: birdwatch whoami to see how the service sees you")
    )]
    NotAdmin { action: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(birdwatch::not_found),
        help("Run: birdwatch {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Backend ──────────────────────────────────────────────────────
    #[error("Backend error: {message}")]
    #[diagnostic(code(birdwatch::remote))]
    Remote { message: String },

    #[error("Blob storage error: {message}")]
    #[diagnostic(code(birdwatch::storage))]
    Storage { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(birdwatch::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(birdwatch::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: birdwatch config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No data service configured")]
    #[diagnostic(
        code(birdwatch::no_config),
        help(
            "Create a profile with: birdwatch config init\n\
             Or pass --backend. Config expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(birdwatch::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(birdwatch::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(birdwatch::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(birdwatch::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::NotAdmin { .. } => exit_code::PERMISSION,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<&CoreError> for CliError {
    fn from(err: &CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed {
                url: url.clone(),
                reason: reason.clone(),
            },

            CoreError::AuthenticationFailed { message } => Self::AuthFailed {
                message: message.clone(),
            },

            CoreError::NotReady => Self::Internal("no backend session attached".into()),

            CoreError::BirdNotFound { identifier } => Self::NotFound {
                resource_type: "bird".into(),
                identifier: identifier.clone(),
                list_command: "birds list".into(),
            },

            CoreError::InvalidRecord { entity, reason } => Self::Remote {
                message: format!("malformed {entity} from backend: {reason}"),
            },

            CoreError::ValidationFailed { message } => Self::Validation {
                field: "input".into(),
                reason: message.clone(),
            },

            CoreError::Remote { message, status } => Self::Remote {
                message: match status {
                    Some(code) => format!("{message} (HTTP {code})"),
                    None => message.clone(),
                },
            },

            CoreError::Storage { message } => Self::Storage {
                message: message.clone(),
            },

            CoreError::Config { message } => Self::Config {
                message: message.clone(),
            },

            CoreError::Internal(message) => Self::Internal(message.clone()),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        Self::from(&err)
    }
}

/// Cached query errors are shared.
impl From<Arc<CoreError>> for CliError {
    fn from(err: Arc<CoreError>) -> Self {
        Self::from(err.as_ref())
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Io(e) => Self::Io(e),
            other => Self::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let cases = [
            (
                CoreError::ConnectionFailed {
                    url: "https://birds.example.org".into(),
                    reason: "refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (
                CoreError::AuthenticationFailed {
                    message: "expired".into(),
                },
                exit_code::AUTH,
            ),
            (
                CoreError::BirdNotFound {
                    identifier: "9".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::ValidationFailed {
                    message: "no name".into(),
                },
                exit_code::USAGE,
            ),
            (
                CoreError::Remote {
                    message: "boom".into(),
                    status: Some(500),
                },
                exit_code::GENERAL,
            ),
        ];
        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }

    #[test]
    fn remote_status_is_kept_in_message() {
        let err = CliError::from(CoreError::Remote {
            message: "rejected".into(),
            status: Some(403),
        });
        assert_eq!(err.to_string(), "Backend error: rejected (HTTP 403)");
    }
}
