//! CLI configuration: thin wrapper around `birdwatch_config` shared types.
//!
//! Re-exports the shared types and adds resolution that respects
//! `GlobalOpts` flag overrides (--backend, --token, etc.).

use std::time::Duration;

use secrecy::SecretString;

use birdwatch_core::{AuthCredentials, SessionConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use birdwatch_config::{
    Config, Profile, config_path, load_config_or_default, save_config, store_token,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `SessionConfig` from the config file, profile, and CLI flags.
///
/// Flags override profile values. Without a profile, `--backend` alone
/// is enough for an anonymous session.
pub fn build_session_config(global: &GlobalOpts) -> Result<SessionConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let fallback = Profile::default();
    let (profile, named) = match cfg.profiles.get(&profile_name) {
        Some(profile) => (profile, true),
        None => (&fallback, false),
    };

    // 1. Backend URL (flag > env > profile)
    let backend = global
        .backend
        .as_deref()
        .or((!profile.backend.is_empty()).then_some(profile.backend.as_str()))
        .ok_or_else(|| {
            if global.profile.is_some() && !named {
                CliError::ProfileNotFound {
                    name: profile_name.clone(),
                    available: cfg.profile_names(),
                }
            } else {
                CliError::NoConfig {
                    path: config_path().display().to_string(),
                }
            }
        })?;
    let mut session = SessionConfig::new(birdwatch_config::parse_url("backend", backend)?);

    // 2. Storage URL
    session.storage_url = global
        .storage
        .as_deref()
        .or(profile.storage.as_deref())
        .map(|raw| birdwatch_config::parse_url("storage", raw))
        .transpose()?;

    // 3. Credentials (flag token > profile chain)
    session.auth = resolve_auth_with_flags(profile, &profile_name, global)?;

    // 4. TLS
    session.tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        birdwatch_config::profile_tls(profile)
    };

    // 5. Timing
    let timeout = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(cfg.defaults.timeout);
    session.timeout = Duration::from_secs(timeout);
    session.stale_time = Duration::from_secs(
        profile
            .stale_time_secs
            .unwrap_or(cfg.defaults.stale_time_secs),
    );

    Ok(session)
}

fn resolve_auth_with_flags(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<AuthCredentials, CliError> {
    let principal = global
        .principal
        .clone()
        .or_else(|| profile.principal.clone());

    // CLI flag takes priority
    let token = match global.token {
        Some(ref token) => Some(SecretString::from(token.clone())),
        None => birdwatch_config::resolve_token(profile, profile_name)?,
    };
    Ok(birdwatch_config::combine_auth(principal, profile_name, token)?)
}
