//! Shared configuration for the birdwatch CLI.
//!
//! TOML profiles, token resolution (env + keyring + plaintext), and
//! translation to `birdwatch_core::SessionConfig`. The CLI layers its
//! flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use birdwatch_core::{AuthCredentials, SessionConfig, TlsVerification};

/// Service name under which tokens are stored in the system keyring.
pub const KEYRING_SERVICE: &str = "birdwatch";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no token configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Comma-separated profile names for help text, `(none)` when empty.
    pub fn profile_names(&self) -> String {
        if self.profiles.is_empty() {
            return "(none)".into();
        }
        let mut names: Vec<_> = self.profiles.keys().cloned().collect();
        names.sort();
        names.join(", ")
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds fetched data is served before a refetch.
    #[serde(default = "default_stale_time")]
    pub stale_time_secs: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            stale_time_secs: default_stale_time(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_stale_time() -> u64 {
    60
}

/// A named backend profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Data service base URL (e.g., "https://birds.example.org").
    pub backend: String,

    /// Blob storage base URL. Media commands need it.
    pub storage: Option<String>,

    /// Caller principal. Without one the session is anonymous.
    pub principal: Option<String>,

    /// Bearer token (plaintext; prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the token.
    pub token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override stale time.
    pub stale_time_secs: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "birdwatch", "birdwatch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("birdwatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` merged over defaults, then `BIRDWATCH_` env vars
/// (`__` separates nested keys, e.g. `BIRDWATCH_DEFAULTS__OUTPUT`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("BIRDWATCH_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

fn keyring_account(profile_name: &str) -> String {
    format!("{profile_name}/token")
}

/// Store a token for `profile_name` in the system keyring.
pub fn store_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    let keyring_err = |e: keyring::Error| ConfigError::Validation {
        field: "keyring".into(),
        reason: format!("failed to store token: {e}"),
    };
    keyring::Entry::new(KEYRING_SERVICE, &keyring_account(profile_name))
        .map_err(keyring_err)?
        .set_password(token)
        .map_err(keyring_err)
}

/// Resolve a bearer token from the credential chain.
///
/// `Ok(None)` when the profile configures no token source at all.
pub fn resolve_token(
    profile: &Profile,
    profile_name: &str,
) -> Result<Option<SecretString>, ConfigError> {
    resolve_token_from(
        profile,
        profile_name,
        |name| std::env::var(name).ok(),
        |account| {
            keyring::Entry::new(KEYRING_SERVICE, account)
                .and_then(|entry| entry.get_password())
                .ok()
        },
    )
}

fn resolve_token_from(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<Option<SecretString>, ConfigError> {
    // 1. Profile's token_env → env var lookup
    if let Some(val) = profile.token_env.as_deref().and_then(&env) {
        return Ok(Some(SecretString::from(val)));
    }

    // 2. System keyring
    if let Some(secret) = keyring(&keyring_account(profile_name)) {
        return Ok(Some(SecretString::from(secret)));
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.token {
        return Ok(Some(SecretString::from(token.clone())));
    }

    if profile.token_env.is_some() {
        return Err(ConfigError::NoCredentials {
            profile: profile_name.into(),
        });
    }
    Ok(None)
}

/// Resolve `AuthCredentials` for a profile.
///
/// A principal needs a token. A token without a principal is attributed
/// to the profile name. Neither means anonymous.
pub fn resolve_auth(profile: &Profile, profile_name: &str) -> Result<AuthCredentials, ConfigError> {
    combine_auth(
        profile.principal.clone(),
        profile_name,
        resolve_token(profile, profile_name)?,
    )
}

/// Pair an optional principal with an optional token.
pub fn combine_auth(
    principal: Option<String>,
    profile_name: &str,
    token: Option<SecretString>,
) -> Result<AuthCredentials, ConfigError> {
    match (principal, token) {
        (Some(principal), Some(token)) => Ok(AuthCredentials::Token { principal, token }),
        (None, Some(token)) => Ok(AuthCredentials::Token {
            principal: profile_name.into(),
            token,
        }),
        (Some(_), None) => Err(ConfigError::NoCredentials {
            profile: profile_name.into(),
        }),
        (None, None) => Ok(AuthCredentials::Anonymous),
    }
}

// ── Profile → SessionConfig ─────────────────────────────────────────

/// Parse a URL field, naming the field on failure.
pub fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })
}

/// TLS strategy for a profile: `insecure` wins over `ca_cert`.
pub fn profile_tls(profile: &Profile) -> TlsVerification {
    if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    }
}

/// Build a `SessionConfig` from a profile, no CLI flag overrides.
pub fn profile_to_session_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<SessionConfig, ConfigError> {
    let auth = resolve_auth(profile, profile_name)?;
    build_session_config(profile, defaults, auth)
}

fn build_session_config(
    profile: &Profile,
    defaults: &Defaults,
    auth: AuthCredentials,
) -> Result<SessionConfig, ConfigError> {
    let mut config = SessionConfig::new(parse_url("backend", &profile.backend)?);
    config.storage_url = profile
        .storage
        .as_deref()
        .map(|raw| parse_url("storage", raw))
        .transpose()?;
    config.auth = auth;
    config.tls = profile_tls(profile);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.stale_time =
        Duration::from_secs(profile.stale_time_secs.unwrap_or(defaults.stale_time_secs));
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn profile() -> Profile {
        Profile {
            backend: "https://birds.example.org".into(),
            ..Profile::default()
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.stale_time_secs, 60);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "field".into(),
            Profile {
                storage: Some("https://blobs.example.org".into()),
                principal: Some("warden".into()),
                token_env: Some("FIELD_TOKEN".into()),
                stale_time_secs: Some(5),
                ..profile()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let field = &loaded.profiles["field"];
        assert_eq!(field.backend, "https://birds.example.org");
        assert_eq!(field.principal.as_deref(), Some("warden"));
        assert_eq!(field.stale_time_secs, Some(5));
        assert_eq!(loaded.profile_names(), "field");
    }

    #[test]
    fn token_env_wins_over_plaintext() {
        let p = Profile {
            token: Some("plain".into()),
            token_env: Some("FIELD_TOKEN".into()),
            ..profile()
        };
        let token = resolve_token_from(
            &p,
            "field",
            |name| (name == "FIELD_TOKEN").then(|| "from-env".into()),
            no_env,
        )
        .unwrap()
        .unwrap();
        assert_eq!(token.expose_secret(), "from-env");
    }

    #[test]
    fn keyring_wins_over_plaintext() {
        let p = Profile {
            token: Some("plain".into()),
            ..profile()
        };
        let token = resolve_token_from(&p, "field", no_env, |account| {
            (account == "field/token").then(|| "from-keyring".into())
        })
        .unwrap()
        .unwrap();
        assert_eq!(token.expose_secret(), "from-keyring");
    }

    #[test]
    fn unset_token_env_without_fallback_errors() {
        let p = Profile {
            token_env: Some("FIELD_TOKEN".into()),
            ..profile()
        };
        let err = resolve_token_from(&p, "field", no_env, no_env).unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { .. }));
    }

    #[test]
    fn no_principal_no_token_is_anonymous() {
        let auth = combine_auth(None, "field", None).unwrap();
        assert!(matches!(auth, AuthCredentials::Anonymous));
    }

    #[test]
    fn principal_without_token_errors() {
        assert!(combine_auth(Some("warden".into()), "field", None).is_err());
    }

    #[test]
    fn token_without_principal_uses_profile_name() {
        let auth = combine_auth(None, "field", Some(SecretString::from("t"))).unwrap();
        assert_eq!(auth.identity().unwrap().principal(), "field");
    }

    #[test]
    fn session_config_applies_overrides() {
        let p = Profile {
            storage: Some("https://blobs.example.org/media/".into()),
            insecure: Some(true),
            ca_cert: Some("/etc/ca.pem".into()),
            timeout: Some(5),
            ..profile()
        };
        let cfg = build_session_config(&p, &Defaults::default(), AuthCredentials::Anonymous)
            .unwrap();
        assert_eq!(cfg.backend_url.as_str(), "https://birds.example.org/");
        assert_eq!(
            cfg.storage_url.unwrap().as_str(),
            "https://blobs.example.org/media/"
        );
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.stale_time, Duration::from_secs(60));
    }

    #[test]
    fn bad_backend_url_names_the_field() {
        let p = Profile {
            backend: "not a url".into(),
            ..Profile::default()
        };
        let err =
            build_session_config(&p, &Defaults::default(), AuthCredentials::Anonymous).unwrap_err();
        assert!(err.to_string().contains("backend"), "{err}");
    }
}
