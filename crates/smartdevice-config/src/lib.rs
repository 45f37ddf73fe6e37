//! Shared configuration for SmartDevice tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `smartdevice_core::AccountConfig`. The CLI layers
//! its flag overrides on top.

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

use smartdevice_core::{
    AccountConfig, Availability, Credentials, NotificationSettings, OAuthSettings, TlsVerification,
};

/// Keyring service name; entries are `{profile}/api-key` and `{profile}/password`.
pub const KEYRING_SERVICE: &str = "smartdevice";

/// Prefix for environment overrides, e.g. `SMARTDEVICE_DEFAULT_PROFILE`.
pub const ENV_PREFIX: &str = "SMARTDEVICE_";

pub const API_KEY_ENV: &str = "SMARTDEVICE_API_KEY";
pub const USERNAME_ENV: &str = "SMARTDEVICE_USERNAME";
pub const PASSWORD_ENV: &str = "SMARTDEVICE_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

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
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named account profiles.
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
    /// Pick a profile: the explicit name, else `default_profile`, else
    /// `"default"`.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, &Profile), ConfigError> {
        let name = name
            .map(String::from)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into());
        self.profiles
            .get(&name)
            .map(|p| (name.clone(), p))
            .ok_or(ConfigError::UnknownProfile { name })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
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
    15
}
fn default_poll_interval() -> u64 {
    10
}

/// A named account profile.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Auth mode: "api-key" or "password".
    #[serde(default = "default_auth_mode")]
    pub auth_mode: String,

    /// API key (plaintext; prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Account e-mail for password auth.
    pub username: Option<String>,

    /// Password (plaintext; prefer keyring).
    pub password: Option<String>,

    /// Override the Home API root.
    pub api_url: Option<String>,

    /// Override the login service.
    pub login_url: Option<String>,
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Seconds.
    pub timeout: Option<u64>,
    /// Seconds; 0 disables background polling.
    pub poll_interval: Option<u64>,
    /// Seconds to wait after a command before polling.
    pub settle_delay: Option<u64>,
    pub fetch_retries: Option<u32>,
    /// Seconds a door state must hold before it is confirmed.
    pub door_debounce: Option<u64>,

    /// "assume" or "reported".
    pub availability: Option<Availability>,

    #[serde(default)]
    pub notifications: NotificationProfile,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            auth_mode: default_auth_mode(),
            api_key: None,
            api_key_env: None,
            username: None,
            password: None,
            api_url: None,
            login_url: None,
            client_id: None,
            redirect_uri: None,
            ca_cert: None,
            timeout: None,
            poll_interval: None,
            settle_delay: None,
            fetch_retries: None,
            door_debounce: None,
            availability: None,
            notifications: NotificationProfile::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct NotificationProfile {
    #[serde(default)]
    pub enabled: bool,
    /// Appliance ids to keep notifications for; empty keeps all.
    #[serde(default)]
    pub devices: Vec<String>,
}

fn default_auth_mode() -> String {
    "api-key".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "smartdevice", "smartdevice").map_or_else(
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
    p.push("smartdevice");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` + environment. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(&path, cfg)?;
    Ok(path)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Keyring ─────────────────────────────────────────────────────────

/// Which secret a keyring entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKind {
    ApiKey,
    Password,
}

impl SecretKind {
    fn entry_name(self, profile_name: &str) -> String {
        match self {
            Self::ApiKey => format!("{profile_name}/api-key"),
            Self::Password => format!("{profile_name}/password"),
        }
    }
}

/// Store a secret in the system keyring.
pub fn store_secret(profile_name: &str, kind: SecretKind, secret: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &kind.entry_name(profile_name))?;
    entry.set_password(secret)?;
    Ok(())
}

fn keyring_secret(profile_name: &str, kind: SecretKind) -> Option<String> {
    keyring::Entry::new(KEYRING_SERVICE, &kind.entry_name(profile_name))
        .ok()?
        .get_password()
        .ok()
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Where secrets come from, in lookup order after the environment.
struct SecretSources<'a> {
    env: &'a dyn Fn(&str) -> Option<String>,
    keyring: &'a dyn Fn(&str, SecretKind) -> Option<String>,
}

const SYSTEM: SecretSources<'static> = SecretSources {
    env: &env_var,
    keyring: &keyring_secret,
};

/// Resolve an API key: env var → keyring → plaintext.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    api_key_from(profile, profile_name, &SYSTEM)
}

fn api_key_from(
    profile: &Profile,
    profile_name: &str,
    sources: &SecretSources<'_>,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's api_key_env, then the global variable
    let env_name = profile.api_key_env.as_deref().unwrap_or(API_KEY_ENV);
    if let Some(val) = (sources.env)(env_name) {
        return Ok(SecretString::from(val));
    }

    // 2. System keyring
    if let Some(secret) = (sources.keyring)(profile_name, SecretKind::ApiKey) {
        return Ok(SecretString::from(secret));
    }

    // 3. Plaintext in config
    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve username + password. The password follows env var → keyring →
/// plaintext.
pub fn resolve_password_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<(String, SecretString), ConfigError> {
    password_from(profile, profile_name, &SYSTEM)
}

fn password_from(
    profile: &Profile,
    profile_name: &str,
    sources: &SecretSources<'_>,
) -> Result<(String, SecretString), ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| (sources.env)(USERNAME_ENV))
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    // 1. Env var
    if let Some(pw) = (sources.env)(PASSWORD_ENV) {
        return Ok((username, SecretString::from(pw)));
    }

    // 2. Keyring
    if let Some(pw) = (sources.keyring)(profile_name, SecretKind::Password) {
        return Ok((username, SecretString::from(pw)));
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok((username, SecretString::from(pw.clone())));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve `Credentials` from a profile's `auth_mode` field.
pub fn resolve_credentials(profile: &Profile, profile_name: &str) -> Result<Credentials, ConfigError> {
    credentials_from(profile, profile_name, &SYSTEM)
}

fn credentials_from(
    profile: &Profile,
    profile_name: &str,
    sources: &SecretSources<'_>,
) -> Result<Credentials, ConfigError> {
    match profile.auth_mode.as_str() {
        "api-key" => Ok(Credentials::ApiKey {
            key: api_key_from(profile, profile_name, sources)?,
        }),
        "password" => {
            let (username, password) = password_from(profile, profile_name, sources)?;
            Ok(Credentials::Password { username, password })
        }
        other => Err(ConfigError::Validation {
            field: "auth_mode".into(),
            reason: format!("expected 'api-key' or 'password', got '{other}'"),
        }),
    }
}

// ── Translation ─────────────────────────────────────────────────────

/// Build an `AccountConfig` from a profile, no CLI flag overrides.
pub fn profile_to_account_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<AccountConfig, ConfigError> {
    let credentials = resolve_credentials(profile, profile_name)?;
    build_account_config(profile, defaults, credentials)
}

/// Build an `AccountConfig` from a profile with already-resolved credentials.
///
/// Used by callers that layer their own credential sources (CLI flags) on
/// top of the profile.
pub fn build_account_config(
    profile: &Profile,
    defaults: &Defaults,
    credentials: Credentials,
) -> Result<AccountConfig, ConfigError> {
    let mut cfg = AccountConfig::new(credentials);

    if let Some(ref raw) = profile.api_url {
        cfg.api_url = parse_url("api_url", raw)?;
    }
    cfg.oauth = oauth_settings(profile)?;

    if let Some(ref ca_path) = profile.ca_cert {
        cfg.tls = TlsVerification::CustomCa(ca_path.clone());
    }

    cfg.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    cfg.poll_interval =
        Duration::from_secs(profile.poll_interval.unwrap_or(defaults.poll_interval));
    if let Some(secs) = profile.settle_delay {
        cfg.settle_delay = Duration::from_secs(secs);
    }
    if let Some(retries) = profile.fetch_retries {
        cfg.fetch_retries = retries;
    }
    if let Some(secs) = profile.door_debounce {
        cfg.door_debounce = Duration::from_secs(secs);
    }
    if let Some(availability) = profile.availability {
        cfg.availability = availability;
    }
    cfg.notifications = NotificationSettings {
        enabled: profile.notifications.enabled,
        devices: profile.notifications.devices.clone(),
    };

    cfg.validate().map_err(|e| ConfigError::Validation {
        field: "profile".into(),
        reason: e.to_string(),
    })?;
    Ok(cfg)
}

fn oauth_settings(profile: &Profile) -> Result<OAuthSettings, ConfigError> {
    let mut settings = OAuthSettings::default();
    if let Some(ref raw) = profile.login_url {
        settings.login_url = parse_url("login_url", raw)?;
    }
    if let Some(ref id) = profile.client_id {
        settings.client_id.clone_from(id);
    }
    if let Some(ref uri) = profile.redirect_uri {
        settings.redirect_uri.clone_from(uri);
    }
    Ok(settings)
}

fn parse_url(field: &str, raw: &str) -> Result<Url, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })
}
