//! CLI configuration -- thin wrapper around `smartdevice_config`.
//!
//! Adds the flag overrides (`--api-url`, `--api-key`, `--timeout`) on top
//! of profile resolution.

use secrecy::SecretString;

use smartdevice_core::{AccountConfig, Credentials};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use smartdevice_config::{
    Config, Profile, SecretKind, config_path, load_config_or_default, save_config, store_secret,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the account configuration for this invocation.
///
/// A named profile that does not exist is an error. Without any profile,
/// `--api-key` (or `SMARTDEVICE_API_KEY`) alone is enough.
pub fn build_account_config(global: &GlobalOpts) -> Result<AccountConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, &cfg, global);
    }

    if global.profile.is_some() {
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: available_profiles(&cfg),
        });
    }

    if global.api_key.is_none() {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    }
    resolve_profile(&Profile::default(), &profile_name, &cfg, global)
}

/// Translate a `Profile` + global flags into an `AccountConfig`.
///
/// Flag values take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<AccountConfig, CliError> {
    let mut profile = profile.clone();
    if let Some(ref url) = global.api_url {
        profile.api_url = Some(url.clone());
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    let credentials = match global.api_key {
        Some(ref key) => Credentials::ApiKey {
            key: SecretString::from(key.clone()),
        },
        None => smartdevice_config::resolve_credentials(&profile, profile_name)?,
    };

    Ok(smartdevice_config::build_account_config(
        &profile,
        &cfg.defaults,
        credentials,
    )?)
}

pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        return "(none)".into();
    }
    let mut names: Vec<_> = cfg.profiles.keys().cloned().collect();
    names.sort();
    names.join(", ")
}
