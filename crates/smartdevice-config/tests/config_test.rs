#![allow(clippy::unwrap_used)]
// Loading and saving TOML profiles from disk.

use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use smartdevice_config::{
    Config, NotificationProfile, Profile, load_config_from, profile_to_account_config,
    save_config_to,
};
use smartdevice_core::{Availability, Credentials};

const SAMPLE: &str = r#"
default_profile = "kitchen"

[defaults]
output = "json"
timeout = 20

[profiles.kitchen]
auth_mode = "api-key"
api_key = "plain-key"
poll_interval = 60
availability = "reported"

[profiles.kitchen.notifications]
enabled = true
devices = ["A", "B"]

[profiles.cabin]
auth_mode = "password"
username = "me@example.com"
password = "hunter2"
"#;

fn write_sample(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, SAMPLE).unwrap();
    path
}

#[test]
fn test_load_profiles_from_toml() {
    let dir = TempDir::new().unwrap();
    let cfg = load_config_from(&write_sample(&dir)).unwrap();

    assert_eq!(cfg.default_profile.as_deref(), Some("kitchen"));
    assert_eq!(cfg.defaults.output, "json");
    assert_eq!(cfg.defaults.timeout, 20);
    assert_eq!(cfg.defaults.poll_interval, 10);

    let (name, kitchen) = cfg.profile(None).unwrap();
    assert_eq!(name, "kitchen");
    assert_eq!(kitchen.poll_interval, Some(60));
    assert_eq!(kitchen.availability, Some(Availability::Reported));
    assert_eq!(
        kitchen.notifications,
        NotificationProfile {
            enabled: true,
            devices: vec!["A".into(), "B".into()],
        }
    );

    let (_, cabin) = cfg.profile(Some("cabin")).unwrap();
    assert_eq!(cabin.auth_mode, "password");
    assert!(!cabin.notifications.enabled);
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();

    assert_eq!(cfg.default_profile.as_deref(), Some("default"));
    assert!(cfg.profiles.is_empty());
}

#[test]
fn test_profile_translates_to_account_config() {
    let dir = TempDir::new().unwrap();
    let cfg = load_config_from(&write_sample(&dir)).unwrap();
    let (name, profile) = cfg.profile(Some("cabin")).unwrap();

    // Only meaningful when no password override is present in the environment.
    if std::env::var("SMARTDEVICE_PASSWORD").is_ok() {
        return;
    }
    let account = profile_to_account_config(profile, &name, &cfg.defaults).unwrap();

    assert!(matches!(
        account.credentials,
        Credentials::Password { ref username, .. } if username == "me@example.com"
    ));
    assert_eq!(account.timeout, Duration::from_secs(20));
    assert_eq!(account.poll_interval, Duration::from_secs(10));
}

#[test]
fn test_saved_config_loads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut cfg = Config::default();
    cfg.profiles.insert(
        "default".into(),
        Profile {
            api_key_env: Some("MY_FRIDGE_KEY".into()),
            settle_delay: Some(3),
            ..Profile::default()
        },
    );
    save_config_to(&path, &cfg).unwrap();

    let loaded = load_config_from(&path).unwrap();
    let (_, profile) = loaded.profile(None).unwrap();
    assert_eq!(profile.auth_mode, "api-key");
    assert_eq!(profile.api_key_env.as_deref(), Some("MY_FRIDGE_KEY"));
    assert_eq!(profile.settle_delay, Some(3));
}
