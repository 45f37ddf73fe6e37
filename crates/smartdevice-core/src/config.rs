// ── Runtime account configuration ──
//
// Describes how one account talks to the cloud: credentials, endpoints
// and timing. Never touches disk; the CLI (or any embedding host) builds
// an `AccountConfig` and hands it to `Account::new`.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use url::Url;

use smartdevice_api::home::DEFAULT_BASE_URL;
use smartdevice_api::{Credentials, OAuthSettings};

use crate::error::CoreError;

/// Shortest accepted poll interval. Zero disables background polling.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    #[default]
    SystemDefaults,
    CustomCa(PathBuf),
}

/// Where an appliance's `available` flag comes from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Availability {
    /// Every listed appliance is available.
    #[default]
    Assume,
    /// Use the `connected` flag the API reports, assuming available when
    /// it is absent.
    Reported,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationSettings {
    /// Fetch notifications on every tick.
    pub enabled: bool,
    /// Appliances to keep notifications for. Empty keeps all.
    pub devices: Vec<String>,
}

impl NotificationSettings {
    pub fn wants(&self, device_id: &str) -> bool {
        self.devices.is_empty() || self.devices.iter().any(|d| d == device_id)
    }
}

/// Configuration for one account.
#[derive(Debug, Clone)]
pub struct AccountConfig {
    pub credentials: Credentials,
    /// Home API root.
    pub api_url: Url,
    /// Login service settings, used by password accounts only.
    pub oauth: OAuthSettings,
    pub tls: TlsVerification,
    /// Upper bound for each HTTP call.
    pub timeout: Duration,
    /// Time between poll ticks. `Duration::ZERO` = no background polling.
    pub poll_interval: Duration,
    /// Wait after a command before the follow-up poll.
    pub settle_delay: Duration,
    /// Extra attempts for a fetch that failed to connect or timed out.
    pub fetch_retries: u32,
    pub notifications: NotificationSettings,
    pub availability: Availability,
    /// Quiet period before a door state is confirmed.
    pub door_debounce: Duration,
}

impl AccountConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            api_url: Url::parse(DEFAULT_BASE_URL).expect("valid default API URL"),
            oauth: OAuthSettings::default(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(15),
            poll_interval: Duration::from_secs(10),
            settle_delay: Duration::from_secs(5),
            fetch_retries: 0,
            notifications: NotificationSettings::default(),
            availability: Availability::default(),
            door_debounce: Duration::from_secs(3),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !self.poll_interval.is_zero() && self.poll_interval < MIN_POLL_INTERVAL {
            return Err(CoreError::Config {
                message: format!(
                    "poll interval must be at least {}s (got {:?})",
                    MIN_POLL_INTERVAL.as_secs(),
                    self.poll_interval
                ),
            });
        }
        if self.timeout.is_zero() {
            return Err(CoreError::Config {
                message: "timeout must be greater than zero".into(),
            });
        }
        if let Credentials::Password { username, .. } = &self.credentials {
            if username.trim().is_empty() {
                return Err(CoreError::Config {
                    message: "username must not be empty".into(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn api_key() -> Credentials {
        Credentials::ApiKey {
            key: "k".to_string().into(),
        }
    }

    #[test]
    fn defaults() {
        let cfg = AccountConfig::new(api_key());
        assert_eq!(cfg.poll_interval, Duration::from_secs(10));
        assert_eq!(cfg.settle_delay, Duration::from_secs(5));
        assert_eq!(cfg.door_debounce, Duration::from_secs(3));
        assert!(!cfg.notifications.enabled);
        assert_eq!(cfg.availability, Availability::Assume);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn poll_interval_floor() {
        let mut cfg = AccountConfig::new(api_key());
        cfg.poll_interval = Duration::from_secs(2);
        assert!(matches!(cfg.validate(), Err(CoreError::Config { .. })));

        cfg.poll_interval = Duration::ZERO;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn notification_device_filter() {
        let all = NotificationSettings {
            enabled: true,
            devices: vec![],
        };
        assert!(all.wants("A"));

        let some = NotificationSettings {
            enabled: true,
            devices: vec!["A".into()],
        };
        assert!(some.wants("A"));
        assert!(!some.wants("B"));
    }

    #[test]
    fn availability_parses_kebab_case() {
        assert_eq!("reported".parse::<Availability>().unwrap(), Availability::Reported);
        assert_eq!(Availability::Assume.to_string(), "assume");
    }
}
