// ── Notification domain types ──

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Alarm or reminder category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    DoorAlarm,
    AirFilterReminder,
    UpperTemperatureAlarm,
    LowerTemperatureAlarm,
    AutoDoorOverheatAlarm,
    AutoDoorObstacleAlarm,
    UpperPowerFailureAlarm,
    LowerPowerFailureAlarm,
    Other(String),
}

impl NotificationKind {
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "door_alarm" => Self::DoorAlarm,
            "air_filter_reminder" => Self::AirFilterReminder,
            "upper_temperature_alarm" => Self::UpperTemperatureAlarm,
            "lower_temperature_alarm" => Self::LowerTemperatureAlarm,
            "auto_door_overheat_alarm" => Self::AutoDoorOverheatAlarm,
            "auto_door_obstacle_alarm" => Self::AutoDoorObstacleAlarm,
            "upper_power_failure_alarm" => Self::UpperPowerFailureAlarm,
            "lower_power_failure_alarm" => Self::LowerPowerFailureAlarm,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::DoorAlarm => "door_alarm",
            Self::AirFilterReminder => "air_filter_reminder",
            Self::UpperTemperatureAlarm => "upper_temperature_alarm",
            Self::LowerTemperatureAlarm => "lower_temperature_alarm",
            Self::AutoDoorOverheatAlarm => "auto_door_overheat_alarm",
            Self::AutoDoorObstacleAlarm => "auto_door_obstacle_alarm",
            Self::UpperPowerFailureAlarm => "upper_power_failure_alarm",
            Self::LowerPowerFailureAlarm => "lower_power_failure_alarm",
            Self::Other(raw) => raw,
        }
    }

    /// Alarms need attention; reminders do not.
    pub fn is_alarm(&self) -> bool {
        !matches!(self, Self::AirFilterReminder | Self::Other(_))
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for NotificationKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NotificationKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_raw(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub notification_id: String,
    pub device_id: String,
    pub kind: NotificationKind,
    pub created_at: Option<DateTime<Utc>>,
    pub acknowledged: bool,
}
