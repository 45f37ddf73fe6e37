// ── Appliance domain types ──

use std::fmt;

use serde::{Deserialize, Serialize};

use super::control::{AutoDoorControl, Control, ControlKey, TemperatureControl};

/// Product family reported by the vendor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ApplianceType {
    Fridge,
    Freezer,
    Combi,
    Wine,
    /// A family this crate does not know yet, kept verbatim.
    Other(String),
}

impl ApplianceType {
    pub fn from_raw(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "FRIDGE" => Self::Fridge,
            "FREEZER" => Self::Freezer,
            "COMBI" => Self::Combi,
            "WINE" => Self::Wine,
            _ => Self::Other(raw.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Fridge => "FRIDGE",
            Self::Freezer => "FREEZER",
            Self::Combi => "COMBI",
            Self::Wine => "WINE",
            Self::Other(raw) => raw,
        }
    }

    /// Whether this family has user-settable cooling zones.
    pub fn is_cooling(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for ApplianceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ApplianceType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ApplianceType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_raw(&raw))
    }
}

/// One appliance registered to the account, with its controls as of the
/// last poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appliance {
    pub device_id: String,
    /// Model designation.
    pub model: String,
    pub image: Option<String>,
    /// User-assigned name, or the model when none is set.
    pub nickname: String,
    pub appliance_type: ApplianceType,
    pub capabilities: Vec<String>,
    pub available: bool,
    /// Replaced wholesale on every poll.
    pub controls: Vec<Control>,
}

impl Appliance {
    pub fn control(&self, key: &ControlKey) -> Option<&Control> {
        self.controls.iter().find(|c| c.key() == *key)
    }

    /// Temperature control for a zone.
    pub fn temperature_zone(&self, zone_id: i64) -> Option<&TemperatureControl> {
        self.controls.iter().find_map(|c| match c {
            Control::Temperature(t) if t.zone_id == zone_id => Some(t),
            _ => None,
        })
    }

    pub fn doors(&self) -> impl Iterator<Item = &AutoDoorControl> {
        self.controls.iter().filter_map(|c| match c {
            Control::AutoDoor(d) => Some(d),
            _ => None,
        })
    }
}
