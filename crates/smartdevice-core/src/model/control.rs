// ── Control domain types ──
//
// One variant per vendor control family. A control only means something
// inside the appliance that owns it; `ControlKey` identifies it there.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identity of a control within its appliance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ControlKey {
    pub name: String,
    pub zone_id: Option<i64>,
}

impl ControlKey {
    pub fn new(name: impl Into<String>, zone_id: Option<i64>) -> Self {
        Self {
            name: name.into(),
            zone_id,
        }
    }
}

impl fmt::Display for ControlKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.zone_id {
            Some(zone) => write!(f, "{}@{zone}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureControl {
    pub name: String,
    pub zone_id: i64,
    pub zone_position: Option<String>,
    /// Measured temperature.
    pub value: Option<f64>,
    /// Set point.
    pub target: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// `°C` or `°F`.
    pub unit: String,
}

impl TemperatureControl {
    /// Whether `target` lies inside the advertised range. Unknown bounds
    /// do not constrain.
    pub fn accepts(&self, target: f64) -> bool {
        self.min.is_none_or(|min| target >= min) && self.max.is_none_or(|max| target <= max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToggleControl {
    pub name: String,
    pub zone_id: Option<i64>,
    pub zone_position: Option<String>,
    pub value: bool,
}

/// Select-style control (BioFresh-Plus, HydroBreeze, generic modes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeControl {
    pub name: String,
    pub zone_id: Option<i64>,
    pub current_mode: Option<String>,
    pub supported_modes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoDoorControl {
    pub name: String,
    pub zone_id: Option<i64>,
    /// Raw door state as reported, e.g. `OPEN`.
    pub value: Option<String>,
}

impl AutoDoorControl {
    pub fn state(&self) -> DoorState {
        self.value
            .as_deref()
            .map_or(DoorState::Unknown, DoorState::from_raw)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceMakerControl {
    pub name: String,
    pub zone_id: Option<i64>,
    pub ice_maker_mode: Option<String>,
    pub has_max_ice: Option<bool>,
}

/// A control reported by an appliance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Control {
    Temperature(TemperatureControl),
    Toggle(ToggleControl),
    Mode(ModeControl),
    AutoDoor(AutoDoorControl),
    IceMaker(IceMakerControl),
}

impl Control {
    pub fn name(&self) -> &str {
        match self {
            Self::Temperature(c) => &c.name,
            Self::Toggle(c) => &c.name,
            Self::Mode(c) => &c.name,
            Self::AutoDoor(c) => &c.name,
            Self::IceMaker(c) => &c.name,
        }
    }

    pub fn zone_id(&self) -> Option<i64> {
        match self {
            Self::Temperature(c) => Some(c.zone_id),
            Self::Toggle(c) => c.zone_id,
            Self::Mode(c) => c.zone_id,
            Self::AutoDoor(c) => c.zone_id,
            Self::IceMaker(c) => c.zone_id,
        }
    }

    pub fn key(&self) -> ControlKey {
        ControlKey::new(self.name(), self.zone_id())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Temperature(_) => "temperature",
            Self::Toggle(_) => "toggle",
            Self::Mode(_) => "mode",
            Self::AutoDoor(_) => "auto_door",
            Self::IceMaker(_) => "ice_maker",
        }
    }

    /// Short human-readable state, for listings.
    pub fn summary(&self) -> String {
        match self {
            Self::Temperature(c) => {
                let fmt_opt = |v: Option<f64>| v.map_or_else(|| "?".to_owned(), |v| format!("{v}"));
                format!(
                    "{}{unit} (target {}{unit})",
                    fmt_opt(c.value),
                    fmt_opt(c.target),
                    unit = c.unit
                )
            }
            Self::Toggle(c) => if c.value { "on" } else { "off" }.to_owned(),
            Self::Mode(c) => c.current_mode.clone().unwrap_or_else(|| "?".to_owned()),
            Self::AutoDoor(c) => c.state().to_string(),
            Self::IceMaker(c) => c.ice_maker_mode.clone().unwrap_or_else(|| "?".to_owned()),
        }
    }
}

/// Door position as seen by the appliance.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DoorState {
    Open,
    Closed,
    /// The motor is moving the door.
    Opening,
    #[default]
    Unknown,
}

impl DoorState {
    /// Vendor values: `OPEN`, `CLOSED`, `MOVING`. Anything else is unknown.
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "OPEN" => Self::Open,
            "CLOSED" => Self::Closed,
            "MOVING" => Self::Opening,
            _ => Self::Unknown,
        }
    }
}
