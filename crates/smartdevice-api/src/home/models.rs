// Home API wire types
//
// Response shapes for `devices`, `devices/{id}/controls` and
// `notifications`, plus the request bodies for control mutations. Fields
// default liberally because appliance generations report different
// subsets; anything unmodelled lands in `extra`.

use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Devices ──────────────────────────────────────────────────────────

/// One entry of `GET devices`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceResponse {
    pub device_id: String,
    /// Model designation, e.g. `"CBNbsd 576i"`.
    pub device_name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    /// `FRIDGE`, `FREEZER`, `COMBI`, `WINE`, or a newer value.
    #[serde(default)]
    pub device_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub capabilities: Vec<String>,
    /// Only some API revisions report connectivity.
    #[serde(default)]
    pub connected: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Controls ─────────────────────────────────────────────────────────

/// One entry of `GET devices/{id}/controls`.
///
/// The endpoint returns a heterogeneous list discriminated by `type`.
/// Every type-specific field is optional here; the core decides which
/// variant a control becomes and drops what it does not recognise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlResponse {
    #[serde(rename = "type")]
    pub control_type: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Some select-style controls carry an `identifier` instead of a name.
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub zone_id: Option<i64>,
    /// `top`, `middle`, `bottom`.
    #[serde(default)]
    pub zone_position: Option<String>,
    /// Current reading for temperatures, on/off for toggles, raw door
    /// state string for auto doors.
    #[serde(default)]
    pub value: Option<serde_json::Value>,
    #[serde(default)]
    pub target: Option<f64>,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub current_mode: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub supported_modes: Vec<String>,
    #[serde(default)]
    pub ice_maker_mode: Option<String>,
    #[serde(default)]
    pub has_max_ice: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body of `POST devices/{id}/controls/{name}`.
///
/// `zoneId` is omitted for appliance-wide controls.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ControlRequest {
    Temperature {
        #[serde(rename = "zoneId", skip_serializing_if = "Option::is_none")]
        zone_id: Option<i64>,
        target: i64,
        unit: String,
    },
    Toggle {
        #[serde(rename = "zoneId", skip_serializing_if = "Option::is_none")]
        zone_id: Option<i64>,
        value: bool,
    },
    Mode {
        #[serde(rename = "zoneId", skip_serializing_if = "Option::is_none")]
        zone_id: Option<i64>,
        mode: String,
    },
    /// `value: true` opens the door, `false` closes it.
    AutoDoor {
        #[serde(rename = "zoneId", skip_serializing_if = "Option::is_none")]
        zone_id: Option<i64>,
        value: bool,
    },
    IceMaker {
        #[serde(rename = "zoneId", skip_serializing_if = "Option::is_none")]
        zone_id: Option<i64>,
        #[serde(rename = "iceMakerMode")]
        ice_maker_mode: String,
    },
}

// ── Notifications ────────────────────────────────────────────────────

/// One entry of `GET notifications`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub notification_id: String,
    pub device_id: String,
    /// `door_alarm`, `air_filter_reminder`, ...
    #[serde(default)]
    pub notification_type: String,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub is_acknowledged: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AcknowledgeRequest {
    pub is_acknowledged: bool,
}
