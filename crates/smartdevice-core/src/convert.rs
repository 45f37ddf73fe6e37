// ── API-to-domain type conversions ──
//
// Bridges raw `smartdevice_api` response types into `smartdevice_core::model`
// types. Controls are matched on their vendor `type`; anything unknown or
// missing a required field is dropped here and never reaches a snapshot.

use tracing::debug;

use smartdevice_api::{ControlResponse, DeviceResponse, NotificationResponse};

use crate::config::{Availability, NotificationSettings};
use crate::model::{
    Appliance, ApplianceType, AutoDoorControl, Control, IceMakerControl, ModeControl,
    Notification, NotificationKind, TemperatureControl, ToggleControl,
};

/// HydroBreeze controls may omit their mode list.
const HYDROBREEZE_MODES: &[&str] = &["OFF", "LOW", "MEDIUM", "HIGH"];

const DEFAULT_UNIT: &str = "°C";

// ── Appliance ──────────────────────────────────────────────────────

/// Build an appliance from its list entry and its raw control list.
pub fn appliance(
    device: DeviceResponse,
    controls: Vec<ControlResponse>,
    availability: Availability,
) -> Appliance {
    let available = match availability {
        Availability::Assume => true,
        Availability::Reported => device.connected.unwrap_or(true),
    };
    let controls = controls
        .into_iter()
        .filter_map(|raw| control(&device.device_id, raw))
        .collect();

    Appliance {
        nickname: device
            .nickname
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| device.device_name.clone()),
        model: device.device_name,
        image: device.image_url,
        appliance_type: ApplianceType::from_raw(&device.device_type),
        capabilities: device.capabilities,
        available,
        controls,
        device_id: device.device_id,
    }
}

// ── Control ────────────────────────────────────────────────────────

/// Convert one raw control. Returns `None` (and logs) for types this
/// crate does not model.
pub fn control(device_id: &str, raw: ControlResponse) -> Option<Control> {
    let kind = raw.control_type.to_ascii_lowercase();
    let name = raw
        .name
        .clone()
        .or_else(|| raw.identifier.clone())
        .unwrap_or_else(|| kind.clone());

    let converted = match kind.as_str() {
        "temperaturecontrol" => temperature(name, raw),
        "togglecontrol" => Some(Control::Toggle(ToggleControl {
            name,
            zone_id: raw.zone_id,
            zone_position: raw.zone_position,
            value: raw
                .value
                .as_ref()
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false),
        })),
        "modecontrol" | "biofreshpluscontrol" | "biofreshplus" | "hydrobreezecontrol"
        | "hydrobreeze" => {
            let mut supported_modes = raw.supported_modes;
            if supported_modes.is_empty() && kind.starts_with("hydrobreeze") {
                supported_modes = HYDROBREEZE_MODES.iter().map(|m| (*m).to_owned()).collect();
            }
            Some(Control::Mode(ModeControl {
                name,
                zone_id: raw.zone_id,
                current_mode: raw.current_mode,
                supported_modes,
            }))
        }
        "autodoorcontrol" | "autodoor" => Some(Control::AutoDoor(AutoDoorControl {
            name,
            zone_id: raw.zone_id,
            value: raw.value.as_ref().and_then(json_string),
        })),
        "icemakercontrol" | "icemaker" => Some(Control::IceMaker(IceMakerControl {
            name,
            zone_id: raw.zone_id,
            ice_maker_mode: raw
                .ice_maker_mode
                .or_else(|| raw.value.as_ref().and_then(json_string)),
            has_max_ice: raw.has_max_ice,
        })),
        _ => None,
    };

    if converted.is_none() {
        debug!(device_id, control_type = kind.as_str(), "dropping unsupported control");
    }
    converted
}

fn temperature(name: String, raw: ControlResponse) -> Option<Control> {
    let zone_id = raw.zone_id?;
    Some(Control::Temperature(TemperatureControl {
        name,
        zone_id,
        zone_position: raw.zone_position,
        value: raw.value.as_ref().and_then(serde_json::Value::as_f64),
        target: raw.target,
        min: raw.min,
        max: raw.max,
        unit: raw.unit.unwrap_or_else(|| DEFAULT_UNIT.to_owned()),
    }))
}

fn json_string(value: &serde_json::Value) -> Option<String> {
    value.as_str().map(String::from)
}

// ── Notification ───────────────────────────────────────────────────

impl From<NotificationResponse> for Notification {
    fn from(raw: NotificationResponse) -> Self {
        Self {
            kind: NotificationKind::from_raw(&raw.notification_type),
            notification_id: raw.notification_id,
            device_id: raw.device_id,
            created_at: raw.created_at,
            acknowledged: raw.is_acknowledged,
        }
    }
}

/// Keep unacknowledged notifications for the selected appliances.
pub fn notifications(
    raw: Vec<NotificationResponse>,
    settings: &NotificationSettings,
) -> Vec<Notification> {
    raw.into_iter()
        .filter(|n| !n.is_acknowledged && settings.wants(&n.device_id))
        .map(Notification::from)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn raw_control(value: serde_json::Value) -> ControlResponse {
        serde_json::from_value(value).unwrap()
    }

    fn raw_device(value: serde_json::Value) -> DeviceResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn temperature_control() {
        let c = control(
            "A",
            raw_control(json!({
                "type": "TemperatureControl",
                "name": "temperature",
                "zoneId": 1,
                "zonePosition": "bottom",
                "value": -18,
                "target": -18,
                "min": -26,
                "max": -14,
                "unit": "°C"
            })),
        )
        .unwrap();

        let Control::Temperature(t) = c else {
            panic!("expected temperature control");
        };
        assert_eq!(t.zone_id, 1);
        assert_eq!(t.value, Some(-18.0));
        assert_eq!(t.min, Some(-26.0));
        assert_eq!(t.zone_position.as_deref(), Some("bottom"));
    }

    #[test]
    fn temperature_without_zone_is_dropped() {
        let c = control(
            "A",
            raw_control(json!({ "type": "TemperatureControl", "name": "temperature" })),
        );
        assert_eq!(c, None);
    }

    #[test]
    fn unknown_type_is_dropped() {
        let c = control(
            "A",
            raw_control(json!({ "type": "BottleTimer", "name": "bottletimer" })),
        );
        assert_eq!(c, None);
    }

    #[test]
    fn select_controls_become_modes() {
        let bio = control(
            "A",
            raw_control(json!({
                "type": "BioFreshPlusControl",
                "name": "biofreshplus",
                "currentMode": "ZERO_ZERO",
                "supportedModes": ["ZERO_ZERO", "MINUS_TWO_ZERO"]
            })),
        )
        .unwrap();
        assert_eq!(bio.kind(), "mode");

        let hydro = control(
            "A",
            raw_control(json!({ "type": "hydrobreeze", "currentMode": "LOW" })),
        )
        .unwrap();
        let Control::Mode(m) = hydro else {
            panic!("expected mode control");
        };
        assert_eq!(m.name, "hydrobreeze");
        assert_eq!(m.supported_modes, vec!["OFF", "LOW", "MEDIUM", "HIGH"]);
    }

    #[test]
    fn auto_door_keeps_raw_state() {
        let c = control(
            "A",
            raw_control(json!({ "type": "AutoDoorControl", "name": "autodoor", "zoneId": 0, "value": "MOVING" })),
        )
        .unwrap();
        let Control::AutoDoor(d) = c else {
            panic!("expected auto door control");
        };
        assert_eq!(d.value.as_deref(), Some("MOVING"));
        assert_eq!(d.state(), crate::model::DoorState::Opening);
    }

    #[test]
    fn nickname_falls_back_to_model() {
        let a = appliance(
            raw_device(json!({ "deviceId": "A", "deviceName": "CBNbsd 576i", "deviceType": "COMBI" })),
            vec![],
            Availability::Assume,
        );
        assert_eq!(a.nickname, "CBNbsd 576i");
        assert_eq!(a.model, "CBNbsd 576i");
        assert_eq!(a.appliance_type, ApplianceType::Combi);
        assert!(a.available);
    }

    #[test]
    fn reported_availability_reads_connected_flag() {
        let device = raw_device(json!({
            "deviceId": "A", "deviceName": "X", "deviceType": "FRIDGE", "connected": false
        }));
        assert!(!appliance(device.clone(), vec![], Availability::Reported).available);
        assert!(appliance(device, vec![], Availability::Assume).available);
    }

    #[test]
    fn notifications_filtered_by_device_and_ack() {
        let raw: Vec<NotificationResponse> = serde_json::from_value(json!([
            { "notificationId": "1", "deviceId": "A", "notificationType": "door_alarm" },
            { "notificationId": "2", "deviceId": "A", "notificationType": "door_alarm", "isAcknowledged": true },
            { "notificationId": "3", "deviceId": "B", "notificationType": "air_filter_reminder" }
        ]))
        .unwrap();

        let only_a = NotificationSettings {
            enabled: true,
            devices: vec!["A".into()],
        };
        let kept = notifications(raw.clone(), &only_a);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].notification_id, "1");
        assert_eq!(kept[0].kind, NotificationKind::DoorAlarm);

        let all = NotificationSettings {
            enabled: true,
            devices: vec![],
        };
        assert_eq!(notifications(raw, &all).len(), 2);
    }
}
