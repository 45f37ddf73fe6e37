// ── Command API ──
//
// All writes flow through a single `Command` enum. The account's command
// processor validates each one against the current snapshot and turns it
// into exactly one vendor call. Commands never touch the snapshot; the
// new value shows up on the next poll.

use tokio::sync::oneshot;

use smartdevice_api::ControlRequest;

use crate::error::CoreError;
use crate::model::{Control, ControlKey, Snapshot};

/// Control name the vendor uses for every temperature zone.
pub const TEMPERATURE_CONTROL: &str = "temperature";

const DEFAULT_UNIT: &str = "°C";

/// A command envelope sent through the command channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: oneshot::Sender<Result<(), CoreError>>,
}

/// All write operations against an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set the target temperature of one zone. `unit` defaults to the
    /// zone's reported unit.
    SetTemperature {
        device_id: String,
        zone_id: i64,
        target: i64,
        unit: Option<String>,
    },
    SetToggle {
        device_id: String,
        control: String,
        zone_id: Option<i64>,
        value: bool,
    },
    SetMode {
        device_id: String,
        control: String,
        zone_id: Option<i64>,
        mode: String,
    },
    /// `open: true` opens the door.
    SetAutoDoor {
        device_id: String,
        control: String,
        zone_id: Option<i64>,
        open: bool,
    },
    SetIceMaker {
        device_id: String,
        control: String,
        zone_id: Option<i64>,
        mode: String,
    },
    AcknowledgeNotification {
        device_id: String,
        notification_id: String,
    },
}

/// The single vendor call a command resolves to.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Route {
    Control {
        device_id: String,
        control_name: String,
        request: ControlRequest,
    },
    Acknowledge {
        device_id: String,
        notification_id: String,
    },
}

impl Command {
    pub fn device_id(&self) -> &str {
        match self {
            Self::SetTemperature { device_id, .. }
            | Self::SetToggle { device_id, .. }
            | Self::SetMode { device_id, .. }
            | Self::SetAutoDoor { device_id, .. }
            | Self::SetIceMaker { device_id, .. }
            | Self::AcknowledgeNotification { device_id, .. } => device_id,
        }
    }

    /// Identity of the targeted control, if the command targets one.
    pub fn control_key(&self) -> Option<ControlKey> {
        match self {
            Self::SetTemperature { zone_id, .. } => {
                Some(ControlKey::new(TEMPERATURE_CONTROL, Some(*zone_id)))
            }
            Self::SetToggle {
                control, zone_id, ..
            }
            | Self::SetMode {
                control, zone_id, ..
            }
            | Self::SetAutoDoor {
                control, zone_id, ..
            }
            | Self::SetIceMaker {
                control, zone_id, ..
            } => Some(ControlKey::new(control.clone(), *zone_id)),
            Self::AcknowledgeNotification { .. } => None,
        }
    }

    /// Validate against `snapshot` and resolve the vendor call.
    ///
    /// Checks only apply when the targeted control is present; a command
    /// for a control the last poll did not see is sent as-is.
    pub(crate) fn prepare(self, snapshot: &Snapshot) -> Result<Route, CoreError> {
        let current = self
            .control_key()
            .and_then(|key| lookup(snapshot, self.device_id(), &key));

        match self {
            Self::SetTemperature {
                device_id,
                zone_id,
                target,
                unit,
            } => {
                let zone = snapshot
                    .appliance(&device_id)
                    .and_then(|a| a.temperature_zone(zone_id));
                if let Some(zone) = zone {
                    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
                    let requested = target as f64;
                    if !zone.accepts(requested) {
                        return Err(CoreError::ValidationFailed {
                            message: format!(
                                "{target} is outside {}..{} for zone {zone_id}",
                                bound(zone.min),
                                bound(zone.max)
                            ),
                        });
                    }
                }
                let unit = unit
                    .or_else(|| zone.map(|z| z.unit.clone()))
                    .unwrap_or_else(|| DEFAULT_UNIT.to_owned());
                Ok(Route::Control {
                    device_id,
                    control_name: TEMPERATURE_CONTROL.to_owned(),
                    request: ControlRequest::Temperature {
                        zone_id: Some(zone_id),
                        target,
                        unit,
                    },
                })
            }
            Self::SetToggle {
                device_id,
                control,
                zone_id,
                value,
            } => {
                expect_kind(current, "toggle", &control)?;
                Ok(Route::Control {
                    device_id,
                    control_name: control,
                    request: ControlRequest::Toggle { zone_id, value },
                })
            }
            Self::SetMode {
                device_id,
                control,
                zone_id,
                mode,
            } => {
                expect_kind(current, "mode", &control)?;
                if let Some(Control::Mode(m)) = current {
                    if !m.supported_modes.is_empty() && !m.supported_modes.contains(&mode) {
                        return Err(CoreError::ValidationFailed {
                            message: format!(
                                "mode '{mode}' is not supported by {control} (expected one of: {})",
                                m.supported_modes.join(", ")
                            ),
                        });
                    }
                }
                Ok(Route::Control {
                    device_id,
                    control_name: control,
                    request: ControlRequest::Mode { zone_id, mode },
                })
            }
            Self::SetAutoDoor {
                device_id,
                control,
                zone_id,
                open,
            } => {
                expect_kind(current, "auto_door", &control)?;
                Ok(Route::Control {
                    device_id,
                    control_name: control,
                    request: ControlRequest::AutoDoor {
                        zone_id,
                        value: open,
                    },
                })
            }
            Self::SetIceMaker {
                device_id,
                control,
                zone_id,
                mode,
            } => {
                expect_kind(current, "ice_maker", &control)?;
                Ok(Route::Control {
                    device_id,
                    control_name: control,
                    request: ControlRequest::IceMaker {
                        zone_id,
                        ice_maker_mode: mode,
                    },
                })
            }
            Self::AcknowledgeNotification {
                device_id,
                notification_id,
            } => Ok(Route::Acknowledge {
                device_id,
                notification_id,
            }),
        }
    }
}

fn lookup<'a>(snapshot: &'a Snapshot, device_id: &str, key: &ControlKey) -> Option<&'a Control> {
    snapshot.control(device_id, key)
}

fn expect_kind(current: Option<&Control>, kind: &str, control: &str) -> Result<(), CoreError> {
    match current {
        Some(c) if c.kind() != kind => Err(CoreError::ValidationFailed {
            message: format!("{control} is a {} control, not {kind}", c.kind()),
        }),
        _ => Ok(()),
    }
}

fn bound(value: Option<f64>) -> String {
    value.map_or_else(|| "?".to_owned(), |v| v.to_string())
}
