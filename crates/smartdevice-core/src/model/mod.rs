// ── Domain model ──
//
// Types consumers read out of a `Snapshot`. None of them carry wire
// details; `convert` builds them from the API responses.

pub mod appliance;
pub mod control;
pub mod notification;
pub mod snapshot;

pub use appliance::{Appliance, ApplianceType};
pub use control::{
    AutoDoorControl, Control, ControlKey, DoorState, IceMakerControl, ModeControl,
    TemperatureControl, ToggleControl,
};
pub use notification::{Notification, NotificationKind};
pub use snapshot::Snapshot;
