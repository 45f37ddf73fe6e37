// smartdevice-core: Account lifecycle, polling and command layer between smartdevice-api and consumers.

pub mod account;
pub mod command;
pub mod config;
pub mod convert;
pub mod door;
pub mod error;
pub mod model;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use account::{Account, AccountState, RefreshOutcome};
pub use command::Command;
pub use config::{
    AccountConfig, Availability, MIN_POLL_INTERVAL, NotificationSettings, TlsVerification,
};
pub use door::{DoorTracker, DoorWatcher};
pub use error::CoreError;
pub use store::SnapshotStore;
pub use stream::{SnapshotStream, SnapshotWatchStream};

pub use model::{
    Appliance, ApplianceType, AutoDoorControl, Control, ControlKey, DoorState, IceMakerControl,
    ModeControl, Notification, NotificationKind, Snapshot, TemperatureControl, ToggleControl,
};

// Types consumers need to build an `AccountConfig`.
pub use smartdevice_api::{AuthStage, Credentials, OAuthSettings};
