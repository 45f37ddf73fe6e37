//! Control listing.

use tabled::Tabled;

use smartdevice_core::{Account, AccountConfig, Control, DoorState};

use crate::cli::{ControlsArgs, ControlsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{Output, Status};

use super::util;

#[derive(Tabled)]
struct ControlRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Zone")]
    zone: String,
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "State")]
    state: String,
}

impl ControlRow {
    fn new(c: &Control, out: &Output) -> Self {
        let summary = c.summary();
        let state = match c {
            Control::AutoDoor(d) => match d.state() {
                DoorState::Open | DoorState::Opening => out.paint(&summary, Status::Attention),
                DoorState::Closed => summary,
                DoorState::Unknown => out.paint(&summary, Status::Inactive),
            },
            Control::Toggle(t) if t.value => out.paint(&summary, Status::Active),
            _ => summary,
        };
        Self {
            name: c.name().to_owned(),
            zone: c.zone_id().as_ref().map(ToString::to_string).unwrap_or_default(),
            kind: c.kind(),
            state,
        }
    }
}

pub async fn handle(
    config: AccountConfig,
    args: ControlsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let ControlsCommand::List { device_id } = args.command;

    let snapshot = Account::oneshot(config, |account| async move { Ok(account.snapshot()) }).await?;
    let appliance = util::find_appliance(&snapshot, &device_id)?;
    let out = Output::new(global);

    let rendered = out.list(
        &appliance.controls,
        |c| ControlRow::new(c, &out),
        |c| c.key().to_string(),
    );
    out.emit(&rendered);
    Ok(())
}
