//! Control mutation handlers.

use smartdevice_core::{Account, AccountConfig, Command as CoreCommand, Control, ControlKey};

use crate::cli::{DoorAction, GlobalOpts, SetArgs, SetCommand, Switch};
use crate::error::CliError;

use super::util;

/// Control kinds used to pick a default control name.
const DOOR_KIND: &str = "auto_door";
const ICE_MAKER_KIND: &str = "ice_maker";

pub async fn handle(config: AccountConfig, args: SetArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let wait = args.wait;
    let yes = global.yes;
    let quiet = global.quiet;

    util::with_account(config, |account| async move {
        let cmd = build_command(&account, args.command, yes)?;
        let device_id = cmd.device_id().to_owned();
        let key = cmd.control_key();

        if wait {
            account.execute_and_refresh(cmd).await?;
        } else {
            account.execute(cmd).await?;
        }

        if !quiet {
            report(&account, &device_id, key.as_ref(), wait);
        }
        Ok(())
    })
    .await
}

/// Translate CLI arguments into a core command, filling in defaults from
/// the snapshot.
fn build_command(account: &Account, cmd: SetCommand, yes: bool) -> Result<CoreCommand, CliError> {
    let snapshot = account.snapshot();

    Ok(match cmd {
        SetCommand::Temperature {
            device_id,
            target,
            zone,
            unit,
        } => CoreCommand::SetTemperature {
            device_id,
            zone_id: zone,
            target,
            unit,
        },

        SetCommand::Toggle {
            device_id,
            control,
            state,
            zone,
        } => {
            let appliance = util::find_appliance(&snapshot, &device_id)?;
            CoreCommand::SetToggle {
                zone_id: util::default_zone(appliance, &control, zone),
                device_id,
                control,
                value: matches!(state, Switch::On),
            }
        }

        SetCommand::Mode {
            device_id,
            control,
            mode,
            zone,
        } => {
            let appliance = util::find_appliance(&snapshot, &device_id)?;
            CoreCommand::SetMode {
                zone_id: util::default_zone(appliance, &control, zone),
                device_id,
                control,
                mode,
            }
        }

        SetCommand::Door {
            device_id,
            action,
            control,
            zone,
        } => {
            let appliance = util::find_appliance(&snapshot, &device_id)?;
            let control = match control {
                Some(name) => name,
                None => util::first_control_named(appliance, DOOR_KIND)?,
            };
            let open = matches!(action, DoorAction::Open);
            if open
                && !util::confirm(
                    "door open",
                    &format!("Open the door of '{}'?", appliance.nickname),
                    yes,
                )?
            {
                return Err(CliError::Validation {
                    field: "confirmation".into(),
                    reason: "aborted".into(),
                });
            }
            CoreCommand::SetAutoDoor {
                zone_id: util::default_zone(appliance, &control, zone),
                device_id,
                control,
                open,
            }
        }

        SetCommand::Icemaker {
            device_id,
            mode,
            control,
            zone,
        } => {
            let appliance = util::find_appliance(&snapshot, &device_id)?;
            let control = match control {
                Some(name) => name,
                None => util::first_control_named(appliance, ICE_MAKER_KIND)?,
            };
            CoreCommand::SetIceMaker {
                zone_id: util::default_zone(appliance, &control, zone),
                device_id,
                control,
                mode: mode.as_api_str().to_owned(),
            }
        }
    })
}

fn report(account: &Account, device_id: &str, key: Option<&ControlKey>, refreshed: bool) {
    let Some(key) = key else {
        return;
    };
    if !refreshed {
        eprintln!("✓ Sent {key} to {device_id}");
        return;
    }
    let state = account
        .snapshot()
        .control(device_id, key)
        .map_or_else(|| "not reported".to_owned(), Control::summary);
    eprintln!("✓ {device_id} {key}: {state}");
}
