//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::time::Duration;

use smartdevice_core::{Account, AccountConfig, Appliance, Control, CoreError, Snapshot};

use crate::error::CliError;

/// Set up an account without background polling, run `f`, unload.
///
/// Like `Account::oneshot`, for handlers whose work fails with CLI errors.
pub async fn with_account<F, Fut, T>(mut config: AccountConfig, f: F) -> Result<T, CliError>
where
    F: FnOnce(Account) -> Fut,
    Fut: Future<Output = Result<T, CliError>>,
{
    config.poll_interval = Duration::ZERO;
    let account = Account::new(config);
    account.setup().await?;
    let result = f(account.clone()).await;
    account.unload().await;
    result
}

/// Look up an appliance in a snapshot, with a CLI-friendly error.
pub fn find_appliance<'a>(snapshot: &'a Snapshot, device_id: &str) -> Result<&'a Appliance, CliError> {
    snapshot.appliance(device_id).ok_or_else(|| {
        CoreError::ApplianceNotFound {
            device_id: device_id.into(),
        }
        .into()
    })
}

/// Name of the first control of `kind` on an appliance, for commands
/// where `--control` was omitted.
pub fn first_control_named(appliance: &Appliance, kind: &str) -> Result<String, CliError> {
    appliance
        .controls
        .iter()
        .find(|c| c.kind() == kind)
        .map(|c| c.name().to_owned())
        .ok_or_else(|| CliError::NotFound {
            resource_type: format!("{kind} control on"),
            identifier: appliance.device_id.clone(),
            list_command: format!("controls list {}", appliance.device_id),
        })
}

/// Zone of the first control named `name`, if the caller did not pass one.
pub fn default_zone(appliance: &Appliance, name: &str, zone: Option<i64>) -> Option<i64> {
    zone.or_else(|| {
        appliance
            .controls
            .iter()
            .find(|c| c.name() == name)
            .and_then(Control::zone_id)
    })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to ask on, `--yes` is required.
pub fn confirm(action: &str, message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Dash for absent values in detail views.
pub fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}
