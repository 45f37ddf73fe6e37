//! `watch`: keep an account running and print every change it sees.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::Serialize;

use smartdevice_core::{Account, AccountConfig, ControlKey, DoorState, Snapshot};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output::{Output, Status};

const FALLBACK_INTERVAL: Duration = Duration::from_secs(10);

/// One observed change.
#[derive(Debug, Serialize, PartialEq, Eq)]
struct Change {
    device_id: String,
    control: String,
    from: Option<String>,
    to: Option<String>,
}

type StateMap = HashMap<(String, ControlKey), String>;

fn states(snapshot: &Snapshot, device: Option<&str>) -> StateMap {
    snapshot
        .appliances
        .iter()
        .filter(|a| device.is_none_or(|d| a.device_id == d))
        .flat_map(|a| {
            a.controls
                .iter()
                .map(|c| ((a.device_id.clone(), c.key()), c.summary()))
        })
        .collect()
}

fn diff(before: &StateMap, after: &StateMap) -> Vec<Change> {
    let mut changes: Vec<Change> = after
        .iter()
        .filter(|(k, v)| before.get(*k) != Some(*v))
        .map(|((device_id, key), v)| Change {
            device_id: device_id.clone(),
            control: key.to_string(),
            from: before.get(&(device_id.clone(), key.clone())).cloned(),
            to: Some(v.clone()),
        })
        .chain(
            before
                .iter()
                .filter(|(k, _)| !after.contains_key(*k))
                .map(|((device_id, key), v)| Change {
                    device_id: device_id.clone(),
                    control: key.to_string(),
                    from: Some(v.clone()),
                    to: None,
                }),
        )
        .collect();
    changes.sort_by(|a, b| (&a.device_id, &a.control).cmp(&(&b.device_id, &b.control)));
    changes
}

fn print_change(change: &Change, at: DateTime<Local>, out: &Output) {
    let line = out.event(change, || {
        let from = change.from.as_deref().unwrap_or("-");
        let to = change
            .to
            .as_deref()
            .map_or_else(|| out.paint("gone", Status::Inactive), str::to_owned);
        format!(
            "{} {} {}: {from} -> {to}",
            at.format("%H:%M:%S"),
            change.device_id,
            change.control
        )
    });
    out.emit(&line);
}

pub async fn handle(
    mut config: AccountConfig,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let WatchArgs { interval, device } = args;
    if let Some(ref raw) = interval {
        config.poll_interval = humantime::parse_duration(raw).map_err(|e| CliError::Validation {
            field: "interval".into(),
            reason: e.to_string(),
        })?;
    }
    if config.poll_interval.is_zero() {
        config.poll_interval = FALLBACK_INTERVAL;
    }
    let every = config.poll_interval;

    let account = Account::new(config);
    account.setup().await?;
    if !global.quiet {
        eprintln!(
            "Watching {} appliance(s) every {}. Ctrl-C to stop.",
            account.snapshot().appliances.len(),
            humantime::format_duration(every)
        );
    }

    let out = Output::new(global);
    let device = device.as_deref();
    let mut stream = account.subscribe();
    let mut last = states(stream.current(), device);
    let mut doors: HashMap<(String, ControlKey), DoorState> = HashMap::new();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            next = stream.changed() => {
                let Some(snapshot) = next else { break };
                let now = states(&snapshot, device);
                for change in diff(&last, &now) {
                    print_change(&change, Local::now(), &out);
                }
                last = now;

                let watched = snapshot
                    .appliances
                    .iter()
                    .filter(|a| device.is_none_or(|d| a.device_id == d));
                for appliance in watched {
                    for door in appliance.doors() {
                        let key = ControlKey::new(door.name.clone(), door.zone_id);
                        let confirmed = account.door_state(&appliance.device_id, &key).await;
                        let id = (appliance.device_id.clone(), key);
                        let previous = doors.insert(id.clone(), confirmed);
                        if previous != Some(confirmed) && confirmed != DoorState::Unknown {
                            tracing::debug!(
                                device_id = %id.0,
                                door = %id.1,
                                state = %confirmed,
                                "door state confirmed"
                            );
                            let change = Change {
                                device_id: id.0,
                                control: format!("{} (confirmed)", id.1),
                                from: previous.as_ref().map(ToString::to_string),
                                to: Some(confirmed.to_string()),
                            };
                            print_change(&change, Local::now(), &out);
                        }
                    }
                }
            }
        }
    }

    account.unload().await;
    Ok(())
}
