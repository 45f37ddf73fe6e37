//! `login`: authenticate and fetch once to prove the credentials work.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use smartdevice_core::{Account, AccountConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::Output;

#[derive(Serialize)]
struct LoginReport {
    identity: String,
    api_url: String,
    appliances: usize,
    notifications: usize,
}

fn detail(r: &LoginReport) -> String {
    [
        format!("Logged in as: {}", r.identity),
        format!("Home API:     {}", r.api_url),
        format!("Appliances:   {}", r.appliances),
    ]
    .join("\n")
}

fn spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner} {msg}").expect("spinner template is valid"),
    );
    bar.set_message("Signing in...");
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

pub async fn handle(config: AccountConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let identity = config.credentials.display_identity();
    let api_url = config.api_url.to_string();

    let bar = spinner(global.quiet);
    let result = Account::oneshot(config, |account| async move { Ok(account.snapshot()) }).await;
    bar.finish_and_clear();
    let snapshot = result?;

    let report = LoginReport {
        identity,
        api_url,
        appliances: snapshot.appliances.len(),
        notifications: snapshot.notifications.len(),
    };
    let out = Output::new(global);
    out.emit(&out.single(&report, detail, |r| r.identity.clone()));
    Ok(())
}
