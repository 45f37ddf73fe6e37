//! Appliance command handlers.

use tabled::Tabled;

use smartdevice_core::{Account, AccountConfig, Appliance};

use crate::cli::{AppliancesArgs, AppliancesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{Output, Status};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ApplianceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Online")]
    online: String,
    #[tabled(rename = "Controls")]
    controls: usize,
}

impl ApplianceRow {
    fn new(a: &Appliance, out: &Output) -> Self {
        let online = if a.available {
            out.paint("yes", Status::Active)
        } else {
            out.paint("no", Status::Alarm)
        };
        Self {
            id: a.device_id.clone(),
            name: a.nickname.clone(),
            model: a.model.clone(),
            kind: a.appliance_type.to_string(),
            online,
            controls: a.controls.len(),
        }
    }
}

fn detail(a: &Appliance) -> String {
    let mut lines = vec![
        format!("ID:       {}", a.device_id),
        format!("Name:     {}", a.nickname),
        format!("Model:    {}", a.model),
        format!("Type:     {}", a.appliance_type),
        format!("Online:   {}", if a.available { "yes" } else { "no" }),
        format!("Image:    {}", util::or_dash(a.image.as_deref())),
    ];
    if !a.capabilities.is_empty() {
        lines.push(format!("Features: {}", a.capabilities.join(", ")));
    }
    if !a.controls.is_empty() {
        lines.push("Controls:".into());
        for c in &a.controls {
            lines.push(format!("  {:<24} {}", c.key().to_string(), c.summary()));
        }
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    config: AccountConfig,
    args: AppliancesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshot = Account::oneshot(config, |account| async move { Ok(account.snapshot()) }).await?;
    let out = Output::new(global);

    let rendered = match args.command {
        AppliancesCommand::List => out.list(
            &snapshot.appliances,
            |a| ApplianceRow::new(a, &out),
            |a| a.device_id.clone(),
        ),
        AppliancesCommand::Get { device_id } => {
            let appliance = util::find_appliance(&snapshot, &device_id)?;
            out.single(appliance, detail, |a| a.device_id.clone())
        }
    };
    out.emit(&rendered);
    Ok(())
}
