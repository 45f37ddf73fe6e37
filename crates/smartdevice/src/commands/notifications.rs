//! Notification command handlers.

use tabled::Tabled;

use smartdevice_core::{Account, AccountConfig, Command as CoreCommand, Notification};

use crate::cli::{GlobalOpts, NotificationsArgs, NotificationsCommand};
use crate::error::CliError;
use crate::output::{Output, Status};

#[derive(Tabled)]
struct NotificationRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Appliance")]
    device: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl NotificationRow {
    fn new(n: &Notification, out: &Output) -> Self {
        let status = if n.kind.is_alarm() {
            Status::Alarm
        } else {
            Status::Attention
        };
        Self {
            id: n.notification_id.clone(),
            device: n.device_id.clone(),
            kind: out.paint(n.kind.as_str(), status),
            created: n
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}

pub async fn handle(
    mut config: AccountConfig,
    args: NotificationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        NotificationsCommand::List { device } => {
            // Listing is explicit, so fetch even when the profile leaves
            // notifications off.
            config.notifications.enabled = true;
            let snapshot =
                Account::oneshot(config, |account| async move { Ok(account.snapshot()) }).await?;

            let items: Vec<Notification> = snapshot
                .notifications
                .iter()
                .filter(|n| device.as_deref().is_none_or(|d| n.device_id == d))
                .cloned()
                .collect();

            let out = Output::new(global);
            let rendered = out.list(
                &items,
                |n| NotificationRow::new(n, &out),
                |n| n.notification_id.clone(),
            );
            out.emit(&rendered);
            Ok(())
        }

        NotificationsCommand::Ack {
            device_id,
            notification_id,
        } => {
            let cmd = CoreCommand::AcknowledgeNotification {
                device_id: device_id.clone(),
                notification_id: notification_id.clone(),
            };
            Account::oneshot(config, |account| async move { account.execute(cmd).await }).await?;
            if !global.quiet {
                eprintln!("✓ Acknowledged {notification_id} on {device_id}");
            }
            Ok(())
        }
    }
}
