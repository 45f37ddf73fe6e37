//! Command handlers, one module per top-level subcommand.

pub mod appliances;
pub mod config_cmd;
pub mod controls;
pub mod login;
pub mod notifications;
pub mod set;
pub mod util;
pub mod watch;

use smartdevice_core::AccountConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a command that needs an account to its handler.
pub async fn dispatch(
    cmd: Command,
    config: AccountConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Appliances(args) => appliances::handle(config, args, global).await,
        Command::Controls(args) => controls::handle(config, args, global).await,
        Command::Set(args) => set::handle(config, args, global).await,
        Command::Notifications(args) => notifications::handle(config, args, global).await,
        Command::Login => login::handle(config, global).await,
        Command::Watch(args) => watch::handle(config, args, global).await,
        Command::Config(_) | Command::Completions(_) => unreachable!("handled before dispatch"),
    }
}
