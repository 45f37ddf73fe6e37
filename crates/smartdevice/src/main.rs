mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Crates whose events `-v` turns up; HTTP internals stay at `warn`.
const LOG_TARGETS: [&str; 3] = ["smartdevice", "smartdevice_core", "smartdevice_api"];

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    };
    let directives = level.map_or_else(
        || "warn".to_owned(),
        |level| {
            LOG_TARGETS
                .iter()
                .fold(String::from("warn"), |acc, target| format!("{acc},{target}={level}"))
        },
    );

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_owned();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Local file operations; no account needed.
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),
        Command::Completions(args) => {
            print_completions(args.shell);
            Ok(())
        }

        cmd => {
            let account_config = config::build_account_config(&cli.global)?;
            tracing::debug!(
                api_url = %account_config.api_url,
                command = ?cmd,
                "dispatching command"
            );
            commands::dispatch(cmd, account_config, &cli.global).await
        }
    }
}
