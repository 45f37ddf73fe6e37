//! Config subcommand handlers.

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, SecretArg};
use crate::config::{self, Config, Profile, SecretKind};
use crate::error::CliError;
use crate::output::Output;

const REDACTED: &str = "********";

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_secret(label: &str, field: &str) -> Result<String, CliError> {
    let secret = rpassword::prompt_password(label).map_err(prompt_err)?;
    if secret.is_empty() {
        return Err(CliError::Validation {
            field: field.into(),
            reason: "value cannot be empty".into(),
        });
    }
    Ok(secret)
}

/// Ask where a secret goes. `Some` means "write it to the config file".
fn place_secret(
    profile_name: &str,
    kind: SecretKind,
    secret: String,
) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store it?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        config::store_secret(profile_name, kind, &secret)?;
        eprintln!("   ✓ Stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(secret))
    }
}

/// Copy of the config with plaintext secrets masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.api_key.is_some() {
            profile.api_key = Some(REDACTED.into());
        }
        if profile.password.is_some() {
            profile.password = Some(REDACTED.into());
        }
    }
    cfg
}

// ── Wizard ──────────────────────────────────────────────────────────

fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("SmartDevice CLI configuration");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let auth_choices = &["API key from the vendor app (recommended)", "Account e-mail and password"];
    let auth_selection = Select::new()
        .with_prompt("Authentication method")
        .items(auth_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let mut profile = Profile::default();
    if auth_selection == 0 {
        let key = prompt_secret("API key: ", "api_key")?;
        profile.api_key = place_secret(&profile_name, SecretKind::ApiKey, key)?;
    } else {
        let user: String = Input::new()
            .with_prompt("E-mail")
            .interact_text()
            .map_err(prompt_err)?;
        if user.trim().is_empty() {
            return Err(CliError::Validation {
                field: "username".into(),
                reason: "cannot be empty".into(),
            });
        }
        let pass = prompt_secret("Password: ", "password")?;
        profile.auth_mode = "password".into();
        profile.username = Some(user);
        profile.password = place_secret(&profile_name, SecretKind::Password, pass)?;
    }

    let poll: u64 = Input::new()
        .with_prompt("Poll interval in seconds (0 disables)")
        .default(10)
        .interact_text()
        .map_err(prompt_err)?;
    profile.poll_interval = Some(poll);

    // Keep other profiles when re-running the wizard.
    let mut cfg = config::load_config_or_default();
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());

    let path = config::save_config(&cfg)?;
    eprintln!("\n✓ Configuration written to {}", path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: smartdevice login");
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = Output::new(global);
            out.emit(&out.single(
                &cfg,
                |c| format!("{c:#?}"),
                |c| config::active_profile_name(global, c),
            ));
            Ok(())
        }

        ConfigCommand::SetSecret { kind } => {
            let cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: config::available_profiles(&cfg),
                });
            }

            let (kind, label) = match kind {
                SecretArg::ApiKey => (SecretKind::ApiKey, "API key: "),
                SecretArg::Password => (SecretKind::Password, "Password: "),
            };
            let secret = prompt_secret(label, "secret")?;
            config::store_secret(&profile_name, kind, &secret)?;

            eprintln!("✓ Secret stored in system keyring for profile '{profile_name}'");
            Ok(())
        }

        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
    }
}
