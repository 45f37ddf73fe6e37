//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use smartdevice_config::ConfigError;
use smartdevice_core::{AuthStage, CoreError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the cloud service")]
    #[diagnostic(
        code(smartdevice::connection_failed),
        help(
            "Check your network connection and the api_url in your profile.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(smartdevice::timeout),
        help("Increase the timeout with --timeout or in your profile.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed at step '{stage}': {message}")]
    #[diagnostic(
        code(smartdevice::auth_failed),
        help(
            "Verify your username and password.\n\
             Store a new password with: smartdevice config set-secret password"
        )
    )]
    AuthFailed { stage: String, message: String },

    #[error("The Home API rejected the credentials")]
    #[diagnostic(
        code(smartdevice::unauthorized),
        help(
            "The API key may have been revoked. Create a new one in the vendor app\n\
             and store it with: smartdevice config set-secret api-key"
        )
    )]
    Unauthorized,

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(smartdevice::no_credentials),
        help(
            "Configure credentials with: smartdevice config init\n\
             Or set the SMARTDEVICE_API_KEY environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(smartdevice::not_found),
        help("Run: smartdevice {list_command}")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Home API error: {message}")]
    #[diagnostic(code(smartdevice::api_error))]
    Api {
        message: String,
        status: Option<u16>,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(smartdevice::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(smartdevice::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: smartdevice config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration file not found")]
    #[diagnostic(
        code(smartdevice::no_config),
        help(
            "Create one with: smartdevice config init\n\
             Or pass --api-key. Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(smartdevice::config))]
    Config(Box<figment::Error>),

    #[error("Keyring error: {message}")]
    #[diagnostic(
        code(smartdevice::keyring),
        help("Put the secret in the profile or an environment variable instead.")
    )]
    Keyring { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(smartdevice::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("{0}")]
    #[diagnostic(code(smartdevice::internal))]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::Unauthorized | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. }
            | Self::ProfileNotFound { .. }
            | Self::Api {
                status: Some(404), ..
            } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError ─────────────────────────────────────────────

fn stage_label(stage: Option<AuthStage>) -> String {
    stage.as_ref().map_or_else(|| "unknown".into(), ToString::to_string)
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let stage = err.auth_stage();
        match err {
            CoreError::AuthPage { message }
            | CoreError::Login { message }
            | CoreError::AuthorizationCode { message }
            | CoreError::TokenExchange { message } => CliError::AuthFailed {
                stage: stage_label(stage),
                message,
            },

            CoreError::Unauthorized => CliError::Unauthorized,

            CoreError::Fetch { message, status } | CoreError::Command { message, status } => {
                CliError::Api { message, status }
            }

            CoreError::Timeout => CliError::Timeout,

            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed { reason },

            CoreError::ApplianceNotFound { device_id } => CliError::NotFound {
                resource_type: "appliance".into(),
                identifier: device_id,
                list_command: "appliances list".into(),
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::AccountNotRunning => {
                CliError::Internal("account stopped before the command completed".into())
            }

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError ───────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: "(see `smartdevice config show`)".into(),
            },
            ConfigError::Keyring(e) => CliError::Keyring {
                message: e.to_string(),
            },
            ConfigError::Serialization(e) => CliError::Internal(e.to_string()),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}
