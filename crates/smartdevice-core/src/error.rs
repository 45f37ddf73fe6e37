// ── Core error types ──
//
// The single result type of smartdevice-core. Login-flow failures keep
// their step so callers can tell "wrong password" from "vendor changed
// the login page". Everything else from the transport collapses into
// `Fetch` (read side) or `Command` (write side).

use thiserror::Error;

use smartdevice_api::AuthStage;

#[derive(Debug, Error)]
pub enum CoreError {
    // ── Authentication (fatal to the attempt) ────────────────────────
    #[error("Authentication failed: login page unusable ({message})")]
    AuthPage { message: String },

    #[error("Authentication failed: {message}")]
    Login { message: String },

    #[error("Authentication failed: no authorization code ({message})")]
    AuthorizationCode { message: String },

    #[error("Authentication failed: token exchange ({message})")]
    TokenExchange { message: String },

    #[error("Credentials rejected by the Home API")]
    Unauthorized,

    // ── Data and commands (non-fatal) ────────────────────────────────
    #[error("Fetch failed: {message}")]
    Fetch {
        message: String,
        status: Option<u16>,
    },

    #[error("Command failed: {message}")]
    Command {
        message: String,
        status: Option<u16>,
    },

    #[error("Request timed out")]
    Timeout,

    #[error("Cannot reach the cloud service: {reason}")]
    ConnectionFailed { reason: String },

    // ── Lookup and validation ────────────────────────────────────────
    #[error("Appliance not found: {device_id}")]
    ApplianceNotFound { device_id: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("Account is not running -- call setup() first")]
    AccountNotRunning,

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The login step that failed, for authentication errors.
    pub fn auth_stage(&self) -> Option<AuthStage> {
        match self {
            Self::AuthPage { .. } => Some(AuthStage::Init),
            Self::Login { .. } => Some(AuthStage::GotLoginPage),
            Self::AuthorizationCode { .. } => Some(AuthStage::SubmittedLogin),
            Self::TokenExchange { .. } => Some(AuthStage::GotAuthCode),
            _ => None,
        }
    }

    pub fn is_auth(&self) -> bool {
        self.auth_stage().is_some() || matches!(self, Self::Unauthorized)
    }

    /// Re-label a read-side error as a command failure.
    pub(crate) fn into_command(self) -> Self {
        match self {
            Self::Fetch { message, status } => Self::Command { message, status },
            other => other,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<smartdevice_api::Error> for CoreError {
    fn from(err: smartdevice_api::Error) -> Self {
        use smartdevice_api::Error as Api;

        match err {
            Api::AuthPage { message } => Self::AuthPage { message },
            Api::Login { message } => Self::Login { message },
            Api::AuthorizationCode { message } => Self::AuthorizationCode { message },
            Api::TokenExchange { message } => Self::TokenExchange { message },
            Api::Unauthorized | Api::MissingToken => Self::Unauthorized,
            Api::Api { status, message } => Self::Fetch {
                message: format!("HTTP {status}: {message}"),
                status: Some(status),
            },
            Api::Transport(ref e) => {
                if e.is_timeout() {
                    Self::Timeout
                } else if e.is_connect() {
                    Self::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    Self::Fetch {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            Api::InvalidUrl(e) => Self::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::Tls(msg) => Self::ConnectionFailed {
                reason: format!("TLS error: {msg}"),
            },
            Api::Deserialization { message, body: _ } => Self::Fetch {
                message: format!("unexpected response: {message}"),
                status: None,
            },
        }
    }
}
