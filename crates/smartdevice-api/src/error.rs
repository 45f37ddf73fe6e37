use thiserror::Error;

use crate::oauth::AuthStage;

/// Top-level error type for the `smartdevice-api` crate.
///
/// Covers every failure mode of both API surfaces: the four stages of the
/// PKCE login flow, and the Home API transport.
/// `smartdevice-core` maps these into its own error kinds.
#[derive(Debug, Error)]
pub enum Error {
    // ── Login flow ──────────────────────────────────────────────────
    /// The authorize page could not be fetched or did not carry the
    /// hidden form fields the login form needs.
    #[error("Login page error: {message}")]
    AuthPage { message: String },

    /// Credential submission was rejected (wrong username or password).
    #[error("Login failed: {message}")]
    Login { message: String },

    /// The authorization callback did not yield a usable code.
    #[error("Authorization code error: {message}")]
    AuthorizationCode { message: String },

    /// The token endpoint did not return an access token.
    #[error("Token exchange failed: {message}")]
    TokenExchange { message: String },

    // ── Home API ────────────────────────────────────────────────────
    /// HTTP 401: the API key or bearer token is not (or no longer) valid.
    #[error("Unauthorized -- credentials rejected or session expired")]
    Unauthorized,

    /// Any other non-success status from the Home API.
    #[error("Home API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// A bearer-token account issued a request before logging in.
    #[error("No session token -- authenticate first")]
    MissingToken,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS configuration or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` for HTTP 401, the only signal that a fresh login is due.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized | Self::MissingToken)
    }

    /// Returns `true` for connect and timeout failures, the only errors
    /// worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Returns `true` if the error came out of the PKCE login flow.
    pub fn is_auth_flow(&self) -> bool {
        self.auth_stage().is_some()
    }

    /// The login stage this error aborted, if it came from the PKCE flow.
    pub fn auth_stage(&self) -> Option<AuthStage> {
        match self {
            Self::AuthPage { .. } => Some(AuthStage::Init),
            Self::Login { .. } => Some(AuthStage::GotLoginPage),
            Self::AuthorizationCode { .. } => Some(AuthStage::SubmittedLogin),
            Self::TokenExchange { .. } => Some(AuthStage::GotAuthCode),
            _ => None,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
