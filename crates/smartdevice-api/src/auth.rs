use secrecy::{ExposeSecret, SecretString};

/// Which header the Home API client attaches to each request.
///
/// Marker enum (no data) -- the secret material lives in [`Credentials`]
/// or in the session token obtained by the login flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    /// Static key sent as the `api-key` header.
    ApiKey,
    /// Bearer token obtained through the PKCE login flow.
    Bearer,
}

/// Credentials for one configured account.
///
/// Immutable for the lifetime of the account. Password accounts go
/// through [`Authenticator`](crate::Authenticator) to obtain a token;
/// API-key accounts use the key directly.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// Personal API key issued by the vendor's app.
    ApiKey { key: SecretString },

    /// Username and password for the vendor's login service.
    Password {
        username: String,
        password: SecretString,
    },
}

impl Credentials {
    pub fn strategy(&self) -> AuthStrategy {
        match self {
            Self::ApiKey { .. } => AuthStrategy::ApiKey,
            Self::Password { .. } => AuthStrategy::Bearer,
        }
    }

    /// Account identity suitable for logs. Never includes secrets.
    pub fn display_identity(&self) -> String {
        match self {
            Self::ApiKey { key } => {
                let raw = key.expose_secret();
                let tail: String = raw
                    .chars()
                    .rev()
                    .take(4)
                    .collect::<Vec<_>>()
                    .into_iter()
                    .rev()
                    .collect();
                format!("api-key ****{tail}")
            }
            Self::Password { username, .. } => username.clone(),
        }
    }
}

/// The header currently applied to Home API requests.
#[derive(Debug, Clone)]
pub(crate) enum RequestAuth {
    ApiKey(SecretString),
    Bearer(SecretString),
    /// Password account that has not logged in yet.
    None,
}

impl RequestAuth {
    pub(crate) fn apply(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, crate::Error> {
        match self {
            Self::ApiKey(key) => Ok(builder.header("api-key", key.expose_secret())),
            Self::Bearer(token) => Ok(builder.bearer_auth(token.expose_secret())),
            Self::None => Err(crate::Error::MissingToken),
        }
    }
}
