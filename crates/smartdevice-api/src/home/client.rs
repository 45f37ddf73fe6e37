// Home API HTTP client
//
// Wraps `reqwest::Client` with base-URL joining and the per-request auth
// header. Endpoint methods (devices, controls, notifications) live in
// sibling files as inherent methods; this module only deals with
// transport mechanics and status handling.

use std::sync::RwLock;

use secrecy::SecretString;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::{Credentials, RequestAuth};
use crate::error::Error;
use crate::transport::TransportConfig;

pub const DEFAULT_BASE_URL: &str = "https://home-api.smartdevice.liebherr.com/v1/";

/// Raw HTTP client for the vendor's Home API.
///
/// API-key accounts are ready to use immediately. Password accounts must
/// install a token via [`set_token`](Self::set_token) after logging in;
/// until then every call fails with [`Error::MissingToken`].
pub struct HomeApiClient {
    http: reqwest::Client,
    base_url: Url,
    auth: RwLock<RequestAuth>,
}

impl HomeApiClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the API root (e.g. `https://host/v1/`). A trailing
    /// slash is added when missing so that relative joins keep the prefix.
    pub fn new(
        base_url: Url,
        credentials: &Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, credentials))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, credentials: &Credentials) -> Self {
        let auth = match credentials {
            Credentials::ApiKey { key } => RequestAuth::ApiKey(key.clone()),
            Credentials::Password { .. } => RequestAuth::None,
        };
        Self {
            http,
            base_url: normalize_base(base_url),
            auth: RwLock::new(auth),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Session token ────────────────────────────────────────────────

    /// Install a bearer token obtained from the login flow.
    ///
    /// Replaces whatever auth the client carried before, including an
    /// API key.
    pub fn set_token(&self, token: SecretString) {
        debug!("installing session token");
        *self.auth.write().expect("auth lock poisoned") = RequestAuth::Bearer(token);
    }

    /// Drop the session token. Subsequent calls fail with `MissingToken`
    /// until a new one is installed. API keys are left alone.
    pub fn clear_token(&self) {
        let mut guard = self.auth.write().expect("auth lock poisoned");
        if matches!(*guard, RequestAuth::Bearer(_)) {
            *guard = RequestAuth::None;
        }
    }

    pub fn has_credential(&self) -> bool {
        !matches!(
            *self.auth.read().expect("auth lock poisoned"),
            RequestAuth::None
        )
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, Error> {
        self.auth.read().expect("auth lock poisoned").apply(builder)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// `{base}{path}`; `path` is relative (no leading slash).
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let builder = self.authorize(self.http.get(url))?;
        let resp = builder.send().await.map_err(Error::Transport)?;

        Self::handle_response(resp).await
    }

    /// POST a JSON body to an endpoint that answers with no content.
    pub(crate) async fn post_no_content(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<(), Error> {
        debug!("POST {}", url);

        let builder = self.authorize(self.http.post(url).json(body))?;
        let resp = builder.send().await.map_err(Error::Transport)?;

        Self::handle_empty(resp).await
    }

    /// PATCH a JSON body to an endpoint that answers with no content.
    pub(crate) async fn patch_no_content(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<(), Error> {
        debug!("PATCH {}", url);

        let builder = self.authorize(self.http.patch(url).json(body))?;
        let resp = builder.send().await.map_err(Error::Transport)?;

        Self::handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let preview: String = body.chars().take(200).collect();
            return Err(Error::Api {
                status: status.as_u16(),
                message: if preview.is_empty() {
                    status.canonical_reason().unwrap_or("unknown").to_owned()
                } else {
                    preview
                },
            });
        }

        Ok(resp)
    }

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let resp = Self::check_status(resp).await?;
        let body = resp.text().await.map_err(Error::Transport)?;

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
        Self::check_status(resp).await.map(|_| ())
    }
}

fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
