// PKCE login flow
//
// Username/password accounts trade their credentials for a bearer token
// by driving the vendor's browser login: fetch the authorize page, submit
// the login form, follow the callback by hand to capture the code, and
// exchange the code at the token endpoint. Every attempt runs on its own
// cookie jar and PKCE pair.

pub mod form;
pub mod pkce;

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

pub use self::pkce::PkcePair;

const DEFAULT_LOGIN_URL: &str = "https://login.liebherr.com";
const DEFAULT_CLIENT_ID: &str = "smartdevice-app";
const DEFAULT_REDIRECT_URI: &str = "com.liebherr.smartdevice://oauth/callback";
const DEFAULT_SCOPES: &[&str] = &["openid", "profile", "offline_access", "home-api"];

/// The login service rejects requests that do not look like a browser.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 14) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/126.0 Mobile Safari/537.36";

const ANTI_FORGERY_FIELD: &str = "__RequestVerificationToken";
const RETURN_URL_FIELD: &str = "ReturnUrl";

/// Progress of one login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStage {
    Init,
    GotLoginPage,
    /// Login form accepted; the authorization callback is pending.
    SubmittedLogin,
    GotAuthCode,
    GotToken,
}

impl fmt::Display for AuthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::GotLoginPage => "got-login-page",
            Self::SubmittedLogin => "submitted-login",
            Self::GotAuthCode => "got-auth-code",
            Self::GotToken => "got-token",
        };
        f.write_str(name)
    }
}

/// Login service endpoints and client registration.
#[derive(Debug, Clone)]
pub struct OAuthSettings {
    pub login_url: Url,
    pub client_id: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            login_url: Url::parse(DEFAULT_LOGIN_URL).expect("valid default login URL"),
            client_id: DEFAULT_CLIENT_ID.to_owned(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_owned(),
            scopes: DEFAULT_SCOPES.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

impl OAuthSettings {
    /// Default client registration against a different login host.
    pub fn with_login_url(login_url: Url) -> Self {
        Self {
            login_url,
            ..Self::default()
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.login_url.join(path).map_err(Error::InvalidUrl)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Drives the four-step PKCE exchange.
///
/// Stateless between attempts; the returned token is owned by the caller.
#[derive(Debug, Clone)]
pub struct Authenticator {
    settings: OAuthSettings,
    transport: TransportConfig,
}

impl Authenticator {
    pub fn new(settings: OAuthSettings, transport: &TransportConfig) -> Self {
        let transport = transport
            .clone()
            .without_redirects()
            .with_user_agent(BROWSER_USER_AGENT);
        Self {
            settings,
            transport,
        }
    }

    pub fn settings(&self) -> &OAuthSettings {
        &self.settings
    }

    /// Run one complete login attempt and return the bearer token.
    ///
    /// No step is retried. A failure at any step aborts the attempt with
    /// the error kind of that step.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<SecretString, Error> {
        let http = self.transport.clone().with_cookie_jar().build_client()?;
        let pkce = PkcePair::generate();
        let state = pkce::random_state();

        info!(username, "starting login");

        let page = self.fetch_login_page(&http, &pkce, &state).await?;
        debug!(stage = %AuthStage::GotLoginPage, "login page parsed");

        let callback = self.submit_login(&http, username, password, &page).await?;
        debug!(stage = %AuthStage::SubmittedLogin, "login form accepted");

        let code = self.resolve_code(&http, &callback, &state).await?;
        debug!(stage = %AuthStage::GotAuthCode, "authorization code received");

        let token = self.exchange_code(&http, &code, &pkce).await?;
        info!(stage = %AuthStage::GotToken, "login complete");
        Ok(token)
    }

    // ── Step 1: authorize page ───────────────────────────────────────

    async fn fetch_login_page(
        &self,
        http: &reqwest::Client,
        pkce: &PkcePair,
        state: &str,
    ) -> Result<LoginPage, Error> {
        let mut url = self.settings.endpoint("/connect/authorize")?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.settings.client_id)
            .append_pair("redirect_uri", &self.settings.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.settings.scopes.join(" "))
            .append_pair("code_challenge", pkce.challenge())
            .append_pair("code_challenge_method", "S256")
            .append_pair("state", state);

        debug!("GET {}", url.path());

        let resp = http.get(url).send().await.map_err(|e| Error::AuthPage {
            message: format!("request failed: {e}"),
        })?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::AuthPage {
                message: format!("unexpected HTTP {status}"),
            });
        }

        let html = resp.text().await.map_err(|e| Error::AuthPage {
            message: format!("unreadable body: {e}"),
        })?;

        LoginPage::parse(&html)
    }

    // ── Step 2: credential submission ────────────────────────────────

    async fn submit_login(
        &self,
        http: &reqwest::Client,
        username: &str,
        password: &SecretString,
        page: &LoginPage,
    ) -> Result<Url, Error> {
        let url = self.settings.endpoint("/Account/Login")?;
        debug!("POST {}", url.path());

        let form = [
            ("Username", username),
            ("Password", password.expose_secret()),
            (ANTI_FORGERY_FIELD, page.anti_forgery.as_str()),
            (RETURN_URL_FIELD, page.return_url.as_str()),
            ("button", "login"),
        ];

        let resp = http
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::Login {
                message: format!("request failed: {e}"),
            })?;

        let status = resp.status();
        if status != reqwest::StatusCode::FOUND && status != reqwest::StatusCode::OK {
            return Err(Error::Login {
                message: format!("unexpected HTTP {status}"),
            });
        }

        let location = location_header(&resp).ok_or_else(|| Error::Login {
            message: "credentials rejected (no redirect issued)".into(),
        })?;

        self.settings
            .login_url
            .join(&location)
            .map_err(|e| Error::Login {
                message: format!("invalid redirect target: {e}"),
            })
    }

    // ── Step 3: authorization callback ───────────────────────────────

    async fn resolve_code(
        &self,
        http: &reqwest::Client,
        callback: &Url,
        state: &str,
    ) -> Result<String, Error> {
        debug!("GET {}", callback.path());

        let resp = http
            .get(callback.clone())
            .send()
            .await
            .map_err(|e| Error::AuthorizationCode {
                message: format!("request failed: {e}"),
            })?;

        let location = location_header(&resp).ok_or_else(|| Error::AuthorizationCode {
            message: format!("no redirect from callback (HTTP {})", resp.status()),
        })?;

        let target = self
            .settings
            .login_url
            .join(&location)
            .map_err(|e| Error::AuthorizationCode {
                message: format!("invalid redirect target: {e}"),
            })?;

        extract_code(&target, state)
    }

    // ── Step 4: token exchange ───────────────────────────────────────

    async fn exchange_code(
        &self,
        http: &reqwest::Client,
        code: &str,
        pkce: &PkcePair,
    ) -> Result<SecretString, Error> {
        let url = self.settings.endpoint("/connect/token")?;
        debug!("POST {}", url.path());

        let form = [
            ("grant_type", "authorization_code"),
            ("client_id", self.settings.client_id.as_str()),
            ("code", code),
            ("redirect_uri", self.settings.redirect_uri.as_str()),
            ("code_verifier", pkce.verifier()),
        ];

        let resp = http
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(|e| Error::TokenExchange {
                message: format!("request failed: {e}"),
            })?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            let preview: String = body.chars().take(200).collect();
            return Err(Error::TokenExchange {
                message: format!("HTTP {status}: {preview}"),
            });
        }

        let parsed: TokenResponse = resp.json().await.map_err(|e| Error::TokenExchange {
            message: format!("malformed token response: {e}"),
        })?;

        match parsed.access_token {
            Some(token) if !token.is_empty() => Ok(SecretString::from(token)),
            _ => Err(Error::TokenExchange {
                message: "response carried no access_token".into(),
            }),
        }
    }
}

/// Hidden form fields scraped from the authorize page.
#[derive(Debug)]
struct LoginPage {
    anti_forgery: String,
    return_url: String,
}

impl LoginPage {
    fn parse(html: &str) -> Result<Self, Error> {
        let anti_forgery = form::hidden_input(html, ANTI_FORGERY_FIELD)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::AuthPage {
                message: format!("{ANTI_FORGERY_FIELD} not found in login page"),
            })?;
        let return_url = form::hidden_input(html, RETURN_URL_FIELD)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::AuthPage {
                message: format!("{RETURN_URL_FIELD} not found in login page"),
            })?;
        Ok(Self {
            anti_forgery,
            return_url,
        })
    }
}

fn location_header(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn extract_code(target: &Url, expected_state: &str) -> Result<String, Error> {
    let mut code = None;
    let mut state = None;
    for (key, value) in target.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            _ => {}
        }
    }

    if state.as_deref() != Some(expected_state) {
        return Err(Error::AuthorizationCode {
            message: "state mismatch in authorization callback".into(),
        });
    }

    code.filter(|c| !c.is_empty())
        .ok_or_else(|| Error::AuthorizationCode {
            message: "no code in authorization callback".into(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn code_and_state_from_custom_scheme_redirect() {
        let url = Url::parse("com.liebherr.smartdevice://oauth/callback?code=abc&state=s1").unwrap();
        assert_eq!(extract_code(&url, "s1").unwrap(), "abc");
    }

    #[test]
    fn mismatched_state_is_rejected() {
        let url = Url::parse("https://example.com/cb?code=abc&state=other").unwrap();
        assert!(matches!(
            extract_code(&url, "s1"),
            Err(Error::AuthorizationCode { .. })
        ));
    }

    #[test]
    fn missing_code_is_rejected() {
        let url = Url::parse("https://example.com/cb?state=s1").unwrap();
        assert!(matches!(
            extract_code(&url, "s1"),
            Err(Error::AuthorizationCode { .. })
        ));
    }

    #[test]
    fn login_page_requires_both_fields() {
        let only_return = r#"<input type="hidden" name="ReturnUrl" value="/cb">"#;
        let err = LoginPage::parse(only_return).unwrap_err();
        assert!(matches!(err, Error::AuthPage { .. }));
        assert_eq!(err.auth_stage(), Some(AuthStage::Init));
    }

    #[test]
    fn default_settings_point_at_vendor_login() {
        let settings = OAuthSettings::default();
        assert_eq!(settings.login_url.host_str(), Some("login.liebherr.com"));
        assert!(settings.scopes.iter().any(|s| s == "openid"));
    }
}
