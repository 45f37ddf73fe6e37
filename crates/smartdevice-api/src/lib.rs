// smartdevice-api: Async Rust client for the SmartDevice appliance cloud (Home API + PKCE login)

pub mod auth;
pub mod error;
pub mod home;
pub mod oauth;
pub mod transport;

pub use auth::{AuthStrategy, Credentials};
pub use error::Error;
pub use home::HomeApiClient;
pub use home::models::{ControlRequest, ControlResponse, DeviceResponse, NotificationResponse};
pub use oauth::{AuthStage, Authenticator, OAuthSettings, PkcePair};
pub use transport::{TlsMode, TransportConfig};
