// Home API client modules
//
// Key- or token-authenticated REST surface for appliances, their
// controls, and account notifications.

pub mod client;
pub mod controls;
pub mod devices;
pub mod models;
pub mod notifications;

pub use client::{DEFAULT_BASE_URL, HomeApiClient};
