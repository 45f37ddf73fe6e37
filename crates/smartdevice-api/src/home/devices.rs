use tracing::debug;

use crate::error::Error;
use crate::home::client::HomeApiClient;
use crate::home::models::DeviceResponse;

impl HomeApiClient {
    /// List every appliance registered to the account.
    ///
    /// `GET devices`
    pub async fn list_devices(&self) -> Result<Vec<DeviceResponse>, Error> {
        let url = self.url("devices")?;
        debug!("listing devices");
        self.get(url).await
    }
}
