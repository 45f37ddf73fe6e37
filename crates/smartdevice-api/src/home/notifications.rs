use tracing::debug;

use crate::error::Error;
use crate::home::client::HomeApiClient;
use crate::home::controls::segment;
use crate::home::models::{AcknowledgeRequest, NotificationResponse};

impl HomeApiClient {
    /// All notifications for the account, acknowledged ones included.
    ///
    /// `GET notifications`
    pub async fn list_notifications(&self) -> Result<Vec<NotificationResponse>, Error> {
        let url = self.url("notifications")?;
        debug!("listing notifications");
        self.get(url).await
    }

    /// Mark one notification as seen.
    ///
    /// `PATCH notifications/{device_id}/{notification_id}` with
    /// `{"isAcknowledged": true}`
    pub async fn acknowledge_notification(
        &self,
        device_id: &str,
        notification_id: &str,
    ) -> Result<(), Error> {
        let url = self.url(&format!(
            "notifications/{}/{}",
            segment(device_id),
            segment(notification_id)
        ))?;
        debug!(device_id, notification_id, "acknowledging notification");
        self.patch_no_content(
            url,
            &AcknowledgeRequest {
                is_acknowledged: true,
            },
        )
        .await
    }
}
