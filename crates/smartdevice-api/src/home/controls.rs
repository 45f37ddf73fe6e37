// Home API control endpoints
//
// Reading the control list of one appliance and mutating a single
// control. Mutations answer 204 and return nothing; the new value only
// shows up on the next read.

use tracing::debug;

use crate::error::Error;
use crate::home::client::HomeApiClient;
use crate::home::models::{ControlRequest, ControlResponse};

impl HomeApiClient {
    /// `GET devices/{device_id}/controls`
    ///
    /// Entries are decoded one by one; an entry whose shape does not fit
    /// is skipped so the rest of the appliance's controls survive.
    pub async fn list_controls(&self, device_id: &str) -> Result<Vec<ControlResponse>, Error> {
        let url = self.url(&format!("devices/{}/controls", segment(device_id)))?;
        debug!(device_id, "listing controls");
        let raw: Vec<serde_json::Value> = self.get(url).await?;
        Ok(decode_controls(device_id, raw))
    }

    /// Change one control.
    ///
    /// `POST devices/{device_id}/controls/{control_name}`
    pub async fn set_control(
        &self,
        device_id: &str,
        control_name: &str,
        request: &ControlRequest,
    ) -> Result<(), Error> {
        let url = self.url(&format!(
            "devices/{}/controls/{}",
            segment(device_id),
            segment(control_name)
        ))?;
        debug!(device_id, control_name, ?request, "setting control");
        self.post_no_content(url, request).await
    }
}

fn decode_controls(device_id: &str, raw: Vec<serde_json::Value>) -> Vec<ControlResponse> {
    raw.into_iter()
        .filter_map(|value| {
            let control_type = value
                .get("type")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("<missing>")
                .to_owned();
            match serde_json::from_value(value) {
                Ok(control) => Some(control),
                Err(e) => {
                    debug!(device_id, %control_type, error = %e, "skipping malformed control");
                    None
                }
            }
        })
        .collect()
}

/// Percent-encode a path segment so identifiers cannot escape it.
pub(crate) fn segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn malformed_entry_does_not_sink_the_list() {
        let raw = json!([
            { "type": "ToggleControl", "name": "superfrost", "zoneId": 0, "value": true },
            { "type": "PresentationLightControl", "name": "light", "min": "OFF", "max": "HIGH" },
            { "name": "typeless" }
        ]);
        let controls = decode_controls("A", serde_json::from_value(raw).unwrap());
        assert_eq!(controls.len(), 1);
        assert_eq!(controls[0].name.as_deref(), Some("superfrost"));
    }
}
