// ── Snapshot ──
//
// Everything one poll tick learned about the account. Built in full, then
// swapped in as a unit; never mutated after publication.

use serde::{Deserialize, Serialize};

use super::appliance::Appliance;
use super::control::{Control, ControlKey};
use super::notification::Notification;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub appliances: Vec<Appliance>,
    pub notifications: Vec<Notification>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.appliances.is_empty() && self.notifications.is_empty()
    }

    pub fn appliance(&self, device_id: &str) -> Option<&Appliance> {
        self.appliances.iter().find(|a| a.device_id == device_id)
    }

    pub fn control(&self, device_id: &str, key: &ControlKey) -> Option<&Control> {
        self.appliance(device_id)?.control(key)
    }

    pub fn notifications_for<'a>(
        &'a self,
        device_id: &'a str,
    ) -> impl Iterator<Item = &'a Notification> + 'a {
        self.notifications
            .iter()
            .filter(move |n| n.device_id == device_id)
    }
}
