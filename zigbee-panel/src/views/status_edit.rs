use std::collections::BTreeMap;
use std::fmt;

use zigbee_api::models::DeviceId;

use super::status::DeviceRow;
use crate::controller::Intent;
use crate::models::SystemSnapshot;

/// Device switches; starts from the confirmed status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEditView {
    pub devices: Vec<DeviceRow>,
    pub switches: BTreeMap<DeviceId, bool>,
}

impl StatusEditView {
    pub fn new(snapshot: &SystemSnapshot) -> Self {
        Self {
            devices: DeviceRow::visible(snapshot),
            switches: snapshot
                .status
                .iter()
                .map(|(id, status)| (id.clone(), status.is_on()))
                .collect(),
        }
    }

    /// Unknown ids are ignored.
    pub fn with_switch(&self, id: &str, on: bool) -> Self {
        let mut switches = self.switches.clone();
        if let Some(value) = switches.get_mut(id) {
            *value = on;
        }

        Self {
            devices: self.devices.clone(),
            switches,
        }
    }

    pub fn submit(&self) -> Intent {
        Intent::SubmitDeviceState(self.switches.clone())
    }

    pub fn cancel(&self) -> Intent {
        Intent::Cancel
    }
}

impl fmt::Display for StatusEditView {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "== Status (editing) ==")?;
        for device in &self.devices {
            let on = self.switches.get(&device.id).copied().unwrap_or(false);
            writeln!(f, "  {:<24} [{}] {}", device.name, if on { "x" } else { " " }, device.id)?;
        }
        write!(f, "(switch <id> on|off | save | cancel)")
    }
}
