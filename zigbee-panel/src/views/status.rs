use std::fmt;

use zigbee_api::models::{DeviceId, DeviceStatus};

use crate::codec::DateTimeCodec;
use crate::controller::{Intent, ViewState};
use crate::models::{GatewayLink, SystemSnapshot};

/// One configured device as shown on the status screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRow {
    pub id: DeviceId,
    pub name: String,
    pub kind: String,
    pub status: DeviceStatus,
}

impl DeviceRow {
    pub(crate) fn visible(snapshot: &SystemSnapshot) -> Vec<Self> {
        snapshot
            .visible_devices()
            .map(|(device, status)| Self {
                id: device.id.clone(),
                name: device.name.clone(),
                kind: device.kind.clone(),
                status,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub devices: Vec<DeviceRow>,
    pub link: GatewayLink,
    /// Local `HH:MM` the snapshot was fetched at
    pub fetched_at: String,
}

impl StatusView {
    pub fn new(snapshot: &SystemSnapshot, datetime: &DateTimeCodec) -> Self {
        Self {
            devices: DeviceRow::visible(snapshot),
            link: snapshot.link.clone(),
            fetched_at: datetime.to_local_time(snapshot.fetched_at),
        }
    }

    pub fn edit(&self) -> Intent {
        Intent::Navigate(ViewState::EditingStatus)
    }

    pub fn rules(&self) -> Intent {
        Intent::Navigate(ViewState::ListingRules)
    }
}

impl fmt::Display for StatusView {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "== Status ({}) ==", self.fetched_at)?;
        for device in &self.devices {
            write!(f, "  {:<24} {:>4}  [{}]", device.name, device.status.to_string(), device.id)?;
            if !device.kind.is_empty() {
                write!(f, " {}", device.kind)?;
            }
            writeln!(f)?;
        }
        if !self.link.update_ok {
            writeln!(f, "  controller link down: {}", self.link.update_status)?;
        }
        write!(f, "(edit | rules | quit)")
    }
}
