use std::collections::BTreeMap;

use time::OffsetDateTime;
use zigbee_api::ApiResponse;
use zigbee_api::models::{Device, DeviceId, DeviceStatus, Rule, StatusResponse};

/// Health of the link between the backend and the radio controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GatewayLink {
    pub update_ok: bool,
    pub update_status: String,
    /// Unix seconds of the last exchange with the controller
    pub update_time: i64,
}

/// Server-confirmed state at one instant. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemSnapshot {
    pub devices: Vec<Device>,
    pub status: BTreeMap<DeviceId, DeviceStatus>,
    pub rules: Vec<Rule>,
    pub link: GatewayLink,
    pub fetched_at: OffsetDateTime,
    pub ok: bool,
    pub status_code: Option<u16>,
    pub status_text: String,
}

impl SystemSnapshot {
    pub fn new(response: ApiResponse, state: StatusResponse) -> Self {
        Self {
            devices: state.devices,
            status: state.status,
            rules: state.rules,
            link: GatewayLink {
                update_ok: state.update_ok,
                update_status: state.update_status,
                update_time: state.update_time,
            },
            fetched_at: response.timestamp,
            ok: response.ok,
            status_code: response.status_code,
            status_text: response.status_text,
        }
    }

    /// Devices that have a status entry, in server order.
    pub fn visible_devices(&self) -> impl Iterator<Item = (&Device, DeviceStatus)> {
        self.devices
            .iter()
            .filter_map(|device| self.status.get(&device.id).map(|status| (device, *status)))
    }

    pub fn rule(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }
}
