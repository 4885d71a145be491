mod rule;

pub use rule::*;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

pub type DeviceId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Opaque device identifier
    pub id: DeviceId,
    /// Display name
    pub name: String,
    /// Hardware family, informational only
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum DeviceStatus {
    On,
    Off,
    Unreachable,
}

impl DeviceStatus {
    pub fn is_on(self) -> bool {
        self == DeviceStatus::On
    }
}

impl TryFrom<i8> for DeviceStatus {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(DeviceStatus::On),
            0 => Ok(DeviceStatus::Off),
            -1 => Ok(DeviceStatus::Unreachable),
            other => Err(format!("unknown device status {other}")),
        }
    }
}

impl From<DeviceStatus> for i8 {
    fn from(value: DeviceStatus) -> Self {
        match value {
            DeviceStatus::On => 1,
            DeviceStatus::Off => 0,
            DeviceStatus::Unreachable => -1,
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeviceStatus::On => write!(f, "ON"),
            DeviceStatus::Off => write!(f, "OFF"),
            DeviceStatus::Unreachable => write!(f, "out"),
        }
    }
}

/// Payload of `GET status.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Last known state of every configured device
    #[serde(rename = "zigbee", default, deserialize_with = "null_as_default")]
    pub status: BTreeMap<DeviceId, DeviceStatus>,
    /// Whether the backend could reach the radio controller
    #[serde(default)]
    pub update_ok: bool,
    /// Human readable outcome of the last controller poll
    #[serde(default)]
    pub update_status: String,
    /// Unix time of the last successful controller poll
    #[serde(default)]
    pub update_time: i64,
    /// Scheduled rules in execution order
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: Vec<Rule>,
    /// Known devices
    #[serde(default, deserialize_with = "null_as_default")]
    pub devices: Vec<Device>,
}

/// Body of `POST setState`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetStateRequest {
    /// Desired power state per device
    #[serde(with = "switch_map")]
    pub state: BTreeMap<DeviceId, bool>,
}

/// Body of `POST setRules`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetRulesRequest {
    /// Complete replacement rule list
    pub rules: Vec<Rule>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Device maps travel as `0|1` integers; booleans are accepted on input.
pub(crate) mod switch_map {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};

    use super::DeviceId;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SwitchValue {
        Flag(bool),
        Level(i64),
    }

    pub fn serialize<S: Serializer>(
        value: &BTreeMap<DeviceId, bool>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(value.iter().map(|(id, on)| (id, u8::from(*on))))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<DeviceId, bool>, D::Error> {
        let raw = Option::<BTreeMap<DeviceId, SwitchValue>>::deserialize(deserializer)?;

        Ok(raw
            .unwrap_or_default()
            .into_iter()
            .map(|(id, value)| {
                let on = match value {
                    SwitchValue::Flag(flag) => flag,
                    SwitchValue::Level(level) => level != 0,
                };
                (id, on)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_status_response_from_backend() {
        let payload = json!({
            "zigbee": {"d1": 1, "d2": 0, "d3": -1},
            "updateOk": true,
            "updateStatus": "OK",
            "updateTime": 1694547000,
            "rules": null,
            "devices": [
                {"id": "d1", "name": "Lamp", "type": "plug"},
                {"id": "dX", "name": "Spare"}
            ]
        });

        let response: StatusResponse = serde_json::from_value(payload).unwrap();

        assert_eq!(response.status["d1"], DeviceStatus::On);
        assert_eq!(response.status["d2"], DeviceStatus::Off);
        assert_eq!(response.status["d3"], DeviceStatus::Unreachable);
        assert!(response.rules.is_empty());
        assert_eq!(response.devices[0].kind, "plug");
        assert_eq!(response.devices[1].kind, "");
        assert!(response.update_ok);
    }

    #[test]
    fn test_status_rejects_unknown_level() {
        let payload = json!({"zigbee": {"d1": 7}});

        assert!(serde_json::from_value::<StatusResponse>(payload).is_err());
    }

    #[test]
    fn test_set_state_request_uses_integers() {
        let request = SetStateRequest {
            state: BTreeMap::from([("d1".to_string(), true), ("d2".to_string(), false)]),
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"state": {"d1": 1, "d2": 0}})
        );
    }
}
