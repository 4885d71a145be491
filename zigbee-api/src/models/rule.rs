use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{DeviceId, switch_map};

/// A scheduled activation of a set of device states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Rule name
    #[serde(default)]
    pub name: String,
    /// Whether the scheduler considers this rule
    #[serde(default)]
    pub enabled: bool,
    /// Next execution instant, always UTC on the wire
    #[serde(with = "crate::timestamp")]
    pub timestamp: OffsetDateTime,
    /// Repeat period in nanoseconds, `0` for a one-shot rule
    #[serde(default)]
    pub repeat: i64,
    /// Devices affected by the rule and their desired state
    #[serde(rename = "newState", default)]
    pub target: TargetMap,
}

/// Sparse device membership of a rule.
///
/// A key is present only when the device was explicitly added; the value is the
/// desired power state. Every edit returns a new map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetMap(#[serde(with = "switch_map")] BTreeMap<DeviceId, bool>);

impl TargetMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<bool> {
        self.0.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Adds a device switched off; no-op when it is already a member.
    pub fn with_device(&self, id: &str) -> Self {
        let mut next = self.0.clone();
        next.entry(id.to_string()).or_insert(false);
        Self(next)
    }

    /// Drops a device from the rule; no-op when it is not a member.
    pub fn without_device(&self, id: &str) -> Self {
        let mut next = self.0.clone();
        next.remove(id);
        Self(next)
    }

    /// Changes the desired state of a member; non-members are left out.
    pub fn with_state(&self, id: &str, on: bool) -> Self {
        let mut next = self.0.clone();
        if let Some(value) = next.get_mut(id) {
            *value = on;
        }
        Self(next)
    }
}

impl From<BTreeMap<DeviceId, bool>> for TargetMap {
    fn from(value: BTreeMap<DeviceId, bool>) -> Self {
        Self(value)
    }
}

impl FromIterator<(DeviceId, bool)> for TargetMap {
    fn from_iter<I: IntoIterator<Item = (DeviceId, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
