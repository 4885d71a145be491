use std::fmt;

use zigbee_api::models::{Device, DeviceId};

use crate::codec::{EditableRule, RepeatSpan, RuleCodec};
use crate::controller::Intent;
use crate::errors::PanelError;
use crate::models::SystemSnapshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRow {
    pub id: DeviceId,
    pub name: String,
    pub on: bool,
}

/// Editor for the selected rule, or for a new one when `index` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleEditView {
    pub index: Option<usize>,
    pub rule: EditableRule,
    devices: Vec<Device>,
}

impl RuleEditView {
    pub fn new(snapshot: &SystemSnapshot, index: Option<usize>, codec: &RuleCodec) -> Self {
        let index = index.filter(|index| *index < snapshot.rules.len());

        Self {
            index,
            rule: codec.to_editable(index.and_then(|index| snapshot.rule(index))),
            devices: snapshot.devices.clone(),
        }
    }

    fn with_rule(&self, rule: EditableRule) -> Self {
        Self {
            index: self.index,
            rule,
            devices: self.devices.clone(),
        }
    }

    fn is_known(&self, id: &str) -> bool {
        self.devices.iter().any(|device| device.id == id)
    }

    pub fn with_name(&self, name: &str) -> Self {
        self.with_rule(self.rule.with_name(name))
    }

    pub fn with_enabled(&self, enabled: bool) -> Self {
        self.with_rule(self.rule.with_enabled(enabled))
    }

    /// Local wall-clock time; validated only on submit.
    pub fn with_timestamp(&self, text: &str) -> Self {
        self.with_rule(self.rule.with_display_timestamp(text))
    }

    pub fn with_repeat(&self, days: &str, hours: &str, minutes: &str) -> Self {
        self.with_rule(self.rule.with_repeat(RepeatSpan::parse(days, hours, minutes)))
    }

    /// Adds a known device to the target, switched off.
    pub fn with_device(&self, id: &str) -> Self {
        if !self.is_known(id) {
            return self.clone();
        }
        self.with_rule(self.rule.with_device(id))
    }

    pub fn without_device(&self, id: &str) -> Self {
        self.with_rule(self.rule.without_device(id))
    }

    pub fn with_target_state(&self, id: &str, on: bool) -> Self {
        self.with_rule(self.rule.with_target_state(id, on))
    }

    pub fn used_devices(&self) -> Vec<TargetRow> {
        self.devices
            .iter()
            .filter_map(|device| {
                self.rule.target.get(&device.id).map(|on| TargetRow {
                    id: device.id.clone(),
                    name: device.name.clone(),
                    on,
                })
            })
            .collect()
    }

    pub fn unused_devices(&self) -> Vec<&Device> {
        self.devices
            .iter()
            .filter(|device| !self.rule.target.contains(&device.id))
            .collect()
    }

    pub fn submit(&self, codec: &RuleCodec) -> Result<Intent, PanelError> {
        Ok(Intent::SubmitRule(Some(codec.to_wire(&self.rule)?)))
    }

    pub fn delete(&self) -> Intent {
        Intent::SubmitRule(None)
    }

    pub fn cancel(&self) -> Intent {
        Intent::Cancel
    }
}

impl fmt::Display for RuleEditView {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.index {
            Some(index) => writeln!(f, "== Rule {index} ==")?,
            None => writeln!(f, "== New rule ==")?,
        }
        writeln!(f, "  name:    {}", self.rule.name)?;
        writeln!(f, "  enabled: {}", if self.rule.enabled { "on" } else { "off" })?;
        writeln!(f, "  at:      {}", self.rule.display_timestamp)?;
        writeln!(f, "  repeat:  {}", self.rule.repeat_span())?;
        for row in self.used_devices() {
            writeln!(f, "  - {:<22} {:>3}  [{}]", row.name, if row.on { "ON" } else { "OFF" }, row.id)?;
        }
        for device in self.unused_devices() {
            writeln!(f, "  + {:<22}       [{}]", device.name, device.id)?;
        }
        write!(
            f,
            "(name <text> | enable on|off | at <YYYY-MM-DDTHH:MM> | repeat <d> <h> <m> | add <id> | remove <id> | target <id> on|off | save | delete | cancel)"
        )
    }
}

#[cfg(test)]
mod tests {
    use time::macros::{datetime, offset};
    use zigbee_api::ApiResponse;
    use zigbee_api::models::{Rule, StatusResponse, TargetMap};

    use super::*;
    use crate::codec::{DateTimeCodec, NANOS_PER_MINUTE};

    fn create_snapshot() -> SystemSnapshot {
        let state = StatusResponse {
            devices: ["d1", "d2"]
                .into_iter()
                .map(|id| Device {
                    id: id.to_string(),
                    name: format!("Plug {id}"),
                    kind: String::new(),
                })
                .collect(),
            rules: vec![Rule {
                name: "Morning".to_string(),
                enabled: true,
                timestamp: datetime!(2023-09-12 05:00 UTC),
                repeat: 1440 * NANOS_PER_MINUTE,
                target: TargetMap::new().with_device("d1").with_state("d1", true),
            }],
            ..Default::default()
        };
        SystemSnapshot::new(ApiResponse::completed(200, "OK", ""), state)
    }

    #[test]
    fn test_existing_rule_is_localized() {
        let codec = RuleCodec::new(DateTimeCodec::new(offset!(+2)));
        let view = RuleEditView::new(&create_snapshot(), Some(0), &codec);

        assert_eq!(view.rule.display_timestamp, "2023-09-12T07:00");
        assert_eq!(view.rule.repeat_span().days, 1);
        assert_eq!(view.used_devices().len(), 1);
        assert_eq!(view.unused_devices()[0].id, "d2");
    }

    #[test]
    fn test_membership_edits() {
        let codec = RuleCodec::default();
        let view = RuleEditView::new(&create_snapshot(), Some(0), &codec)
            .with_device("d2")
            .with_device("unknown")
            .with_target_state("d2", true)
            .without_device("d1");

        assert_eq!(
            view.used_devices(),
            vec![TargetRow {
                id: "d2".to_string(),
                name: "Plug d2".to_string(),
                on: true
            }]
        );
        assert!(!view.rule.target.contains("unknown"));
    }

    #[test]
    fn test_new_rule_submit() {
        let codec = RuleCodec::default();
        let view = RuleEditView::new(&create_snapshot(), None, &codec);

        assert!(matches!(view.submit(&codec), Err(PanelError::InvalidTimestamp(_))));

        let view = view
            .with_name("Evening")
            .with_enabled(true)
            .with_timestamp("2023-09-12 21:30")
            .with_repeat("0", "12", "x");
        let Intent::SubmitRule(Some(rule)) = view.submit(&codec).unwrap() else {
            panic!("expected a rule submission");
        };

        assert_eq!(rule.name, "Evening");
        assert_eq!(rule.timestamp, datetime!(2023-09-12 21:30 UTC));
        assert_eq!(rule.repeat, 720 * NANOS_PER_MINUTE);
        assert_eq!(view.delete(), Intent::SubmitRule(None));
    }
}
