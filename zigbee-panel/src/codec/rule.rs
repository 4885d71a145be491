use time::OffsetDateTime;
use zigbee_api::models::{Rule, TargetMap};

use super::datetime::DateTimeCodec;
use super::duration::{RepeatSpan, minutes_from_nanos, nanos_from_minutes};
use crate::errors::PanelError;

/// Form representation of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableRule {
    pub name: String,
    pub enabled: bool,
    /// Instant the form was loaded from, `None` for a new rule
    pub timestamp: Option<OffsetDateTime>,
    /// Repeat the form was loaded from, in nanoseconds
    pub repeat: i64,
    pub target: TargetMap,
    /// Local wall-clock time, `YYYY-MM-DDTHH:MM`
    pub display_timestamp: String,
    pub display_repeat_minutes: u64,
}

impl EditableRule {
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn with_enabled(&self, enabled: bool) -> Self {
        Self {
            enabled,
            ..self.clone()
        }
    }

    pub fn with_display_timestamp(&self, display_timestamp: impl Into<String>) -> Self {
        Self {
            display_timestamp: display_timestamp.into(),
            ..self.clone()
        }
    }

    pub fn with_repeat(&self, span: RepeatSpan) -> Self {
        Self {
            display_repeat_minutes: span.to_minutes(),
            ..self.clone()
        }
    }

    pub fn with_device(&self, id: &str) -> Self {
        Self {
            target: self.target.with_device(id),
            ..self.clone()
        }
    }

    pub fn without_device(&self, id: &str) -> Self {
        Self {
            target: self.target.without_device(id),
            ..self.clone()
        }
    }

    pub fn with_target_state(&self, id: &str, on: bool) -> Self {
        Self {
            target: self.target.with_state(id, on),
            ..self.clone()
        }
    }

    pub fn repeat_span(&self) -> RepeatSpan {
        RepeatSpan::from_minutes(self.display_repeat_minutes)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuleCodec {
    datetime: DateTimeCodec,
}

impl RuleCodec {
    pub fn new(datetime: DateTimeCodec) -> Self {
        Self { datetime }
    }

    pub fn datetime(&self) -> &DateTimeCodec {
        &self.datetime
    }

    pub fn to_editable(&self, rule: Option<&Rule>) -> EditableRule {
        match rule {
            None => EditableRule {
                name: String::new(),
                enabled: false,
                timestamp: None,
                repeat: 0,
                target: TargetMap::new(),
                display_timestamp: String::new(),
                display_repeat_minutes: 0,
            },
            Some(rule) => EditableRule {
                name: rule.name.clone(),
                enabled: rule.enabled,
                timestamp: Some(rule.timestamp),
                repeat: rule.repeat,
                target: rule.target.clone(),
                display_timestamp: self.datetime.to_local(rule.timestamp),
                display_repeat_minutes: minutes_from_nanos(rule.repeat),
            },
        }
    }

    pub fn to_wire(&self, editable: &EditableRule) -> Result<Rule, PanelError> {
        Ok(Rule {
            name: editable.name.clone(),
            enabled: editable.enabled,
            timestamp: self.datetime.to_instant(&editable.display_timestamp)?,
            repeat: nanos_from_minutes(editable.display_repeat_minutes),
            target: editable.target.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use time::Duration;
    use time::macros::{datetime, offset};

    use super::*;
    use crate::codec::duration::NANOS_PER_MINUTE;

    fn create_rule() -> Rule {
        Rule {
            name: "Heater".to_string(),
            enabled: true,
            timestamp: datetime!(2023-09-12 05:30:42.250 UTC),
            repeat: 90 * NANOS_PER_MINUTE + 1_500,
            target: TargetMap::new().with_device("d1").with_state("d1", true),
        }
    }

    #[test]
    fn test_new_rule_defaults() {
        let editable = RuleCodec::default().to_editable(None);

        assert_eq!(editable.name, "");
        assert!(!editable.enabled);
        assert_eq!(editable.timestamp, None);
        assert_eq!(editable.display_timestamp, "");
        assert_eq!(editable.display_repeat_minutes, 0);
        assert!(editable.target.is_empty());
    }

    #[test]
    fn test_to_editable_localizes() {
        let codec = RuleCodec::new(DateTimeCodec::new(offset!(+2)));
        let editable = codec.to_editable(Some(&create_rule()));

        assert_eq!(editable.display_timestamp, "2023-09-12T07:30");
        assert_eq!(editable.display_repeat_minutes, 90);
        assert_eq!(
            editable.repeat_span(),
            RepeatSpan {
                days: 0,
                hours: 1,
                minutes: 30
            }
        );
    }

    #[test]
    fn test_round_trip_drops_sub_minute_precision() {
        let codec = RuleCodec::new(DateTimeCodec::new(offset!(-3)));
        let rule = create_rule();

        let wire = codec.to_wire(&codec.to_editable(Some(&rule))).unwrap();

        assert_eq!(wire.name, rule.name);
        assert_eq!(wire.enabled, rule.enabled);
        assert_eq!(wire.target, rule.target);
        assert_eq!(wire.timestamp, datetime!(2023-09-12 05:30 UTC));
        assert_eq!(wire.repeat, 90 * NANOS_PER_MINUTE);
    }

    #[test]
    fn test_round_trip_is_exact_at_minute_resolution() {
        let codec = RuleCodec::new(DateTimeCodec::new(offset!(+9)));
        for step in 0..200i64 {
            let rule = Rule {
                name: format!("rule {step}"),
                enabled: step % 2 == 0,
                timestamp: datetime!(2024-02-28 23:00 UTC) + Duration::minutes(step * 61),
                repeat: step * 7 * NANOS_PER_MINUTE,
                target: TargetMap::new().with_device(&format!("d{step}")),
            };

            assert_eq!(codec.to_wire(&codec.to_editable(Some(&rule))).unwrap(), rule);
        }
    }

    #[test]
    fn test_membership_edits_are_pure() {
        let codec = RuleCodec::default();
        let editable = codec.to_editable(Some(&create_rule()));

        let added = editable.with_device("d2");
        let removed = added.without_device("d1");

        assert_eq!(editable.target.len(), 1);
        assert_eq!(added.target.get("d2"), Some(false));
        assert_eq!(added.target.get("d1"), Some(true));
        assert!(!removed.target.contains("d1"));
        assert_eq!(added.with_device("d1").target, added.target);
    }

    #[test]
    fn test_new_rule_without_time_cannot_be_sent() {
        let codec = RuleCodec::default();
        let editable = codec.to_editable(None).with_name("Lights");

        assert!(matches!(
            codec.to_wire(&editable),
            Err(PanelError::InvalidTimestamp(_))
        ));

        let rule = codec
            .to_wire(&editable.with_display_timestamp("2023-09-12T21:30"))
            .unwrap();
        assert_eq!(rule.timestamp, datetime!(2023-09-12 21:30 UTC));
        assert_eq!(rule.repeat, 0);
    }
}
