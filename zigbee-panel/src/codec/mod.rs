mod datetime;
mod duration;
mod rule;

pub use datetime::{DateTimeCodec, LocalZone, Zone};
pub use duration::{NANOS_PER_MINUTE, RepeatSpan, minutes_from_nanos, nanos_from_minutes};
pub use rule::{EditableRule, RuleCodec};
