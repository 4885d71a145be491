use std::fmt;

pub const NANOS_PER_MINUTE: i64 = 60_000_000_000;

const MAX_DAYS: u64 = 366;
const MAX_HOURS: u64 = 24;
const MAX_MINUTES: u64 = 60;

/// A repeat period split for editing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepeatSpan {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
}

impl RepeatSpan {
    pub fn from_minutes(total: u64) -> Self {
        let minutes = total % 60;
        let hours_total = (total - minutes) / 60;
        let hours = hours_total % 24;
        let days = (hours_total - hours) / 24;

        Self {
            days,
            hours,
            minutes,
        }
    }

    pub fn to_minutes(&self) -> u64 {
        self.days
            .saturating_mul(24)
            .saturating_add(self.hours)
            .saturating_mul(60)
            .saturating_add(self.minutes)
    }

    /// Reads form fields; a field that is not a number in range counts as zero.
    pub fn parse(days: &str, hours: &str, minutes: &str) -> Self {
        Self {
            days: parse_field(days, MAX_DAYS),
            hours: parse_field(hours, MAX_HOURS),
            minutes: parse_field(minutes, MAX_MINUTES),
        }
    }
}

impl fmt::Display for RepeatSpan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}d {}h {}min", self.days, self.hours, self.minutes)
    }
}

fn parse_field(raw: &str, max: u64) -> u64 {
    match raw.trim().parse::<u64>() {
        Ok(value) if value <= max => value,
        _ => 0,
    }
}

/// Whole minutes of a nanosecond duration; negative durations count as zero.
pub fn minutes_from_nanos(nanos: i64) -> u64 {
    if nanos <= 0 {
        0
    } else {
        (nanos / NANOS_PER_MINUTE) as u64
    }
}

pub fn nanos_from_minutes(minutes: u64) -> i64 {
    i64::try_from(minutes)
        .unwrap_or(i64::MAX)
        .saturating_mul(NANOS_PER_MINUTE)
}
