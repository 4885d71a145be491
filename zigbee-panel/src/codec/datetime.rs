use std::fmt;
use std::sync::Arc;

use chrono::{Local, LocalResult, NaiveDate, NaiveDateTime, TimeZone};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::errors::PanelError;

/// `YYYY-MM-DDTHH:MM`
const MINUTE_PREFIX: usize = 16;
const DATE_LENGTH: usize = 10;

/// Offset rules of a timezone, asked per instant so daylight saving changes
/// are followed.
pub trait Zone: fmt::Debug + Send + Sync {
    /// Offset in effect at `instant`.
    fn offset_at(&self, instant: OffsetDateTime) -> UtcOffset;

    /// Offset to read a wall-clock time with. An ambiguous time takes the
    /// earlier offset; a time skipped by a forward change takes the offset
    /// from before the change.
    fn offset_of_local(&self, local: PrimitiveDateTime) -> UtcOffset;
}

impl Zone for UtcOffset {
    fn offset_at(&self, _instant: OffsetDateTime) -> UtcOffset {
        *self
    }

    fn offset_of_local(&self, _local: PrimitiveDateTime) -> UtcOffset {
        *self
    }
}

/// Timezone of the host, through `chrono::Local`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalZone;

impl Zone for LocalZone {
    fn offset_at(&self, instant: OffsetDateTime) -> UtcOffset {
        let seconds = chrono::DateTime::from_timestamp(instant.unix_timestamp(), 0)
            .map(|utc| utc.with_timezone(&Local).offset().local_minus_utc());

        to_utc_offset(seconds)
    }

    fn offset_of_local(&self, local: PrimitiveDateTime) -> UtcOffset {
        let Some(naive) = to_naive(local) else {
            return UtcOffset::UTC;
        };

        let seconds = match Local.from_local_datetime(&naive) {
            LocalResult::Single(resolved) => Some(resolved.offset().local_minus_utc()),
            LocalResult::Ambiguous(earliest, _) => Some(earliest.offset().local_minus_utc()),
            LocalResult::None => Local
                .from_local_datetime(&(naive - chrono::Duration::hours(1)))
                .earliest()
                .map(|before| before.offset().local_minus_utc()),
        };

        to_utc_offset(seconds)
    }
}

fn to_naive(local: PrimitiveDateTime) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(local.year(), u32::from(u8::from(local.month())), u32::from(local.day()))?
        .and_hms_opt(
            u32::from(local.hour()),
            u32::from(local.minute()),
            u32::from(local.second()),
        )
}

fn to_utc_offset(seconds: Option<i32>) -> UtcOffset {
    seconds
        .and_then(|seconds| UtcOffset::from_whole_seconds(seconds).ok())
        .unwrap_or(UtcOffset::UTC)
}

/// Converts between UTC instants and local wall-clock strings at minute
/// resolution.
#[derive(Debug, Clone)]
pub struct DateTimeCodec {
    zone: Arc<dyn Zone>,
}

impl DateTimeCodec {
    pub fn new(zone: impl Zone + 'static) -> Self {
        Self { zone: Arc::new(zone) }
    }

    /// Uses the timezone of the host.
    pub fn local() -> Self {
        Self::new(LocalZone)
    }

    pub fn zone(&self) -> &dyn Zone {
        self.zone.as_ref()
    }

    pub fn to_local(&self, instant: OffsetDateTime) -> String {
        let local = instant.to_offset(self.zone.offset_at(instant));
        format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}",
            local.year(),
            u8::from(local.month()),
            local.day(),
            local.hour(),
            local.minute()
        )
    }

    pub fn to_local_time(&self, instant: OffsetDateTime) -> String {
        let local = instant.to_offset(self.zone.offset_at(instant));
        format!("{:02}:{:02}", local.hour(), local.minute())
    }

    /// Parses a local wall-clock string; anything past the minute is ignored.
    pub fn to_instant(&self, text: &str) -> Result<OffsetDateTime, PanelError> {
        let text = text.trim();
        let invalid = || PanelError::InvalidTimestamp(text.to_string());

        let prefix = text.get(..MINUTE_PREFIX).ok_or_else(invalid)?;
        let (date, clock) = prefix.split_at_checked(DATE_LENGTH).ok_or_else(invalid)?;
        let normalized = match clock.strip_prefix(' ') {
            Some(rest) => format!("{date}T{rest}"),
            None => prefix.to_string(),
        };

        let local = PrimitiveDateTime::parse(
            &normalized,
            format_description!("[year]-[month]-[day]T[hour]:[minute]"),
        )
        .map_err(|_| invalid())?;

        Ok(local
            .assume_offset(self.zone.offset_of_local(local))
            .to_offset(UtcOffset::UTC))
    }
}

impl Default for DateTimeCodec {
    fn default() -> Self {
        Self::new(UtcOffset::UTC)
    }
}
