//! Wire timestamps.
//!
//! The backend emits RFC 3339 instants with up to nanosecond precision. Only the
//! first 19 characters (`YYYY-MM-DDTHH:MM:SS`) and at most three fractional
//! digits are kept; anything finer is dropped instead of being rejected.

use serde::{Deserialize, Deserializer, Serializer};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::error::TimestampError;

const SECONDS_PREFIX: usize = 19;
const MAX_FRACTION_DIGITS: usize = 3;

pub fn parse(input: &str) -> Result<OffsetDateTime, TimestampError> {
    let input = input.trim();
    let head = input
        .get(..SECONDS_PREFIX)
        .ok_or_else(|| TimestampError::TooShort(input.to_string()))?;

    let base = PrimitiveDateTime::parse(
        head,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    )
    .map_err(|source| TimestampError::Parse {
        input: input.to_string(),
        source,
    })?;

    let mut rest = &input[SECONDS_PREFIX..];
    let mut millis = 0i64;
    if let Some(fraction) = rest.strip_prefix('.') {
        let digits = fraction.bytes().take_while(u8::is_ascii_digit).count();
        let kept = &fraction[..digits.min(MAX_FRACTION_DIGITS)];
        let scale = 10i64.pow((MAX_FRACTION_DIGITS - kept.len()) as u32);
        millis = kept.parse::<i64>().unwrap_or(0) * scale;
        rest = &fraction[digits..];
    }

    let offset = match rest {
        "" | "Z" | "z" => UtcOffset::UTC,
        suffix => UtcOffset::parse(
            suffix,
            format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
        )
        .map_err(|source| TimestampError::Parse {
            input: input.to_string(),
            source,
        })?,
    };

    Ok(base.assume_offset(offset).to_offset(UtcOffset::UTC) + Duration::milliseconds(millis))
}

pub fn format(value: OffsetDateTime) -> Result<String, time::error::Format> {
    value.to_offset(UtcOffset::UTC).format(&Rfc3339)
}

pub fn serialize<S: Serializer>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    let text = format(*value).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&text)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<OffsetDateTime, D::Error> {
    let text = String::deserialize(deserializer)?;
    parse(&text).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn test_parse_plain_utc() {
        assert_eq!(
            parse("2023-09-12T19:30:00Z").unwrap(),
            datetime!(2023-09-12 19:30:00 UTC)
        );
    }

    #[test]
    fn test_parse_drops_sub_millisecond_digits() {
        assert_eq!(
            parse("2023-09-12T19:30:00.123456789Z").unwrap(),
            datetime!(2023-09-12 19:30:00.123 UTC)
        );
        assert_eq!(
            parse("2023-09-12T19:30:00.5Z").unwrap(),
            datetime!(2023-09-12 19:30:00.5 UTC)
        );
    }

    #[test]
    fn test_parse_honours_offset() {
        assert_eq!(
            parse("2023-09-12T21:30:00+02:00").unwrap(),
            datetime!(2023-09-12 19:30:00 UTC)
        );
    }

    #[test]
    fn test_parse_without_offset_is_utc() {
        assert_eq!(
            parse("2023-09-12T19:30:00").unwrap(),
            datetime!(2023-09-12 19:30:00 UTC)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse("soon"), Err(TimestampError::TooShort(_))));
        assert!(matches!(
            parse("2023-13-12T19:30:00Z"),
            Err(TimestampError::Parse { .. })
        ));
    }

    #[test]
    fn test_format_is_utc_rfc3339() {
        let value = datetime!(2023-09-12 21:30:00 +02:00);

        assert_eq!(format(value).unwrap(), "2023-09-12T19:30:00Z");
    }
}
