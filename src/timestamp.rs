//! Specifies how to serialize a [time::OffsetDateTime] in a custom format that
//! avoids serialisations with datetimes containing midnight.
//!
//! The default serializer for [time::OffsetDateTime] will serialize
//! "00:00:00.000000" as "0:00:00.0" and the deserializer would error out
//! because it expects the hours to be two digits, not one.
//!
//! Use with `#[serde(with = "crate::timestamp")]`.

use serde::{Deserialize, Deserializer, Serializer};
use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

/// Date time format for timestamps, e.g. "2021-01-01 00:00:00.000000 +00:00:00".
const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
         sign:mandatory]:[offset_minute]:[offset_second]"
);

pub fn serialize<S>(date_time: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let formatted = date_time
        .format(DATE_TIME_FORMAT)
        .map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&formatted)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    OffsetDateTime::parse(&text, DATE_TIME_FORMAT).map_err(serde::de::Error::custom)
}
