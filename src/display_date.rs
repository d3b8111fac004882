//! Conversion between calendar dates and the `DD/MM/YYYY` strings clients send
//! and receive.

use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::domain_error::DomainError;

/// Day, month and four digit year, all zero-padded and separated by slashes.
const DISPLAY_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[day]/[month]/[year]");

/// Parse a `DD/MM/YYYY` string into a calendar date.
///
/// Parsing is strict: every component must be zero-padded, the separators
/// must be slashes, and the date must exist (e.g. "31/02/2024" is rejected).
///
/// # Errors
///
/// Returns a [DomainError::ValidationError] that quotes `display` if it is
/// not a valid date in the expected format.
pub fn parse_display_date(display: &str) -> Result<Date, DomainError> {
    let invalid_date = || {
        DomainError::validation(format!(
            "invalid date \"{display}\", expected a date in the format DD/MM/YYYY"
        ))
    };

    if !has_display_shape(display) {
        return Err(invalid_date());
    }

    Date::parse(display, DISPLAY_DATE_FORMAT).map_err(|_| invalid_date())
}

/// Format `date` as `DD/MM/YYYY`.
///
/// # Errors
///
/// Returns an error if `time` fails to write the formatted date.
pub fn format_display_date(date: Date) -> Result<String, time::error::Format> {
    date.format(DISPLAY_DATE_FORMAT)
}

/// Check for exactly two digits, a slash, two digits, a slash and four digits.
fn has_display_shape(display: &str) -> bool {
    let bytes = display.as_bytes();

    bytes.len() == 10
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            2 | 5 => *byte == b'/',
            _ => byte.is_ascii_digit(),
        })
}

/// Serialize and deserialize a [Date] as a `DD/MM/YYYY` string.
///
/// Use with `#[serde(with = "crate::display_date::display_date_format")]`.
pub mod display_date_format {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    use super::{format_display_date, parse_display_date};

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let display = format_display_date(*date).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&display)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let display = String::deserialize(deserializer)?;
        parse_display_date(&display).map_err(serde::de::Error::custom)
    }
}
