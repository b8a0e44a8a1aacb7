//! Conversion of spreadsheet date cells into calendar dates.
//!
//! Spreadsheets store dates as day counts in the 1900 date system: serial `1`
//! is 1900-01-01 and serial `60` is 1900-02-29, a day that never existed but
//! that the format inherited from Lotus 1-2-3. Every serial from `61` onwards
//! is therefore one day ahead of a naive count from the epoch, and the
//! conversion below compensates so results match what the spreadsheet shows.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::record::Value;

/// Display pattern used for every rendered date.
pub const DISPLAY_FORMAT: &str = "%m/%d/%Y";

/// First serial affected by the phantom 1900-02-29.
const PHANTOM_LEAP_DAY: i64 = 60;

/// Largest serial accepted (9999-12-31).
const MAX_SERIAL: i64 = 2_958_465;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M:%S"];

fn epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 31)
}

/// Converts a 1900-system serial into a calendar date.
///
/// The time-of-day fraction is discarded. Serials below `1`, the phantom leap
/// day and values past the end of the calendar yield `None`.
pub fn from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let days = serial.trunc() as i64;
    if !(1..=MAX_SERIAL).contains(&days) || days == PHANTOM_LEAP_DAY {
        return None;
    }
    let offset = if days > PHANTOM_LEAP_DAY { days - 1 } else { days };
    epoch()?.checked_add_signed(Duration::days(offset))
}

fn parse_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(serial) = text.parse::<f64>() {
        return from_serial(serial);
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| {
            DATETIME_FORMATS.iter().find_map(|format| {
                NaiveDateTime::parse_from_str(text, format)
                    .ok()
                    .map(|dt| dt.date())
            })
        })
}

/// Normalizes a raw cell into a calendar date.
///
/// Absent cells, blank text and anything that is neither a serial nor a
/// recognised date string produce `None`. This never fails.
pub fn normalize(raw: &Value) -> Option<NaiveDate> {
    match raw {
        Value::Absent => None,
        Value::Number(serial) => from_serial(*serial),
        Value::Text(text) => parse_text(text),
    }
}

/// Formats a date with [`DISPLAY_FORMAT`].
pub fn format_date(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}
