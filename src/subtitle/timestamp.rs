//! Timestamp conversion
//!
//! Two formatters exist and they are not interchangeable:
//! - [`format_timestamp`] is used by the compiler and truncates milliseconds.
//! - [`printable_timestamp`] is used for HLS segment files and rounds to the
//!   nearest millisecond before splitting into hours/minutes/seconds.

use regex::Regex;

/// Hours are optional and unbounded, the fraction has two or three digits.
pub(crate) fn timestamp_regex() -> &'static Regex {
    regex!(r"([0-9]+)?:?([0-9]{2}):([0-9]{2}\.[0-9]{2,3})")
}

/// Round to a fixed number of decimal places
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Check whether a timestamp appears in the given text
pub fn is_valid_timestamp(text: &str) -> bool {
    timestamp_regex().is_match(text)
}

/// Parse a `[H+:]MM:SS.mmm` timestamp into seconds, rounded to milliseconds
pub fn parse_timestamp(text: &str) -> Option<f64> {
    let caps = timestamp_regex().captures(text)?;

    let hours = match caps.get(1) {
        Some(h) => h.as_str().parse::<f64>().ok()?,
        None => 0.0,
    };
    let minutes = caps[2].parse::<f64>().ok()?;
    let seconds = caps[3].parse::<f64>().ok()?;

    Some(round_to(hours * 3600.0 + minutes * 60.0 + seconds, 3))
}

/// Format seconds as `HH:MM:SS.mmm`, truncating below the millisecond
///
/// The fraction is first rounded to four decimals, which absorbs float noise
/// such as `135.9999` being stored as `135.99989999...`.
pub fn format_timestamp(time: f64) -> String {
    let time = time.max(0.0);
    let mut whole = time.floor() as u64;
    let tenths_of_ms = ((time - time.floor()) * 10_000.0).round() as u64;
    let mut millis = tenths_of_ms / 10;
    if millis >= 1000 {
        whole += 1;
        millis -= 1000;
    }

    format!(
        "{:02}:{:02}:{:02}.{:03}",
        whole / 3600,
        (whole / 60) % 60,
        whole % 60,
        millis
    )
}

/// Format seconds as `HH:MM:SS.mmm` for HLS segment files
///
/// The millisecond part is extracted and rounded first, then removed from
/// the value before the whole seconds are decomposed.
pub fn printable_timestamp(time: f64) -> String {
    let time = time.max(0.0);
    let fraction = round_to(time % 1.0, 3);
    let mut whole = (time - fraction).round() as u64;
    let mut millis = (fraction * 1000.0).round() as u64;
    if millis >= 1000 {
        whole += 1;
        millis -= 1000;
    }

    let hours = whole / 3600;
    let minutes = (whole - hours * 3600) / 60;
    let seconds = whole - hours * 3600 - minutes * 60;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}
