//! Epoch clocks, calendar helpers and time-layout conversion.
//!
//! All layout helpers work in UTC.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

/// Reference-layout tokens and their strftime counterparts, longest match first.
const TUP_REFERENCE_LAYOUT_TOKENS: [(&str, &str); 27] = [
    ("January", "%B"),
    ("Monday", "%A"),
    ("2006", "%Y"),
    ("-07:00", "%:z"),
    ("-0700", "%z"),
    ("Z07:00", "%:z"),
    (".000000000", "%.9f"),
    (".000000", "%.6f"),
    (".000", "%.3f"),
    ("Jan", "%b"),
    ("Mon", "%a"),
    ("MST", "%Z"),
    ("_2", "%e"),
    ("01", "%m"),
    ("02", "%d"),
    ("03", "%I"),
    ("04", "%M"),
    ("05", "%S"),
    ("06", "%y"),
    ("15", "%H"),
    ("PM", "%p"),
    ("pm", "%P"),
    ("1", "%-m"),
    ("2", "%-d"),
    ("3", "%-I"),
    ("4", "%-M"),
    ("5", "%-S"),
];

/// Current unix time in seconds.
pub fn unix_second() -> i64 {
    Utc::now().timestamp()
}

/// Current unix time in milliseconds.
pub fn unix_millisecond() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn get_year(t: &impl Datelike) -> i32 {
    t.year()
}

/// Month number, 1-based.
pub fn get_month(t: &impl Datelike) -> u32 {
    t.month()
}

pub fn get_day(t: &impl Datelike) -> u32 {
    t.day()
}

/// Number of days in `month` of `year`; `None` when `month` is outside `1..=12`.
pub fn derive_days_of_month(year: i32, month: u32) -> Option<u32> {
    match month {
        2 => {
            let if_leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
            Some(if if_leap { 29 } else { 28 })
        }
        4 | 6 | 9 | 11 => Some(30),
        1 | 3 | 5 | 7 | 8 | 10 | 12 => Some(31),
        _ => None,
    }
}

/// Number of days in the month containing `t`.
pub fn derive_days_of_month_by_time(t: &impl Datelike) -> u32 {
    // month() is always within 1..=12
    derive_days_of_month(t.year(), t.month()).unwrap_or(31)
}

/// Translate a reference layout (`2006-01-02 15:04:05`) into strftime.
///
/// Layouts that already contain `%` are treated as strftime and returned as-is.
pub fn convert_reference_layout(layout: &str) -> String {
    if layout.contains('%') {
        return layout.to_string();
    }

    let mut c_fmt = String::with_capacity(layout.len() * 2);
    let mut c_rest = layout;
    'outer: while !c_rest.is_empty() {
        for (c_token, c_strftime) in TUP_REFERENCE_LAYOUT_TOKENS {
            if let Some(c_tail) = c_rest.strip_prefix(c_token) {
                c_fmt.push_str(c_strftime);
                c_rest = c_tail;
                continue 'outer;
            }
        }
        let mut iter_chars = c_rest.chars();
        if let Some(chr) = iter_chars.next() {
            c_fmt.push(chr);
        }
        c_rest = iter_chars.as_str();
    }
    c_fmt
}

/// Render unix seconds with `layout` (reference or strftime), in UTC.
///
/// Returns `None` for out-of-range timestamps or invalid layouts.
pub fn format_unix_seconds(secs: i64, layout: &str) -> Option<String> {
    let c_fmt = convert_reference_layout(layout);
    if StrftimeItems::new(&c_fmt).any(|item| matches!(item, Item::Error)) {
        return None;
    }
    let dt = DateTime::<Utc>::from_timestamp(secs, 0)?;

    let mut c_out = String::new();
    write!(c_out, "{}", dt.format(&c_fmt)).ok()?;
    Some(c_out)
}

/// Parse `text` with `layout` (reference or strftime) into unix seconds.
///
/// Layouts without an offset are read as UTC; date-only layouts read as midnight.
pub fn parse_unix_seconds(text: &str, layout: &str) -> Option<i64> {
    let c_fmt = convert_reference_layout(layout);
    let c_text = text.trim();

    if let Ok(dt) = DateTime::parse_from_str(c_text, &c_fmt) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(c_text, &c_fmt) {
        return Some(dt.and_utc().timestamp());
    }
    let date = NaiveDate::parse_from_str(c_text, &c_fmt).ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}
