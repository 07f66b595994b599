use serde::Serializer;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// Truncate a tweet timestamp to its calendar date.
///
/// Accepts RFC 3339 timestamps (`2021-02-24T09:23:35+00:00`), other ISO 8601
/// date-times that start `YYYY-MM-DDTHH:MM` or `YYYY-MM-DD HH:MM` (no offset,
/// basic `+hhmm` offset, `Z`), and bare `YYYY-MM-DD` dates. The date is taken
/// as written: the offset is not applied. Anything else yields `None`.
pub fn tweet_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    if raw.len() <= 10 {
        return calendar_date(raw);
    }
    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(dt.date());
    }
    if has_clock_after_date(raw.as_bytes()) {
        return raw.get(..10).and_then(calendar_date);
    }
    None
}

fn calendar_date(s: &str) -> Option<Date> {
    Date::parse(s, format_description!("[year]-[month]-[day]")).ok()
}

/// `....-..-..` followed by `T` or a space and `HH:MM`.
fn has_clock_after_date(b: &[u8]) -> bool {
    b.len() >= 16
        && matches!(b[10], b'T' | b't' | b' ')
        && b[11].is_ascii_digit()
        && b[12].is_ascii_digit()
        && b[13] == b':'
        && b[14].is_ascii_digit()
        && b[15].is_ascii_digit()
}

/// Serialize a `Date` as `YYYY-MM-DD`.
pub fn serialize_iso_date<S: Serializer>(date: &Date, s: S) -> Result<S::Ok, S::Error> {
    let fmt = format_description!("[year]-[month]-[day]");
    let text = date.format(fmt).map_err(serde::ser::Error::custom)?;
    s.serialize_str(&text)
}
