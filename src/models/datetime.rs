//! Lenient timestamp parsing for request bodies and query strings.
//!
//! Accepts RFC 3339 as well as offset-less `YYYY-MM-DDTHH:MM[:SS[.fff]]` (what a
//! `datetime-local` input submits); the latter is read as UTC.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{de::Error as _, Deserialize, Deserializer};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// `Option<DateTime<Utc>>` field; pair with `#[serde(default)]`.
pub fn option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse(&raw)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid datetime: {raw}"))),
        None => Ok(None),
    }
}

/// Partial-update field: absent stays `None`, `null` becomes `Some(None)`.
pub fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    option(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_accepts_offsets_and_naive_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();

        assert_eq!(parse("2024-03-01T09:00:00Z"), Some(expected));
        assert_eq!(parse("2024-03-01T11:00:00+02:00"), Some(expected));
        assert_eq!(parse("2024-03-01T09:00"), Some(expected));
        assert_eq!(parse("2024-03-01T09:00:00"), Some(expected));
        assert_eq!(parse("2024-03-01 09:00:00"), Some(expected));
        assert_eq!(
            parse("2024-03-01T09:00:00.250"),
            Some(expected + chrono::Duration::milliseconds(250))
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse("tomorrow"), None);
        assert_eq!(parse("2024-03-01"), None);
        assert_eq!(parse(""), None);
    }
}
