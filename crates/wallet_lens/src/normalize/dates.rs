//! Date-filter normalization so equivalent spellings produce identical
//! request keys.

use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

#[derive(Error, Debug)]
pub enum DateError {
    #[error("invalid date: {0}")]
    InvalidDate(String),
}

/// Canonicalize a user-supplied date filter to Unix seconds. Accepts a raw
/// Unix timestamp, an RFC3339 timestamp, or a bare `YYYY-MM-DD` date (taken
/// as midnight UTC).
pub fn normalize_date(raw: &str) -> Result<i64, DateError> {
    let raw = raw.trim();
    if let Ok(ts) = raw.parse::<i64>() {
        return Ok(ts);
    }
    if let Ok(dt) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Ok(dt.unix_timestamp());
    }
    let date_only = format_description!("[year]-[month]-[day]");
    let date = Date::parse(raw, &date_only)
        .map_err(|_| DateError::InvalidDate(raw.to_string()))?;
    Ok(date.midnight().assume_utc().unix_timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_seconds_pass_through() {
        assert_eq!(normalize_date("1700000000").unwrap(), 1_700_000_000);
    }

    #[test]
    fn rfc3339_converts() {
        assert_eq!(normalize_date("1970-01-01T00:01:00Z").unwrap(), 60);
    }

    #[test]
    fn bare_date_is_midnight_utc() {
        assert_eq!(normalize_date("1970-01-02").unwrap(), 86_400);
    }

    #[test]
    fn equivalent_spellings_agree() {
        let bare = normalize_date("2024-01-15").unwrap();
        let rfc = normalize_date("2024-01-15T00:00:00Z").unwrap();
        assert_eq!(bare, rfc);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(normalize_date("next tuesday").is_err());
    }
}
