use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Errors produced while parsing calendar values supplied by callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    #[error("invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),
    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),
}

/// Parses a date from either `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// Timestamps are reduced to their UTC calendar date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|timestamp| timestamp.with_timezone(&Utc).date_naive())
}

/// Resolves an IANA timezone name.
pub fn parse_timezone(name: &str) -> Result<Tz, CalendarError> {
    name.parse()
        .map_err(|_| CalendarError::InvalidTimezone(name.to_string()))
}

/// Returns the calendar date of `now` in `tz`.
pub fn local_date(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// `deserialize_with` helper for optional dates; unparseable input becomes `None`.
pub mod lenient_date {
    use super::*;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(|value| value.as_str()).and_then(parse_date))
    }
}

/// A calendar month, used to bucket expenses on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Month that contains `now` when observed from `tz`.
    pub fn containing(now: DateTime<Utc>, tz: Tz) -> Self {
        Self::of(local_date(now, tz))
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = CalendarError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || CalendarError::InvalidMonth(value.to_string());
        let (year, month) = value.trim().split_once('-').ok_or_else(invalid)?;
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_plain_dates_and_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1).expect("valid date");
        assert_eq!(parse_date("2024-05-01"), Some(expected));
        assert_eq!(parse_date("2024-05-01T10:30:00.000Z"), Some(expected));
        assert_eq!(parse_date("2024-05-01T23:30:00-02:00").map(|d| d.day()), Some(2));
        assert_eq!(parse_date("yesterday"), None);
    }

    #[test]
    fn month_boundary_follows_timezone() {
        let now = Utc.with_ymd_and_hms(2024, 5, 31, 20, 0, 0).unwrap();
        let utc = YearMonth::containing(now, chrono_tz::UTC);
        let kolkata = YearMonth::containing(now, chrono_tz::Asia::Kolkata);
        assert_eq!(utc.to_string(), "2024-05");
        assert_eq!(kolkata.to_string(), "2024-06");
    }

    #[test]
    fn parses_year_month() {
        let month: YearMonth = "2024-03".parse().expect("valid month");
        assert_eq!((month.year(), month.month()), (2024, 3));
        assert!("2024-13".parse::<YearMonth>().is_err());
        assert!("March".parse::<YearMonth>().is_err());
    }

    #[test]
    fn contains_matches_year_and_month() {
        let month = YearMonth::new(2024, 3).expect("valid");
        assert!(month.contains(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()));
        assert!(!month.contains(NaiveDate::from_ymd_opt(2023, 3, 1).unwrap()));
    }

    #[test]
    fn rejects_unknown_timezone() {
        assert!(parse_timezone("Asia/Kolkata").is_ok());
        assert_eq!(
            parse_timezone("Mars/Base").unwrap_err(),
            CalendarError::InvalidTimezone("Mars/Base".to_string())
        );
    }
}
