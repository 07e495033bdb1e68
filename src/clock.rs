//! Time source for time-dependent defaults.
//!
//! DataCite falls back to the current year when a record has no publication
//! year. Going through [`Clock`] keeps conversions reproducible: tests pin
//! the time with [`FixedClock`].
//!
//! [`parse_timestamp`] reads the loosely formatted timestamps found in
//! catalog records.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Source of the current time.
pub trait Clock: fmt::Debug + Send + Sync {
    /// Current instant in UTC.
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar year.
    fn current_year(&self) -> i32 {
        self.now().year()
    }
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Freezes the clock at midnight UTC on 1 January of `year`.
    ///
    /// Years chrono cannot represent fall back to the Unix epoch.
    #[must_use]
    pub fn at_year(year: i32) -> Self {
        Self(
            Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0)
                .single()
                .unwrap_or_default(),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Parses a record timestamp.
///
/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.ffffff]` (read as UTC),
/// the same with a space separator, and bare `YYYY-MM-DD` dates.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}
