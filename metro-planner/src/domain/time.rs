//! Schedule time handling.
//!
//! GTFS-style feeds give stop times as "HH:MM:SS" strings measured from the
//! midnight of the service day. Trips that run past midnight keep counting,
//! so "25:10:00" is 01:10 on the following calendar day. `TimeOfDay` keeps
//! that representation and converts to an absolute instant only once the
//! service date is known.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

const SECS_PER_MINUTE: u32 = 60;
const SECS_PER_HOUR: u32 = 60 * SECS_PER_MINUTE;

/// Largest hour value accepted. Feeds rarely exceed 30; anything past
/// four days of overflow is a typo rather than a schedule.
const MAX_HOURS: u32 = 99;

/// A time of day on a service day, in whole seconds since its midnight.
///
/// Values of 24:00:00 and later are allowed and denote the following
/// calendar day(s).
///
/// # Examples
///
/// ```
/// use metro_planner::domain::TimeOfDay;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
/// let late = TimeOfDay::parse("25:10:00").unwrap();
/// assert_eq!(late.to_string(), "25:10:00");
///
/// let instant = late.on(date);
/// assert_eq!(instant.date(), NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
/// assert_eq!(instant.format("%H:%M").to_string(), "01:10");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    /// Start of the service day.
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);

    /// Create a time from hour, minute and second components.
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Result<Self, TimeError> {
        if hour > MAX_HOURS {
            return Err(TimeError::new("hour must be 0-99"));
        }
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        if second > 59 {
            return Err(TimeError::new("second must be 0-59"));
        }
        Ok(Self(hour * SECS_PER_HOUR + minute * SECS_PER_MINUTE + second))
    }

    /// Create a time from seconds since the service day's midnight.
    pub fn from_seconds(seconds: u32) -> Self {
        Self(seconds)
    }

    /// Parse a time from "HH:MM:SS" format.
    ///
    /// The hour may have one to two digits and may be 24 or more.
    ///
    /// # Examples
    ///
    /// ```
    /// use metro_planner::domain::TimeOfDay;
    ///
    /// assert!(TimeOfDay::parse("08:00:00").is_ok());
    /// assert!(TimeOfDay::parse("8:00:00").is_ok());
    /// assert!(TimeOfDay::parse("24:30:00").is_ok());
    ///
    /// assert!(TimeOfDay::parse("08:00").is_err());
    /// assert!(TimeOfDay::parse("08:60:00").is_err());
    /// assert!(TimeOfDay::parse("08:00:0").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let mut parts = s.split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TimeError::new("expected HH:MM:SS format"));
        };

        if h.is_empty() || h.len() > 2 {
            return Err(TimeError::new("hour must have one or two digits"));
        }
        let hour = parse_digits(h.as_bytes()).ok_or_else(|| TimeError::new("invalid hour digits"))?;

        if m.len() != 2 {
            return Err(TimeError::new("minute must have two digits"));
        }
        let minute =
            parse_digits(m.as_bytes()).ok_or_else(|| TimeError::new("invalid minute digits"))?;

        if sec.len() != 2 {
            return Err(TimeError::new("second must have two digits"));
        }
        let second =
            parse_digits(sec.as_bytes()).ok_or_else(|| TimeError::new("invalid second digits"))?;

        Self::from_hms(hour, minute, second)
    }

    /// Seconds since the service day's midnight.
    pub fn seconds(&self) -> u32 {
        self.0
    }

    /// Returns the hour, which may be 24 or more.
    pub fn hour(&self) -> u32 {
        self.0 / SECS_PER_HOUR
    }

    pub fn minute(&self) -> u32 {
        (self.0 % SECS_PER_HOUR) / SECS_PER_MINUTE
    }

    pub fn second(&self) -> u32 {
        self.0 % SECS_PER_MINUTE
    }

    /// Returns true if this time falls on a later calendar day than the
    /// service day it belongs to.
    pub fn is_overflow(&self) -> bool {
        self.hour() >= 24
    }

    /// The absolute instant of this time on the given service date.
    pub fn on(&self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(NaiveTime::MIN) + Duration::seconds(i64::from(self.0))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl std::str::FromStr for TimeOfDay {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

impl fmt::Debug for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TimeOfDay({self})")
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

/// Parse ASCII digit bytes into a u32.
fn parse_digits(bytes: &[u8]) -> Option<u32> {
    bytes.iter().try_fold(0u32, |acc, &b| {
        let d = (b as char).to_digit(10)?;
        Some(acc * 10 + d)
    })
}

/// Format an instant the way schedules print it.
pub fn format_instant(instant: NaiveDateTime) -> String {
    instant.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_valid_times() {
        let t = TimeOfDay::parse("00:00:00").unwrap();
        assert_eq!(t, TimeOfDay::MIDNIGHT);

        let t = TimeOfDay::parse("23:59:59").unwrap();
        assert_eq!(t.hour(), 23);
        assert_eq!(t.minute(), 59);
        assert_eq!(t.second(), 59);

        let t = TimeOfDay::parse("8:05:30").unwrap();
        assert_eq!(t.seconds(), 8 * 3600 + 5 * 60 + 30);
    }

    #[test]
    fn parse_overflow_hours() {
        let t = TimeOfDay::parse("24:00:00").unwrap();
        assert!(t.is_overflow());
        assert_eq!(t.hour(), 24);

        let t = TimeOfDay::parse("27:15:00").unwrap();
        assert_eq!(t.to_string(), "27:15:00");
    }

    #[test]
    fn reject_invalid_format() {
        assert!(TimeOfDay::parse("").is_err());
        assert!(TimeOfDay::parse("08:00").is_err());
        assert!(TimeOfDay::parse("08:00:00:00").is_err());
        assert!(TimeOfDay::parse("080000").is_err());
        assert!(TimeOfDay::parse("100:00:00").is_err());
        assert!(TimeOfDay::parse(":00:00").is_err());
    }

    #[test]
    fn reject_out_of_range_components() {
        assert!(TimeOfDay::parse("08:60:00").is_err());
        assert!(TimeOfDay::parse("08:00:60").is_err());
    }

    #[test]
    fn reject_non_digits() {
        assert!(TimeOfDay::parse("0a:00:00").is_err());
        assert!(TimeOfDay::parse("08:-1:00").is_err());
        assert!(TimeOfDay::parse("08:00:+1").is_err());
    }

    #[test]
    fn on_same_day() {
        let t = TimeOfDay::parse("08:10:00").unwrap();
        let instant = t.on(date(2024, 6, 14));
        assert_eq!(instant, date(2024, 6, 14).and_hms_opt(8, 10, 0).unwrap());
    }

    #[test]
    fn on_rolls_over_midnight() {
        let t = TimeOfDay::parse("24:05:00").unwrap();
        let instant = t.on(date(2024, 12, 31));
        assert_eq!(instant, date(2025, 1, 1).and_hms_opt(0, 5, 0).unwrap());
    }

    #[test]
    fn ordering_follows_seconds() {
        let a = TimeOfDay::parse("23:59:59").unwrap();
        let b = TimeOfDay::parse("24:00:00").unwrap();
        assert!(a < b);
    }

    #[test]
    fn serde_uses_string_form() {
        let t: TimeOfDay = serde_json::from_str("\"25:00:00\"").unwrap();
        assert_eq!(t.hour(), 25);
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"25:00:00\"");
        assert!(serde_json::from_str::<TimeOfDay>("\"25:00\"").is_err());
    }

    #[test]
    fn format_instant_is_full_precision() {
        let instant = date(2024, 6, 14).and_hms_opt(8, 0, 5).unwrap();
        assert_eq!(format_instant(instant), "2024-06-14 08:00:05");
    }
}
