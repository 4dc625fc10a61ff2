//! Service calendars.
//!
//! A trip runs on a date when its service is active: the weekday flag is set
//! and the date lies inside the validity range, unless an explicit exception
//! adds or removes that date.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Whether a calendar exception adds or removes service on its date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionKind {
    Added,
    Removed,
}

/// A one-off change to a service's regular pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarException {
    pub date: NaiveDate,
    pub kind: ExceptionKind,
}

/// Weekly service pattern with a validity range and exceptions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCalendar {
    /// Days of the week the service runs, Monday first.
    #[serde(default)]
    pub weekdays: [bool; 7],

    /// First date of the regular pattern (inclusive).
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Last date of the regular pattern (inclusive).
    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    #[serde(default)]
    pub exceptions: Vec<CalendarException>,
}

impl ServiceCalendar {
    /// A calendar running every day between two dates.
    pub fn daily(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            weekdays: [true; 7],
            start_date: Some(start_date),
            end_date: Some(end_date),
            exceptions: Vec::new(),
        }
    }

    /// Returns true if the weekly pattern includes the given weekday.
    pub fn runs_on_weekday(&self, weekday: Weekday) -> bool {
        self.weekdays[weekday.num_days_from_monday() as usize]
    }

    /// Returns true if the service is active on the date.
    ///
    /// Exceptions take precedence over the weekly pattern. A calendar with no
    /// validity range only runs on dates it is explicitly added for.
    pub fn is_active(&self, date: NaiveDate) -> bool {
        if let Some(exception) = self.exceptions.iter().rev().find(|e| e.date == date) {
            return exception.kind == ExceptionKind::Added;
        }

        let (Some(start), Some(end)) = (self.start_date, self.end_date) else {
            return false;
        };

        start <= date && date <= end && self.runs_on_weekday(date.weekday())
    }
}
