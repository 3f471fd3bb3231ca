//! ISO-8601 week arithmetic.
//!
//! Weeks start on Monday and week 1 is the week holding the year's first
//! Thursday, so the first days of January can belong to the last week of the
//! previous year and the last days of December to week 1 of the next one.
//! Every function works on plain calendar dates; there is no time of day and
//! therefore no timezone or DST shift to get wrong.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use time::{Date, Duration, Month, OffsetDateTime, UtcOffset, Weekday};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WeekError {
    #[error("invalid week identifier {0:?}, expected YYYY-Www")]
    InvalidFormat(String),
    #[error("week {week} does not exist in {year}")]
    WeekOutOfRange { year: i32, week: u8 },
    #[error("year {0} is out of range")]
    YearOutOfRange(i32),
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// A (year, week) pair, printed as `"YYYY-Www"`.
///
/// The year is the ISO week-numbering year, which differs from the calendar
/// year for a few days around New Year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeekId {
    year: i32,
    week: u8,
    monday: Date,
}

impl WeekId {
    pub fn new(year: i32, week: u8) -> Result<Self, WeekError> {
        let jan4 = Date::from_calendar_date(year, Month::January, 4)
            .map_err(|_| WeekError::YearOutOfRange(year))?;

        if week == 0 || week > time::util::weeks_in_year(year) {
            return Err(WeekError::WeekOutOfRange { year, week });
        }

        // January 4th always lies in week 1.
        let monday = jan4
            .checked_sub(Duration::days(days_from_monday(jan4)))
            .and_then(|week_one| week_one.checked_add(Duration::weeks(i64::from(week) - 1)))
            .ok_or(WeekError::YearOutOfRange(year))?;

        Ok(Self { year, week, monday })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn week(&self) -> u8 {
        self.week
    }

    pub fn monday(&self) -> Date {
        self.monday
    }

    pub fn sunday(&self) -> Date {
        self.monday.saturating_add(Duration::days(6))
    }
}

impl fmt::Display for WeekId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-W{:02}", self.year, self.week)
    }
}

impl FromStr for WeekId {
    type Err = WeekError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || WeekError::InvalidFormat(s.to_string());

        let (year, week) = s.trim().split_once("-W").ok_or_else(invalid)?;
        let digits = |part: &str, len: usize| {
            part.len() == len && part.chars().all(|c| c.is_ascii_digit())
        };
        if !digits(year, 4) || !digits(week, 2) {
            return Err(invalid());
        }

        let year = year.parse().map_err(|_| invalid())?;
        let week = week.parse().map_err(|_| invalid())?;
        WeekId::new(year, week)
    }
}

impl TryFrom<String> for WeekId {
    type Error = WeekError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WeekId> for String {
    fn from(week: WeekId) -> Self {
        week.to_string()
    }
}

fn days_from_monday(date: Date) -> i64 {
    i64::from(date.weekday().number_days_from_monday())
}

/// The Thursday of `date`'s week decides which year the week belongs to.
fn thursday_of(date: Date) -> Date {
    date.saturating_add(Duration::days(3 - days_from_monday(date)))
}

/// ISO week number of `date` (1..=53).
pub fn week_number(date: Date) -> u8 {
    let thursday = thursday_of(date);
    // Days elapsed since January 1st plus one, divided by seven, rounded up.
    thursday.ordinal().div_ceil(7) as u8
}

/// The week `date` falls in.
pub fn week_id_of(date: Date) -> WeekId {
    let thursday = thursday_of(date);
    WeekId {
        year: thursday.year(),
        week: week_number(date),
        monday: monday_of_date(date),
    }
}

/// Monday of the given week.
pub fn monday_of(week: WeekId) -> Date {
    week.monday()
}

pub fn monday_of_date(date: Date) -> Date {
    date.saturating_sub(Duration::days(days_from_monday(date)))
}

/// Monday and Sunday of the given week.
pub fn week_bounds(week: WeekId) -> (Date, Date) {
    (week.monday(), week.sunday())
}

pub fn weeks_in_year(year: i32) -> u8 {
    time::util::weeks_in_year(year)
}

/// Today in the local timezone, falling back to UTC when the local offset is
/// unknown.
pub fn today() -> Date {
    OffsetDateTime::now_utc()
        .to_offset(UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC))
        .date()
}

pub fn current_week_id() -> WeekId {
    week_id_of(today())
}

/// Only the current week accepts new or submitted hours.
pub fn is_week_closed(week: WeekId, current: WeekId) -> bool {
    week != current
}

const WEEKDAY_ABBREVIATIONS: [&str; 7] = ["Dom", "Lun", "Mar", "Mié", "Jue", "Vie", "Sáb"];

/// Weekday abbreviation and day/month, e.g. `"Lun 1/1"`.
pub fn format_short(date: Date) -> String {
    let weekday = WEEKDAY_ABBREVIATIONS[date.weekday().number_days_from_sunday() as usize];
    format!("{} {}/{}", weekday, date.day(), date.month() as u8)
}

/// `dd/mm/yyyy`.
pub fn format_full(date: Date) -> String {
    format!(
        "{:02}/{:02}/{:04}",
        date.day(),
        date.month() as u8,
        date.year()
    )
}

pub fn format_iso_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        date.month() as u8,
        date.day()
    )
}

pub fn parse_iso_date(s: &str) -> Result<Date, WeekError> {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    Date::parse(s.trim(), &format).map_err(|_| WeekError::InvalidDate(s.to_string()))
}

/// Monday through Friday, the columns of the weekly hours grid.
pub const WORK_WEEK: [Weekday; 5] = [
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
];
