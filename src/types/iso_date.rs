//! Calendar dates as stored in the climate dataset
//!
//! The dataset stores dates as ISO-8601 `YYYY-MM-DD` strings. For that format lexicographic order
//! equals chronological order, so queries compare the strings directly in SQL. [IsoDate] is used
//! wherever a date needs to be parsed, validated or shifted.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use thiserror::Error;

/// `strftime` format of dates in the dataset and in request paths.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Years with exactly four digits. Outside this range `%Y` renders a sign or a fifth digit, and
/// the rendered strings no longer sort chronologically.
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 0..=9999;

/// Length of the trailing window used by the precipitation and temperature observation queries.
pub const TRAILING_WINDOW_DAYS: u64 = 365;

/// A calendar date that renders in canonical `YYYY-MM-DD` form.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct IsoDate(NaiveDate);

impl IsoDate {
    /// Returns a new IsoDate, or None if the year, month and day do not form a valid date within
    /// [YEAR_RANGE].
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        if !YEAR_RANGE.contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Returns the first day of the trailing window ending on this date.
    ///
    /// The window is inclusive at both ends: `[self - 365 days, self]`.
    pub fn window_start(self) -> Self {
        Self(
            self.0
                .checked_sub_days(Days::new(TRAILING_WINDOW_DAYS))
                .unwrap_or(NaiveDate::MIN),
        )
    }
}

/// Error parsing an [IsoDate]
#[derive(Debug, Error, PartialEq)]
pub enum IsoDateError {
    /// Not a `YYYY-MM-DD` calendar date
    #[error(transparent)]
    Parse(#[from] chrono::ParseError),

    /// Year that cannot be written with four digits
    #[error("year {0} is outside 0000-9999")]
    YearOutOfRange(i32),
}

impl FromStr for IsoDate {
    type Err = IsoDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(s, ISO_DATE_FORMAT)?;
        if !YEAR_RANGE.contains(&date.year()) {
            return Err(IsoDateError::YearOutOfRange(date.year()));
        }
        Ok(Self(date))
    }
}

impl fmt::Display for IsoDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(ISO_DATE_FORMAT))
    }
}
