//! Tolerant parsing of tag date text
//!
//! Tag frames carry dates at whatever precision the tagger had: full dates,
//! year-month, bare years, ISO timestamps, and legacy placeholders such as
//! `"0"`. Everything that does not resolve to a real calendar date becomes
//! `None`; year zero is never produced.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Calendar date with optional month/day precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TagDate {
    year: u16,
    month: Option<u8>,
    day: Option<u8>,
}

impl TagDate {
    /// Year-only date
    pub fn from_year(year: u32) -> Option<Self> {
        if year == 0 || year > 9999 {
            return None;
        }
        Some(Self {
            year: year as u16,
            month: None,
            day: None,
        })
    }

    /// Full date, validated against the calendar
    pub fn from_ymd(year: u32, month: u32, day: u32) -> Option<Self> {
        let date = NaiveDate::from_ymd_opt(year as i32, month, day)?;
        Self::from_naive(date)
    }

    /// Year-month date
    pub fn from_ym(year: u32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year as i32, month, 1)?;
        let mut date = Self::from_year(year)?;
        date.month = Some(month as u8);
        Some(date)
    }

    /// Convert from a chrono date
    pub fn from_naive(date: NaiveDate) -> Option<Self> {
        if date.year() <= 0 || date.year() > 9999 {
            return None;
        }
        Some(Self {
            year: date.year() as u16,
            month: Some(date.month() as u8),
            day: Some(date.day() as u8),
        })
    }

    /// Parse raw frame text
    ///
    /// Accepts `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, `/` separators and ISO
    /// timestamps (`T` or space before the time). An invalid month or day
    /// truncates precision instead of rejecting the year.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let date_part = raw
            .split(|c: char| c == 'T' || c == ' ')
            .next()
            .unwrap_or_default();

        let parts: Vec<&str> = date_part.split(['-', '/']).collect();

        // Bare short years are tolerated; compound dates need a 4-digit year
        let year_text = parts[0];
        if year_text.len() != 4 && !(year_text.len() < 4 && parts.len() == 1) {
            return None;
        }
        let year: u32 = parse_digits(year_text)?;
        let mut date = Self::from_year(year)?;

        let Some(month) = parts.get(1).and_then(|p| parse_digits(p)) else {
            return Some(date);
        };
        match Self::from_ym(year, month) {
            Some(with_month) => date = with_month,
            None => return Some(date),
        }

        let Some(day) = parts.get(2).and_then(|p| parse_digits(p)) else {
            return Some(date);
        };
        Some(Self::from_ymd(year, month, day).unwrap_or(date))
    }

    pub fn year(&self) -> u32 {
        self.year as u32
    }

    pub fn month(&self) -> Option<u32> {
        self.month.map(u32::from)
    }

    pub fn day(&self) -> Option<u32> {
        self.day.map(u32::from)
    }

    /// True when the source supplied at least a month
    pub fn has_month(&self) -> bool {
        self.month.is_some()
    }

    /// Full calendar date, if day precision is present
    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year as i32, self.month()?, self.day()?)
    }
}

impl fmt::Display for TagDate {
    /// ISO rendering at the date's own precision
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.year)?;
        if let Some(month) = self.month {
            write!(f, "-{:02}", month)?;
            if let Some(day) = self.day {
                write!(f, "-{:02}", day)?;
            }
        }
        Ok(())
    }
}

fn parse_digits(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Split a date frame into the canonical (date, year) pair
///
/// The year always follows the frame. The date is kept only when the frame
/// was more precise than a bare year.
pub fn split_date_frame(raw: Option<&str>) -> (Option<TagDate>, Option<u32>) {
    match raw.and_then(TagDate::parse) {
        Some(date) => {
            let year = Some(date.year());
            if date.has_month() {
                (Some(date), year)
            } else {
                (None, year)
            }
        }
        None => (None, None),
    }
}

/// Text to store in a single date frame: the date if known, else the year
pub fn join_date_frame(date: Option<&TagDate>, year: Option<u32>) -> Option<String> {
    match (date, year.filter(|&y| y > 0)) {
        (Some(date), _) => Some(date.to_string()),
        (None, Some(year)) => Some(format!("{:04}", year)),
        (None, None) => None,
    }
}
