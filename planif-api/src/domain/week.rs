//! Week bucketing.
//!
//! Charges, capacities and milestones are fetched independently and joined on
//! the week they fall in. A week is always identified by its Monday, rendered
//! `YYYY-MM-DD` by [`WeekKey`]'s `Display`, and nothing else formats week keys.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Days, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

const WEEK_KEY_FORMAT: &str = "%Y-%m-%d";

/// Monday of the week containing `date`.
///
/// Dates in the first, partial week chrono can represent map to its minimum.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
        .unwrap_or(NaiveDate::MIN)
}

/// ISO-8601 week number (weeks start on Monday, week 1 holds the year's first Thursday).
pub fn week_number(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

pub fn week_key(date: NaiveDate) -> WeekKey {
    WeekKey(week_start(date))
}

/// `count` consecutive weeks, starting with the week that contains `from`.
///
/// Shorter than `count` when the axis would run past the last representable date.
pub fn week_axis(from: NaiveDate, count: usize) -> Vec<WeekKey> {
    std::iter::successors(Some(week_key(from)), WeekKey::next)
        .take(count)
        .collect()
}

/// Canonical join key for everything that happens "in the same week".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekKey(NaiveDate);

impl WeekKey {
    pub fn number(&self) -> u32 {
        week_number(self.0)
    }

    /// ISO week-based year, which differs from the calendar year around new year.
    pub fn iso_year(&self) -> i32 {
        self.0.iso_week().year()
    }

    pub fn next(&self) -> Option<Self> {
        self.0.checked_add_days(Days::new(7)).map(Self)
    }
}

impl From<NaiveDate> for WeekKey {
    fn from(date: NaiveDate) -> Self {
        week_key(date)
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(WEEK_KEY_FORMAT))
    }
}

impl FromStr for WeekKey {
    type Err = chrono::ParseError;

    /// Parses a `YYYY-MM-DD` date and snaps it to its Monday.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let date = NaiveDate::parse_from_str(s.trim(), WEEK_KEY_FORMAT)?;
        Ok(week_key(date))
    }
}

impl Serialize for WeekKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WeekKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|e| de::Error::custom(format!("invalid week date '{}': {}", raw, e)))
    }
}
