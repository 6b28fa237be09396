use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid period `{input}`: expected YYYY-MM or YYYY-MM-DD")]
pub struct PeriodParseError {
    pub input: String,
}

/// A calendar month (`YYYY-MM`) or day (`YYYY-MM-DD`).
///
/// Field order matters: the derived `Ord` is chronological and matches the
/// lexicographic order of the rendered strings, since the year is always
/// four digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodToken {
    year: i32,
    month: u32,
    day: Option<u32>,
}

impl PeriodToken {
    pub fn month(year: i32, month: u32) -> Option<Self> {
        Self::validated(year, month, None)
    }

    pub fn day(year: i32, month: u32, day: u32) -> Option<Self> {
        Self::validated(year, month, Some(day))
    }

    fn validated(year: i32, month: u32, day: Option<u32>) -> Option<Self> {
        if !(1..=9999).contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, day.unwrap_or(1))?;
        Some(Self { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month_number(&self) -> u32 {
        self.month
    }

    pub fn is_day(&self) -> bool {
        self.day.is_some()
    }

    /// The month this token falls in, with any day component dropped.
    pub fn month_token(&self) -> Self {
        Self {
            day: None,
            ..*self
        }
    }

    /// The following calendar month; December rolls over into January.
    pub fn next_month(&self) -> Self {
        let first = NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .and_then(|d| d.checked_add_months(chrono::Months::new(1)));
        match first {
            Some(d) => Self {
                year: d.year(),
                month: d.month(),
                day: None,
            },
            // chrono's upper bound is far beyond year 9999
            None => Self {
                year: self.year + 1,
                month: 1,
                day: None,
            },
        }
    }

    /// Numeric `YYYYMM` key used by the spreadsheet report.
    pub fn month_key(&self) -> u32 {
        self.year as u32 * 100 + self.month
    }
}

impl fmt::Display for PeriodToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.day {
            Some(day) => write!(f, "{:04}-{:02}-{:02}", self.year, self.month, day),
            None => write!(f, "{:04}-{:02}", self.year, self.month),
        }
    }
}

impl FromStr for PeriodToken {
    type Err = PeriodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PeriodParseError {
            input: s.to_string(),
        };
        let s = s.trim();
        let parts: Vec<&str> = s.split('-').collect();

        let token = match parts[..] {
            [y, m] => Self::month(digits(y, 4).ok_or_else(err)? as i32, digits(m, 2).ok_or_else(err)?),
            [y, m, d] => Self::day(
                digits(y, 4).ok_or_else(err)? as i32,
                digits(m, 2).ok_or_else(err)?,
                digits(d, 2).ok_or_else(err)?,
            ),
            _ => None,
        };
        token.ok_or_else(err)
    }
}

/// A fixed-width run of ASCII digits.
fn digits(part: &str, width: usize) -> Option<u32> {
    if part.len() != width || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl Serialize for PeriodToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PeriodToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
