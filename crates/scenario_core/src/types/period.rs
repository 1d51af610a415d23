//! Fiscal quarter labels and per-category amount records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::PeriodParseError;

/// A fiscal quarter such as `2023-Q2`.
///
/// Ordered chronologically. Serialises as its `YYYY-Qn` label. Years are
/// four digits, so every value has exactly one label and stepping off either
/// end of the range yields `None` rather than wrapping.
///
/// # Examples
/// ```
/// use scenario_core::types::FiscalQuarter;
///
/// let q: FiscalQuarter = "2023-Q4".parse().unwrap();
/// assert_eq!(q.next().unwrap().to_string(), "2024-Q1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FiscalQuarter {
    year: i32,
    quarter: u8,
}

impl FiscalQuarter {
    /// Earliest representable year.
    pub const MIN_YEAR: i32 = 1000;
    /// Latest representable year.
    pub const MAX_YEAR: i32 = 9999;

    /// Create a quarter, returning `None` when `quarter` is not in `1..=4`
    /// or `year` is outside `MIN_YEAR..=MAX_YEAR`.
    pub const fn new(year: i32, quarter: u8) -> Option<Self> {
        if year < Self::MIN_YEAR || year > Self::MAX_YEAR || quarter < 1 || quarter > 4 {
            None
        } else {
            Some(Self { year, quarter })
        }
    }

    /// First quarter of `year`, clamped into the representable range.
    pub const fn first_of(year: i32) -> Self {
        let year = if year < Self::MIN_YEAR {
            Self::MIN_YEAR
        } else if year > Self::MAX_YEAR {
            Self::MAX_YEAR
        } else {
            year
        };
        Self { year, quarter: 1 }
    }

    /// Calendar year.
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Quarter number in `1..=4`.
    pub fn quarter(&self) -> u8 {
        self.quarter
    }

    /// The following quarter, `None` after `MAX_YEAR`-Q4.
    pub fn next(&self) -> Option<Self> {
        if self.quarter == 4 {
            Self::new(self.year.checked_add(1)?, 1)
        } else {
            Self::new(self.year, self.quarter + 1)
        }
    }

    /// The same quarter one year earlier, `None` before `MIN_YEAR`.
    pub fn year_ago(&self) -> Option<Self> {
        Self::new(self.year.checked_sub(1)?, self.quarter)
    }
}

impl fmt::Display for FiscalQuarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-Q{}", self.year, self.quarter)
    }
}

impl FromStr for FiscalQuarter {
    type Err = PeriodParseError;

    /// Parse the canonical label only: four year digits, `-Q`, one quarter digit.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || PeriodParseError(s.to_string());
        let (year, quarter) = s.trim().split_once("-Q").ok_or_else(err)?;
        if year.len() != 4
            || quarter.len() != 1
            || !year.bytes().chain(quarter.bytes()).all(|b| b.is_ascii_digit())
        {
            return Err(err());
        }
        let year: i32 = year.parse().map_err(|_| err())?;
        let quarter: u8 = quarter.parse().map_err(|_| err())?;
        Self::new(year, quarter).ok_or_else(err)
    }
}

impl Serialize for FiscalQuarter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FiscalQuarter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// An amount booked against a category in one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmountRecord {
    /// Reporting period
    pub period: FiscalQuarter,
    /// Category (product line, cost centre, ...)
    pub category: String,
    /// Amount in currency units
    pub amount: f64,
}

impl AmountRecord {
    /// Create a new record.
    pub fn new(period: FiscalQuarter, category: impl Into<String>, amount: f64) -> Self {
        Self {
            period,
            category: category.into(),
            amount,
        }
    }
}
