//! Budget period: the (month, year) key of a budget record.

use std::ops::RangeInclusive;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Earliest accepted calendar year.
pub const MIN_YEAR: i32 = 1900;
/// Latest accepted calendar year.
pub const MAX_YEAR: i32 = 2999;

/// English month names indexed by zero-based month.
pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A calendar month within a year.
///
/// `month` is zero-indexed (0 = January, 11 = December), matching the wire
/// format of the budget API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawPeriod")]
pub struct BudgetPeriod {
    // Field order gives chronological `Ord`.
    year: i32,
    month: u8,
}

#[derive(Deserialize)]
struct RawPeriod {
    month: i64,
    year: i64,
}

impl TryFrom<RawPeriod> for BudgetPeriod {
    type Error = AppError;

    fn try_from(raw: RawPeriod) -> Result<Self, Self::Error> {
        let month = u8::try_from(raw.month)
            .map_err(|_| AppError::Validation(format!("month out of range: {}", raw.month)))?;
        let year = i32::try_from(raw.year)
            .map_err(|_| AppError::Validation(format!("year out of range: {}", raw.year)))?;
        Self::new(month, year)
    }
}

impl BudgetPeriod {
    /// Creates a period, validating the month and year.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if `month > 11` or the year is outside
    /// `MIN_YEAR..=MAX_YEAR`.
    pub fn new(month: u8, year: i32) -> Result<Self, AppError> {
        if month > 11 {
            return Err(AppError::Validation(format!(
                "month must be between 0 and 11, got {month}"
            )));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(AppError::Validation(format!(
                "year must be between {MIN_YEAR} and {MAX_YEAR}, got {year}"
            )));
        }
        Ok(Self { year, month })
    }

    /// The period containing today's local date.
    #[must_use]
    pub fn current() -> Self {
        let today = chrono::Local::now().date_naive();
        Self {
            year: today.year().clamp(MIN_YEAR, MAX_YEAR),
            month: u8::try_from(today.month0()).unwrap_or_default(),
        }
    }

    /// Zero-based month.
    #[must_use]
    pub const fn month(self) -> u8 {
        self.month
    }

    /// Calendar year.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// English name of the month.
    #[must_use]
    pub fn month_name(self) -> &'static str {
        MONTH_NAMES[usize::from(self.month)]
    }

    /// The following month, or `None` past `MAX_YEAR`.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        if self.month == 11 {
            Self::new(0, self.year + 1).ok()
        } else {
            Some(Self {
                month: self.month + 1,
                ..self
            })
        }
    }

    /// The preceding month, or `None` before `MIN_YEAR`.
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        if self.month == 0 {
            Self::new(11, self.year - 1).ok()
        } else {
            Some(Self {
                month: self.month - 1,
                ..self
            })
        }
    }

    /// The years offered by the period picker: two either side of `around`.
    #[must_use]
    pub fn selectable_years(around: i32) -> RangeInclusive<i32> {
        (around - 2)..=(around + 2)
    }
}

impl std::fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year)
    }
}
