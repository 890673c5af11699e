//! Calendar types for monthly billing
//!
//! Billing resolves at month granularity. [`BillingPeriod`] names one calendar
//! month; [`MonthWindow`] is an inclusive span of months, used for pause
//! windows whose day-level dates are collapsed to the months they fall in.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Earliest year accepted for a billing period
pub const MIN_BILLING_YEAR: i32 = 1900;
/// Latest year accepted for a billing period
pub const MAX_BILLING_YEAR: i32 = 9999;

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid month {0}: expected 1-12")]
    InvalidMonth(u32),

    #[error("Year {0} is outside the supported range 1900-9999")]
    YearOutOfRange(i32),

    #[error("Invalid window: start {start} is after end {end}")]
    InvalidWindow {
        start: String,
        end: String,
    },
}

/// Timezone wrapper for company-local "current month" decisions
///
/// Wraps chrono_tz::Tz with string serialization ("America/Chicago").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tz::from_str(&s)
            .map(Timezone)
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Returns the local calendar date of a UTC instant
    pub fn local_date(&self, utc: DateTime<Utc>) -> NaiveDate {
        utc.with_timezone(&self.0).date_naive()
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self(chrono_tz::UTC)
    }
}

/// One calendar month, the unit every billing resolution is keyed on
///
/// Ordering is chronological (year first, then month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBillingPeriod")]
pub struct BillingPeriod {
    year: i32,
    month: u32,
}

/// Unvalidated wire shape of a billing period
#[derive(Deserialize)]
struct RawBillingPeriod {
    year: i32,
    month: u32,
}

impl TryFrom<RawBillingPeriod> for BillingPeriod {
    type Error = TemporalError;

    fn try_from(raw: RawBillingPeriod) -> Result<Self, Self::Error> {
        BillingPeriod::new(raw.year, raw.month)
    }
}

impl BillingPeriod {
    /// Creates a validated billing period
    ///
    /// # Errors
    ///
    /// `InvalidMonth` when `month` is outside 1-12, `YearOutOfRange` when the
    /// year falls outside the supported calendar range.
    pub fn new(year: i32, month: u32) -> Result<Self, TemporalError> {
        if !(1..=12).contains(&month) {
            return Err(TemporalError::InvalidMonth(month));
        }
        if !(MIN_BILLING_YEAR..=MAX_BILLING_YEAR).contains(&year) {
            return Err(TemporalError::YearOutOfRange(year));
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The current month as seen from `tz`
    pub fn current_in(tz: &Timezone) -> Self {
        Self::containing(tz.local_date(Utc::now()))
    }

    /// The current month in UTC
    pub fn current() -> Self {
        Self::current_in(&Timezone::default())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The preceding month; January rolls back to December of the prior year
    pub fn previous(&self) -> Result<Self, TemporalError> {
        if self.month == 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    /// The following month; December rolls forward to January
    pub fn next(&self) -> Result<Self, TemporalError> {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    /// First calendar day of the month
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Human-readable label, e.g. "October 2026"
    pub fn label(&self) -> String {
        let name = MONTH_NAMES
            .get(self.month.saturating_sub(1) as usize)
            .copied()
            .unwrap_or("Unknown");
        format!("{} {}", name, self.year)
    }

    /// Returns true if `date` falls inside this month
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// An inclusive span of months, optionally open-ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthWindow {
    pub start: BillingPeriod,
    /// None means the window never ends
    pub end: Option<BillingPeriod>,
}

impl MonthWindow {
    pub fn new(start: BillingPeriod, end: Option<BillingPeriod>) -> Result<Self, TemporalError> {
        if let Some(end) = end {
            if end < start {
                return Err(TemporalError::InvalidWindow {
                    start: start.to_string(),
                    end: end.to_string(),
                });
            }
        }
        Ok(Self { start, end })
    }

    /// Collapses day-level dates to the months containing them
    pub fn from_dates(start: NaiveDate, end: Option<NaiveDate>) -> Result<Self, TemporalError> {
        Self::new(
            BillingPeriod::containing(start),
            end.map(BillingPeriod::containing),
        )
    }

    pub fn contains(&self, period: BillingPeriod) -> bool {
        period >= self.start && self.end.map_or(true, |end| period <= end)
    }

    pub fn is_open_ended(&self) -> bool {
        self.end.is_none()
    }
}
