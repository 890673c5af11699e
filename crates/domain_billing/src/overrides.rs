//! Seasonal rules and monthly overrides
//!
//! Both adjust what a facility bills for a month without touching its
//! contract. A seasonal rule recurs every year over a span of months; a
//! monthly override applies to exactly one calendar month and beats any
//! seasonal rule.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{BillingPeriod, FacilityProfileId, MonthlyOverrideId, SeasonalRuleId};

use crate::error::BillingError;
use crate::facility::FacilityStatus;

fn validate_month(month: u32, field: &str) -> Result<(), BillingError> {
    if !(1..=12).contains(&month) {
        return Err(BillingError::validation(format!(
            "{} {} is outside 1-12",
            field, month
        )));
    }
    Ok(())
}

fn validate_rate(rate: Option<Decimal>) -> Result<(), BillingError> {
    match rate {
        Some(r) if r.is_sign_negative() && !r.is_zero() => Err(BillingError::validation(
            format!("Rate {} must not be negative", r),
        )),
        _ => Ok(()),
    }
}

/// A recurring annual adjustment, e.g. "paused December through February"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalRule {
    pub id: SeasonalRuleId,
    pub facility_profile_id: FacilityProfileId,
    /// First covered month, 1-12
    pub start_month: u32,
    /// Last covered month, 1-12; may be less than `start_month` to wrap the year
    pub end_month: u32,
    pub status: Option<FacilityStatus>,
    pub rate: Option<Decimal>,
    pub frequency_per_week: Option<u32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl SeasonalRule {
    pub fn new(
        facility_profile_id: FacilityProfileId,
        start_month: u32,
        end_month: u32,
    ) -> Result<Self, BillingError> {
        validate_month(start_month, "Start month")?;
        validate_month(end_month, "End month")?;
        Ok(Self {
            id: SeasonalRuleId::new_v7(),
            facility_profile_id,
            start_month,
            end_month,
            status: None,
            rate: None,
            frequency_per_week: None,
            is_active: true,
            created_at: Utc::now(),
        })
    }

    pub fn with_status(mut self, status: FacilityStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_rate(mut self, rate: Decimal) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn with_frequency(mut self, frequency_per_week: u32) -> Self {
        self.frequency_per_week = Some(frequency_per_week);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Returns true if `month` falls inside the rule's span, inclusive
    ///
    /// Spans with `start_month > end_month` wrap around the new year, so
    /// 11..2 covers November, December, January, and February.
    pub fn covers(&self, month: u32) -> bool {
        if self.start_month <= self.end_month {
            month >= self.start_month && month <= self.end_month
        } else {
            month >= self.start_month || month <= self.end_month
        }
    }

    /// True if the rule is active and covers the period's month
    pub fn applies_to(&self, period: BillingPeriod) -> bool {
        self.is_active && self.covers(period.month())
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    pub fn validate(&self) -> Result<(), BillingError> {
        validate_month(self.start_month, "Start month")?;
        validate_month(self.end_month, "End month")?;
        validate_rate(self.rate)
    }
}

/// A one-off adjustment for a single calendar month
///
/// At most one override exists per facility and month; saving another for
/// the same pair replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyOverride {
    pub id: MonthlyOverrideId,
    pub facility_profile_id: FacilityProfileId,
    pub period: BillingPeriod,
    pub override_status: FacilityStatus,
    pub override_rate: Option<Decimal>,
    pub override_frequency: Option<u32>,
    pub override_notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl MonthlyOverride {
    pub fn new(
        facility_profile_id: FacilityProfileId,
        period: BillingPeriod,
        override_status: FacilityStatus,
    ) -> Self {
        Self {
            id: MonthlyOverrideId::new_v7(),
            facility_profile_id,
            period,
            override_status,
            override_rate: None,
            override_frequency: None,
            override_notes: None,
            updated_at: Utc::now(),
        }
    }

    /// Creates an override from raw year and month values
    pub fn for_month(
        facility_profile_id: FacilityProfileId,
        year: i32,
        month: u32,
        override_status: FacilityStatus,
    ) -> Result<Self, BillingError> {
        let period = BillingPeriod::new(year, month)?;
        Ok(Self::new(facility_profile_id, period, override_status))
    }

    pub fn with_rate(mut self, rate: Decimal) -> Self {
        self.override_rate = Some(rate);
        self
    }

    pub fn with_frequency(mut self, frequency_per_week: u32) -> Self {
        self.override_frequency = Some(frequency_per_week);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.override_notes = Some(notes.into());
        self
    }

    pub fn applies_to(&self, facility_profile_id: FacilityProfileId, period: BillingPeriod) -> bool {
        self.facility_profile_id == facility_profile_id && self.period == period
    }

    pub fn validate(&self) -> Result<(), BillingError> {
        validate_rate(self.override_rate)
    }
}
