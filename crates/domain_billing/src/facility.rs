//! Facility profiles
//!
//! A facility profile is one billable service unit installed at a client
//! location. It carries the contracted defaults (status, monthly rate,
//! weekly frequency) that apply unless a higher-precedence rule overrides
//! them for a given month.
//!
//! # Lifecycle
//!
//! ```text
//! PendingApproval ──► Active ◄──► Paused
//!        │              │           │
//!        └──────────────┴───────────┴──► Closed (terminal)
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use core_kernel::{ClientId, FacilityProfileId, LocationId, MonthWindow, TemporalError};

use crate::client::Client;
use crate::error::BillingError;

/// Stored contract status of a facility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FacilityStatus {
    /// Signed but not yet approved for service
    PendingApproval,
    Active,
    Paused,
    Closed,
}

impl FacilityStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FacilityStatus::Closed)
    }

    /// Returns true if moving from `self` to `target` is allowed
    pub fn can_transition_to(&self, target: FacilityStatus) -> bool {
        match (self, target) {
            (FacilityStatus::Closed, FacilityStatus::Closed) => true,
            (FacilityStatus::Closed, _) => false,
            _ => true,
        }
    }
}

/// Status actually in effect for one month, after all rules are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectiveStatus {
    Active,
    Pending,
    Paused,
    Closed,
}

impl EffectiveStatus {
    /// Only active facilities contribute to invoice totals
    pub fn is_billable(&self) -> bool {
        matches!(self, EffectiveStatus::Active)
    }
}

impl From<FacilityStatus> for EffectiveStatus {
    fn from(status: FacilityStatus) -> Self {
        match status {
            FacilityStatus::PendingApproval => EffectiveStatus::Pending,
            FacilityStatus::Active => EffectiveStatus::Active,
            FacilityStatus::Paused => EffectiveStatus::Paused,
            FacilityStatus::Closed => EffectiveStatus::Closed,
        }
    }
}

/// How the monthly recurring charge is derived from rate and frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum RateType {
    /// The rate is the full monthly charge regardless of frequency
    FlatMonthly,
}

impl RateType {
    /// Unrounded recurring charge for one month
    pub fn recurring_amount(&self, rate: Decimal, _frequency_per_week: u32) -> Decimal {
        match self {
            RateType::FlatMonthly => rate,
        }
    }
}

impl Default for RateType {
    fn default() -> Self {
        RateType::FlatMonthly
    }
}

/// Per-line tax treatment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaxBehavior {
    /// Taxable unless the client is tax exempt
    InheritClient,
    /// Always taxed at the client's rate, even for exempt clients
    Taxable,
    Exempt,
}

impl TaxBehavior {
    pub fn is_taxable_for(&self, client: &Client) -> bool {
        match self {
            TaxBehavior::InheritClient => !client.tax_exempt,
            TaxBehavior::Taxable => true,
            TaxBehavior::Exempt => false,
        }
    }
}

impl Default for TaxBehavior {
    fn default() -> Self {
        TaxBehavior::InheritClient
    }
}

/// A billable service unit at a client location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityProfile {
    pub id: FacilityProfileId,
    pub client_id: ClientId,
    pub location_id: LocationId,
    /// Free-text service category, e.g. "Restroom"
    pub category: String,
    pub default_monthly_rate: Decimal,
    pub rate_type: RateType,
    pub tax_behavior: TaxBehavior,
    pub status: FacilityStatus,
    /// Months before the go-live month resolve to pending
    pub go_live_date: Option<NaiveDate>,
    pub pause_start_date: Option<NaiveDate>,
    /// None with a start date set means paused indefinitely
    pub pause_end_date: Option<NaiveDate>,
    pub seasonal_rules_enabled: bool,
    /// Service days, 0 = Sunday through 6 = Saturday
    pub normal_days_of_week: BTreeSet<u8>,
    pub normal_frequency_per_week: u32,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

impl FacilityProfile {
    /// Creates a pending facility with a flat monthly rate
    pub fn new(
        client_id: ClientId,
        location_id: LocationId,
        category: impl Into<String>,
        default_monthly_rate: Decimal,
    ) -> Self {
        Self {
            id: FacilityProfileId::new_v7(),
            client_id,
            location_id,
            category: category.into(),
            default_monthly_rate,
            rate_type: RateType::default(),
            tax_behavior: TaxBehavior::default(),
            status: FacilityStatus::PendingApproval,
            go_live_date: None,
            pause_start_date: None,
            pause_end_date: None,
            seasonal_rules_enabled: false,
            normal_days_of_week: BTreeSet::new(),
            normal_frequency_per_week: 0,
            sort_order: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: FacilityStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_tax_behavior(mut self, tax_behavior: TaxBehavior) -> Self {
        self.tax_behavior = tax_behavior;
        self
    }

    pub fn with_go_live_date(mut self, date: NaiveDate) -> Self {
        self.go_live_date = Some(date);
        self
    }

    pub fn with_pause(mut self, start: NaiveDate, end: Option<NaiveDate>) -> Self {
        self.pause_start_date = Some(start);
        self.pause_end_date = end;
        self
    }

    pub fn with_seasonal_rules_enabled(mut self, enabled: bool) -> Self {
        self.seasonal_rules_enabled = enabled;
        self
    }

    pub fn with_schedule(mut self, days_of_week: impl IntoIterator<Item = u8>, frequency_per_week: u32) -> Self {
        self.normal_days_of_week = days_of_week.into_iter().collect();
        self.normal_frequency_per_week = frequency_per_week;
        self
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn is_closed(&self) -> bool {
        self.status.is_terminal()
    }

    /// The pause window collapsed to whole months
    ///
    /// Returns `None` when no pause start is set. An end date without a start
    /// date is ignored.
    pub fn pause_window(&self) -> Result<Option<MonthWindow>, TemporalError> {
        match self.pause_start_date {
            Some(start) => MonthWindow::from_dates(start, self.pause_end_date).map(Some),
            None => Ok(None),
        }
    }

    /// Changes the stored status
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` when leaving `Closed`.
    pub fn transition_to(&mut self, target: FacilityStatus) -> Result<(), BillingError> {
        if !self.status.can_transition_to(target) {
            return Err(BillingError::invalid_transition(self.status, target));
        }
        self.status = target;
        Ok(())
    }

    /// Closes the facility; closing twice is a no-op
    pub fn close(&mut self) -> Result<(), BillingError> {
        self.transition_to(FacilityStatus::Closed)
    }

    /// Replaces the contracted monthly rate
    pub fn set_default_monthly_rate(&mut self, rate: Decimal) -> Result<(), BillingError> {
        if self.is_closed() {
            return Err(BillingError::validation("Closed facilities cannot be re-rated"));
        }
        if rate.is_sign_negative() && !rate.is_zero() {
            return Err(BillingError::validation(format!(
                "Monthly rate {} must not be negative",
                rate
            )));
        }
        self.default_monthly_rate = rate;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), BillingError> {
        if self.category.trim().is_empty() {
            return Err(BillingError::validation("Facility category is required"));
        }
        if self.default_monthly_rate.is_sign_negative() && !self.default_monthly_rate.is_zero() {
            return Err(BillingError::validation("Monthly rate must not be negative"));
        }
        if let Some(day) = self.normal_days_of_week.iter().find(|d| **d > 6) {
            return Err(BillingError::validation(format!(
                "Day of week {} is outside 0-6",
                day
            )));
        }
        if self.normal_frequency_per_week > 7 {
            return Err(BillingError::validation(format!(
                "Frequency {} per week exceeds 7",
                self.normal_frequency_per_week
            )));
        }
        self.pause_window()?;
        Ok(())
    }
}
