//! Ad-hoc service line items
//!
//! One-time charges (extra cleanings, repairs) recorded against a client for
//! a specific month, optionally tied to one of its facilities.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{BillingPeriod, ClientId, FacilityProfileId, ServiceLineItemId};

use crate::error::BillingError;
use crate::facility::TaxBehavior;

/// Approval status of an ad-hoc charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceItemStatus {
    Draft,
    Approved,
    Invoiced,
    Void,
}

impl ServiceItemStatus {
    /// Approved and already-invoiced items appear on invoices
    pub fn is_billable(&self) -> bool {
        matches!(self, ServiceItemStatus::Approved | ServiceItemStatus::Invoiced)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceLineItem {
    pub id: ServiceLineItemId,
    pub client_id: ClientId,
    /// None for charges not tied to a facility
    pub facility_profile_id: Option<FacilityProfileId>,
    pub description: String,
    pub period: BillingPeriod,
    pub quantity: Decimal,
    pub unit_rate: Decimal,
    pub tax_behavior: TaxBehavior,
    pub status: ServiceItemStatus,
    pub performed_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl ServiceLineItem {
    /// Creates an approved item
    pub fn new(
        client_id: ClientId,
        period: BillingPeriod,
        description: impl Into<String>,
        quantity: Decimal,
        unit_rate: Decimal,
    ) -> Self {
        Self {
            id: ServiceLineItemId::new_v7(),
            client_id,
            facility_profile_id: None,
            description: description.into(),
            period,
            quantity,
            unit_rate,
            tax_behavior: TaxBehavior::default(),
            status: ServiceItemStatus::Approved,
            performed_date: None,
            created_at: Utc::now(),
        }
    }

    pub fn for_facility(mut self, facility_profile_id: FacilityProfileId) -> Self {
        self.facility_profile_id = Some(facility_profile_id);
        self
    }

    pub fn with_status(mut self, status: ServiceItemStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_tax_behavior(mut self, tax_behavior: TaxBehavior) -> Self {
        self.tax_behavior = tax_behavior;
        self
    }

    pub fn with_performed_date(mut self, date: NaiveDate) -> Self {
        self.performed_date = Some(date);
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn is_billable(&self) -> bool {
        self.status.is_billable()
    }

    /// Unrounded quantity times unit rate
    pub fn amount(&self) -> Decimal {
        self.quantity * self.unit_rate
    }

    pub fn validate(&self) -> Result<(), BillingError> {
        if self.description.trim().is_empty() {
            return Err(BillingError::validation("Service item description is required"));
        }
        if self.quantity.is_sign_negative() && !self.quantity.is_zero() {
            return Err(BillingError::validation("Quantity must not be negative"));
        }
        Ok(())
    }
}
