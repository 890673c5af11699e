//! Billing previews
//!
//! A preview is the invoice a client would receive for one month, computed
//! from current records without persisting anything.

use serde::{Deserialize, Serialize};

use core_kernel::{BillingPeriod, ClientId, Currency, Money};

use crate::aggregator::{aggregate, line_tax};
use crate::client::{BillingDisplayMode, Client, Location, PaymentTerms};
use crate::error::BillingError;
use crate::line_items::{build_line_items, FacilityResolution, LineItem, LineItemKind};
use crate::ports::FacilityRecord;
use crate::resolver::{resolve, ResolvedState};
use crate::service_item::ServiceLineItem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingPreview {
    pub client_id: ClientId,
    pub client_name: String,
    pub period: BillingPeriod,
    /// e.g. "October 2026"
    pub month_label: String,
    pub currency: Currency,
    pub billing_display_mode: BillingDisplayMode,
    pub payment_terms: PaymentTerms,
    /// Recurring lines in facility order, then ad-hoc lines
    pub line_items: Vec<LineItem>,
    pub subtotal: Money,
    pub tax_amount: Money,
    pub total: Money,
}

impl BillingPreview {
    pub fn recurring_items(&self) -> impl Iterator<Item = &LineItem> {
        self.line_items
            .iter()
            .filter(|i| i.kind == LineItemKind::Recurring)
    }

    pub fn ad_hoc_items(&self) -> impl Iterator<Item = &LineItem> {
        self.line_items
            .iter()
            .filter(|i| i.kind == LineItemKind::AdHoc)
    }

    /// The amount the invoice headlines under the client's display mode
    pub fn display_total(&self) -> Money {
        match self.billing_display_mode {
            BillingDisplayMode::PreTaxOnly => self.subtotal,
            BillingDisplayMode::WithTax => self.total,
        }
    }
}

/// Orders facilities by sort order, then creation time, then id
pub fn sort_facility_records(records: &mut [FacilityRecord]) {
    records.sort_by(|a, b| {
        let a = &a.profile;
        let b = &b.profile;
        (a.sort_order, a.created_at, a.id).cmp(&(b.sort_order, b.created_at, b.id))
    });
}

/// Orders ad-hoc items by creation time, then id
pub fn sort_service_items(items: &mut [ServiceLineItem]) {
    items.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
}

/// Resolves, builds, and totals one client-month from loaded records
///
/// Inputs are sorted here, so the output does not depend on the order the
/// repository returned them in.
pub fn assemble_preview(
    client: &Client,
    mut records: Vec<FacilityRecord>,
    locations: &[Location],
    mut ad_hoc_items: Vec<ServiceLineItem>,
    period: BillingPeriod,
    currency: Currency,
) -> Result<BillingPreview, BillingError> {
    sort_facility_records(&mut records);
    sort_service_items(&mut ad_hoc_items);

    let states = records
        .iter()
        .map(|r| resolve(&r.profile, &r.seasonal_rules, &r.monthly_overrides, period))
        .collect::<Result<Vec<ResolvedState>, _>>()?;

    let resolutions: Vec<FacilityResolution<'_>> = records
        .iter()
        .zip(states.iter())
        .map(|(record, state)| FacilityResolution {
            facility: &record.profile,
            state,
        })
        .collect();

    let mut line_items = build_line_items(client, &resolutions, locations, &ad_hoc_items, period, currency)?;
    for item in &mut line_items {
        item.tax_amount = line_tax(client, item);
    }

    let totals = aggregate(client, &line_items, currency)?;

    Ok(BillingPreview {
        client_id: client.id,
        client_name: client.name.clone(),
        period,
        month_label: period.label(),
        currency,
        billing_display_mode: client.billing_display_mode,
        payment_terms: client.payment_terms,
        line_items,
        subtotal: totals.subtotal,
        tax_amount: totals.tax_amount,
        total: totals.total,
    })
}
