//! Line-Item Builder
//!
//! Turns resolved facility states and ad-hoc charges into invoice lines.
//! Every facility gets exactly one recurring line, even when it is excluded
//! from the total, so the invoice shows paused and pending facilities at zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use core_kernel::{BillingPeriod, Currency, FacilityProfileId, LocationId, Money, ServiceLineItemId};

use crate::client::{Client, Location};
use crate::error::BillingError;
use crate::facility::{EffectiveStatus, FacilityProfile};
use crate::resolver::ResolvedState;
use crate::service_item::ServiceLineItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItemKind {
    Recurring,
    AdHoc,
}

/// One line on an invoice preview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub kind: LineItemKind,
    /// None for ad-hoc charges not tied to a facility
    pub facility_profile_id: Option<FacilityProfileId>,
    pub service_line_item_id: Option<ServiceLineItemId>,
    pub location_name: Option<String>,
    pub category: Option<String>,
    pub description: String,
    pub effective_status: EffectiveStatus,
    pub effective_rate: Decimal,
    pub effective_frequency: u32,
    pub quantity: Decimal,
    pub unit_rate: Decimal,
    pub taxable: bool,
    pub included_in_total: bool,
    /// Rounded to currency precision; zero when excluded
    pub line_item_total: Money,
    /// Filled in by the preview once the aggregator has priced tax
    pub tax_amount: Money,
    pub notes: Option<String>,
}

/// A facility paired with its resolved state for the billed month
#[derive(Debug, Clone, Copy)]
pub struct FacilityResolution<'a> {
    pub facility: &'a FacilityProfile,
    pub state: &'a ResolvedState,
}

/// Builds the invoice lines for one client and month
///
/// Recurring lines come first, in the order of `resolutions`, followed by one
/// line per billable ad-hoc item for `period`, in the order given.
///
/// # Errors
///
/// `DataIntegrity` when a facility's location is missing from `locations`,
/// or when an ad-hoc item links to a facility not in `resolutions`.
pub fn build_line_items(
    client: &Client,
    resolutions: &[FacilityResolution<'_>],
    locations: &[Location],
    ad_hoc_items: &[ServiceLineItem],
    period: BillingPeriod,
    currency: Currency,
) -> Result<Vec<LineItem>, BillingError> {
    let locations_by_id: BTreeMap<LocationId, &Location> =
        locations.iter().map(|l| (l.id, l)).collect();

    let mut items = Vec::with_capacity(resolutions.len() + ad_hoc_items.len());
    let mut facilities_by_id: BTreeMap<FacilityProfileId, (&FacilityProfile, &str)> = BTreeMap::new();

    for resolution in resolutions {
        let facility = resolution.facility;
        let location = locations_by_id.get(&facility.location_id).copied().ok_or_else(|| {
            warn!(
                facility_id = %facility.id,
                location_id = %facility.location_id,
                "facility references a missing location"
            );
            BillingError::data_integrity(format!(
                "Facility {} references missing location {}",
                facility.id, facility.location_id
            ))
        })?;

        facilities_by_id.insert(facility.id, (facility, location.name.as_str()));
        items.push(recurring_line(client, facility, resolution.state, location, currency));
    }

    for item in ad_hoc_items
        .iter()
        .filter(|i| i.period == period && i.is_billable())
    {
        let linked = match item.facility_profile_id {
            Some(facility_id) => {
                let found = facilities_by_id.get(&facility_id).copied().ok_or_else(|| {
                    warn!(
                        service_item_id = %item.id,
                        facility_id = %facility_id,
                        "service item references an unknown facility"
                    );
                    BillingError::data_integrity(format!(
                        "Service item {} references unknown facility {}",
                        item.id, facility_id
                    ))
                })?;
                Some(found)
            }
            None => None,
        };
        items.push(ad_hoc_line(client, item, linked, currency));
    }

    Ok(items)
}

fn recurring_line(
    client: &Client,
    facility: &FacilityProfile,
    state: &ResolvedState,
    location: &Location,
    currency: Currency,
) -> LineItem {
    let included = state.included_in_total();
    let unit_rate = facility
        .rate_type
        .recurring_amount(state.rate, state.frequency_per_week);
    let line_item_total = if included {
        Money::rounded(unit_rate, currency)
    } else {
        Money::zero(currency)
    };

    LineItem {
        kind: LineItemKind::Recurring,
        facility_profile_id: Some(facility.id),
        service_line_item_id: None,
        location_name: Some(location.name.clone()),
        category: Some(facility.category.clone()),
        description: format!("{} - {}", location.name, facility.category),
        effective_status: state.status,
        effective_rate: state.rate,
        effective_frequency: state.frequency_per_week,
        quantity: Decimal::ONE,
        unit_rate,
        taxable: facility.tax_behavior.is_taxable_for(client),
        included_in_total: included,
        line_item_total,
        tax_amount: Money::zero(currency),
        notes: state.notes.clone(),
    }
}

fn ad_hoc_line(
    client: &Client,
    item: &ServiceLineItem,
    linked: Option<(&FacilityProfile, &str)>,
    currency: Currency,
) -> LineItem {
    LineItem {
        kind: LineItemKind::AdHoc,
        facility_profile_id: item.facility_profile_id,
        service_line_item_id: Some(item.id),
        location_name: linked.map(|(_, name)| name.to_string()),
        category: linked.map(|(f, _)| f.category.clone()),
        description: item.description.clone(),
        effective_status: EffectiveStatus::Active,
        effective_rate: item.unit_rate,
        effective_frequency: 0,
        quantity: item.quantity,
        unit_rate: item.unit_rate,
        taxable: item.tax_behavior.is_taxable_for(client),
        included_in_total: true,
        line_item_total: Money::rounded(item.amount(), currency),
        tax_amount: Money::zero(currency),
        notes: None,
    }
}
