//! Month-over-month comparison
//!
//! Compares two previews facility by facility. A facility's total for a month
//! is its recurring line plus any ad-hoc lines linked to it; ad-hoc lines with
//! no facility are reported together as the unassigned delta. Facility deltas
//! plus the unassigned delta always add up to the subtotal delta.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use core_kernel::{BillingPeriod, ClientId, Currency, FacilityProfileId, Money};

use crate::error::BillingError;
use crate::facility::EffectiveStatus;
use crate::line_items::LineItemKind;
use crate::preview::BillingPreview;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// Only in the current month
    Added,
    /// Only in the previous month
    Removed,
    Changed,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityDelta {
    pub facility_profile_id: FacilityProfileId,
    pub location_name: Option<String>,
    pub category: Option<String>,
    pub change_type: ChangeType,
    pub is_new: bool,
    pub is_removed: bool,
    pub current_status: Option<EffectiveStatus>,
    pub previous_status: Option<EffectiveStatus>,
    pub current_rate: Decimal,
    pub previous_rate: Decimal,
    pub current_total: Money,
    pub previous_total: Money,
    /// Current minus previous
    pub total_delta: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaReport {
    pub client_id: ClientId,
    pub current_period: BillingPeriod,
    pub previous_period: BillingPeriod,
    pub current_month_label: String,
    pub previous_month_label: String,
    pub current_subtotal: Money,
    pub previous_subtotal: Money,
    pub current_tax: Money,
    pub previous_tax: Money,
    pub current_total: Money,
    pub previous_total: Money,
    pub subtotal_delta: Money,
    pub tax_delta: Money,
    pub total_delta: Money,
    /// Current facilities in preview order, then removed ones in previous order
    pub facilities: Vec<FacilityDelta>,
    /// Delta of ad-hoc charges not linked to any facility
    pub unassigned_delta: Money,
}

impl DeltaReport {
    pub fn facility(&self, id: FacilityProfileId) -> Option<&FacilityDelta> {
        self.facilities.iter().find(|f| f.facility_profile_id == id)
    }

    /// True if any amount or facility status differs between the two months
    pub fn has_changes(&self) -> bool {
        !self.total_delta.is_zero()
            || !self.unassigned_delta.is_zero()
            || self
                .facilities
                .iter()
                .any(|f| f.change_type != ChangeType::Unchanged)
    }
}

/// One facility's footprint in a single preview
#[derive(Debug, Clone)]
struct FacilitySnapshot {
    id: FacilityProfileId,
    location_name: Option<String>,
    category: Option<String>,
    status: Option<EffectiveStatus>,
    rate: Decimal,
    total: Money,
}

struct PreviewSnapshot {
    facilities: Vec<FacilitySnapshot>,
    unassigned: Money,
}

impl PreviewSnapshot {
    fn from_preview(preview: &BillingPreview) -> Result<Self, BillingError> {
        let mut facilities: Vec<FacilitySnapshot> = Vec::new();
        let mut index: BTreeMap<FacilityProfileId, usize> = BTreeMap::new();
        let mut unassigned = Money::zero(preview.currency);

        for item in &preview.line_items {
            let Some(id) = item.facility_profile_id else {
                unassigned = unassigned.checked_add(&item.line_item_total)?;
                continue;
            };

            let position = *index.entry(id).or_insert_with(|| {
                facilities.push(FacilitySnapshot {
                    id,
                    location_name: item.location_name.clone(),
                    category: item.category.clone(),
                    status: None,
                    rate: Decimal::ZERO,
                    total: Money::zero(preview.currency),
                });
                facilities.len() - 1
            });

            let snapshot = &mut facilities[position];
            if item.kind == LineItemKind::Recurring {
                snapshot.status = Some(item.effective_status);
                snapshot.rate = item.effective_rate;
            }
            snapshot.total = snapshot.total.checked_add(&item.line_item_total)?;
        }

        Ok(Self {
            facilities,
            unassigned,
        })
    }
}

fn added(current: &FacilitySnapshot, currency: Currency) -> FacilityDelta {
    FacilityDelta {
        facility_profile_id: current.id,
        location_name: current.location_name.clone(),
        category: current.category.clone(),
        change_type: ChangeType::Added,
        is_new: true,
        is_removed: false,
        current_status: current.status,
        previous_status: None,
        current_rate: current.rate,
        previous_rate: Decimal::ZERO,
        current_total: current.total,
        previous_total: Money::zero(currency),
        total_delta: current.total,
    }
}

fn removed(previous: &FacilitySnapshot, currency: Currency) -> Result<FacilityDelta, BillingError> {
    let zero = Money::zero(currency);
    Ok(FacilityDelta {
        facility_profile_id: previous.id,
        location_name: previous.location_name.clone(),
        category: previous.category.clone(),
        change_type: ChangeType::Removed,
        is_new: false,
        is_removed: true,
        current_status: None,
        previous_status: previous.status,
        current_rate: Decimal::ZERO,
        previous_rate: previous.rate,
        current_total: zero,
        previous_total: previous.total,
        total_delta: zero.checked_sub(&previous.total)?,
    })
}

fn matched(current: &FacilitySnapshot, previous: &FacilitySnapshot) -> Result<FacilityDelta, BillingError> {
    let total_delta = current.total.checked_sub(&previous.total)?;
    let change_type = if total_delta.is_zero() && current.status == previous.status {
        ChangeType::Unchanged
    } else {
        ChangeType::Changed
    };

    Ok(FacilityDelta {
        facility_profile_id: current.id,
        location_name: current.location_name.clone(),
        category: current.category.clone(),
        change_type,
        is_new: false,
        is_removed: false,
        current_status: current.status,
        previous_status: previous.status,
        current_rate: current.rate,
        previous_rate: previous.rate,
        current_total: current.total,
        previous_total: previous.total,
        total_delta,
    })
}

/// Compares two previews of the same client
///
/// # Errors
///
/// `Validation` when the previews belong to different clients or currencies.
pub fn compare_previews(current: &BillingPreview, previous: &BillingPreview) -> Result<DeltaReport, BillingError> {
    if current.client_id != previous.client_id {
        return Err(BillingError::validation(format!(
            "Cannot compare previews of different clients {} and {}",
            current.client_id, previous.client_id
        )));
    }
    if current.currency != previous.currency {
        return Err(BillingError::validation(format!(
            "Cannot compare {} preview with {} preview",
            current.currency, previous.currency
        )));
    }

    let currency = current.currency;
    let cur = PreviewSnapshot::from_preview(current)?;
    let prev = PreviewSnapshot::from_preview(previous)?;

    let previous_by_id: BTreeMap<FacilityProfileId, &FacilitySnapshot> =
        prev.facilities.iter().map(|f| (f.id, f)).collect();
    let current_ids: BTreeSet<FacilityProfileId> = cur.facilities.iter().map(|f| f.id).collect();

    let mut facilities = Vec::with_capacity(cur.facilities.len() + prev.facilities.len());
    for snapshot in &cur.facilities {
        let delta = match previous_by_id.get(&snapshot.id) {
            Some(previous_snapshot) => matched(snapshot, previous_snapshot)?,
            None => added(snapshot, currency),
        };
        facilities.push(delta);
    }
    for snapshot in prev.facilities.iter().filter(|f| !current_ids.contains(&f.id)) {
        facilities.push(removed(snapshot, currency)?);
    }

    Ok(DeltaReport {
        client_id: current.client_id,
        current_period: current.period,
        previous_period: previous.period,
        current_month_label: current.month_label.clone(),
        previous_month_label: previous.month_label.clone(),
        current_subtotal: current.subtotal,
        previous_subtotal: previous.subtotal,
        current_tax: current.tax_amount,
        previous_tax: previous.tax_amount,
        current_total: current.total,
        previous_total: previous.total,
        subtotal_delta: current.subtotal.checked_sub(&previous.subtotal)?,
        tax_delta: current.tax_amount.checked_sub(&previous.tax_amount)?,
        total_delta: current.total.checked_sub(&previous.total)?,
        facilities,
        unassigned_delta: cur.unassigned.checked_sub(&prev.unassigned)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Client, Location};
    use crate::facility::{FacilityProfile, FacilityStatus};
    use crate::ports::FacilityRecord;
    use crate::preview::assemble_preview;
    use crate::service_item::ServiceLineItem;
    use core_kernel::CompanyId;
    use rust_decimal_macros::dec;

    fn preview(
        client: &Client,
        location: &Location,
        facilities: Vec<FacilityProfile>,
        ad_hoc: Vec<ServiceLineItem>,
        period: BillingPeriod,
    ) -> BillingPreview {
        let records = facilities.into_iter().map(FacilityRecord::new).collect();
        assemble_preview(client, records, std::slice::from_ref(location), ad_hoc, period, Currency::USD).unwrap()
    }

    #[test]
    fn test_added_and_removed_facilities() {
        let client = Client::new(CompanyId::new(), "Acme", dec!(0));
        let location = Location::new(client.id, "Depot");
        let oct = BillingPeriod::new(2026, 10).unwrap();
        let nov = oct.next().unwrap();

        let kept = FacilityProfile::new(client.id, location.id, "Kept", dec!(100)).with_status(FacilityStatus::Active);
        let gone = FacilityProfile::new(client.id, location.id, "Gone", dec!(50)).with_status(FacilityStatus::Active);
        let new = FacilityProfile::new(client.id, location.id, "New", dec!(75)).with_status(FacilityStatus::Active);

        let previous = preview(&client, &location, vec![kept.clone(), gone.clone()], vec![], oct);
        let current = preview(&client, &location, vec![kept.clone(), new.clone()], vec![], nov);

        let report = compare_previews(&current, &previous).unwrap();
        let ids: Vec<_> = report.facilities.iter().map(|f| f.facility_profile_id).collect();
        assert_eq!(ids, vec![kept.id, new.id, gone.id]);

        let added = report.facility(new.id).unwrap();
        assert_eq!(added.change_type, ChangeType::Added);
        assert!(added.is_new);
        assert_eq!(added.total_delta.amount(), dec!(75));

        let removed = report.facility(gone.id).unwrap();
        assert_eq!(removed.change_type, ChangeType::Removed);
        assert!(removed.is_removed);
        assert!(removed.current_status.is_none());
        assert!(removed.current_total.is_zero());
        assert_eq!(removed.total_delta.amount(), dec!(-50));

        assert_eq!(report.facility(kept.id).unwrap().change_type, ChangeType::Unchanged);
        assert_eq!(report.subtotal_delta.amount(), dec!(25));
    }

    #[test]
    fn test_linked_ad_hoc_counts_toward_facility() {
        let client = Client::new(CompanyId::new(), "Acme", dec!(0));
        let location = Location::new(client.id, "Depot");
        let oct = BillingPeriod::new(2026, 10).unwrap();
        let nov = oct.next().unwrap();
        let f = FacilityProfile::new(client.id, location.id, "Restroom", dec!(100)).with_status(FacilityStatus::Active);

        let extra = ServiceLineItem::new(client.id, nov, "Repair", dec!(1), dec!(40)).for_facility(f.id);
        let loose = ServiceLineItem::new(client.id, nov, "Delivery", dec!(1), dec!(15));

        let previous = preview(&client, &location, vec![f.clone()], vec![], oct);
        let current = preview(&client, &location, vec![f.clone()], vec![extra, loose], nov);

        let report = compare_previews(&current, &previous).unwrap();
        let delta = report.facility(f.id).unwrap();
        assert_eq!(delta.change_type, ChangeType::Changed);
        assert_eq!(delta.total_delta.amount(), dec!(40));
        assert_eq!(report.unassigned_delta.amount(), dec!(15));
        assert_eq!(report.subtotal_delta.amount(), dec!(55));
        assert!(report.has_changes());
    }

    #[test]
    fn test_rejects_different_clients() {
        let a = Client::new(CompanyId::new(), "A", dec!(0));
        let b = Client::new(CompanyId::new(), "B", dec!(0));
        let la = Location::new(a.id, "Depot");
        let lb = Location::new(b.id, "Depot");
        let period = BillingPeriod::new(2026, 10).unwrap();

        let pa = preview(&a, &la, vec![], vec![], period);
        let pb = preview(&b, &lb, vec![], vec![], period);
        assert!(matches!(compare_previews(&pa, &pb), Err(BillingError::Validation(_))));
    }
}
