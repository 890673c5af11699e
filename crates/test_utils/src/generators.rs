//! Property-Based Test Generators
//!
//! Proptest strategies for facility billing records. Generated records are
//! valid on their own; strategies that need a client or facility take its id.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{BillingPeriod, ClientId, Currency, FacilityProfileId, LocationId};
use domain_billing::{
    FacilityProfile, FacilityStatus, MonthlyOverride, SeasonalRule, ServiceItemStatus,
    ServiceLineItem, TaxBehavior,
};

pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::USD),
        Just(Currency::CAD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::AUD),
    ]
}

pub fn facility_status_strategy() -> impl Strategy<Value = FacilityStatus> {
    prop_oneof![
        Just(FacilityStatus::PendingApproval),
        Just(FacilityStatus::Active),
        Just(FacilityStatus::Paused),
        Just(FacilityStatus::Closed),
    ]
}

pub fn tax_behavior_strategy() -> impl Strategy<Value = TaxBehavior> {
    prop_oneof![
        Just(TaxBehavior::InheritClient),
        Just(TaxBehavior::Taxable),
        Just(TaxBehavior::Exempt),
    ]
}

pub fn service_item_status_strategy() -> impl Strategy<Value = ServiceItemStatus> {
    prop_oneof![
        Just(ServiceItemStatus::Draft),
        Just(ServiceItemStatus::Approved),
        Just(ServiceItemStatus::Invoiced),
        Just(ServiceItemStatus::Void),
    ]
}

pub fn month_strategy() -> impl Strategy<Value = u32> {
    1u32..=12u32
}

pub fn billing_period_strategy() -> impl Strategy<Value = BillingPeriod> {
    (2020i32..2035i32, month_strategy())
        .prop_map(|(year, month)| BillingPeriod::new(year, month).unwrap())
}

/// Monthly rates from 0 to 99,999.9999
pub fn monthly_rate_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000i64).prop_map(|m| Decimal::new(m, 4))
}

/// Tax rates from 0% to 15% in basis-point steps
pub fn tax_rate_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=1500i64).prop_map(|bp| Decimal::new(bp, 4))
}

pub fn frequency_strategy() -> impl Strategy<Value = u32> {
    0u32..=7u32
}

pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2020i32..2035i32, month_strategy(), 1u32..=28u32)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

/// Timestamps spread over five years from 2024
pub fn timestamp_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..(5 * 365 * 24 * 3600)).prop_map(|secs| {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(secs)
    })
}

/// Facility profiles with any status, optional go-live, and an optional pause window
pub fn facility_profile_strategy(
    client_id: ClientId,
    location_id: LocationId,
) -> impl Strategy<Value = FacilityProfile> {
    (
        facility_status_strategy(),
        monthly_rate_strategy(),
        tax_behavior_strategy(),
        proptest::option::of(date_strategy()),
        proptest::option::of((date_strategy(), proptest::option::of(0i64..400i64))),
        any::<bool>(),
        frequency_strategy(),
        timestamp_strategy(),
    )
        .prop_map(
            move |(status, rate, tax_behavior, go_live, pause, seasonal, frequency, created_at)| {
                let mut profile = FacilityProfile::new(client_id, location_id, "Restroom", rate)
                    .with_status(status)
                    .with_tax_behavior(tax_behavior)
                    .with_seasonal_rules_enabled(seasonal)
                    .with_schedule(0..frequency.min(7) as u8, frequency)
                    .with_created_at(created_at);
                if let Some(date) = go_live {
                    profile = profile.with_go_live_date(date);
                }
                if let Some((start, length)) = pause {
                    profile = profile.with_pause(start, length.map(|days| start + Duration::days(days)));
                }
                profile
            },
        )
}

pub fn seasonal_rule_strategy(facility_id: FacilityProfileId) -> impl Strategy<Value = SeasonalRule> {
    (
        month_strategy(),
        month_strategy(),
        proptest::option::of(facility_status_strategy()),
        proptest::option::of(monthly_rate_strategy()),
        proptest::option::of(frequency_strategy()),
        timestamp_strategy(),
    )
        .prop_map(move |(start, end, status, rate, frequency, created_at)| {
            let mut rule = SeasonalRule::new(facility_id, start, end)
                .unwrap()
                .with_created_at(created_at);
            if let Some(status) = status {
                rule = rule.with_status(status);
            }
            if let Some(rate) = rate {
                rule = rule.with_rate(rate);
            }
            if let Some(frequency) = frequency {
                rule = rule.with_frequency(frequency);
            }
            rule
        })
}

pub fn monthly_override_strategy(
    facility_id: FacilityProfileId,
    period: BillingPeriod,
) -> impl Strategy<Value = MonthlyOverride> {
    (
        facility_status_strategy(),
        proptest::option::of(monthly_rate_strategy()),
        proptest::option::of(frequency_strategy()),
    )
        .prop_map(move |(status, rate, frequency)| {
            let mut monthly_override = MonthlyOverride::new(facility_id, period, status);
            if let Some(rate) = rate {
                monthly_override = monthly_override.with_rate(rate);
            }
            if let Some(frequency) = frequency {
                monthly_override = monthly_override.with_frequency(frequency);
            }
            monthly_override
        })
}

/// Ad-hoc items with quantities up to 100 and unit rates up to 999.99
pub fn service_item_strategy(client_id: ClientId, period: BillingPeriod) -> impl Strategy<Value = ServiceLineItem> {
    (
        1i64..=100i64,
        0i64..100_000i64,
        tax_behavior_strategy(),
        service_item_status_strategy(),
        timestamp_strategy(),
    )
        .prop_map(move |(qty, cents, tax_behavior, status, created_at)| {
            ServiceLineItem::new(
                client_id,
                period,
                "Extra service",
                Decimal::from(qty),
                Decimal::new(cents, 2),
            )
            .with_tax_behavior(tax_behavior)
            .with_status(status)
            .with_created_at(created_at)
        })
}
