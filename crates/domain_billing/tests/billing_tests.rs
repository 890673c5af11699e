//! Integration tests for domain_billing
//!
//! Drives the billing service end to end through the in-memory port, plus
//! property tests over the resolver, totals, and deltas.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{AdapterHealth, BillingPeriod, ClientId, CompanyId, Currency, HealthCheckable, LocationId};
use domain_billing::{
    assemble_preview, compare_previews, resolve, BillingDisplayMode, BillingError, BillingSettings,
    ChangeType, Client, EffectiveStatus, FacilityBillingPort, FacilityRecord, FacilityStatus,
    LineItemKind, Location, MonthlyOverride, ResolutionLayer, SeasonalRule, ServiceItemStatus,
    ServiceLineItem, TaxBehavior,
};
use test_utils::{
    assert_delta_reconciles, assert_money_eq, assert_preview_consistent, facility_profile_strategy,
    init_test_tracing, monthly_override_strategy, seasonal_rule_strategy, service_item_strategy,
    tax_rate_strategy, BillingScenario, PeriodFixtures, TemporalFixtures, TenantFixtures,
};

// ============================================================================
// Preview Scenarios
// ============================================================================

mod preview_tests {
    use super::*;

    #[tokio::test]
    async fn test_single_active_facility_with_tax() {
        init_test_tracing();
        let mut scenario = BillingScenario::new();
        scenario.add_active_facility("Restroom", dec!(1000));
        let (service, _) = scenario.mock_service().await;

        let preview = service
            .generate_billing_preview(scenario.client_id(), scenario.company_id(), 2026, 10)
            .await
            .unwrap();

        assert_eq!(preview.line_items.len(), 1);
        assert_money_eq(&preview.subtotal, dec!(1000.00));
        assert_money_eq(&preview.tax_amount, dec!(82.50));
        assert_money_eq(&preview.total, dec!(1082.50));
        assert_eq!(preview.currency, Currency::USD);
        assert_preview_consistent(&preview);
    }

    #[tokio::test]
    async fn test_paused_override_is_listed_but_excluded() {
        init_test_tracing();
        let mut scenario = BillingScenario::new();
        let facility_id = scenario.add_active_facility("Restroom", dec!(1000));
        scenario.add_monthly_override(
            MonthlyOverride::new(facility_id, PeriodFixtures::october_2026(), FacilityStatus::Paused)
                .with_notes("Site closed for renovation"),
        );
        let (service, _) = scenario.mock_service().await;

        let preview = service
            .generate_billing_preview(scenario.client_id(), scenario.company_id(), 2026, 10)
            .await
            .unwrap();

        let line = &preview.line_items[0];
        assert_eq!(line.effective_status, EffectiveStatus::Paused);
        assert!(!line.included_in_total);
        assert_eq!(line.effective_rate, dec!(1000));
        assert_eq!(line.notes.as_deref(), Some("Site closed for renovation"));
        assert_money_eq(&preview.subtotal, dec!(0));
        assert_money_eq(&preview.total, dec!(0));
        assert_preview_consistent(&preview);
    }

    #[tokio::test]
    async fn test_tax_exempt_client_owes_no_tax() {
        let mut scenario = BillingScenario::new().with_client(|c| c.with_tax_exempt(true));
        scenario.add_active_facility("Restroom", dec!(1000));
        let (service, _) = scenario.mock_service().await;

        let preview = service
            .generate_billing_preview(scenario.client_id(), scenario.company_id(), 2026, 10)
            .await
            .unwrap();

        assert_money_eq(&preview.tax_amount, dec!(0));
        assert_money_eq(&preview.total, dec!(1000.00));
    }

    #[tokio::test]
    async fn test_exempt_facility_on_taxable_client() {
        let mut scenario = BillingScenario::new();
        scenario.add_active_facility("Restroom", dec!(1000));
        let location_id = scenario.add_location("Annex");
        scenario.add_facility(location_id, "Sink", dec!(200), |f| {
            f.with_status(FacilityStatus::Active)
                .with_tax_behavior(TaxBehavior::Exempt)
                .with_sort_order(1)
        });
        let (service, _) = scenario.mock_service().await;

        let preview = service
            .generate_billing_preview(scenario.client_id(), scenario.company_id(), 2026, 10)
            .await
            .unwrap();

        assert_money_eq(&preview.subtotal, dec!(1200.00));
        assert_money_eq(&preview.tax_amount, dec!(82.50));
        assert!(!preview.line_items[1].taxable);
        assert_preview_consistent(&preview);
    }

    #[tokio::test]
    async fn test_only_approved_and_invoiced_items_are_billed() {
        let mut scenario = BillingScenario::new();
        let period = PeriodFixtures::october_2026();
        for (status, rate) in [
            (ServiceItemStatus::Draft, dec!(10)),
            (ServiceItemStatus::Approved, dec!(20)),
            (ServiceItemStatus::Invoiced, dec!(30)),
            (ServiceItemStatus::Void, dec!(40)),
        ] {
            scenario.add_service_item(
                ServiceLineItem::new(scenario.client_id(), period, "Pump-out", dec!(1), rate).with_status(status),
            );
        }
        scenario.add_service_item(ServiceLineItem::new(
            scenario.client_id(),
            PeriodFixtures::november_2026(),
            "Next month",
            dec!(1),
            dec!(99),
        ));
        let (service, _) = scenario.mock_service().await;

        let preview = service
            .generate_billing_preview(scenario.client_id(), scenario.company_id(), 2026, 10)
            .await
            .unwrap();

        assert_eq!(preview.ad_hoc_items().count(), 2);
        assert!(preview.line_items.iter().all(|l| l.kind == LineItemKind::AdHoc));
        assert_money_eq(&preview.subtotal, dec!(50.00));
    }

    #[tokio::test]
    async fn test_facilities_follow_sort_order() {
        let mut scenario = BillingScenario::new();
        let location_id = scenario.add_location("Depot");
        let second = scenario.add_facility(location_id, "Sink", dec!(100), |f| {
            f.with_status(FacilityStatus::Active).with_sort_order(2)
        });
        let first = scenario.add_facility(location_id, "Restroom", dec!(100), |f| {
            f.with_status(FacilityStatus::Active).with_sort_order(1)
        });
        let (service, _) = scenario.mock_service().await;

        let preview = service
            .generate_billing_preview(scenario.client_id(), scenario.company_id(), 2026, 10)
            .await
            .unwrap();

        let order: Vec<_> = preview.recurring_items().filter_map(|l| l.facility_profile_id).collect();
        assert_eq!(order, vec![first, second]);
    }

    #[tokio::test]
    async fn test_pre_tax_display_mode_still_computes_tax() {
        let mut scenario =
            BillingScenario::new().with_client(|c| c.with_display_mode(BillingDisplayMode::PreTaxOnly));
        scenario.add_active_facility("Restroom", dec!(1000));
        let (service, _) = scenario.mock_service().await;

        let preview = service
            .generate_billing_preview(scenario.client_id(), scenario.company_id(), 2026, 10)
            .await
            .unwrap();

        assert_money_eq(&preview.tax_amount, dec!(82.50));
        assert_money_eq(&preview.display_total(), dec!(1000.00));
    }
}

// ============================================================================
// Resolution Scenarios
// ============================================================================

mod resolution_tests {
    use super::*;

    async fn status_in(scenario: &BillingScenario, year: i32, month: u32) -> EffectiveStatus {
        let (service, _) = scenario.mock_service().await;
        let preview = service
            .generate_billing_preview(scenario.client_id(), scenario.company_id(), year, month)
            .await
            .unwrap();
        preview.line_items[0].effective_status
    }

    #[tokio::test]
    async fn test_seasonal_rule_wraps_year_end() {
        let mut scenario = BillingScenario::new();
        let location_id = scenario.add_location("Lodge");
        let facility_id = scenario.add_facility(location_id, "Restroom", dec!(1000), |f| {
            f.with_status(FacilityStatus::Active).with_seasonal_rules_enabled(true)
        });
        scenario.add_seasonal_rule(
            SeasonalRule::new(facility_id, 11, 2)
                .unwrap()
                .with_status(FacilityStatus::Paused),
        );

        assert_eq!(status_in(&scenario, 2026, 10).await, EffectiveStatus::Active);
        assert_eq!(status_in(&scenario, 2026, 11).await, EffectiveStatus::Paused);
        assert_eq!(status_in(&scenario, 2027, 1).await, EffectiveStatus::Paused);
        assert_eq!(status_in(&scenario, 2027, 2).await, EffectiveStatus::Paused);
        assert_eq!(status_in(&scenario, 2027, 3).await, EffectiveStatus::Active);
    }

    #[tokio::test]
    async fn test_pause_window_covers_partial_months() {
        let mut scenario = BillingScenario::new();
        let location_id = scenario.add_location("Depot");
        scenario.add_facility(location_id, "Restroom", dec!(1000), |f| {
            f.with_status(FacilityStatus::Active).with_pause(
                TemporalFixtures::date(2026, 10, 10),
                Some(TemporalFixtures::date(2026, 12, 5)),
            )
        });

        assert_eq!(status_in(&scenario, 2026, 9).await, EffectiveStatus::Active);
        assert_eq!(status_in(&scenario, 2026, 10).await, EffectiveStatus::Paused);
        assert_eq!(status_in(&scenario, 2026, 11).await, EffectiveStatus::Paused);
        assert_eq!(status_in(&scenario, 2026, 12).await, EffectiveStatus::Paused);
        assert_eq!(status_in(&scenario, 2027, 1).await, EffectiveStatus::Active);
    }

    #[tokio::test]
    async fn test_go_live_month_bills_and_earlier_months_pend() {
        let mut scenario = BillingScenario::new();
        let location_id = scenario.add_location("Depot");
        scenario.add_facility(location_id, "Restroom", dec!(1000), |f| {
            f.with_status(FacilityStatus::Active)
                .with_go_live_date(TemporalFixtures::date(2026, 11, 20))
        });

        assert_eq!(status_in(&scenario, 2026, 10).await, EffectiveStatus::Pending);
        assert_eq!(status_in(&scenario, 2026, 11).await, EffectiveStatus::Active);
    }

    #[tokio::test]
    async fn test_override_beats_pause_window() {
        let mut scenario = BillingScenario::new();
        let location_id = scenario.add_location("Depot");
        let facility_id = scenario.add_facility(location_id, "Restroom", dec!(1000), |f| {
            f.with_status(FacilityStatus::Active)
                .with_pause(TemporalFixtures::date(2026, 10, 1), None)
        });
        scenario.add_monthly_override(
            MonthlyOverride::new(facility_id, PeriodFixtures::october_2026(), FacilityStatus::Active)
                .with_rate(dec!(500)),
        );
        let (service, _) = scenario.mock_service().await;

        let preview = service
            .generate_billing_preview(scenario.client_id(), scenario.company_id(), 2026, 10)
            .await
            .unwrap();

        assert_eq!(preview.line_items[0].effective_status, EffectiveStatus::Active);
        assert_money_eq(&preview.subtotal, dec!(500.00));
    }

    #[tokio::test]
    async fn test_override_then_pause_then_seasonal_rule() {
        let mut scenario = BillingScenario::new();
        let location_id = scenario.add_location("Lodge");
        let facility_id = scenario.add_facility(location_id, "Restroom", dec!(1000), |f| {
            f.with_status(FacilityStatus::Active)
                .with_seasonal_rules_enabled(true)
                .with_pause(
                    TemporalFixtures::date(2026, 10, 10),
                    Some(TemporalFixtures::date(2026, 11, 5)),
                )
        });
        scenario.add_seasonal_rule(
            SeasonalRule::new(facility_id, 10, 12)
                .unwrap()
                .with_status(FacilityStatus::Active)
                .with_rate(dec!(1200)),
        );
        scenario.add_monthly_override(
            MonthlyOverride::new(facility_id, PeriodFixtures::october_2026(), FacilityStatus::Active)
                .with_rate(dec!(500)),
        );
        let (service, _) = scenario.mock_service().await;

        // October has all three; November has the pause and the rule
        let mut results = Vec::new();
        for month in [10, 11, 12] {
            let preview = service
                .generate_billing_preview(scenario.client_id(), scenario.company_id(), 2026, month)
                .await
                .unwrap();
            results.push((preview.line_items[0].effective_status, preview.subtotal.amount()));
        }

        assert_eq!(
            results,
            vec![
                (EffectiveStatus::Active, dec!(500.00)),
                (EffectiveStatus::Paused, dec!(0)),
                (EffectiveStatus::Active, dec!(1200.00)),
            ]
        );
    }

    #[tokio::test]
    async fn test_upserted_override_reaches_preview() {
        let mut scenario = BillingScenario::new();
        let facility_id = scenario.add_active_facility("Restroom", dec!(1000));
        let (service, port) = scenario.mock_service().await;

        port.upsert_monthly_override(MonthlyOverride::new(
            facility_id,
            PeriodFixtures::october_2026(),
            FacilityStatus::Paused,
        ))
        .await
        .unwrap();
        port.upsert_monthly_override(
            MonthlyOverride::new(facility_id, PeriodFixtures::october_2026(), FacilityStatus::Active)
                .with_rate(dec!(800)),
        )
        .await
        .unwrap();

        let preview = service
            .generate_billing_preview(scenario.client_id(), scenario.company_id(), 2026, 10)
            .await
            .unwrap();
        assert_eq!(port.monthly_overrides_for(facility_id).await.len(), 1);
        assert_money_eq(&preview.subtotal, dec!(800.00));
    }

    #[tokio::test]
    async fn test_superseded_rule_no_longer_applies() {
        let mut scenario = BillingScenario::new();
        let location_id = scenario.add_location("Lodge");
        let facility_id = scenario.add_facility(location_id, "Restroom", dec!(1000), |f| {
            f.with_status(FacilityStatus::Active).with_seasonal_rules_enabled(true)
        });
        let (service, port) = scenario.mock_service().await;

        port.supersede_seasonal_rules(
            SeasonalRule::new(facility_id, 10, 10)
                .unwrap()
                .with_status(FacilityStatus::Paused),
        )
        .await
        .unwrap();
        port.supersede_seasonal_rules(SeasonalRule::new(facility_id, 6, 8).unwrap().with_rate(dec!(1200)))
            .await
            .unwrap();

        let preview = service
            .generate_billing_preview(scenario.client_id(), scenario.company_id(), 2026, 10)
            .await
            .unwrap();
        assert_eq!(preview.line_items[0].effective_status, EffectiveStatus::Active);
        assert_money_eq(&preview.subtotal, dec!(1000.00));
    }
}

// ============================================================================
// Delta Scenarios
// ============================================================================

mod delta_tests {
    use super::*;

    #[tokio::test]
    async fn test_resumed_facility_is_changed() {
        init_test_tracing();
        let mut scenario = BillingScenario::new();
        let facility_id = scenario.add_active_facility("Restroom", dec!(1000));
        scenario.add_monthly_override(MonthlyOverride::new(
            facility_id,
            PeriodFixtures::october_2026(),
            FacilityStatus::Paused,
        ));
        let (service, _) = scenario.mock_service().await;

        let report = service
            .generate_delta(scenario.client_id(), scenario.company_id(), 2026, 11)
            .await
            .unwrap();

        let delta = report.facility(facility_id).unwrap();
        assert_eq!(delta.change_type, ChangeType::Changed);
        assert_eq!(delta.previous_status, Some(EffectiveStatus::Paused));
        assert_eq!(delta.current_status, Some(EffectiveStatus::Active));
        assert_money_eq(&delta.total_delta, dec!(1000.00));
        assert_money_eq(&report.subtotal_delta, dec!(1000.00));
        assert_money_eq(&report.tax_delta, dec!(82.50));
        assert!(report.has_changes());
        assert_delta_reconciles(&report);
    }

    #[tokio::test]
    async fn test_january_compares_with_prior_december() {
        let mut scenario = BillingScenario::new();
        scenario.add_active_facility("Restroom", dec!(1000));
        let (service, _) = scenario.mock_service().await;

        let report = service
            .generate_delta(scenario.client_id(), scenario.company_id(), 2027, 1)
            .await
            .unwrap();

        assert_eq!(report.current_period, PeriodFixtures::january_2027());
        assert_eq!(report.previous_period, PeriodFixtures::december_2026());
        assert_eq!(report.facilities[0].change_type, ChangeType::Unchanged);
        assert!(!report.has_changes());
    }

    #[tokio::test]
    async fn test_facility_going_live_is_added() {
        let mut scenario = BillingScenario::new();
        let location_id = scenario.add_location("Depot");
        let facility_id = scenario.add_facility(location_id, "Restroom", dec!(1000), |f| {
            f.with_status(FacilityStatus::Active)
                .with_go_live_date(TemporalFixtures::date(2026, 11, 1))
        });
        let (service, _) = scenario.mock_service().await;

        let report = service
            .generate_delta(scenario.client_id(), scenario.company_id(), 2026, 11)
            .await
            .unwrap();

        let delta = report.facility(facility_id).unwrap();
        assert_eq!(delta.previous_status, Some(EffectiveStatus::Pending));
        assert_money_eq(&delta.total_delta, dec!(1000.00));
        assert_delta_reconciles(&report);
    }

    #[tokio::test]
    async fn test_delta_is_repeatable() {
        let mut scenario = BillingScenario::new();
        let facility_id = scenario.add_active_facility("Restroom", dec!(1000));
        scenario.add_active_facility("Sink", dec!(333.33));
        scenario.add_monthly_override(MonthlyOverride::new(
            facility_id,
            PeriodFixtures::october_2026(),
            FacilityStatus::Paused,
        ));
        let (service, _) = scenario.mock_service().await;

        let first = service
            .generate_delta(scenario.client_id(), scenario.company_id(), 2026, 11)
            .await
            .unwrap();
        let second = service
            .generate_delta(scenario.client_id(), scenario.company_id(), 2026, 11)
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_preview_is_repeatable() {
        let mut scenario = BillingScenario::new();
        scenario.add_active_facility("Restroom", dec!(1000));
        scenario.add_active_facility("Sink", dec!(333.33));
        scenario.add_service_item(ServiceLineItem::new(
            scenario.client_id(),
            PeriodFixtures::october_2026(),
            "Emergency pump-out",
            dec!(3),
            dec!(41.67),
        ));
        let (service, _) = scenario.mock_service().await;

        let first = service
            .generate_billing_preview(scenario.client_id(), scenario.company_id(), 2026, 10)
            .await
            .unwrap();
        let second = service
            .generate_billing_preview(scenario.client_id(), scenario.company_id(), 2026, 10)
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_ad_hoc_items_are_unassigned() {
        let mut scenario = BillingScenario::new();
        scenario.add_active_facility("Restroom", dec!(1000));
        scenario.add_service_item(ServiceLineItem::new(
            scenario.client_id(),
            PeriodFixtures::november_2026(),
            "Emergency pump-out",
            dec!(2),
            dec!(75),
        ));
        let (service, _) = scenario.mock_service().await;

        let report = service
            .generate_delta(scenario.client_id(), scenario.company_id(), 2026, 11)
            .await
            .unwrap();

        assert_money_eq(&report.unassigned_delta, dec!(150.00));
        assert_money_eq(&report.subtotal_delta, dec!(150.00));
        assert_delta_reconciles(&report);
    }
}

// ============================================================================
// Errors
// ============================================================================

mod error_tests {
    use super::*;

    #[tokio::test]
    async fn test_other_company_cannot_see_client() {
        let mut scenario = BillingScenario::new();
        scenario.add_active_facility("Restroom", dec!(1000));
        let (service, _) = scenario.mock_service().await;

        let result = service
            .generate_billing_preview(scenario.client_id(), TenantFixtures::other_company(), 2026, 10)
            .await;
        assert!(matches!(result, Err(BillingError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_missing_location_is_data_integrity() {
        let mut scenario = BillingScenario::new();
        scenario.add_facility(LocationId::new(), "Restroom", dec!(1000), |f| {
            f.with_status(FacilityStatus::Active)
        });
        let (service, _) = scenario.mock_service().await;

        let result = service
            .generate_billing_preview(scenario.client_id(), scenario.company_id(), 2026, 10)
            .await;
        assert!(matches!(result, Err(BillingError::DataIntegrity(_))));
    }

    #[tokio::test]
    async fn test_unavailable_repository_propagates() {
        let mut scenario = BillingScenario::new();
        scenario.add_active_facility("Restroom", dec!(1000));
        let (service, port) = scenario.mock_service().await;
        port.set_unavailable(true);

        let result = service
            .generate_delta(scenario.client_id(), scenario.company_id(), 2026, 11)
            .await;
        assert!(matches!(result, Err(BillingError::Repository(_))));
        assert_eq!(port.health_check().await.status, AdapterHealth::Unhealthy);
    }

    #[tokio::test]
    async fn test_invalid_month_is_validation() {
        let scenario = BillingScenario::new();
        let (service, _) = scenario.mock_service().await;

        let result = service
            .generate_delta(scenario.client_id(), scenario.company_id(), 2026, 0)
            .await;
        assert!(matches!(result, Err(BillingError::Validation(_))));
    }

    #[tokio::test]
    async fn test_currency_comes_from_settings() {
        let mut scenario = BillingScenario::new();
        scenario.add_active_facility("Restroom", dec!(1000));
        let (service, _) = scenario
            .mock_service_with(BillingSettings::default().with_currency(Currency::CAD))
            .await;

        let preview = service
            .generate_billing_preview(scenario.client_id(), scenario.company_id(), 2026, 10)
            .await
            .unwrap();
        assert_eq!(preview.total.currency(), Currency::CAD);
    }
}

// ============================================================================
// Properties
// ============================================================================

fn period() -> BillingPeriod {
    PeriodFixtures::october_2026()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_closed_is_terminal(
        rules in proptest::collection::vec(seasonal_rule_strategy(core_kernel::FacilityProfileId::new()), 0..4),
        month in 1u32..=12u32,
    ) {
        let client_id = ClientId::new();
        let facility = domain_billing::FacilityProfile::new(client_id, LocationId::new(), "Restroom", dec!(1000))
            .with_status(FacilityStatus::Closed)
            .with_seasonal_rules_enabled(true);
        let period = BillingPeriod::new(2026, month).unwrap();
        let rules: Vec<SeasonalRule> = rules
            .into_iter()
            .map(|r| SeasonalRule { facility_profile_id: facility.id, ..r })
            .collect();
        let overrides = vec![MonthlyOverride::new(facility.id, period, FacilityStatus::Active)];

        let state = resolve(&facility, &rules, &overrides, period).unwrap();
        prop_assert_eq!(state.status, EffectiveStatus::Closed);
        prop_assert_eq!(state.status_source, ResolutionLayer::ClosedGuard);
        prop_assert!(!state.included_in_total());
    }

    #[test]
    fn prop_resolution_ignores_input_order(
        profile in facility_profile_strategy(ClientId::new(), LocationId::new()),
        rules in proptest::collection::vec(seasonal_rule_strategy(core_kernel::FacilityProfileId::new()), 0..5),
        overrides in proptest::collection::vec(monthly_override_strategy(core_kernel::FacilityProfileId::new(), period()), 0..3),
    ) {
        let rules: Vec<SeasonalRule> = rules
            .into_iter()
            .map(|r| SeasonalRule { facility_profile_id: profile.id, ..r })
            .collect();
        let overrides: Vec<MonthlyOverride> = overrides
            .into_iter()
            .map(|o| MonthlyOverride { facility_profile_id: profile.id, ..o })
            .collect();

        let forward = resolve(&profile, &rules, &overrides, period()).unwrap();

        let mut reversed_rules = rules.clone();
        reversed_rules.reverse();
        let mut reversed_overrides = overrides.clone();
        reversed_overrides.reverse();
        let backward = resolve(&profile, &reversed_rules, &reversed_overrides, period()).unwrap();

        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn prop_preview_totals_follow_lines(
        tax_rate in tax_rate_strategy(),
        exempt in any::<bool>(),
        profiles in proptest::collection::vec(facility_profile_strategy(ClientId::new(), LocationId::new()), 0..6),
        items in proptest::collection::vec(service_item_strategy(ClientId::new(), period()), 0..6),
    ) {
        let client = Client::new(CompanyId::new(), "Acme", tax_rate).with_tax_exempt(exempt);
        let location = Location::new(client.id, "Depot");
        let any_line_taxable = profiles.iter().any(|p| p.tax_behavior == TaxBehavior::Taxable)
            || items.iter().any(|i| i.tax_behavior == TaxBehavior::Taxable);
        let records: Vec<FacilityRecord> = profiles
            .into_iter()
            .map(|p| FacilityRecord::new(domain_billing::FacilityProfile { client_id: client.id, location_id: location.id, ..p }))
            .collect();
        let items: Vec<ServiceLineItem> = items
            .into_iter()
            .map(|i| ServiceLineItem { client_id: client.id, ..i })
            .collect();

        let preview = assemble_preview(&client, records, &[location], items, period(), Currency::USD).unwrap();

        assert_preview_consistent(&preview);
        if exempt && !any_line_taxable {
            prop_assert_eq!(preview.tax_amount.amount(), Decimal::ZERO);
        }
    }

    #[test]
    fn prop_delta_reconciles(
        current_profiles in proptest::collection::vec(facility_profile_strategy(ClientId::new(), LocationId::new()), 0..5),
        dropped in 0usize..3,
        items in proptest::collection::vec(service_item_strategy(ClientId::new(), period()), 0..4),
    ) {
        let client = Client::new(CompanyId::new(), "Acme", dec!(0.0825));
        let location = Location::new(client.id, "Depot");
        let records: Vec<FacilityRecord> = current_profiles
            .into_iter()
            .map(|p| FacilityRecord::new(domain_billing::FacilityProfile { client_id: client.id, location_id: location.id, ..p }))
            .collect();
        let previous_records: Vec<FacilityRecord> = records.iter().skip(dropped).cloned().collect();
        let items: Vec<ServiceLineItem> = items
            .into_iter()
            .map(|i| ServiceLineItem { client_id: client.id, ..i })
            .collect();

        let previous_period = period().previous().unwrap();
        let previous_items: Vec<ServiceLineItem> = items
            .iter()
            .map(|i| ServiceLineItem { period: previous_period, ..i.clone() })
            .take(1)
            .collect();

        let current = assemble_preview(&client, records, &[location.clone()], items, period(), Currency::USD).unwrap();
        let previous = assemble_preview(&client, previous_records, &[location], previous_items, previous_period, Currency::USD).unwrap();

        let report = compare_previews(&current, &previous).unwrap();
        assert_delta_reconciles(&report);

        let again = compare_previews(&current, &previous).unwrap();
        prop_assert_eq!(report, again);
    }
}
