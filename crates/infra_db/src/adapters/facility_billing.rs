//! PostgreSQL Facility Billing Adapter
//!
//! Implements [`FacilityBillingPort`] on top of [`FacilityBillingRepository`].
//! Rows are converted to domain records here; a row the domain cannot
//! represent (a month of 13, a negative tax rate, a day-of-week of 9) fails
//! with `PortError::Transformation` rather than being silently clamped.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool_from_url, PostgresFacilityBillingAdapter};
//! use domain_billing::{FacilityBillingService, BillingSettings};
//! use std::sync::Arc;
//!
//! let pool = create_pool_from_url("postgres://localhost/facility_billing").await?;
//! let adapter = PostgresFacilityBillingAdapter::new(pool);
//! let service = FacilityBillingService::new(Arc::new(adapter), BillingSettings::load()?);
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, BillingPeriod, ClientId, CompanyId, DomainPort, FacilityProfileId,
    HealthCheckResult, HealthCheckable, LocationId, MonthlyOverrideId, PortError, Rate,
    SeasonalRuleId, ServiceLineItemId,
};
use domain_billing::{
    BillingDisplayMode, Client, FacilityBillingPort, FacilityProfile, FacilityRecord,
    FacilityStatus, Location, MonthlyOverride, PaymentTerms, RateType, SeasonalRule,
    ServiceItemStatus, ServiceLineItem, TaxBehavior,
};

use crate::repositories::facility_billing::{
    BillingDisplayMode as DbBillingDisplayMode, ClientRow, FacilityBillingRepository,
    FacilityProfileRow, FacilityStatus as DbFacilityStatus, LocationRow, MonthlyOverrideRow,
    PaymentTerms as DbPaymentTerms, RateType as DbRateType, SeasonalRuleRow,
    ServiceItemStatus as DbServiceItemStatus, ServiceLineItemRow, TaxBehavior as DbTaxBehavior,
};

const ADAPTER_ID: &str = "postgres-facility-billing-adapter";

/// PostgreSQL-backed implementation of the FacilityBillingPort trait
///
/// Database errors are translated through `From<DatabaseError> for PortError`,
/// so a missing client surfaces as `PortError::NotFound` and a dropped
/// connection as `PortError::Connection`.
#[derive(Debug, Clone)]
pub struct PostgresFacilityBillingAdapter {
    repository: FacilityBillingRepository,
    pool: PgPool,
}

impl PostgresFacilityBillingAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: FacilityBillingRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns the underlying repository
    pub fn repository(&self) -> &FacilityBillingRepository {
        &self.repository
    }

    /// Stores a new client
    ///
    /// Clients are maintained outside the billing engine; this exists for
    /// seeding and imports.
    #[instrument(skip(self, client), fields(client_id = %client.id))]
    pub async fn insert_client(&self, client: &Client) -> Result<(), PortError> {
        debug!("Inserting client");
        self.repository.insert_client(&client_to_row(client)).await?;
        Ok(())
    }

    #[instrument(skip(self, location), fields(location_id = %location.id))]
    pub async fn insert_location(&self, location: &Location) -> Result<(), PortError> {
        debug!("Inserting location");
        self.repository.insert_location(&location_to_row(location)).await?;
        Ok(())
    }

    #[instrument(skip(self, item), fields(service_line_item_id = %item.id))]
    pub async fn insert_service_line_item(&self, item: &ServiceLineItem) -> Result<(), PortError> {
        debug!("Inserting service line item");
        self.repository
            .insert_service_line_item(&service_item_to_row(item))
            .await?;
        Ok(())
    }

    async fn ensure_facility_exists(&self, id: FacilityProfileId) -> Result<(), PortError> {
        if self.repository.facility_exists(*id.as_uuid()).await? {
            Ok(())
        } else {
            Err(PortError::not_found("FacilityProfile", id))
        }
    }
}

impl DomainPort for PostgresFacilityBillingAdapter {}

#[async_trait]
impl HealthCheckable for PostgresFacilityBillingAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult {
                adapter_id: ADAPTER_ID.to_string(),
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => HealthCheckResult {
                adapter_id: ADAPTER_ID.to_string(),
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(format!("Database error: {}", e)),
                checked_at: Utc::now(),
            },
        }
    }
}

#[async_trait]
impl FacilityBillingPort for PostgresFacilityBillingAdapter {
    #[instrument(skip(self), fields(client_id = %client_id, company_id = %company_id))]
    async fn get_client(&self, client_id: ClientId, company_id: CompanyId) -> Result<Client, PortError> {
        debug!("Fetching client");
        let row = self
            .repository
            .get_client(*client_id.as_uuid(), *company_id.as_uuid())
            .await?;
        row_to_client(row)
    }

    #[instrument(skip(self), fields(client_id = %client_id))]
    async fn list_locations(&self, client_id: ClientId) -> Result<Vec<Location>, PortError> {
        let rows = self.repository.list_locations(*client_id.as_uuid()).await?;
        debug!(count = rows.len(), "Fetched locations");
        Ok(rows.into_iter().map(row_to_location).collect())
    }

    #[instrument(skip(self), fields(client_id = %client_id))]
    async fn list_facility_profiles(&self, client_id: ClientId) -> Result<Vec<FacilityRecord>, PortError> {
        let uuid = *client_id.as_uuid();
        let (profiles, rules, overrides) = tokio::try_join!(
            self.repository.list_facility_profiles(uuid),
            self.repository.list_seasonal_rules(uuid),
            self.repository.list_monthly_overrides(uuid),
        )?;
        debug!(
            profiles = profiles.len(),
            seasonal_rules = rules.len(),
            monthly_overrides = overrides.len(),
            "Fetched facility records"
        );

        let mut rules_by_facility: HashMap<uuid::Uuid, Vec<SeasonalRule>> = HashMap::new();
        for row in rules {
            rules_by_facility
                .entry(row.facility_profile_id)
                .or_default()
                .push(row_to_seasonal_rule(row)?);
        }

        let mut overrides_by_facility: HashMap<uuid::Uuid, Vec<MonthlyOverride>> = HashMap::new();
        for row in overrides {
            overrides_by_facility
                .entry(row.facility_profile_id)
                .or_default()
                .push(row_to_monthly_override(row)?);
        }

        profiles
            .into_iter()
            .map(|row| {
                let id = row.id;
                Ok(FacilityRecord {
                    profile: row_to_facility_profile(row)?,
                    seasonal_rules: rules_by_facility.remove(&id).unwrap_or_default(),
                    monthly_overrides: overrides_by_facility.remove(&id).unwrap_or_default(),
                })
            })
            .collect()
    }

    #[instrument(skip(self), fields(client_id = %client_id, period = %period))]
    async fn list_service_line_items(
        &self,
        client_id: ClientId,
        period: BillingPeriod,
    ) -> Result<Vec<ServiceLineItem>, PortError> {
        let rows = self
            .repository
            .list_service_line_items(*client_id.as_uuid(), period.year(), period.month() as i32)
            .await?;
        debug!(count = rows.len(), "Fetched service line items");
        rows.into_iter().map(row_to_service_item).collect()
    }

    #[instrument(skip(self, profile), fields(facility_profile_id = %profile.id))]
    async fn save_facility_profile(&self, profile: &FacilityProfile) -> Result<(), PortError> {
        profile
            .validate()
            .map_err(|e| PortError::validation(e.to_string()))?;
        debug!("Saving facility profile");
        let row = facility_profile_to_row(profile)?;
        if !self.repository.upsert_facility_profile(&row).await? {
            return Err(PortError::conflict(format!(
                "Facility profile {} is closed and cannot be reopened",
                profile.id
            )));
        }
        Ok(())
    }

    #[instrument(
        skip(self, monthly_override),
        fields(facility_profile_id = %monthly_override.facility_profile_id, period = %monthly_override.period)
    )]
    async fn upsert_monthly_override(&self, monthly_override: MonthlyOverride) -> Result<MonthlyOverride, PortError> {
        self.ensure_facility_exists(monthly_override.facility_profile_id).await?;
        let stored = self
            .repository
            .upsert_monthly_override(&monthly_override_to_row(&monthly_override))
            .await?;
        debug!(override_id = %stored.id, "Stored monthly override");
        row_to_monthly_override(stored)
    }

    #[instrument(skip(self, rule), fields(facility_profile_id = %rule.facility_profile_id))]
    async fn supersede_seasonal_rules(&self, rule: SeasonalRule) -> Result<SeasonalRule, PortError> {
        self.ensure_facility_exists(rule.facility_profile_id).await?;
        let stored = self
            .repository
            .supersede_seasonal_rules(&seasonal_rule_to_row(&rule))
            .await?;
        debug!(rule_id = %stored.id, "Superseded seasonal rules");
        row_to_seasonal_rule(stored)
    }
}

// Row conversions

fn to_u32(value: i32, field: &str) -> Result<u32, PortError> {
    u32::try_from(value)
        .map_err(|_| PortError::transformation(format!("{} must not be negative, got {}", field, value)))
}

fn period_from_row(year: i32, month: i32) -> Result<BillingPeriod, PortError> {
    let month = to_u32(month, "month")?;
    BillingPeriod::new(year, month).map_err(|e| PortError::transformation(e.to_string()))
}

fn row_to_client(row: ClientRow) -> Result<Client, PortError> {
    let tax_rate = Rate::try_new(row.tax_rate).map_err(|e| PortError::transformation(e.to_string()))?;
    Ok(Client {
        id: ClientId::from_uuid(row.id),
        company_id: CompanyId::from_uuid(row.company_id),
        name: row.name,
        tax_rate,
        tax_exempt: row.tax_exempt,
        billing_display_mode: row.billing_display_mode.into(),
        payment_terms: row.payment_terms.into(),
    })
}

fn client_to_row(client: &Client) -> ClientRow {
    ClientRow {
        id: *client.id.as_uuid(),
        company_id: *client.company_id.as_uuid(),
        name: client.name.clone(),
        tax_rate: client.tax_rate.as_decimal(),
        tax_exempt: client.tax_exempt,
        billing_display_mode: client.billing_display_mode.into(),
        payment_terms: client.payment_terms.into(),
    }
}

fn row_to_location(row: LocationRow) -> Location {
    Location {
        id: LocationId::from_uuid(row.id),
        client_id: ClientId::from_uuid(row.client_id),
        name: row.name,
        address: row.address,
        is_active: row.is_active,
    }
}

fn location_to_row(location: &Location) -> LocationRow {
    LocationRow {
        id: *location.id.as_uuid(),
        client_id: *location.client_id.as_uuid(),
        name: location.name.clone(),
        address: location.address.clone(),
        is_active: location.is_active,
    }
}

fn row_to_facility_profile(row: FacilityProfileRow) -> Result<FacilityProfile, PortError> {
    let normal_days_of_week = row
        .normal_days_of_week
        .iter()
        .map(|&day| {
            u8::try_from(day)
                .ok()
                .filter(|d| *d <= 6)
                .ok_or_else(|| PortError::transformation(format!("invalid day of week {}", day)))
        })
        .collect::<Result<_, _>>()?;

    Ok(FacilityProfile {
        id: FacilityProfileId::from_uuid(row.id),
        client_id: ClientId::from_uuid(row.client_id),
        location_id: LocationId::from_uuid(row.location_id),
        category: row.category,
        default_monthly_rate: row.default_monthly_rate,
        rate_type: row.rate_type.into(),
        tax_behavior: row.tax_behavior.into(),
        status: row.status.into(),
        go_live_date: row.go_live_date,
        pause_start_date: row.pause_start_date,
        pause_end_date: row.pause_end_date,
        seasonal_rules_enabled: row.seasonal_rules_enabled,
        normal_days_of_week,
        normal_frequency_per_week: to_u32(row.normal_frequency_per_week, "normal_frequency_per_week")?,
        sort_order: row.sort_order,
        created_at: row.created_at,
    })
}

fn facility_profile_to_row(profile: &FacilityProfile) -> Result<FacilityProfileRow, PortError> {
    let rate_type = match profile.rate_type {
        RateType::FlatMonthly => DbRateType::FlatMonthly,
        #[allow(unreachable_patterns)]
        other => {
            return Err(PortError::transformation(format!(
                "rate type {:?} is not stored",
                other
            )))
        }
    };

    Ok(FacilityProfileRow {
        id: *profile.id.as_uuid(),
        client_id: *profile.client_id.as_uuid(),
        location_id: *profile.location_id.as_uuid(),
        category: profile.category.clone(),
        default_monthly_rate: profile.default_monthly_rate,
        rate_type,
        tax_behavior: profile.tax_behavior.into(),
        status: profile.status.into(),
        go_live_date: profile.go_live_date,
        pause_start_date: profile.pause_start_date,
        pause_end_date: profile.pause_end_date,
        seasonal_rules_enabled: profile.seasonal_rules_enabled,
        normal_days_of_week: profile.normal_days_of_week.iter().map(|&d| i16::from(d)).collect(),
        normal_frequency_per_week: profile.normal_frequency_per_week as i32,
        sort_order: profile.sort_order,
        created_at: profile.created_at,
    })
}

fn row_to_seasonal_rule(row: SeasonalRuleRow) -> Result<SeasonalRule, PortError> {
    Ok(SeasonalRule {
        id: SeasonalRuleId::from_uuid(row.id),
        facility_profile_id: FacilityProfileId::from_uuid(row.facility_profile_id),
        start_month: to_u32(row.start_month, "start_month")?,
        end_month: to_u32(row.end_month, "end_month")?,
        status: row.status.map(Into::into),
        rate: row.rate,
        frequency_per_week: row
            .frequency_per_week
            .map(|f| to_u32(f, "frequency_per_week"))
            .transpose()?,
        is_active: row.is_active,
        created_at: row.created_at,
    })
}

fn seasonal_rule_to_row(rule: &SeasonalRule) -> SeasonalRuleRow {
    SeasonalRuleRow {
        id: *rule.id.as_uuid(),
        facility_profile_id: *rule.facility_profile_id.as_uuid(),
        start_month: rule.start_month as i32,
        end_month: rule.end_month as i32,
        status: rule.status.map(Into::into),
        rate: rule.rate,
        frequency_per_week: rule.frequency_per_week.map(|f| f as i32),
        is_active: rule.is_active,
        created_at: rule.created_at,
    }
}

fn row_to_monthly_override(row: MonthlyOverrideRow) -> Result<MonthlyOverride, PortError> {
    Ok(MonthlyOverride {
        id: MonthlyOverrideId::from_uuid(row.id),
        facility_profile_id: FacilityProfileId::from_uuid(row.facility_profile_id),
        period: period_from_row(row.year, row.month)?,
        override_status: row.override_status.into(),
        override_rate: row.override_rate,
        override_frequency: row
            .override_frequency
            .map(|f| to_u32(f, "override_frequency"))
            .transpose()?,
        override_notes: row.override_notes,
        updated_at: row.updated_at,
    })
}

fn monthly_override_to_row(monthly_override: &MonthlyOverride) -> MonthlyOverrideRow {
    MonthlyOverrideRow {
        id: *monthly_override.id.as_uuid(),
        facility_profile_id: *monthly_override.facility_profile_id.as_uuid(),
        year: monthly_override.period.year(),
        month: monthly_override.period.month() as i32,
        override_status: monthly_override.override_status.into(),
        override_rate: monthly_override.override_rate,
        override_frequency: monthly_override.override_frequency.map(|f| f as i32),
        override_notes: monthly_override.override_notes.clone(),
        updated_at: monthly_override.updated_at,
    }
}

fn row_to_service_item(row: ServiceLineItemRow) -> Result<ServiceLineItem, PortError> {
    Ok(ServiceLineItem {
        id: ServiceLineItemId::from_uuid(row.id),
        client_id: ClientId::from_uuid(row.client_id),
        facility_profile_id: row.facility_profile_id.map(FacilityProfileId::from_uuid),
        description: row.description,
        period: period_from_row(row.year, row.month)?,
        quantity: row.quantity,
        unit_rate: row.unit_rate,
        tax_behavior: row.tax_behavior.into(),
        status: row.status.into(),
        performed_date: row.performed_date,
        created_at: row.created_at,
    })
}

fn service_item_to_row(item: &ServiceLineItem) -> ServiceLineItemRow {
    ServiceLineItemRow {
        id: *item.id.as_uuid(),
        client_id: *item.client_id.as_uuid(),
        facility_profile_id: item.facility_profile_id.map(|id| *id.as_uuid()),
        description: item.description.clone(),
        year: item.period.year(),
        month: item.period.month() as i32,
        quantity: item.quantity,
        unit_rate: item.unit_rate,
        tax_behavior: item.tax_behavior.into(),
        status: item.status.into(),
        performed_date: item.performed_date,
        created_at: item.created_at,
    }
}

// Enum conversions

impl From<DbBillingDisplayMode> for BillingDisplayMode {
    fn from(mode: DbBillingDisplayMode) -> Self {
        match mode {
            DbBillingDisplayMode::PreTaxOnly => BillingDisplayMode::PreTaxOnly,
            DbBillingDisplayMode::WithTax => BillingDisplayMode::WithTax,
        }
    }
}

impl From<BillingDisplayMode> for DbBillingDisplayMode {
    fn from(mode: BillingDisplayMode) -> Self {
        match mode {
            BillingDisplayMode::PreTaxOnly => DbBillingDisplayMode::PreTaxOnly,
            BillingDisplayMode::WithTax => DbBillingDisplayMode::WithTax,
        }
    }
}

impl From<DbPaymentTerms> for PaymentTerms {
    fn from(terms: DbPaymentTerms) -> Self {
        match terms {
            DbPaymentTerms::DueOnReceipt => PaymentTerms::DueOnReceipt,
            DbPaymentTerms::Net15 => PaymentTerms::Net15,
            DbPaymentTerms::Net30 => PaymentTerms::Net30,
            DbPaymentTerms::Net45 => PaymentTerms::Net45,
            DbPaymentTerms::Net60 => PaymentTerms::Net60,
        }
    }
}

impl From<PaymentTerms> for DbPaymentTerms {
    fn from(terms: PaymentTerms) -> Self {
        match terms {
            PaymentTerms::DueOnReceipt => DbPaymentTerms::DueOnReceipt,
            PaymentTerms::Net15 => DbPaymentTerms::Net15,
            PaymentTerms::Net30 => DbPaymentTerms::Net30,
            PaymentTerms::Net45 => DbPaymentTerms::Net45,
            PaymentTerms::Net60 => DbPaymentTerms::Net60,
        }
    }
}

impl From<DbFacilityStatus> for FacilityStatus {
    fn from(status: DbFacilityStatus) -> Self {
        match status {
            DbFacilityStatus::PendingApproval => FacilityStatus::PendingApproval,
            DbFacilityStatus::Active => FacilityStatus::Active,
            DbFacilityStatus::Paused => FacilityStatus::Paused,
            DbFacilityStatus::Closed => FacilityStatus::Closed,
        }
    }
}

impl From<FacilityStatus> for DbFacilityStatus {
    fn from(status: FacilityStatus) -> Self {
        match status {
            FacilityStatus::PendingApproval => DbFacilityStatus::PendingApproval,
            FacilityStatus::Active => DbFacilityStatus::Active,
            FacilityStatus::Paused => DbFacilityStatus::Paused,
            FacilityStatus::Closed => DbFacilityStatus::Closed,
        }
    }
}

impl From<DbRateType> for RateType {
    fn from(rate_type: DbRateType) -> Self {
        match rate_type {
            DbRateType::FlatMonthly => RateType::FlatMonthly,
        }
    }
}

impl From<DbTaxBehavior> for TaxBehavior {
    fn from(behavior: DbTaxBehavior) -> Self {
        match behavior {
            DbTaxBehavior::InheritClient => TaxBehavior::InheritClient,
            DbTaxBehavior::Taxable => TaxBehavior::Taxable,
            DbTaxBehavior::Exempt => TaxBehavior::Exempt,
        }
    }
}

impl From<TaxBehavior> for DbTaxBehavior {
    fn from(behavior: TaxBehavior) -> Self {
        match behavior {
            TaxBehavior::InheritClient => DbTaxBehavior::InheritClient,
            TaxBehavior::Taxable => DbTaxBehavior::Taxable,
            TaxBehavior::Exempt => DbTaxBehavior::Exempt,
        }
    }
}

impl From<DbServiceItemStatus> for ServiceItemStatus {
    fn from(status: DbServiceItemStatus) -> Self {
        match status {
            DbServiceItemStatus::Draft => ServiceItemStatus::Draft,
            DbServiceItemStatus::Approved => ServiceItemStatus::Approved,
            DbServiceItemStatus::Invoiced => ServiceItemStatus::Invoiced,
            DbServiceItemStatus::Void => ServiceItemStatus::Void,
        }
    }
}

impl From<ServiceItemStatus> for DbServiceItemStatus {
    fn from(status: ServiceItemStatus) -> Self {
        match status {
            ServiceItemStatus::Draft => DbServiceItemStatus::Draft,
            ServiceItemStatus::Approved => DbServiceItemStatus::Approved,
            ServiceItemStatus::Invoiced => DbServiceItemStatus::Invoiced,
            ServiceItemStatus::Void => DbServiceItemStatus::Void,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn facility_row() -> FacilityProfileRow {
        FacilityProfileRow {
            id: uuid::Uuid::now_v7(),
            client_id: uuid::Uuid::new_v4(),
            location_id: uuid::Uuid::new_v4(),
            category: "Restroom".to_string(),
            default_monthly_rate: dec!(1000),
            rate_type: DbRateType::FlatMonthly,
            tax_behavior: DbTaxBehavior::InheritClient,
            status: DbFacilityStatus::Active,
            go_live_date: NaiveDate::from_ymd_opt(2026, 3, 15),
            pause_start_date: None,
            pause_end_date: None,
            seasonal_rules_enabled: true,
            normal_days_of_week: vec![1, 3, 5],
            normal_frequency_per_week: 3,
            sort_order: 2,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_facility_row_to_domain() {
        let row = facility_row();
        let id = row.id;
        let profile = row_to_facility_profile(row).unwrap();

        assert_eq!(*profile.id.as_uuid(), id);
        assert_eq!(profile.status, FacilityStatus::Active);
        assert_eq!(profile.normal_days_of_week.iter().copied().collect::<Vec<_>>(), vec![1, 3, 5]);
        assert_eq!(profile.normal_frequency_per_week, 3);
    }

    #[test]
    fn test_facility_domain_to_row_preserves_columns() {
        let profile = row_to_facility_profile(facility_row()).unwrap();
        let row = facility_profile_to_row(&profile).unwrap();

        assert_eq!(row.normal_days_of_week, vec![1, 3, 5]);
        assert_eq!(row.status, DbFacilityStatus::Active);
        assert_eq!(row.go_live_date, profile.go_live_date);
        assert_eq!(row.sort_order, 2);
    }

    #[test]
    fn test_invalid_day_of_week_is_transformation_error() {
        let mut row = facility_row();
        row.normal_days_of_week = vec![1, 9];
        let result = row_to_facility_profile(row);
        assert!(matches!(result, Err(PortError::Transformation { .. })));
    }

    #[test]
    fn test_negative_tax_rate_is_transformation_error() {
        let row = ClientRow {
            id: uuid::Uuid::new_v4(),
            company_id: uuid::Uuid::new_v4(),
            name: "Acme".to_string(),
            tax_rate: dec!(-0.01),
            tax_exempt: false,
            billing_display_mode: DbBillingDisplayMode::WithTax,
            payment_terms: DbPaymentTerms::Net30,
        };
        assert!(matches!(row_to_client(row), Err(PortError::Transformation { .. })));
    }

    #[test]
    fn test_override_row_period() {
        let row = MonthlyOverrideRow {
            id: uuid::Uuid::new_v4(),
            facility_profile_id: uuid::Uuid::new_v4(),
            year: 2026,
            month: 10,
            override_status: DbFacilityStatus::Paused,
            override_rate: None,
            override_frequency: Some(2),
            override_notes: Some("Renovation".to_string()),
            updated_at: Utc::now(),
        };
        let monthly_override = row_to_monthly_override(row).unwrap();

        assert_eq!(monthly_override.period, BillingPeriod::new(2026, 10).unwrap());
        assert_eq!(monthly_override.override_status, FacilityStatus::Paused);
        assert_eq!(monthly_override.override_frequency, Some(2));
    }

    #[test]
    fn test_override_row_with_bad_month_is_rejected() {
        let row = MonthlyOverrideRow {
            id: uuid::Uuid::new_v4(),
            facility_profile_id: uuid::Uuid::new_v4(),
            year: 2026,
            month: 13,
            override_status: DbFacilityStatus::Active,
            override_rate: None,
            override_frequency: None,
            override_notes: None,
            updated_at: Utc::now(),
        };
        assert!(matches!(
            row_to_monthly_override(row),
            Err(PortError::Transformation { .. })
        ));
    }

    #[test]
    fn test_payment_terms_round_trip() {
        for terms in [
            PaymentTerms::DueOnReceipt,
            PaymentTerms::Net15,
            PaymentTerms::Net30,
            PaymentTerms::Net45,
            PaymentTerms::Net60,
        ] {
            let db: DbPaymentTerms = terms.into();
            assert_eq!(PaymentTerms::from(db), terms);
        }
    }
}
