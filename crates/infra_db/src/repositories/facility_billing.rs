//! Facility billing repository
//!
//! Row-level access to clients, locations, facility profiles, seasonal rules,
//! monthly overrides, and ad-hoc service line items. Rows mirror the table
//! layout; conversion to domain types happens in the adapter.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

/// Invoice display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "billing_display_mode", rename_all = "snake_case")]
pub enum BillingDisplayMode {
    PreTaxOnly,
    WithTax,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "payment_terms", rename_all = "snake_case")]
pub enum PaymentTerms {
    DueOnReceipt,
    #[sqlx(rename = "net_15")]
    Net15,
    #[sqlx(rename = "net_30")]
    Net30,
    #[sqlx(rename = "net_45")]
    Net45,
    #[sqlx(rename = "net_60")]
    Net60,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "facility_status", rename_all = "snake_case")]
pub enum FacilityStatus {
    PendingApproval,
    Active,
    Paused,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "rate_type", rename_all = "snake_case")]
pub enum RateType {
    FlatMonthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "tax_behavior", rename_all = "snake_case")]
pub enum TaxBehavior {
    InheritClient,
    Taxable,
    Exempt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "service_item_status", rename_all = "snake_case")]
pub enum ServiceItemStatus {
    Draft,
    Approved,
    Invoiced,
    Void,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClientRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub tax_rate: Decimal,
    pub tax_exempt: bool,
    pub billing_display_mode: BillingDisplayMode,
    pub payment_terms: PaymentTerms,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LocationRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub name: String,
    pub address: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FacilityProfileRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub location_id: Uuid,
    pub category: String,
    pub default_monthly_rate: Decimal,
    pub rate_type: RateType,
    pub tax_behavior: TaxBehavior,
    pub status: FacilityStatus,
    pub go_live_date: Option<NaiveDate>,
    pub pause_start_date: Option<NaiveDate>,
    pub pause_end_date: Option<NaiveDate>,
    pub seasonal_rules_enabled: bool,
    pub normal_days_of_week: Vec<i16>,
    pub normal_frequency_per_week: i32,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SeasonalRuleRow {
    pub id: Uuid,
    pub facility_profile_id: Uuid,
    pub start_month: i32,
    pub end_month: i32,
    pub status: Option<FacilityStatus>,
    pub rate: Option<Decimal>,
    pub frequency_per_week: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MonthlyOverrideRow {
    pub id: Uuid,
    pub facility_profile_id: Uuid,
    pub year: i32,
    pub month: i32,
    pub override_status: FacilityStatus,
    pub override_rate: Option<Decimal>,
    pub override_frequency: Option<i32>,
    pub override_notes: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ServiceLineItemRow {
    pub id: Uuid,
    pub client_id: Uuid,
    pub facility_profile_id: Option<Uuid>,
    pub description: String,
    pub year: i32,
    pub month: i32,
    pub quantity: Decimal,
    pub unit_rate: Decimal,
    pub tax_behavior: TaxBehavior,
    pub status: ServiceItemStatus,
    pub performed_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

const FACILITY_COLUMNS: &str = r#"
    id, client_id, location_id, category, default_monthly_rate, rate_type,
    tax_behavior, status, go_live_date, pause_start_date, pause_end_date,
    seasonal_rules_enabled, normal_days_of_week, normal_frequency_per_week,
    sort_order, created_at
"#;

const SEASONAL_RULE_COLUMNS: &str = r#"
    id, facility_profile_id, start_month, end_month, status, rate,
    frequency_per_week, is_active, created_at
"#;

const MONTHLY_OVERRIDE_COLUMNS: &str = r#"
    id, facility_profile_id, year, month, override_status, override_rate,
    override_frequency, override_notes, updated_at
"#;

/// Repository for facility billing tables
#[derive(Debug, Clone)]
pub struct FacilityBillingRepository {
    pool: PgPool,
}

impl FacilityBillingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetches a client scoped to its company
    ///
    /// A client owned by another company is reported as not found.
    pub async fn get_client(&self, client_id: Uuid, company_id: Uuid) -> Result<ClientRow, DatabaseError> {
        sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT id, company_id, name, tax_rate, tax_exempt,
                   billing_display_mode, payment_terms
            FROM clients
            WHERE id = $1 AND company_id = $2
            "#,
        )
        .bind(client_id)
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Client", client_id))
    }

    pub async fn list_locations(&self, client_id: Uuid) -> Result<Vec<LocationRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, LocationRow>(
            r#"
            SELECT id, client_id, name, address, is_active
            FROM locations
            WHERE client_id = $1
            ORDER BY name, id
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_facility_profiles(&self, client_id: Uuid) -> Result<Vec<FacilityProfileRow>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM facility_profiles WHERE client_id = $1 ORDER BY sort_order, created_at, id",
            FACILITY_COLUMNS
        );
        let rows = sqlx::query_as::<_, FacilityProfileRow>(&sql)
            .bind(client_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// All seasonal rules, active or superseded, of a client's facilities
    pub async fn list_seasonal_rules(&self, client_id: Uuid) -> Result<Vec<SeasonalRuleRow>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM seasonal_rules
            WHERE facility_profile_id IN (SELECT id FROM facility_profiles WHERE client_id = $1)
            ORDER BY created_at DESC, id
            "#,
            SEASONAL_RULE_COLUMNS
        );
        let rows = sqlx::query_as::<_, SeasonalRuleRow>(&sql)
            .bind(client_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn list_monthly_overrides(&self, client_id: Uuid) -> Result<Vec<MonthlyOverrideRow>, DatabaseError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM monthly_overrides
            WHERE facility_profile_id IN (SELECT id FROM facility_profiles WHERE client_id = $1)
            ORDER BY year, month, id
            "#,
            MONTHLY_OVERRIDE_COLUMNS
        );
        let rows = sqlx::query_as::<_, MonthlyOverrideRow>(&sql)
            .bind(client_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn list_service_line_items(
        &self,
        client_id: Uuid,
        year: i32,
        month: i32,
    ) -> Result<Vec<ServiceLineItemRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, ServiceLineItemRow>(
            r#"
            SELECT id, client_id, facility_profile_id, description, year, month,
                   quantity, unit_rate, tax_behavior, status, performed_date, created_at
            FROM service_line_items
            WHERE client_id = $1 AND year = $2 AND month = $3
            ORDER BY created_at, id
            "#,
        )
        .bind(client_id)
        .bind(year)
        .bind(month)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn facility_exists(&self, facility_id: Uuid) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM facility_profiles WHERE id = $1)",
        )
        .bind(facility_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn insert_client(&self, row: &ClientRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO clients (id, company_id, name, tax_rate, tax_exempt,
                                 billing_display_mode, payment_terms)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(row.id)
        .bind(row.company_id)
        .bind(&row.name)
        .bind(row.tax_rate)
        .bind(row.tax_exempt)
        .bind(row.billing_display_mode)
        .bind(row.payment_terms)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_location(&self, row: &LocationRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO locations (id, client_id, name, address, is_active)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(row.id)
        .bind(row.client_id)
        .bind(&row.name)
        .bind(&row.address)
        .bind(row.is_active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Inserts a facility profile or replaces every mutable column of an existing one
    ///
    /// A stored closed profile only accepts another closed save. Returns
    /// `false` when the write was refused for that reason.
    pub async fn upsert_facility_profile(&self, row: &FacilityProfileRow) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            r#"
            INSERT INTO facility_profiles (
                id, client_id, location_id, category, default_monthly_rate, rate_type,
                tax_behavior, status, go_live_date, pause_start_date, pause_end_date,
                seasonal_rules_enabled, normal_days_of_week, normal_frequency_per_week,
                sort_order, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            ON CONFLICT (id) DO UPDATE SET
                location_id = EXCLUDED.location_id,
                category = EXCLUDED.category,
                default_monthly_rate = EXCLUDED.default_monthly_rate,
                rate_type = EXCLUDED.rate_type,
                tax_behavior = EXCLUDED.tax_behavior,
                status = EXCLUDED.status,
                go_live_date = EXCLUDED.go_live_date,
                pause_start_date = EXCLUDED.pause_start_date,
                pause_end_date = EXCLUDED.pause_end_date,
                seasonal_rules_enabled = EXCLUDED.seasonal_rules_enabled,
                normal_days_of_week = EXCLUDED.normal_days_of_week,
                normal_frequency_per_week = EXCLUDED.normal_frequency_per_week,
                sort_order = EXCLUDED.sort_order,
                updated_at = NOW()
            WHERE facility_profiles.status <> 'closed' OR EXCLUDED.status = 'closed'
            "#,
        )
        .bind(row.id)
        .bind(row.client_id)
        .bind(row.location_id)
        .bind(&row.category)
        .bind(row.default_monthly_rate)
        .bind(row.rate_type)
        .bind(row.tax_behavior)
        .bind(row.status)
        .bind(row.go_live_date)
        .bind(row.pause_start_date)
        .bind(row.pause_end_date)
        .bind(row.seasonal_rules_enabled)
        .bind(&row.normal_days_of_week)
        .bind(row.normal_frequency_per_week)
        .bind(row.sort_order)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Stores an override keyed by (facility, year, month), keeping the existing id on conflict
    pub async fn upsert_monthly_override(&self, row: &MonthlyOverrideRow) -> Result<MonthlyOverrideRow, DatabaseError> {
        let sql = format!(
            r#"
            INSERT INTO monthly_overrides (
                id, facility_profile_id, year, month, override_status,
                override_rate, override_frequency, override_notes, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            ON CONFLICT (facility_profile_id, year, month) DO UPDATE SET
                override_status = EXCLUDED.override_status,
                override_rate = EXCLUDED.override_rate,
                override_frequency = EXCLUDED.override_frequency,
                override_notes = EXCLUDED.override_notes,
                updated_at = NOW()
            RETURNING {}
            "#,
            MONTHLY_OVERRIDE_COLUMNS
        );
        let stored = sqlx::query_as::<_, MonthlyOverrideRow>(&sql)
            .bind(row.id)
            .bind(row.facility_profile_id)
            .bind(row.year)
            .bind(row.month)
            .bind(row.override_status)
            .bind(row.override_rate)
            .bind(row.override_frequency)
            .bind(&row.override_notes)
            .fetch_one(&self.pool)
            .await?;
        Ok(stored)
    }

    /// Deactivates the facility's active rules and inserts `row` as active, atomically
    pub async fn supersede_seasonal_rules(&self, row: &SeasonalRuleRow) -> Result<SeasonalRuleRow, DatabaseError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;

        sqlx::query(
            "UPDATE seasonal_rules SET is_active = FALSE WHERE facility_profile_id = $1 AND is_active",
        )
        .bind(row.facility_profile_id)
        .execute(&mut *tx)
        .await?;

        let sql = format!(
            r#"
            INSERT INTO seasonal_rules (
                id, facility_profile_id, start_month, end_month, status, rate,
                frequency_per_week, is_active, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, $8)
            RETURNING {}
            "#,
            SEASONAL_RULE_COLUMNS
        );
        let stored = sqlx::query_as::<_, SeasonalRuleRow>(&sql)
            .bind(row.id)
            .bind(row.facility_profile_id)
            .bind(row.start_month)
            .bind(row.end_month)
            .bind(row.status)
            .bind(row.rate)
            .bind(row.frequency_per_week)
            .bind(row.created_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;
        Ok(stored)
    }

    pub async fn insert_service_line_item(&self, row: &ServiceLineItemRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO service_line_items (
                id, client_id, facility_profile_id, description, year, month,
                quantity, unit_rate, tax_behavior, status, performed_date, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(row.id)
        .bind(row.client_id)
        .bind(row.facility_profile_id)
        .bind(&row.description)
        .bind(row.year)
        .bind(row.month)
        .bind(row.quantity)
        .bind(row.unit_rate)
        .bind(row.tax_behavior)
        .bind(row.status)
        .bind(row.performed_date)
        .bind(row.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
