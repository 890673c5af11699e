//! Facility billing service
//!
//! Orchestrates one client-month: load every record up front through the
//! repository port, then resolve, build, and total without further I/O.

use std::sync::Arc;
use tracing::{debug, instrument};

use core_kernel::{BillingPeriod, ClientId, CompanyId};

use crate::delta::{compare_previews, DeltaReport};
use crate::error::BillingError;
use crate::ports::FacilityBillingPort;
use crate::preview::{assemble_preview, BillingPreview};
use crate::settings::BillingSettings;

/// Produces invoice previews and month-over-month deltas
///
/// Holds no caches; concurrent calls share only the port and the settings.
#[derive(Clone)]
pub struct FacilityBillingService {
    port: Arc<dyn FacilityBillingPort>,
    settings: BillingSettings,
}

impl FacilityBillingService {
    pub fn new(port: Arc<dyn FacilityBillingPort>, settings: BillingSettings) -> Self {
        Self { port, settings }
    }

    pub fn settings(&self) -> &BillingSettings {
        &self.settings
    }

    /// The current month in the configured timezone
    pub fn current_period(&self) -> BillingPeriod {
        BillingPeriod::current_in(&self.settings.timezone)
    }

    /// Builds the invoice preview for one client and month
    ///
    /// # Errors
    ///
    /// - `Validation` if the month is outside 1-12 or the year is out of range;
    ///   checked before any lookup
    /// - `NotFound` if the client does not exist or belongs to another company
    /// - `DataIntegrity` if a facility or service item references a missing record
    /// - `Repository` if the port fails
    #[instrument(skip(self, client_id, company_id), fields(client_id = %client_id, company_id = %company_id))]
    pub async fn generate_billing_preview(
        &self,
        client_id: ClientId,
        company_id: CompanyId,
        year: i32,
        month: u32,
    ) -> Result<BillingPreview, BillingError> {
        let period = BillingPeriod::new(year, month)?;
        self.preview_for_period(client_id, company_id, period).await
    }

    /// Builds the preview for the current month in the configured timezone
    pub async fn generate_current_preview(
        &self,
        client_id: ClientId,
        company_id: CompanyId,
    ) -> Result<BillingPreview, BillingError> {
        self.preview_for_period(client_id, company_id, self.current_period())
            .await
    }

    /// Compares a month with the one before it
    ///
    /// January is compared with December of the prior year. Both previews are
    /// generated concurrently; the first failure aborts the comparison.
    #[instrument(skip(self, client_id, company_id), fields(client_id = %client_id, company_id = %company_id))]
    pub async fn generate_delta(
        &self,
        client_id: ClientId,
        company_id: CompanyId,
        year: i32,
        month: u32,
    ) -> Result<DeltaReport, BillingError> {
        let current_period = BillingPeriod::new(year, month)?;
        let previous_period = current_period.previous()?;

        let (current, previous) = tokio::try_join!(
            self.preview_for_period(client_id, company_id, current_period),
            self.preview_for_period(client_id, company_id, previous_period),
        )?;

        let report = compare_previews(&current, &previous)?;
        debug!(
            current = %current_period,
            previous = %previous_period,
            facilities = report.facilities.len(),
            total_delta = %report.total_delta.amount(),
            "computed billing delta"
        );
        Ok(report)
    }

    async fn preview_for_period(
        &self,
        client_id: ClientId,
        company_id: CompanyId,
        period: BillingPeriod,
    ) -> Result<BillingPreview, BillingError> {
        let client = self.port.get_client(client_id, company_id).await?;

        let (locations, facilities, service_items) = tokio::try_join!(
            self.port.list_locations(client_id),
            self.port.list_facility_profiles(client_id),
            self.port.list_service_line_items(client_id, period),
        )?;

        debug!(
            period = %period,
            locations = locations.len(),
            facilities = facilities.len(),
            service_items = service_items.len(),
            "loaded client month"
        );

        let preview = assemble_preview(
            &client,
            facilities,
            &locations,
            service_items,
            period,
            self.settings.currency,
        )?;

        debug!(
            period = %period,
            line_items = preview.line_items.len(),
            subtotal = %preview.subtotal.amount(),
            tax = %preview.tax_amount.amount(),
            "generated billing preview"
        );
        Ok(preview)
    }
}
