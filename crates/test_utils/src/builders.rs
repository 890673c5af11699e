//! Test Data Builders
//!
//! [`BillingScenario`] collects a client with its locations, facilities,
//! rules, overrides, and ad-hoc items, then seeds them into the in-memory
//! port or into PostgreSQL. Tests state only what matters to them.

use std::sync::Arc;

use fake::faker::address::en::CityName;
use fake::faker::company::en::CompanyName;
use fake::Fake;
use rust_decimal::Decimal;

use core_kernel::{ClientId, CompanyId, FacilityProfileId, LocationId, PortError};
use domain_billing::ports::mock::MockFacilityBillingPort;
use domain_billing::{
    BillingSettings, Client, FacilityBillingPort, FacilityBillingService, FacilityProfile,
    FacilityStatus, Location, MonthlyOverride, SeasonalRule, ServiceLineItem,
};
use infra_db::PostgresFacilityBillingAdapter;

use crate::fixtures::TaxFixtures;

/// A random company name for clients
pub fn fake_client_name() -> String {
    CompanyName().fake()
}

/// A random city name for locations
pub fn fake_location_name() -> String {
    CityName().fake()
}

/// A client and everything billed to it
#[derive(Debug, Clone)]
pub struct BillingScenario {
    pub client: Client,
    pub locations: Vec<Location>,
    pub facilities: Vec<FacilityProfile>,
    pub seasonal_rules: Vec<SeasonalRule>,
    pub monthly_overrides: Vec<MonthlyOverride>,
    pub service_items: Vec<ServiceLineItem>,
}

impl Default for BillingScenario {
    fn default() -> Self {
        Self::new()
    }
}

impl BillingScenario {
    /// A client at the standard 8.25% tax rate with nothing billed yet
    pub fn new() -> Self {
        Self::for_client(Client::new(
            CompanyId::new(),
            fake_client_name(),
            TaxFixtures::standard_rate(),
        ))
    }

    pub fn for_client(client: Client) -> Self {
        Self {
            client,
            locations: Vec::new(),
            facilities: Vec::new(),
            seasonal_rules: Vec::new(),
            monthly_overrides: Vec::new(),
            service_items: Vec::new(),
        }
    }

    pub fn client_id(&self) -> ClientId {
        self.client.id
    }

    pub fn company_id(&self) -> CompanyId {
        self.client.company_id
    }

    /// Replaces the client, keeping its id and company
    pub fn with_client(mut self, customize: impl FnOnce(Client) -> Client) -> Self {
        let (id, company_id) = (self.client.id, self.client.company_id);
        self.client = customize(self.client);
        self.client.id = id;
        self.client.company_id = company_id;
        self
    }

    pub fn add_location(&mut self, name: impl Into<String>) -> LocationId {
        let location = Location::new(self.client.id, name);
        let id = location.id;
        self.locations.push(location);
        id
    }

    /// Adds a facility at `location_id`, shaped by `customize`
    pub fn add_facility(
        &mut self,
        location_id: LocationId,
        category: &str,
        rate: Decimal,
        customize: impl FnOnce(FacilityProfile) -> FacilityProfile,
    ) -> FacilityProfileId {
        let profile = customize(FacilityProfile::new(self.client.id, location_id, category, rate));
        let id = profile.id;
        self.facilities.push(profile);
        id
    }

    /// Adds an active facility at a new randomly named location
    pub fn add_active_facility(&mut self, category: &str, rate: Decimal) -> FacilityProfileId {
        let location_id = self.add_location(fake_location_name());
        self.add_facility(location_id, category, rate, |f| f.with_status(FacilityStatus::Active))
    }

    pub fn add_seasonal_rule(&mut self, rule: SeasonalRule) {
        self.seasonal_rules.push(rule);
    }

    pub fn add_monthly_override(&mut self, monthly_override: MonthlyOverride) {
        self.monthly_overrides.push(monthly_override);
    }

    pub fn add_service_item(&mut self, item: ServiceLineItem) {
        self.service_items.push(item);
    }

    pub fn facility(&self, id: FacilityProfileId) -> Option<&FacilityProfile> {
        self.facilities.iter().find(|f| f.id == id)
    }

    /// Stores every record in the in-memory port as-is
    pub async fn seed(&self, port: &MockFacilityBillingPort) {
        port.insert_client(self.client.clone()).await;
        for location in &self.locations {
            port.insert_location(location.clone()).await;
        }
        for facility in &self.facilities {
            port.insert_facility(facility.clone()).await;
        }
        for rule in &self.seasonal_rules {
            port.insert_seasonal_rule(rule.clone()).await;
        }
        for monthly_override in &self.monthly_overrides {
            port.insert_monthly_override(monthly_override.clone()).await;
        }
        for item in &self.service_items {
            port.insert_service_item(item.clone()).await;
        }
    }

    /// Seeds a fresh mock port and returns a service over it
    pub async fn mock_service(&self) -> (FacilityBillingService, Arc<MockFacilityBillingPort>) {
        self.mock_service_with(BillingSettings::default()).await
    }

    pub async fn mock_service_with(
        &self,
        settings: BillingSettings,
    ) -> (FacilityBillingService, Arc<MockFacilityBillingPort>) {
        let port = Arc::new(MockFacilityBillingPort::new());
        self.seed(&port).await;
        let service = FacilityBillingService::new(port.clone(), settings);
        (service, port)
    }

    /// Stores every record through the PostgreSQL adapter
    ///
    /// Active seasonal rules are stored in order through supersession, so
    /// only the last active rule per facility stays active.
    pub async fn seed_postgres(&self, adapter: &PostgresFacilityBillingAdapter) -> Result<(), PortError> {
        adapter.insert_client(&self.client).await?;
        for location in &self.locations {
            adapter.insert_location(location).await?;
        }
        for facility in &self.facilities {
            adapter.save_facility_profile(facility).await?;
        }
        for rule in self.seasonal_rules.iter().filter(|r| r.is_active) {
            adapter.supersede_seasonal_rules(rule.clone()).await?;
        }
        for monthly_override in &self.monthly_overrides {
            adapter.upsert_monthly_override(monthly_override.clone()).await?;
        }
        for item in &self.service_items {
            adapter.insert_service_line_item(item).await?;
        }
        Ok(())
    }
}
