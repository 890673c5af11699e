//! Repository port for facility billing
//!
//! The billing engine reads everything it needs for a client-month through
//! [`FacilityBillingPort`] and never touches storage directly. The PostgreSQL
//! adapter lives in `infra_db`; [`mock::MockFacilityBillingPort`] keeps data in
//! memory for tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{BillingPeriod, ClientId, CompanyId, DomainPort, HealthCheckable, PortError};

use crate::client::{Client, Location};
use crate::facility::FacilityProfile;
use crate::overrides::{MonthlyOverride, SeasonalRule};
use crate::service_item::ServiceLineItem;

/// A facility together with the rules that can override it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityRecord {
    pub profile: FacilityProfile,
    /// Active and superseded rules; the resolver skips inactive ones
    pub seasonal_rules: Vec<SeasonalRule>,
    pub monthly_overrides: Vec<MonthlyOverride>,
}

impl FacilityRecord {
    pub fn new(profile: FacilityProfile) -> Self {
        Self {
            profile,
            seasonal_rules: Vec::new(),
            monthly_overrides: Vec::new(),
        }
    }

    pub fn with_seasonal_rule(mut self, rule: SeasonalRule) -> Self {
        self.seasonal_rules.push(rule);
        self
    }

    pub fn with_monthly_override(mut self, monthly_override: MonthlyOverride) -> Self {
        self.monthly_overrides.push(monthly_override);
        self
    }
}

/// Port for reading and maintaining facility billing records
///
/// All reads are scoped to one client. Tenant isolation happens in
/// `get_client`: a client outside the requesting company is reported as not
/// found, exactly like a missing one.
#[async_trait]
pub trait FacilityBillingPort: DomainPort + HealthCheckable {
    /// Fetches a client owned by `company_id`
    ///
    /// # Errors
    ///
    /// `PortError::NotFound` when the client does not exist or belongs to
    /// another company.
    async fn get_client(&self, client_id: ClientId, company_id: CompanyId) -> Result<Client, PortError>;

    async fn list_locations(&self, client_id: ClientId) -> Result<Vec<Location>, PortError>;

    /// All facility profiles of a client, with their seasonal rules and monthly overrides
    async fn list_facility_profiles(&self, client_id: ClientId) -> Result<Vec<FacilityRecord>, PortError>;

    /// Ad-hoc items recorded against `period`, in any status
    async fn list_service_line_items(
        &self,
        client_id: ClientId,
        period: BillingPeriod,
    ) -> Result<Vec<ServiceLineItem>, PortError>;

    /// Inserts or replaces a facility profile
    ///
    /// Fails with `Conflict` when the stored profile is closed and the new
    /// one is not.
    async fn save_facility_profile(&self, profile: &FacilityProfile) -> Result<(), PortError>;

    /// Stores an override, replacing any existing one for the same facility and month
    ///
    /// The stored override keeps the original id when it replaces one.
    async fn upsert_monthly_override(&self, monthly_override: MonthlyOverride) -> Result<MonthlyOverride, PortError>;

    /// Deactivates the facility's active seasonal rules and stores `rule` as the active one
    async fn supersede_seasonal_rules(&self, rule: SeasonalRule) -> Result<SeasonalRule, PortError>;
}

/// In-memory implementation of FacilityBillingPort for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use chrono::Utc;
    use crate::facility::FacilityStatus;
    use core_kernel::{AdapterHealth, FacilityProfileId, HealthCheckResult, LocationId};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    #[derive(Debug, Default)]
    pub struct MockFacilityBillingPort {
        clients: Arc<RwLock<HashMap<ClientId, Client>>>,
        locations: Arc<RwLock<HashMap<LocationId, Location>>>,
        facilities: Arc<RwLock<HashMap<FacilityProfileId, FacilityProfile>>>,
        seasonal_rules: Arc<RwLock<Vec<SeasonalRule>>>,
        monthly_overrides: Arc<RwLock<Vec<MonthlyOverride>>>,
        service_items: Arc<RwLock<Vec<ServiceLineItem>>>,
        unavailable: Arc<AtomicBool>,
    }

    impl MockFacilityBillingPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn insert_client(&self, client: Client) {
            self.clients.write().await.insert(client.id, client);
        }

        pub async fn insert_location(&self, location: Location) {
            self.locations.write().await.insert(location.id, location);
        }

        /// Stores a facility without validating it
        pub async fn insert_facility(&self, profile: FacilityProfile) {
            self.facilities.write().await.insert(profile.id, profile);
        }

        pub async fn insert_seasonal_rule(&self, rule: SeasonalRule) {
            self.seasonal_rules.write().await.push(rule);
        }

        /// Stores an override as-is, without the upsert check
        pub async fn insert_monthly_override(&self, monthly_override: MonthlyOverride) {
            self.monthly_overrides.write().await.push(monthly_override);
        }

        pub async fn insert_service_item(&self, item: ServiceLineItem) {
            self.service_items.write().await.push(item);
        }

        /// Makes every subsequent call fail with a connection error
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        pub async fn seasonal_rules_for(&self, facility_id: FacilityProfileId) -> Vec<SeasonalRule> {
            self.seasonal_rules
                .read()
                .await
                .iter()
                .filter(|r| r.facility_profile_id == facility_id)
                .cloned()
                .collect()
        }

        pub async fn monthly_overrides_for(&self, facility_id: FacilityProfileId) -> Vec<MonthlyOverride> {
            self.monthly_overrides
                .read()
                .await
                .iter()
                .filter(|o| o.facility_profile_id == facility_id)
                .cloned()
                .collect()
        }

        fn check_available(&self) -> Result<(), PortError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(PortError::connection("mock port is unavailable"));
            }
            Ok(())
        }

        async fn ensure_facility(&self, facility_id: FacilityProfileId) -> Result<(), PortError> {
            if !self.facilities.read().await.contains_key(&facility_id) {
                return Err(PortError::not_found("FacilityProfile", facility_id));
            }
            Ok(())
        }
    }

    impl DomainPort for MockFacilityBillingPort {}

    #[async_trait]
    impl HealthCheckable for MockFacilityBillingPort {
        async fn health_check(&self) -> HealthCheckResult {
            let mut result = HealthCheckResult::healthy("mock-facility-billing-port");
            if self.unavailable.load(Ordering::SeqCst) {
                result.status = AdapterHealth::Unhealthy;
                result.message = Some("Marked unavailable".to_string());
            }
            result.checked_at = Utc::now();
            result
        }
    }

    #[async_trait]
    impl FacilityBillingPort for MockFacilityBillingPort {
        async fn get_client(&self, client_id: ClientId, company_id: CompanyId) -> Result<Client, PortError> {
            self.check_available()?;
            self.clients
                .read()
                .await
                .get(&client_id)
                .filter(|c| c.belongs_to(company_id))
                .cloned()
                .ok_or_else(|| PortError::not_found("Client", client_id))
        }

        async fn list_locations(&self, client_id: ClientId) -> Result<Vec<Location>, PortError> {
            self.check_available()?;
            Ok(self
                .locations
                .read()
                .await
                .values()
                .filter(|l| l.client_id == client_id)
                .cloned()
                .collect())
        }

        async fn list_facility_profiles(&self, client_id: ClientId) -> Result<Vec<FacilityRecord>, PortError> {
            self.check_available()?;
            let facilities = self.facilities.read().await;
            let rules = self.seasonal_rules.read().await;
            let overrides = self.monthly_overrides.read().await;

            Ok(facilities
                .values()
                .filter(|f| f.client_id == client_id)
                .map(|f| FacilityRecord {
                    profile: f.clone(),
                    seasonal_rules: rules
                        .iter()
                        .filter(|r| r.facility_profile_id == f.id)
                        .cloned()
                        .collect(),
                    monthly_overrides: overrides
                        .iter()
                        .filter(|o| o.facility_profile_id == f.id)
                        .cloned()
                        .collect(),
                })
                .collect())
        }

        async fn list_service_line_items(
            &self,
            client_id: ClientId,
            period: BillingPeriod,
        ) -> Result<Vec<ServiceLineItem>, PortError> {
            self.check_available()?;
            Ok(self
                .service_items
                .read()
                .await
                .iter()
                .filter(|i| i.client_id == client_id && i.period == period)
                .cloned()
                .collect())
        }

        async fn save_facility_profile(&self, profile: &FacilityProfile) -> Result<(), PortError> {
            self.check_available()?;
            profile
                .validate()
                .map_err(|e| PortError::validation(e.to_string()))?;
            let mut facilities = self.facilities.write().await;
            if let Some(stored) = facilities.get(&profile.id) {
                if stored.status == FacilityStatus::Closed && profile.status != FacilityStatus::Closed {
                    return Err(PortError::conflict(format!(
                        "Facility profile {} is closed and cannot be reopened",
                        profile.id
                    )));
                }
            }
            facilities.insert(profile.id, profile.clone());
            Ok(())
        }

        async fn upsert_monthly_override(&self, monthly_override: MonthlyOverride) -> Result<MonthlyOverride, PortError> {
            self.check_available()?;
            monthly_override
                .validate()
                .map_err(|e| PortError::validation(e.to_string()))?;
            self.ensure_facility(monthly_override.facility_profile_id).await?;

            let mut overrides = self.monthly_overrides.write().await;
            let existing = overrides.iter_mut().find(|o| {
                o.applies_to(monthly_override.facility_profile_id, monthly_override.period)
            });

            let stored = match existing {
                Some(current) => {
                    current.override_status = monthly_override.override_status;
                    current.override_rate = monthly_override.override_rate;
                    current.override_frequency = monthly_override.override_frequency;
                    current.override_notes = monthly_override.override_notes;
                    current.updated_at = Utc::now();
                    current.clone()
                }
                None => {
                    overrides.push(monthly_override.clone());
                    monthly_override
                }
            };
            Ok(stored)
        }

        async fn supersede_seasonal_rules(&self, rule: SeasonalRule) -> Result<SeasonalRule, PortError> {
            self.check_available()?;
            rule.validate().map_err(|e| PortError::validation(e.to_string()))?;
            self.ensure_facility(rule.facility_profile_id).await?;

            let mut rules = self.seasonal_rules.write().await;
            rules
                .iter_mut()
                .filter(|r| r.facility_profile_id == rule.facility_profile_id && r.is_active)
                .for_each(SeasonalRule::deactivate);

            let mut stored = rule;
            stored.is_active = true;
            rules.push(stored.clone());
            Ok(stored)
        }
    }
}
