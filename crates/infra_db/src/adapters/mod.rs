//! Domain Adapters
//!
//! Port implementations that connect domain interfaces to PostgreSQL.
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresFacilityBillingAdapter;
//! use domain_billing::FacilityBillingPort;
//!
//! let adapter = PostgresFacilityBillingAdapter::new(pool);
//! let client = adapter.get_client(client_id, company_id).await?;
//! ```

pub mod facility_billing;

pub use facility_billing::PostgresFacilityBillingAdapter;
