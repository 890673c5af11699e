//! Repository implementations
//!
//! Repositories own the SQL. They work in row types that mirror the tables
//! and leave mapping to domain records to the adapters.

pub mod facility_billing;

pub use facility_billing::FacilityBillingRepository;
