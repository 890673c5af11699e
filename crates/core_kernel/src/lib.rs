//! Core Kernel - Foundational types for the facility billing system
//!
//! This crate provides the building blocks shared by the billing engine and
//! its persistence adapters:
//! - Money types with precise decimal arithmetic and currency rounding
//! - Calendar billing periods with month-granularity comparisons
//! - Strongly-typed identifiers
//! - Port error and health types for repository adapters

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError, Rate};
pub use temporal::{BillingPeriod, MonthWindow, TemporalError, Timezone};
pub use identifiers::{
    CompanyId, ClientId, LocationId, FacilityProfileId,
    SeasonalRuleId, MonthlyOverrideId, ServiceLineItemId,
};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
