//! Test Utilities Crate
//!
//! Shared test infrastructure for the facility billing workspace.
//!
//! # Modules
//!
//! - `fixtures`: Fixed periods, amounts, and tax rates
//! - `builders`: `BillingScenario` for seeding the mock port or PostgreSQL
//! - `database`: PostgreSQL test containers with migrations applied
//! - `assertions`: Preview and delta consistency checks
//! - `generators`: Property-based test data generators
//! - `logging`: One-time test subscriber setup

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;
pub mod logging;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
pub use logging::init_test_tracing;
