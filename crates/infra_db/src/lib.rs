//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for facility billing using SQLx. The crate owns
//! the schema (see `migrations/` at the workspace root), the row-level
//! [`FacilityBillingRepository`], and [`PostgresFacilityBillingAdapter`],
//! which implements the billing engine's `FacilityBillingPort`.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{DatabaseConfig, create_pool, run_migrations, PostgresFacilityBillingAdapter};
//!
//! let pool = create_pool(DatabaseConfig::from_env()?).await?;
//! run_migrations(&pool).await?;
//! let adapter = PostgresFacilityBillingAdapter::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{DatabasePool, create_pool, create_pool_from_url, run_migrations, DatabaseConfig};
pub use error::DatabaseError;
pub use repositories::FacilityBillingRepository;
pub use adapters::PostgresFacilityBillingAdapter;
