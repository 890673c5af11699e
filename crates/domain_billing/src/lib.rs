//! Billing Domain - Facility Billing Resolution Engine
//!
//! For every facility a client has under contract, this crate decides what
//! status, rate, and service frequency are actually in effect for a calendar
//! month, turns that into invoice line items, totals them, and compares one
//! month against the one before it.
//!
//! # Resolution layers
//!
//! Layers are evaluated highest precedence first; the first layer to set a
//! field wins it:
//!
//! 1. Closed guard (terminal)
//! 2. Not-yet-live guard
//! 3. Monthly override
//! 4. Seasonal rule
//! 5. Pause window
//! 6. Base contract
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_billing::{FacilityBillingService, BillingSettings};
//! use std::sync::Arc;
//!
//! let service = FacilityBillingService::new(Arc::new(adapter), BillingSettings::default());
//! let preview = service.generate_billing_preview(client_id, company_id, 2026, 10).await?;
//! let delta = service.generate_delta(client_id, company_id, 2026, 11).await?;
//! ```

pub mod client;
pub mod facility;
pub mod overrides;
pub mod service_item;
pub mod resolver;
pub mod line_items;
pub mod aggregator;
pub mod preview;
pub mod delta;
pub mod ports;
pub mod services;
pub mod settings;
pub mod error;

pub use client::{Client, Location, BillingDisplayMode, PaymentTerms};
pub use facility::{FacilityProfile, FacilityStatus, EffectiveStatus, RateType, TaxBehavior};
pub use overrides::{SeasonalRule, MonthlyOverride};
pub use service_item::{ServiceLineItem, ServiceItemStatus};
pub use resolver::{resolve, LayerOutcome, PartialState, ResolvedState, ResolutionLayer};
pub use line_items::{build_line_items, FacilityResolution, LineItem, LineItemKind};
pub use aggregator::{aggregate, line_tax, Totals};
pub use preview::{assemble_preview, BillingPreview};
pub use delta::{compare_previews, ChangeType, DeltaReport, FacilityDelta};
pub use ports::{FacilityBillingPort, FacilityRecord};
pub use services::FacilityBillingService;
pub use settings::BillingSettings;
pub use error::BillingError;
