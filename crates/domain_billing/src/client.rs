//! Clients and their service locations
//!
//! A client is the billed party. It belongs to exactly one company (the
//! tenant) and owns the locations where facilities are installed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ClientId, CompanyId, LocationId, Rate};

use crate::error::BillingError;

/// How the invoice presents amounts to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingDisplayMode {
    /// Show the pre-tax subtotal only
    PreTaxOnly,
    /// Show subtotal, tax, and total
    WithTax,
}

impl Default for BillingDisplayMode {
    fn default() -> Self {
        BillingDisplayMode::WithTax
    }
}

/// Invoice payment terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentTerms {
    DueOnReceipt,
    #[serde(rename = "NET_15")]
    Net15,
    #[serde(rename = "NET_30")]
    Net30,
    #[serde(rename = "NET_45")]
    Net45,
    #[serde(rename = "NET_60")]
    Net60,
}

impl PaymentTerms {
    /// Days after the invoice date that payment is due
    pub fn days(&self) -> u32 {
        match self {
            PaymentTerms::DueOnReceipt => 0,
            PaymentTerms::Net15 => 15,
            PaymentTerms::Net30 => 30,
            PaymentTerms::Net45 => 45,
            PaymentTerms::Net60 => 60,
        }
    }
}

impl Default for PaymentTerms {
    fn default() -> Self {
        PaymentTerms::Net30
    }
}

/// The billed party
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    /// Owning tenant
    pub company_id: CompanyId,
    pub name: String,
    /// Sales tax rate applied to taxable lines
    pub tax_rate: Rate,
    /// Exempt clients pay no tax on lines that inherit the client setting
    pub tax_exempt: bool,
    pub billing_display_mode: BillingDisplayMode,
    pub payment_terms: PaymentTerms,
}

impl Client {
    pub fn new(company_id: CompanyId, name: impl Into<String>, tax_rate: Decimal) -> Self {
        Self {
            id: ClientId::new(),
            company_id,
            name: name.into(),
            tax_rate: Rate::new(tax_rate),
            tax_exempt: false,
            billing_display_mode: BillingDisplayMode::default(),
            payment_terms: PaymentTerms::default(),
        }
    }

    pub fn with_tax_exempt(mut self, exempt: bool) -> Self {
        self.tax_exempt = exempt;
        self
    }

    pub fn with_display_mode(mut self, mode: BillingDisplayMode) -> Self {
        self.billing_display_mode = mode;
        self
    }

    pub fn with_payment_terms(mut self, terms: PaymentTerms) -> Self {
        self.payment_terms = terms;
        self
    }

    /// Returns true if this client is owned by `company_id`
    pub fn belongs_to(&self, company_id: CompanyId) -> bool {
        self.company_id == company_id
    }

    pub fn validate(&self) -> Result<(), BillingError> {
        if self.name.trim().is_empty() {
            return Err(BillingError::validation("Client name is required"));
        }
        Rate::try_new(self.tax_rate.as_decimal())
            .map_err(|e| BillingError::validation(e.to_string()))?;
        Ok(())
    }
}

/// A physical site belonging to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub client_id: ClientId,
    pub name: String,
    pub address: Option<String>,
    pub is_active: bool,
}

impl Location {
    pub fn new(client_id: ClientId, name: impl Into<String>) -> Self {
        Self {
            id: LocationId::new(),
            client_id,
            name: name.into(),
            address: None,
            is_active: true,
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}
