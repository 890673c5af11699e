//! Billing domain errors

use core_kernel::{MoneyError, PortError, TemporalError};
use std::fmt;
use thiserror::Error;

/// Errors raised by the billing engine
///
/// Callers map these to their own transport: `NotFound` and `Validation` are
/// the caller's fault, everything else is not.
#[derive(Debug, Error)]
pub enum BillingError {
    /// Client does not exist, or does not belong to the requesting company
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request or record values are out of range
    #[error("Validation error: {0}")]
    Validation(String),

    /// A record references another record that does not exist
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    /// A facility status change that is not allowed
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        from: String,
        to: String,
    },

    /// Money arithmetic failed
    #[error("Calculation error: {0}")]
    Calculation(String),

    /// The repository failed for a reason other than a missing record
    #[error("Repository error: {0}")]
    Repository(#[source] PortError),
}

impl BillingError {
    pub fn not_found(message: impl Into<String>) -> Self {
        BillingError::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        BillingError::Validation(message.into())
    }

    pub fn data_integrity(message: impl Into<String>) -> Self {
        BillingError::DataIntegrity(message.into())
    }

    pub fn invalid_transition(from: impl fmt::Debug, to: impl fmt::Debug) -> Self {
        BillingError::InvalidStateTransition {
            from: format!("{:?}", from),
            to: format!("{:?}", to),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BillingError::NotFound(_))
    }

    /// True for errors caused by the request rather than by stored data or infrastructure
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BillingError::NotFound(_)
                | BillingError::Validation(_)
                | BillingError::InvalidStateTransition { .. }
        )
    }
}

impl From<TemporalError> for BillingError {
    fn from(error: TemporalError) -> Self {
        BillingError::Validation(error.to_string())
    }
}

impl From<MoneyError> for BillingError {
    fn from(error: MoneyError) -> Self {
        BillingError::Calculation(error.to_string())
    }
}

impl From<PortError> for BillingError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { entity_type, id } => {
                BillingError::NotFound(format!("{} {}", entity_type, id))
            }
            other => BillingError::Repository(other),
        }
    }
}
