//! Billing engine settings

use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Timezone};

/// Settings shared by every preview the service produces
///
/// Loaded from `BILLING_*` environment variables:
///
/// - `BILLING_CURRENCY` - ISO code every amount is priced in (default `USD`)
/// - `BILLING_TIMEZONE` - IANA zone used to decide the current month (default `UTC`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillingSettings {
    pub currency: Currency,
    pub timezone: Timezone,
}

impl Default for BillingSettings {
    fn default() -> Self {
        Self {
            currency: Currency::USD,
            timezone: Timezone::default(),
        }
    }
}

impl BillingSettings {
    /// Loads settings from `BILLING_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_env_with_prefix("BILLING")
    }

    /// Loads settings after reading a `.env` file, if one exists
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env_with_prefix(prefix: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix(prefix))
            .build()?
            .try_deserialize()
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_timezone(mut self, timezone: Timezone) -> Self {
        self.timezone = timezone;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let settings = BillingSettings::from_env_with_prefix("BILLING_UNSET_PREFIX").unwrap();
        assert_eq!(settings, BillingSettings::default());
    }

    #[test]
    fn test_reads_currency_and_timezone() {
        std::env::set_var("BILLING_SETTINGS_TEST_CURRENCY", "CAD");
        std::env::set_var("BILLING_SETTINGS_TEST_TIMEZONE", "America/Toronto");

        let settings = BillingSettings::from_env_with_prefix("BILLING_SETTINGS_TEST").unwrap();
        assert_eq!(settings.currency, Currency::CAD);
        assert_eq!(settings.timezone.0.name(), "America/Toronto");
    }

    #[test]
    fn test_rejects_unknown_timezone() {
        std::env::set_var("BILLING_BAD_TZ_TEST_TIMEZONE", "Mars/Olympus");
        assert!(BillingSettings::from_env_with_prefix("BILLING_BAD_TZ_TEST").is_err());
    }
}
