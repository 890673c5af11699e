//! Pre-built Test Fixtures
//!
//! Ready-to-use values for facility billing tests. Fixtures are fixed and
//! predictable; use the builders when a test needs random names.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{BillingPeriod, CompanyId, Currency, Money};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// The standard restroom contract rate
    pub fn usd_1000() -> Money {
        Money::new(dec!(1000.00), Currency::USD)
    }

    pub fn usd_zero() -> Money {
        Money::zero(Currency::USD)
    }

    /// Creates a CAD amount for currency mismatch tests
    pub fn cad_100() -> Money {
        Money::new(dec!(100.00), Currency::CAD)
    }
}

/// Fixture for billing periods
pub struct PeriodFixtures;

impl PeriodFixtures {
    /// October 2026, the reference month for scenario tests
    pub fn october_2026() -> BillingPeriod {
        BillingPeriod::new(2026, 10).unwrap()
    }

    pub fn november_2026() -> BillingPeriod {
        BillingPeriod::new(2026, 11).unwrap()
    }

    pub fn december_2026() -> BillingPeriod {
        BillingPeriod::new(2026, 12).unwrap()
    }

    pub fn january_2027() -> BillingPeriod {
        BillingPeriod::new(2027, 1).unwrap()
    }
}

/// Fixture for dates and timestamps
pub struct TemporalFixtures;

impl TemporalFixtures {
    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    /// Midnight UTC on the given day
    pub fn timestamp(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
    }
}

/// Fixture for tax rates
pub struct TaxFixtures;

impl TaxFixtures {
    /// 8.25%
    pub fn standard_rate() -> Decimal {
        dec!(0.0825)
    }

    pub fn zero_rate() -> Decimal {
        Decimal::ZERO
    }
}

/// Fixture for tenant ids
pub struct TenantFixtures;

impl TenantFixtures {
    /// A company that owns nothing in any scenario
    pub fn other_company() -> CompanyId {
        CompanyId::new()
    }
}
