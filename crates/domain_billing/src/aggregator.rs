//! Invoice totals
//!
//! Tax is priced line by line: each taxable line's tax is rounded half-up to
//! currency precision and the rounded amounts are summed. This can differ by
//! a cent from rounding the taxable subtotal once, and matches what a
//! customer can recompute from the printed lines.

use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money};

use crate::client::Client;
use crate::error::BillingError;
use crate::line_items::LineItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Money,
    pub tax_amount: Money,
    pub total: Money,
}

/// Rounded tax owed on one line at the client's rate
pub fn line_tax(client: &Client, item: &LineItem) -> Money {
    let currency = item.line_item_total.currency();
    if !item.taxable {
        return Money::zero(currency);
    }
    Money::rounded(
        item.line_item_total.amount() * client.tax_rate.as_decimal(),
        currency,
    )
}

/// Sums line totals and per-line tax
///
/// # Errors
///
/// `Calculation` if a line is priced in a currency other than `currency`.
pub fn aggregate(client: &Client, items: &[LineItem], currency: Currency) -> Result<Totals, BillingError> {
    let subtotal = Money::sum(currency, items.iter().map(|i| &i.line_item_total))?;
    let taxes: Vec<Money> = items.iter().map(|i| line_tax(client, i)).collect();
    let tax_amount = Money::sum(currency, &taxes)?;
    let total = subtotal.checked_add(&tax_amount)?;

    Ok(Totals {
        subtotal,
        tax_amount,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facility::EffectiveStatus;
    use crate::line_items::LineItemKind;
    use core_kernel::CompanyId;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn line(total: Decimal, taxable: bool) -> LineItem {
        LineItem {
            kind: LineItemKind::AdHoc,
            facility_profile_id: None,
            service_line_item_id: None,
            location_name: None,
            category: None,
            description: "Service".to_string(),
            effective_status: EffectiveStatus::Active,
            effective_rate: total,
            effective_frequency: 0,
            quantity: Decimal::ONE,
            unit_rate: total,
            taxable,
            included_in_total: true,
            line_item_total: Money::new(total, Currency::USD),
            tax_amount: Money::zero(Currency::USD),
            notes: None,
        }
    }

    fn client() -> Client {
        Client::new(CompanyId::new(), "Acme", dec!(0.0825))
    }

    #[test]
    fn test_single_taxable_line() {
        let totals = aggregate(&client(), &[line(dec!(1000.00), true)], Currency::USD).unwrap();
        assert_eq!(totals.subtotal.amount(), dec!(1000.00));
        assert_eq!(totals.tax_amount.amount(), dec!(82.50));
        assert_eq!(totals.total.amount(), dec!(1082.50));
    }

    #[test]
    fn test_per_line_rounding_differs_from_rounding_once() {
        let items = vec![
            line(dec!(10.10), true),
            line(dec!(10.10), true),
            line(dec!(10.10), true),
        ];
        let totals = aggregate(&client(), &items, Currency::USD).unwrap();

        // 0.83325 per line rounds to 0.83; rounding 2.49975 once would give 2.50
        assert_eq!(totals.tax_amount.amount(), dec!(2.49));
    }

    #[test]
    fn test_untaxed_lines_add_no_tax() {
        let items = vec![line(dec!(500), false), line(dec!(100), true)];
        let totals = aggregate(&client(), &items, Currency::USD).unwrap();
        assert_eq!(totals.subtotal.amount(), dec!(600));
        assert_eq!(totals.tax_amount.amount(), dec!(8.25));
    }

    #[test]
    fn test_empty_invoice() {
        let totals = aggregate(&client(), &[], Currency::USD).unwrap();
        assert!(totals.subtotal.is_zero());
        assert!(totals.total.is_zero());
    }

    #[test]
    fn test_currency_mismatch_is_calculation_error() {
        let mut cad = line(dec!(10), true);
        cad.line_item_total = Money::new(dec!(10), Currency::CAD);
        let result = aggregate(&client(), &[cad], Currency::USD);
        assert!(matches!(result, Err(BillingError::Calculation(_))));
    }
}
