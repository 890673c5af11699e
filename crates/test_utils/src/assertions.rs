//! Custom Test Assertions
//!
//! Assertion helpers for billing previews and delta reports that print the
//! offending amounts instead of a bare `assertion failed`.

use core_kernel::Money;
use domain_billing::{BillingPreview, DeltaReport};
use rust_decimal::Decimal;

/// Asserts that a Money value has exactly the expected amount
pub fn assert_money_eq(actual: &Money, expected: Decimal) {
    assert_eq!(
        actual.amount(),
        expected,
        "Expected {} {}, got {}",
        actual.currency(),
        expected,
        actual.amount()
    );
}

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(
        money.is_zero(),
        "Expected zero money, got {} {}",
        money.currency().symbol(),
        money.amount()
    );
}

/// Asserts that money values sum to a total
///
/// # Panics
///
/// Panics if the currencies differ or the sum doesn't equal the total
pub fn assert_money_sum_equals(parts: &[Money], total: &Money) {
    let sum = Money::sum(total.currency(), parts).expect("Currency mismatch in sum");

    assert_eq!(
        sum.amount(),
        total.amount(),
        "Sum of parts ({}) doesn't equal total ({})",
        sum.amount(),
        total.amount()
    );
}

/// Asserts that a preview's totals follow from its lines
///
/// Checks that excluded lines are zero, the subtotal is the sum of line
/// totals, the tax is the sum of per-line tax, and total = subtotal + tax.
pub fn assert_preview_consistent(preview: &BillingPreview) {
    for line in &preview.line_items {
        if !line.included_in_total {
            assert!(
                line.line_item_total.is_zero() && line.tax_amount.is_zero(),
                "Excluded line '{}' carries an amount: {} (tax {})",
                line.description,
                line.line_item_total.amount(),
                line.tax_amount.amount()
            );
        }
        if !line.taxable {
            assert_money_zero(&line.tax_amount);
        }
    }

    let totals: Vec<Money> = preview.line_items.iter().map(|l| l.line_item_total).collect();
    assert_money_sum_equals(&totals, &preview.subtotal);

    let taxes: Vec<Money> = preview.line_items.iter().map(|l| l.tax_amount).collect();
    assert_money_sum_equals(&taxes, &preview.tax_amount);

    assert_money_sum_equals(&[preview.subtotal, preview.tax_amount], &preview.total);
}

/// Asserts that per-facility deltas and the unassigned remainder account for the subtotal change
pub fn assert_delta_reconciles(report: &DeltaReport) {
    let mut parts: Vec<Money> = report.facilities.iter().map(|f| f.total_delta).collect();
    parts.push(report.unassigned_delta);
    assert_money_sum_equals(&parts, &report.subtotal_delta);

    assert_eq!(
        report.current_subtotal.checked_sub(&report.previous_subtotal).ok(),
        Some(report.subtotal_delta),
        "subtotal_delta is not current - previous"
    );
    assert_eq!(
        report.current_total.checked_sub(&report.previous_total).ok(),
        Some(report.total_delta),
        "total_delta is not current - previous"
    );
}
