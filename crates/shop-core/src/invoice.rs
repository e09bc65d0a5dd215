//! # Invoice Arithmetic
//!
//! Pure computation for the invoice aggregate: line totals, invoice totals
//! and the payment-status determination. The workflow engine in shop-db calls
//! into this module so that every amount persisted to the store was computed
//! by exactly one code path.
//!
//! Invariants enforced here:
//! - `line_total = quantity × unit_price` per line
//! - `total = Σ line_total`
//! - `final = total − discount`, rejected if negative
//! - `status = paid ⇔ amount_paid ≥ final`, with `amount_paid` clamped to
//!   `final` when paid (overpayment is change handed back, not stored)

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::PaymentStatus;

/// One requested line item, as it arrives from the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRequest {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: Money,
}

/// A line with its computed total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedLine {
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Totals for a whole invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub lines: Vec<ComputedLine>,
    pub total: Money,
    pub final_amount: Money,
}

/// Computes line totals, the invoice total and the final amount.
///
/// A negative final amount (discount exceeding the total) is a
/// data-integrity error: it should have been caught by validation, and must
/// abort the enclosing transaction if it slips through.
pub fn compute_totals(lines: &[LineRequest], discount: Money) -> CoreResult<InvoiceTotals> {
    let computed: Vec<ComputedLine> = lines
        .iter()
        .map(|l| ComputedLine {
            product_id: l.product_id.clone(),
            quantity: l.quantity,
            unit_price: l.unit_price,
            line_total: l.unit_price.multiply_quantity(l.quantity),
        })
        .collect();

    let total = computed
        .iter()
        .fold(Money::zero(), |acc, l| acc + l.line_total);

    let final_amount = total - discount;
    if final_amount.is_negative() {
        return Err(CoreError::Integrity(format!(
            "final amount is negative: total {} - discount {}",
            total.cents(),
            discount.cents()
        )));
    }

    Ok(InvoiceTotals {
        lines: computed,
        total,
        final_amount,
    })
}

/// Outcome of the payment-status determination at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentOutcome {
    pub status: PaymentStatus,
    /// Amount actually recorded; clamped to the final amount when paid.
    pub amount_paid: Money,
}

/// Determines the payment status of a freshly created invoice.
///
/// `amount_paid >= final_amount` means paid, and the stored amount is
/// clamped down to the final amount. Anything less leaves the invoice
/// unpaid with the tendered amount recorded as-is (the difference becomes
/// customer debt when a customer is attached).
pub fn determine_payment(final_amount: Money, amount_paid: Money) -> PaymentOutcome {
    if amount_paid >= final_amount {
        PaymentOutcome {
            status: PaymentStatus::Paid,
            amount_paid: final_amount,
        }
    } else {
        PaymentOutcome {
            status: PaymentStatus::Unpaid,
            amount_paid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product: &str, qty: i64, price: i64) -> LineRequest {
        LineRequest {
            product_id: product.to_string(),
            quantity: qty,
            unit_price: Money::from_cents(price),
        }
    }

    #[test]
    fn test_totals_sum_of_lines() {
        let totals =
            compute_totals(&[line("p1", 3, 5000), line("p2", 2, 1200)], Money::zero()).unwrap();

        assert_eq!(totals.lines[0].line_total.cents(), 15_000);
        assert_eq!(totals.lines[1].line_total.cents(), 2_400);
        assert_eq!(totals.total.cents(), 17_400);
        assert_eq!(totals.final_amount.cents(), 17_400);
    }

    #[test]
    fn test_discount_reduces_final_amount() {
        let totals = compute_totals(&[line("p1", 3, 5000)], Money::from_cents(1_000)).unwrap();
        assert_eq!(totals.total.cents(), 15_000);
        assert_eq!(totals.final_amount.cents(), 14_000);
    }

    #[test]
    fn test_negative_final_amount_is_integrity_error() {
        let err = compute_totals(&[line("p1", 1, 500)], Money::from_cents(1_000)).unwrap_err();
        assert!(matches!(err, CoreError::Integrity(_)));
    }

    #[test]
    fn test_empty_lines_total_zero() {
        let totals = compute_totals(&[], Money::zero()).unwrap();
        assert_eq!(totals.total, Money::zero());
        assert_eq!(totals.final_amount, Money::zero());
    }

    #[test]
    fn test_exact_payment_is_paid() {
        let outcome = determine_payment(Money::from_cents(15_000), Money::from_cents(15_000));
        assert_eq!(outcome.status, PaymentStatus::Paid);
        assert_eq!(outcome.amount_paid.cents(), 15_000);
    }

    #[test]
    fn test_overpayment_clamps_to_final_amount() {
        let outcome = determine_payment(Money::from_cents(15_000), Money::from_cents(20_000));
        assert_eq!(outcome.status, PaymentStatus::Paid);
        assert_eq!(outcome.amount_paid.cents(), 15_000);
    }

    #[test]
    fn test_underpayment_stays_unpaid() {
        let outcome = determine_payment(Money::from_cents(15_000), Money::from_cents(10_000));
        assert_eq!(outcome.status, PaymentStatus::Unpaid);
        assert_eq!(outcome.amount_paid.cents(), 10_000);
    }
}
