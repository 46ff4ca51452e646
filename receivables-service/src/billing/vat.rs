//! VAT-adjusted totals.

use crate::models::Transaction;
use rust_decimal::Decimal;

/// Total owed for a transaction once VAT is applied.
pub fn total_due(transaction: &Transaction) -> Decimal {
    vat_adjusted_total(
        transaction.amount,
        transaction.vat_percentage,
        transaction.is_vat_inclusive,
    )
}

/// `amount` as-is when VAT is already included, otherwise grossed up by
/// `vat_percentage` percent. Exact decimal arithmetic, no rounding.
pub fn vat_adjusted_total(amount: Decimal, vat_percentage: Decimal, is_vat_inclusive: bool) -> Decimal {
    if is_vat_inclusive {
        return amount;
    }
    amount + amount * vat_percentage / Decimal::ONE_HUNDRED
}
