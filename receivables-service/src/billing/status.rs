//! Payment status derivation.

use super::vat::total_due;
use crate::models::{Payment, Transaction};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Where a transaction stands relative to what is owed and when.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Outstanding,
    Overdue,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Outstanding => "outstanding",
            PaymentStatus::Overdue => "overdue",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sum of every payment amount.
pub fn total_paid(payments: &[Payment]) -> Decimal {
    payments.iter().map(|p| p.amount).sum()
}

/// Unpaid balance, floored at zero for overpaid transactions.
pub fn remaining(total_due: Decimal, total_paid: Decimal) -> Decimal {
    (total_due - total_paid).max(Decimal::ZERO)
}

/// Derive the status of `transaction` given what has been paid so far.
///
/// Full payment wins over the due date. An unpaid balance due today is
/// still outstanding; it only becomes overdue the day after.
pub fn status(transaction: &Transaction, total_paid: Decimal, as_of: NaiveDate) -> PaymentStatus {
    if total_paid >= total_due(transaction) {
        PaymentStatus::Paid
    } else if transaction.due_on >= as_of {
        PaymentStatus::Outstanding
    } else {
        PaymentStatus::Overdue
    }
}

/// Every derived figure for one transaction, computed in a single pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionSummary {
    pub total_due: Decimal,
    pub total_paid: Decimal,
    pub remaining: Decimal,
    pub status: PaymentStatus,
}

impl TransactionSummary {
    pub fn of(transaction: &Transaction, as_of: NaiveDate) -> Self {
        let total_due = total_due(transaction);
        let total_paid = total_paid(&transaction.payments);
        Self {
            total_due,
            total_paid,
            remaining: remaining(total_due, total_paid),
            status: status(transaction, total_paid, as_of),
        }
    }
}
