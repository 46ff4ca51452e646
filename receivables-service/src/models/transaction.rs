//! Billing transaction model for receivables-service.

use super::Payment;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Amount owed by a payer, with every payment recorded against it.
///
/// Totals and status are never stored here; see [`crate::billing`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub transaction_id: Uuid,
    pub payer_id: Uuid,
    /// Joined from the user directory; `None` if the payer row is gone.
    pub payer_name: Option<String>,
    /// Base amount, or the gross amount when `is_vat_inclusive`.
    pub amount: Decimal,
    pub vat_percentage: Decimal,
    pub is_vat_inclusive: bool,
    pub due_on: NaiveDate,
    pub created_utc: DateTime<Utc>,
    #[sqlx(skip)]
    #[serde(default)]
    pub payments: Vec<Payment>,
}

/// Input for creating a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransaction {
    pub payer_id: Uuid,
    pub amount: Decimal,
    pub vat_percentage: Decimal,
    pub is_vat_inclusive: bool,
    pub due_on: NaiveDate,
}

/// Filter parameters for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    /// Restrict to one payer (customer visibility).
    pub payer_id: Option<Uuid>,
    /// Inclusive lower bound on `due_on`.
    pub due_from: Option<NaiveDate>,
    /// Inclusive upper bound on `due_on`.
    pub due_to: Option<NaiveDate>,
}

impl TransactionFilter {
    /// Whether a transaction passes every bound set on this filter.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.payer_id.map_or(true, |id| transaction.payer_id == id)
            && self.due_from.map_or(true, |from| transaction.due_on >= from)
            && self.due_to.map_or(true, |to| transaction.due_on <= to)
    }
}
