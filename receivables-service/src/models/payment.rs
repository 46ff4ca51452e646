//! Payment model for receivables-service.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Money received against a transaction. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub payment_id: Uuid,
    pub transaction_id: Uuid,
    pub amount: Decimal,
    pub paid_on: NaiveDate,
    pub details: Option<String>,
    pub created_utc: DateTime<Utc>,
}

/// Input for recording a payment.
#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub transaction_id: Uuid,
    pub amount: Decimal,
    pub paid_on: NaiveDate,
    pub details: Option<String>,
}
