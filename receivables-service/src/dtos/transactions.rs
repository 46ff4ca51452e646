use crate::billing::{PaymentStatus, TransactionSummary};
use crate::models::{CreatePayment, CreateTransaction, Payment, Transaction};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTransactionRequest {
    pub payer_id: Uuid,
    pub amount: Decimal,
    pub vat_percentage: Decimal,
    pub is_vat_inclusive: bool,
    pub due_on: NaiveDate,
}

impl From<CreateTransactionRequest> for CreateTransaction {
    fn from(req: CreateTransactionRequest) -> Self {
        Self {
            payer_id: req.payer_id,
            amount: req.amount,
            vat_percentage: req.vat_percentage,
            is_vat_inclusive: req.is_vat_inclusive,
            due_on: req.due_on,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    pub amount: Decimal,
    pub paid_on: NaiveDate,
    #[validate(length(max = 2000))]
    pub details: Option<String>,
}

impl RecordPaymentRequest {
    pub fn into_payment(self, transaction_id: Uuid) -> CreatePayment {
        CreatePayment {
            transaction_id,
            amount: self.amount,
            paid_on: self.paid_on,
            details: self.details,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub id: Uuid,
    pub amount: Decimal,
    pub paid_on: NaiveDate,
    pub details: Option<String>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.payment_id,
            amount: payment.amount,
            paid_on: payment.paid_on,
            details: payment.details,
        }
    }
}

/// A transaction with its derived totals, as seen on `as_of`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub payer_id: Uuid,
    pub payer_name: Option<String>,
    pub amount: Decimal,
    pub vat_percentage: Decimal,
    pub is_vat_inclusive: bool,
    pub due_on: NaiveDate,
    pub status: PaymentStatus,
    pub total_due: Decimal,
    pub total_paid: Decimal,
    pub remaining: Decimal,
    pub payments: Vec<PaymentResponse>,
}

impl TransactionResponse {
    pub fn new(transaction: Transaction, as_of: NaiveDate) -> Self {
        let summary = TransactionSummary::of(&transaction, as_of);
        Self {
            id: transaction.transaction_id,
            payer_id: transaction.payer_id,
            payer_name: transaction.payer_name,
            amount: transaction.amount,
            vat_percentage: transaction.vat_percentage,
            is_vat_inclusive: transaction.is_vat_inclusive,
            due_on: transaction.due_on,
            status: summary.status,
            total_due: summary.total_due,
            total_paid: summary.total_paid,
            remaining: summary.remaining,
            payments: transaction
                .payments
                .into_iter()
                .map(PaymentResponse::from)
                .collect(),
        }
    }
}

/// Body returned after a write: the fresh view plus its status.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionEnvelope {
    pub transaction: TransactionResponse,
    pub status: PaymentStatus,
}

impl TransactionEnvelope {
    pub fn new(transaction: Transaction, as_of: NaiveDate) -> Self {
        let transaction = TransactionResponse::new(transaction, as_of);
        Self {
            status: transaction.status,
            transaction,
        }
    }
}
