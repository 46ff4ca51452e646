//! Payment recording.

use crate::billing::validate_amount;
use crate::models::{CreatePayment, Transaction};
use crate::services::metrics::{record_error, PAYMENTS_TOTAL, PAYMENT_AMOUNT_TOTAL};
use crate::services::store::TransactionStore;
use rust_decimal::prelude::ToPrimitive;
use service_core::error::AppError;
use tracing::{info, instrument};

/// Validate and append a payment, returning the transaction as reloaded
/// inside the same unit of work.
#[instrument(skip(store, input), fields(transaction_id = %input.transaction_id))]
pub async fn record_payment(
    store: &dyn TransactionStore,
    input: CreatePayment,
) -> Result<Transaction, AppError> {
    if let Err(e) = validate_amount("amount", input.amount) {
        let err = AppError::from(e);
        record_error(&err);
        return Err(err);
    }

    let result = store
        .record_payment(&input)
        .await
        .inspect_err(record_error)?;

    PAYMENTS_TOTAL.inc();
    PAYMENT_AMOUNT_TOTAL.inc_by(input.amount.to_f64().unwrap_or_default());

    info!(
        amount = %input.amount,
        paid_on = %input.paid_on,
        payment_count = result.payments.len(),
        "Payment applied"
    );

    Ok(result)
}
