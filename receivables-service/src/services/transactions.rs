//! Transaction creation.

use crate::billing::{validate_amount, validate_vat_percentage, BillingError};
use crate::models::{CreateTransaction, Transaction};
use crate::services::metrics::{record_error, TRANSACTIONS_TOTAL};
use crate::services::store::TransactionStore;
use service_core::error::AppError;
use tracing::{info, instrument};

fn validate(input: &CreateTransaction) -> Result<(), BillingError> {
    validate_amount("amount", input.amount)?;
    validate_vat_percentage(input.vat_percentage)
}

/// Validate and persist a new transaction for an existing payer.
#[instrument(skip(store, input), fields(payer_id = %input.payer_id))]
pub async fn create_transaction(
    store: &dyn TransactionStore,
    input: CreateTransaction,
) -> Result<Transaction, AppError> {
    if let Err(e) = validate(&input) {
        let err = AppError::from(e);
        record_error(&err);
        return Err(err);
    }

    let transaction = store
        .create_transaction(&input)
        .await
        .inspect_err(record_error)?;

    TRANSACTIONS_TOTAL.inc();
    info!(
        transaction_id = %transaction.transaction_id,
        vat_inclusive = transaction.is_vat_inclusive,
        "Transaction opened"
    );

    Ok(transaction)
}
