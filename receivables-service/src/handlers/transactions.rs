//! Transaction endpoints.
//!
//! Writes are restricted to administrators. Customers can read their own
//! transactions and nothing else.

use super::today;
use crate::dtos::{
    CreateTransactionRequest, RecordPaymentRequest, TransactionEnvelope, TransactionResponse,
};
use crate::extract::{JsonBody, PathParam};
use crate::middleware::Caller;
use crate::models::TransactionFilter;
use crate::services::{payments, transactions};
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, Json};
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

pub async fn create_transaction(
    State(state): State<AppState>,
    caller: Caller,
    JsonBody(payload): JsonBody<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<TransactionEnvelope>), AppError> {
    caller.require_admin()?;
    payload.validate()?;

    let transaction = transactions::create_transaction(state.store.as_ref(), payload.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(TransactionEnvelope::new(transaction, today())),
    ))
}

pub async fn record_payment(
    State(state): State<AppState>,
    caller: Caller,
    PathParam(transaction_id): PathParam<Uuid>,
    JsonBody(payload): JsonBody<RecordPaymentRequest>,
) -> Result<Json<TransactionEnvelope>, AppError> {
    caller.require_admin()?;
    payload.validate()?;

    let transaction = payments::record_payment(
        state.store.as_ref(),
        payload.into_payment(transaction_id),
    )
    .await?;

    Ok(Json(TransactionEnvelope::new(transaction, today())))
}

/// Admins see every transaction, customers only their own; newest due first.
pub async fn list_transactions(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<TransactionResponse>>, AppError> {
    let filter = TransactionFilter {
        payer_id: caller.visible_payer(),
        ..Default::default()
    };
    let found = state.store.query_transactions(&filter).await?;

    let as_of = today();
    Ok(Json(
        found
            .into_iter()
            .map(|t| TransactionResponse::new(t, as_of))
            .collect(),
    ))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    caller: Caller,
    PathParam(transaction_id): PathParam<Uuid>,
) -> Result<Json<TransactionResponse>, AppError> {
    let transaction = state
        .store
        .load_transaction(transaction_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Transaction not found")))?;
    caller.ensure_can_view(&transaction)?;

    Ok(Json(TransactionResponse::new(transaction, today())))
}
