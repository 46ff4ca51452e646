//! Persistence contract the billing services rely on.

use crate::models::{
    CreatePayment, CreateTransaction, CreateUser, Transaction, TransactionFilter, User,
};
use async_trait::async_trait;
use service_core::error::AppError;
use uuid::Uuid;

/// Storage for users, transactions and their payments.
///
/// Every transaction returned carries its complete payment list; callers
/// never fetch payments separately.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Check the backend is reachable.
    async fn health_check(&self) -> Result<(), AppError>;

    /// Register a user, or refresh the name and role of an existing one.
    async fn create_user(&self, input: &CreateUser) -> Result<User, AppError>;

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, AppError>;

    /// Fails with `BadRequest` when the payer is unknown.
    async fn create_transaction(&self, input: &CreateTransaction)
        -> Result<Transaction, AppError>;

    async fn load_transaction(&self, transaction_id: Uuid)
        -> Result<Option<Transaction>, AppError>;

    /// Append a payment and reload its transaction as one atomic unit.
    ///
    /// Fails with `NotFound` when the transaction does not exist. On any
    /// failure nothing is recorded.
    async fn record_payment(&self, input: &CreatePayment) -> Result<Transaction, AppError>;

    /// Transactions matching `filter`, latest due date first.
    async fn query_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, AppError>;
}
