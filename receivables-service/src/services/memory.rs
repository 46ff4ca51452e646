//! In-memory store for tests and local runs without PostgreSQL.

use crate::models::{
    CreatePayment, CreateTransaction, CreateUser, Payment, Transaction, TransactionFilter, User,
};
use crate::services::store::TransactionStore;
use async_trait::async_trait;
use chrono::Utc;
use service_core::error::AppError;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Thread-safe in-memory [`TransactionStore`].
///
/// A single lock guards all state, so a payment insert and the reload that
/// follows it are never interleaved with another writer.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<Uuid, User>,
    transactions: HashMap<Uuid, Transaction>,
}

impl Inner {
    /// Copy of a stored transaction with the payer's current name.
    fn hydrate(&self, transaction: &Transaction) -> Transaction {
        let mut view = transaction.clone();
        view.payer_name = self.users.get(&transaction.payer_id).map(|u| u.name.clone());
        view
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for InMemoryStore {
    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }

    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    async fn create_user(&self, input: &CreateUser) -> Result<User, AppError> {
        let mut inner = self.inner.write().await;
        let created_utc = inner
            .users
            .get(&input.user_id)
            .map_or_else(Utc::now, |existing| existing.created_utc);
        let user = User {
            user_id: input.user_id,
            name: input.name.clone(),
            role: input.role.as_str().to_string(),
            created_utc,
        };
        inner.users.insert(user.user_id, user.clone());
        debug!("User stored");
        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.inner.read().await.users.get(&user_id).cloned())
    }

    #[instrument(skip(self, input), fields(payer_id = %input.payer_id))]
    async fn create_transaction(&self, input: &CreateTransaction) -> Result<Transaction, AppError> {
        let mut inner = self.inner.write().await;
        if !inner.users.contains_key(&input.payer_id) {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Payer {} does not exist",
                input.payer_id
            )));
        }

        let transaction = Transaction {
            transaction_id: Uuid::new_v4(),
            payer_id: input.payer_id,
            payer_name: None,
            amount: input.amount,
            vat_percentage: input.vat_percentage,
            is_vat_inclusive: input.is_vat_inclusive,
            due_on: input.due_on,
            created_utc: Utc::now(),
            payments: Vec::new(),
        };
        inner
            .transactions
            .insert(transaction.transaction_id, transaction.clone());
        debug!(transaction_id = %transaction.transaction_id, "Transaction stored");
        Ok(inner.hydrate(&transaction))
    }

    async fn load_transaction(&self, transaction_id: Uuid) -> Result<Option<Transaction>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .transactions
            .get(&transaction_id)
            .map(|t| inner.hydrate(t)))
    }

    #[instrument(skip(self, input), fields(transaction_id = %input.transaction_id))]
    async fn record_payment(&self, input: &CreatePayment) -> Result<Transaction, AppError> {
        let mut inner = self.inner.write().await;
        let transaction = inner
            .transactions
            .get_mut(&input.transaction_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Transaction not found")))?;

        transaction.payments.push(Payment {
            payment_id: Uuid::new_v4(),
            transaction_id: input.transaction_id,
            amount: input.amount,
            paid_on: input.paid_on,
            details: input.details.clone(),
            created_utc: Utc::now(),
        });
        transaction
            .payments
            .sort_by(|a, b| (a.paid_on, a.created_utc).cmp(&(b.paid_on, b.created_utc)));

        let snapshot = transaction.clone();
        Ok(inner.hydrate(&snapshot))
    }

    async fn query_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, AppError> {
        let inner = self.inner.read().await;
        let mut transactions: Vec<Transaction> = inner
            .transactions
            .values()
            .filter(|t| filter.matches(t))
            .map(|t| inner.hydrate(t))
            .collect();
        transactions.sort_by(|a, b| (b.due_on, b.created_utc).cmp(&(a.due_on, a.created_utc)));
        Ok(transactions)
    }
}
