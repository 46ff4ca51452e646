//! PostgreSQL store for receivables-service.

use crate::models::{
    CreatePayment, CreateTransaction, CreateUser, Payment, Transaction, TransactionFilter, User,
};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::store::TransactionStore;
use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, instrument};
use uuid::Uuid;

const TRANSACTION_COLUMNS: &str = r#"
    t.transaction_id, t.payer_id, u.name AS payer_name, t.amount, t.vat_percentage,
    t.is_vat_inclusive, t.due_on, t.created_utc
"#;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "receivables-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }
}

/// Fetch every payment for `transaction_ids`, oldest first.
async fn fetch_payments<'e, E>(executor: E, transaction_ids: &[Uuid]) -> Result<Vec<Payment>, AppError>
where
    E: sqlx::PgExecutor<'e>,
{
    if transaction_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, Payment>(
        r#"
        SELECT payment_id, transaction_id, amount, paid_on, details, created_utc
        FROM payments
        WHERE transaction_id = ANY($1)
        ORDER BY paid_on, created_utc
        "#,
    )
    .bind(transaction_ids)
    .fetch_all(executor)
    .await
    .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to load payments: {}", e)))
}

/// Hand each payment to its owning transaction.
fn attach_payments(transactions: &mut [Transaction], payments: Vec<Payment>) {
    let mut by_transaction: HashMap<Uuid, Vec<Payment>> = HashMap::new();
    for payment in payments {
        by_transaction
            .entry(payment.transaction_id)
            .or_default()
            .push(payment);
    }
    for transaction in transactions {
        transaction.payments = by_transaction
            .remove(&transaction.transaction_id)
            .unwrap_or_default();
    }
}

#[async_trait]
impl TransactionStore for Database {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    async fn create_user(&self, input: &CreateUser) -> Result<User, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_user"])
            .start_timer();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, name, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET name = EXCLUDED.name, role = EXCLUDED.role
            RETURNING user_id, name, role, created_utc
            "#,
        )
        .bind(input.user_id)
        .bind(&input.name)
        .bind(input.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create user: {}", e)))?;

        timer.observe_duration();

        debug!(user_id = %user.user_id, "User row upserted");

        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_user"])
            .start_timer();

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, role, created_utc
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get user: {}", e)))?;

        timer.observe_duration();

        Ok(user)
    }

    #[instrument(skip(self, input), fields(payer_id = %input.payer_id))]
    async fn create_transaction(&self, input: &CreateTransaction) -> Result<Transaction, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_transaction"])
            .start_timer();

        let transaction_id = Uuid::new_v4();
        let transaction = sqlx::query_as::<_, Transaction>(&format!(
            r#"
            WITH t AS (
                INSERT INTO transactions (transaction_id, payer_id, amount, vat_percentage, is_vat_inclusive, due_on)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING transaction_id, payer_id, amount, vat_percentage, is_vat_inclusive, due_on, created_utc
            )
            SELECT {TRANSACTION_COLUMNS}
            FROM t
            LEFT JOIN users u ON u.user_id = t.payer_id
            "#
        ))
        .bind(transaction_id)
        .bind(input.payer_id)
        .bind(input.amount)
        .bind(input.vat_percentage)
        .bind(input.is_vat_inclusive)
        .bind(input.due_on)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::BadRequest(anyhow::anyhow!("Payer {} does not exist", input.payer_id))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create transaction: {}", e)),
        })?;

        timer.observe_duration();

        info!(
            transaction_id = %transaction.transaction_id,
            amount = %transaction.amount,
            due_on = %transaction.due_on,
            "Transaction created"
        );

        Ok(transaction)
    }

    #[instrument(skip(self), fields(transaction_id = %transaction_id))]
    async fn load_transaction(&self, transaction_id: Uuid) -> Result<Option<Transaction>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["load_transaction"])
            .start_timer();

        let transaction = sqlx::query_as::<_, Transaction>(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM transactions t
            LEFT JOIN users u ON u.user_id = t.payer_id
            WHERE t.transaction_id = $1
            "#
        ))
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get transaction: {}", e)))?;

        let transaction = match transaction {
            Some(mut t) => {
                let payments = fetch_payments(&self.pool, &[t.transaction_id]).await?;
                attach_payments(std::slice::from_mut(&mut t), payments);
                Some(t)
            }
            None => None,
        };

        timer.observe_duration();

        Ok(transaction)
    }

    #[instrument(skip(self, input), fields(transaction_id = %input.transaction_id))]
    async fn record_payment(&self, input: &CreatePayment) -> Result<Transaction, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["record_payment"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        // Row lock serializes concurrent payments against the same transaction
        let locked = sqlx::query_scalar::<_, Uuid>(
            "SELECT transaction_id FROM transactions WHERE transaction_id = $1 FOR UPDATE",
        )
        .bind(input.transaction_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to lock transaction: {}", e)))?;

        if locked.is_none() {
            tx.rollback().await.ok();
            return Err(AppError::NotFound(anyhow::anyhow!("Transaction not found")));
        }

        let payment_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO payments (payment_id, transaction_id, amount, paid_on, details)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(payment_id)
        .bind(input.transaction_id)
        .bind(input.amount)
        .bind(input.paid_on)
        .bind(&input.details)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to record payment: {}", e)))?;

        let mut transaction = sqlx::query_as::<_, Transaction>(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM transactions t
            LEFT JOIN users u ON u.user_id = t.payer_id
            WHERE t.transaction_id = $1
            "#
        ))
        .bind(input.transaction_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to reload transaction: {}", e)))?;

        let payments = fetch_payments(&mut *tx, &[transaction.transaction_id]).await?;
        attach_payments(std::slice::from_mut(&mut transaction), payments);

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();

        info!(
            payment_id = %payment_id,
            amount = %input.amount,
            payment_count = transaction.payments.len(),
            "Payment recorded"
        );

        Ok(transaction)
    }

    #[instrument(skip(self, filter))]
    async fn query_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["query_transactions"])
            .start_timer();

        let mut transactions = sqlx::query_as::<_, Transaction>(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM transactions t
            LEFT JOIN users u ON u.user_id = t.payer_id
            WHERE ($1::uuid IS NULL OR t.payer_id = $1)
              AND ($2::date IS NULL OR t.due_on >= $2)
              AND ($3::date IS NULL OR t.due_on <= $3)
            ORDER BY t.due_on DESC, t.created_utc DESC
            "#
        ))
        .bind(filter.payer_id)
        .bind(filter.due_from)
        .bind(filter.due_to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list transactions: {}", e)))?;

        let ids: Vec<Uuid> = transactions.iter().map(|t| t.transaction_id).collect();
        let payments = fetch_payments(&self.pool, &ids).await?;
        attach_payments(&mut transactions, payments);

        timer.observe_duration();

        Ok(transactions)
    }
}
