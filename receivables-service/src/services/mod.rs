//! Services module for receivables-service.

pub mod database;
pub mod memory;
pub mod metrics;
pub mod payments;
pub mod reports;
pub mod store;
pub mod transactions;

pub use database::Database;
pub use memory::InMemoryStore;
pub use metrics::{get_metrics, init_metrics};
pub use store::TransactionStore;
