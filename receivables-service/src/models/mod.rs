//! Domain models for receivables-service.

mod payment;
mod transaction;
mod user;

pub use payment::{CreatePayment, Payment};
pub use transaction::{CreateTransaction, Transaction, TransactionFilter};
pub use user::{CreateUser, Role, User};
