//! Request and response bodies for the HTTP API.

mod reports;
mod transactions;
mod users;

pub use reports::{MonthlyReportParams, MonthlyReportResponse};
pub use transactions::{
    CreateTransactionRequest, PaymentResponse, RecordPaymentRequest, TransactionEnvelope,
    TransactionResponse,
};
pub use users::{CreateUserRequest, UserResponse};
