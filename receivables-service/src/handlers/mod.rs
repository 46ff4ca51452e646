//! HTTP handlers for receivables-service.

pub mod health;
pub mod reports;
pub mod transactions;
pub mod users;

use chrono::{NaiveDate, Utc};

/// The calendar date a request is evaluated against.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
