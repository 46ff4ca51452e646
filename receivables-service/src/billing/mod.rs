//! Financial computation: VAT totals, payment status and monthly reports.
//!
//! Everything here is a pure function of its inputs. The current date is
//! always passed in as `as_of`; nothing in this module reads the clock.

mod report;
mod status;
mod vat;

pub use report::{monthly_report, DateRange, MonthlyBucket};
pub use status::{remaining, status, total_paid, PaymentStatus, TransactionSummary};
pub use vat::{total_due, vat_adjusted_total};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use service_core::error::AppError;
use thiserror::Error;

/// Largest value that fits `NUMERIC(15, 2)`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_319, 232_830, 0, false, 2);

/// Largest value that fits `NUMERIC(5, 2)`.
pub const MAX_VAT_PERCENTAGE: Decimal = Decimal::from_parts(99_999, 0, 0, false, 2);

/// Decimal places the money and percentage columns keep.
pub const MAX_SCALE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillingError {
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: Decimal },

    #[error("{field} must not exceed {max}, got {value}")]
    TooLarge {
        field: &'static str,
        value: Decimal,
        max: Decimal,
    },

    #[error("{field} allows at most {max_scale} decimal places, got {value}")]
    TooPrecise {
        field: &'static str,
        value: Decimal,
        max_scale: u32,
    },

    #[error("end_date {end} is before start_date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}

impl From<BillingError> for AppError {
    fn from(err: BillingError) -> Self {
        AppError::BadRequest(anyhow::Error::new(err))
    }
}

/// Check a money amount is non-negative and storable.
pub fn validate_amount(field: &'static str, value: Decimal) -> Result<(), BillingError> {
    check_bounds(field, value, MAX_AMOUNT)
}

/// Check a VAT percentage is non-negative and storable.
pub fn validate_vat_percentage(value: Decimal) -> Result<(), BillingError> {
    check_bounds("vat_percentage", value, MAX_VAT_PERCENTAGE)
}

fn check_bounds(field: &'static str, value: Decimal, max: Decimal) -> Result<(), BillingError> {
    if value < Decimal::ZERO {
        return Err(BillingError::Negative { field, value });
    }
    if value > max {
        return Err(BillingError::TooLarge { field, value, max });
    }
    if value.normalize().scale() > MAX_SCALE {
        return Err(BillingError::TooPrecise {
            field,
            value,
            max_scale: MAX_SCALE,
        });
    }
    Ok(())
}
