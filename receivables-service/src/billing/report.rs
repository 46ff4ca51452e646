//! Monthly receivables report.

use super::status::{remaining, total_paid};
use super::vat::total_due;
use super::BillingError;
use crate::models::Transaction;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inclusive range of due dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, BillingError> {
        if end < start {
            return Err(BillingError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Sums for one calendar month of due dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    pub month: u32,
    pub year: i32,
    /// Cash collected, whether or not the transaction is settled.
    pub paid: Decimal,
    /// Unpaid balance due today or later.
    pub outstanding: Decimal,
    /// Unpaid balance past its due date.
    pub overdue: Decimal,
}

impl MonthlyBucket {
    fn empty(year: i32, month: u32) -> Self {
        Self {
            month,
            year,
            paid: Decimal::ZERO,
            outstanding: Decimal::ZERO,
            overdue: Decimal::ZERO,
        }
    }
}

/// Bucket `transactions` by the month they fall due.
///
/// Every payment counts towards `paid`. The unpaid remainder of a transaction
/// lands in `outstanding` or `overdue` depending on `due_on` against `as_of`,
/// so a partly paid transaction feeds two sums of the same bucket.
/// Transactions outside `range` are ignored; empty months are not emitted.
/// Buckets come back in chronological order.
pub fn monthly_report(
    range: &DateRange,
    transactions: &[Transaction],
    as_of: NaiveDate,
) -> Vec<MonthlyBucket> {
    let mut buckets: BTreeMap<(i32, u32), MonthlyBucket> = BTreeMap::new();

    for transaction in transactions.iter().filter(|t| range.contains(t.due_on)) {
        let (year, month) = (transaction.due_on.year(), transaction.due_on.month());
        let bucket = buckets
            .entry((year, month))
            .or_insert_with(|| MonthlyBucket::empty(year, month));

        let due = total_due(transaction);
        let paid = total_paid(&transaction.payments);

        bucket.paid += paid;

        if paid < due {
            let balance = remaining(due, paid);
            if transaction.due_on >= as_of {
                bucket.outstanding += balance;
            } else {
                bucket.overdue += balance;
            }
        }
    }

    buckets.into_values().collect()
}
