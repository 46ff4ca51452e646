//! Monthly report generation.

use crate::billing::{self, DateRange, MonthlyBucket};
use crate::models::TransactionFilter;
use crate::services::metrics::{record_error, REPORTS_TOTAL};
use crate::services::store::TransactionStore;
use chrono::NaiveDate;
use service_core::error::AppError;
use tracing::{info, instrument};

/// Bucket every transaction due within `[start, end]` by month.
#[instrument(skip_all, fields(start = %start, end = %end, as_of = %as_of))]
pub async fn monthly_report(
    store: &dyn TransactionStore,
    start: NaiveDate,
    end: NaiveDate,
    as_of: NaiveDate,
) -> Result<Vec<MonthlyBucket>, AppError> {
    let range = match DateRange::new(start, end) {
        Ok(range) => range,
        Err(e) => {
            let err = AppError::from(e);
            record_error(&err);
            return Err(err);
        }
    };

    let filter = TransactionFilter {
        payer_id: None,
        due_from: Some(range.start()),
        due_to: Some(range.end()),
    };
    let transactions = store
        .query_transactions(&filter)
        .await
        .inspect_err(record_error)?;

    let report = billing::monthly_report(&range, &transactions, as_of);

    REPORTS_TOTAL.inc();
    info!(
        transaction_count = transactions.len(),
        bucket_count = report.len(),
        "Monthly report generated"
    );

    Ok(report)
}
