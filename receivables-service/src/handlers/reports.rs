use super::today;
use crate::dtos::{MonthlyReportParams, MonthlyReportResponse};
use crate::extract::QueryParams;
use crate::middleware::Caller;
use crate::services::reports;
use crate::startup::AppState;
use axum::{extract::State, Json};
use service_core::error::AppError;

/// Paid, outstanding and overdue totals per month for transactions due in
/// `[start_date, end_date]`.
pub async fn monthly_report(
    State(state): State<AppState>,
    caller: Caller,
    QueryParams(params): QueryParams<MonthlyReportParams>,
) -> Result<Json<MonthlyReportResponse>, AppError> {
    caller.require_admin()?;

    let report = reports::monthly_report(
        state.store.as_ref(),
        params.start_date,
        params.end_date,
        today(),
    )
    .await?;

    Ok(Json(report))
}
