//! Prometheus metrics for receivables-service.
//!
//! Domain counters live in the `prometheus` registry. Per-request HTTP
//! metrics come through the `metrics` facade and are rendered by the
//! exporter recorder; `/metrics` serves both.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter, register_counter_vec, register_histogram_vec, Counter, CounterVec,
    HistogramVec, TextEncoder,
};
use std::sync::OnceLock;

/// Recorder handle for the `metrics` facade; `None` if installing it failed.
static HTTP_METRICS: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

/// Transactions created.
pub static TRANSACTIONS_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "receivables_transactions_total",
        "Total number of transactions created"
    )
    .expect("Failed to register transactions_total")
});

/// Payments recorded.
pub static PAYMENTS_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "receivables_payments_total",
        "Total number of payments recorded"
    )
    .expect("Failed to register payments_total")
});

/// Sum of recorded payment amounts.
pub static PAYMENT_AMOUNT_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "receivables_payment_amount_total",
        "Total amount of recorded payments"
    )
    .expect("Failed to register payment_amount_total")
});

/// Monthly reports generated.
pub static REPORTS_TOTAL: Lazy<Counter> = Lazy::new(|| {
    register_counter!(
        "receivables_reports_total",
        "Total number of monthly reports generated"
    )
    .expect("Failed to register reports_total")
});

/// Error counter for alerting.
pub static ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "receivables_errors_total",
        "Total number of errors by type",
        &["error_type"] // not_found, invalid_input, forbidden, database
    )
    .expect("Failed to register errors_total")
});

/// Database query duration histogram.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "receivables_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register db_query_duration")
});

/// Install the HTTP metrics recorder once and force lazy registration.
///
/// Safe to call repeatedly; only the first call installs the recorder.
pub fn init_metrics() {
    HTTP_METRICS.get_or_init(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install HTTP metrics recorder");
            None
        }
    });
    Lazy::force(&TRANSACTIONS_TOTAL);
    Lazy::force(&PAYMENTS_TOTAL);
    Lazy::force(&PAYMENT_AMOUNT_TOTAL);
    Lazy::force(&REPORTS_TOTAL);
    Lazy::force(&ERRORS_TOTAL);
    Lazy::force(&DB_QUERY_DURATION);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut body = encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default();

    if let Some(handle) = HTTP_METRICS.get().and_then(Option::as_ref) {
        body.push_str(&handle.render());
    }

    body
}

/// Count a failed operation under its error class.
pub fn record_error(err: &service_core::error::AppError) {
    use service_core::error::AppError;

    let error_type = match err {
        AppError::NotFound(_) => "not_found",
        AppError::BadRequest(_) | AppError::ValidationError(_) => "invalid_input",
        AppError::Forbidden(_) | AppError::AuthError(_) => "forbidden",
        AppError::DatabaseError(_) => "database",
        AppError::InternalError(_) | AppError::ConfigError(_) => "internal",
    };
    ERRORS_TOTAL.with_label_values(&[error_type]).inc();
}
