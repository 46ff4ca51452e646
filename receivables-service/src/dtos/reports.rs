use crate::billing::MonthlyBucket;
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct MonthlyReportParams {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

pub type MonthlyReportResponse = Vec<MonthlyBucket>;
