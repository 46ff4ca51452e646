//! Customer receivables: transactions with VAT, payments against them, a
//! derived paid/outstanding/overdue status and monthly reports.

pub mod billing;
pub mod config;
pub mod dtos;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
