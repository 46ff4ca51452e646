//! Request extractors for receivables-service.

pub mod caller;

pub use caller::Caller;
