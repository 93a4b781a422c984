//! Typed HTTP client for the ledgerchat transaction-analysis API.

mod client;
mod error;

pub use client::ApiClient;
pub use error::ApiError;
