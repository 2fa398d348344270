//! Providers Module - External Data Sources
//!
//! Geolocation (ipapi), country metadata (restcountries), currency rates
//! (fixer) and the API key vault.

pub mod countries;
pub mod currency;
pub mod ipapi;
pub mod secrets;

pub use countries::*;
pub use currency::*;
pub use ipapi::*;
pub use secrets::*;

use std::time::Duration;
use tracing::warn;

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::utils::constants::USER_AGENT;

/// Shared HTTP client for all providers
pub fn http_client(timeout: Duration) -> AppResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .gzip(true)
        .build()
        .map_err(|e| AppError::with_source(ErrorCode::Unknown, "Failed to build HTTP client", e))
}

/// Log the technical cause, surface the code's user message
pub(crate) fn service_error<E>(code: ErrorCode, context: &str, err: E) -> AppError
where
    E: std::error::Error + Send + Sync + 'static,
{
    warn!("{}: {}", context, err);
    AppError::with_source(code, code.user_message(), err)
}
