//! fixer.io currency rates client
//!
//! API: https://data.fixer.io/api/latest?access_key={key}

use std::sync::Arc;
use tracing::{info, warn};

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::CurrencyRates;
use crate::providers::secrets::SecretsVault;
use crate::providers::service_error;
use crate::utils::constants::SECRET_API_CURRENCY_KEY;

pub struct CurrencyClient {
    client: reqwest::Client,
    base_url: String,
    secrets: Arc<dyn SecretsVault>,
}

impl CurrencyClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, secrets: Arc<dyn SecretsVault>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            secrets,
        }
    }

    /// Latest rates against fixer's base currency
    pub async fn latest_rates(&self) -> AppResult<CurrencyRates> {
        let key = self.secrets.secret(SECRET_API_CURRENCY_KEY)?;
        let url = format!("{}/latest", self.base_url.trim_end_matches('/'));

        info!("💱 fixer: fetching latest rates");

        let response = self
            .client
            .get(&url)
            .query(&[("access_key", key.as_str())])
            .send()
            .await
            .map_err(|e| service_error(ErrorCode::CurrencyService, "fixer request failed", e))?;

        if !response.status().is_success() {
            warn!("fixer error status: {}", response.status());
            return Err(AppError::from_code(ErrorCode::CurrencyService));
        }

        let rates: CurrencyRates = response
            .json()
            .await
            .map_err(|e| service_error(ErrorCode::CurrencyService, "can't decode fixer response", e))?;

        check_rates(rates)
    }
}

/// fixer answers 200 with `success: false` when the key or quota is exhausted
pub fn check_rates(rates: CurrencyRates) -> AppResult<CurrencyRates> {
    if rates.success {
        return Ok(rates);
    }
    if let Some(detail) = &rates.error {
        warn!(
            "fixer rejected the request: {} {}",
            detail.code,
            detail.info.as_deref().unwrap_or_default()
        );
    }
    Err(AppError::from_code(ErrorCode::LimitReached))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successful_rates_pass() {
        let rates: CurrencyRates = serde_json::from_str(
            r#"{"success": true, "timestamp": 1, "base": "EUR", "date": "2024-01-01",
                "rates": {"USD": 1.1, "ARS": 900.0}}"#,
        )
        .unwrap();
        let rates = check_rates(rates).unwrap();
        assert_eq!(rates.base, "EUR");
    }

    #[test]
    fn test_unsuccessful_rates_hit_limit() {
        let rates: CurrencyRates = serde_json::from_str(
            r#"{"success": false, "error": {"code": 104, "info": "limit reached"}}"#,
        )
        .unwrap();
        assert_eq!(check_rates(rates).unwrap_err().code, ErrorCode::LimitReached);
    }
}
