//! ipapi.com geolocation client
//!
//! API: http://api.ipapi.com/api/{ip}?access_key={key}

use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{IpApiErrorBody, IpApiResponse};
use crate::providers::secrets::SecretsVault;
use crate::providers::service_error;
use crate::utils::constants::SECRET_API_IP_KEY;

pub struct IpApiClient {
    client: reqwest::Client,
    base_url: String,
    secrets: Arc<dyn SecretsVault>,
}

impl IpApiClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, secrets: Arc<dyn SecretsVault>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            secrets,
        }
    }

    /// Locate `ip`. Fails with `IpEmptyResponse` when the answer carries no country.
    pub async fn geolocate(&self, ip: Ipv4Addr) -> AppResult<IpApiResponse> {
        let key = self.secrets.secret(SECRET_API_IP_KEY)?;
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), ip);

        info!("🔍 ipapi: locating {}", ip);

        let response = self
            .client
            .get(&url)
            .query(&[("access_key", key.as_str())])
            .send()
            .await
            .map_err(|e| service_error(ErrorCode::IpService, "ipapi request failed", e))?;

        if !response.status().is_success() {
            warn!("ipapi error status: {}", response.status());
            return Err(AppError::from_code(ErrorCode::IpService));
        }

        let body = response
            .text()
            .await
            .map_err(|e| service_error(ErrorCode::IpService, "ipapi body read failed", e))?;

        let located = parse_geolocation(&body)?;
        if !located.contains_valid_response() {
            warn!("The requested IP returned an empty response: {}", ip);
            return Err(AppError::from_code(ErrorCode::IpEmptyResponse));
        }
        Ok(located)
    }
}

/// Decode an ipapi body; quota / key problems arrive as `{"success": false, "error": {...}}`
pub fn parse_geolocation(body: &str) -> AppResult<IpApiResponse> {
    if let Ok(failure) = serde_json::from_str::<IpApiErrorBody>(body) {
        if !failure.success {
            warn!(
                "ipapi rejected the request: {} {}",
                failure.error.code,
                failure.error.info.as_deref().unwrap_or_default()
            );
            return Err(AppError::from_code(ErrorCode::IpService));
        }
    }

    serde_json::from_str(body)
        .map_err(|e| service_error(ErrorCode::IpService, "can't decode ipapi response", e))
}
