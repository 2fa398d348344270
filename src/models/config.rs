//! Configuration module
//!
//! Defaults come from utils/constants.rs and can be overridden through
//! environment variables. The config is built once in `main` and handed to
//! every component explicitly.

use std::time::Duration;
use tracing::warn;

use crate::utils::constants::{
    API_COUNTRY_BASE_URL, API_CURRENCY_BASE_URL, API_IP_BASE_URL, DEFAULT_CACHE_TTL_MINUTES,
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_LOG_FILE, DEFAULT_STATS_WORKERS, REFERENCE_LATITUDE,
    REFERENCE_LONGITUDE, REFERENCE_NAME,
};

/// Fixed coordinate every query distance is measured from
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePoint {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Default for ReferencePoint {
    fn default() -> Self {
        Self {
            name: REFERENCE_NAME.to_string(),
            lat: REFERENCE_LATITUDE,
            lon: REFERENCE_LONGITUDE,
        }
    }
}

/// Remote API endpoints
#[derive(Debug, Clone)]
pub struct ApiEndpoints {
    pub ipapi_url: String,
    pub countries_url: String,
    pub currency_url: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            ipapi_url: env_or("RUSTER_IPAPI_URL", API_IP_BASE_URL),
            countries_url: env_or("RUSTER_COUNTRIES_URL", API_COUNTRY_BASE_URL),
            currency_url: env_or("RUSTER_CURRENCY_URL", API_CURRENCY_BASE_URL),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Lifetime of cached country / currency responses
    pub cache_ttl: Duration,

    /// Stats aggregator worker pool size
    pub stats_workers: usize,

    /// Timeout for each outbound API request
    pub http_timeout: Duration,

    /// File the log is appended to
    pub log_file: String,

    pub endpoints: ApiEndpoints,

    pub reference: ReferencePoint,
}

impl Default for AppConfig {
    fn default() -> Self {
        let ttl_minutes = env_parse("RUSTER_CACHE_TTL_MINUTES", DEFAULT_CACHE_TTL_MINUTES);
        let workers = env_parse("RUSTER_STATS_WORKERS", DEFAULT_STATS_WORKERS);
        let timeout_secs = env_parse("RUSTER_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS);

        Self {
            cache_ttl: minutes(ttl_minutes),
            stats_workers: workers.max(1),
            http_timeout: Duration::from_secs(timeout_secs),
            log_file: env_or("RUSTER_LOG_FILE", DEFAULT_LOG_FILE),
            endpoints: ApiEndpoints::default(),
            reference: ReferencePoint::default(),
        }
    }
}

fn minutes(count: u64) -> Duration {
    Duration::from_secs(count.saturating_mul(60))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("⚠️ Ignoring invalid {}={:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_point_is_buenos_aires() {
        let reference = ReferencePoint::default();
        assert_eq!(reference.lat, -34.61315);
        assert_eq!(reference.lon, -58.37723);
    }

    #[test]
    fn test_env_parse_falls_back() {
        assert_eq!(env_parse("RUSTER_TEST_UNSET_VARIABLE_XYZ", 7u64), 7);
    }

    #[test]
    fn test_minutes_saturates() {
        assert_eq!(minutes(30), Duration::from_secs(1800));
        assert_eq!(minutes(u64::MAX), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_defaults_are_sane() {
        let config = AppConfig::default();
        assert!(config.stats_workers >= 1);
        assert!(config.cache_ttl > Duration::ZERO || std::env::var("RUSTER_CACHE_TTL_MINUTES").is_ok());
    }
}
