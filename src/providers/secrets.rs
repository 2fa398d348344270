//! API key resolution
//!
//! Keys come from the environment:
//! - `RUSTER_API_SECRETS`: JSON document `{"ipapi_key": "...", "currency_key": "..."}`
//! - `IPAPI_KEY` / `CURRENCY_KEY`: individual fallbacks
//!
//! Keys are never logged.

use serde::Deserialize;
use tracing::{info, warn};

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{SECRET_API_CURRENCY_KEY, SECRET_API_IP_KEY};

/// Source of API keys
pub trait SecretsVault: Send + Sync {
    fn secret(&self, name: &str) -> AppResult<String>;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvSecrets {
    #[serde(default)]
    ipapi_key: String,
    #[serde(default)]
    currency_key: String,
}

impl EnvSecrets {
    pub fn new(ipapi_key: impl Into<String>, currency_key: impl Into<String>) -> Self {
        Self {
            ipapi_key: ipapi_key.into(),
            currency_key: currency_key.into(),
        }
    }

    pub fn from_env() -> Self {
        let mut secrets = match std::env::var("RUSTER_API_SECRETS") {
            Ok(raw) => Self::from_json(&raw).unwrap_or_else(|e| {
                warn!("⚠️ RUSTER_API_SECRETS is not valid JSON: {}", e);
                Self::default()
            }),
            Err(_) => Self::default(),
        };

        if secrets.ipapi_key.is_empty() {
            secrets.ipapi_key = std::env::var("IPAPI_KEY").unwrap_or_default();
        }
        if secrets.currency_key.is_empty() {
            secrets.currency_key = std::env::var("CURRENCY_KEY").unwrap_or_default();
        }

        info!(
            "🔑 API secrets loaded (ipapi: {}, currency: {})",
            if secrets.ipapi_key.is_empty() { "missing" } else { "configured" },
            if secrets.currency_key.is_empty() { "missing" } else { "configured" },
        );
        secrets
    }

    pub fn from_json(raw: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

impl SecretsVault for EnvSecrets {
    fn secret(&self, name: &str) -> AppResult<String> {
        let value = match name {
            SECRET_API_IP_KEY => &self.ipapi_key,
            SECRET_API_CURRENCY_KEY => &self.currency_key,
            _ => {
                warn!("The requested secret is not valid: {}", name);
                return Err(AppError::missing_secret(name));
            }
        };

        if value.trim().is_empty() {
            return Err(AppError::missing_secret(name));
        }
        Ok(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ErrorCode;

    #[test]
    fn test_known_secrets() {
        let vault = EnvSecrets::new("ip-123", "fx-456");
        assert_eq!(vault.secret(SECRET_API_IP_KEY).unwrap(), "ip-123");
        assert_eq!(vault.secret(SECRET_API_CURRENCY_KEY).unwrap(), "fx-456");
    }

    #[test]
    fn test_unknown_and_empty_secrets_fail() {
        let vault = EnvSecrets::new("", "fx");
        assert_eq!(vault.secret(SECRET_API_IP_KEY).unwrap_err().code, ErrorCode::Secrets);
        assert_eq!(vault.secret("aws_key").unwrap_err().code, ErrorCode::Secrets);
    }

    #[test]
    fn test_from_json() {
        let vault = EnvSecrets::from_json(r#"{"ipapi_key": "a", "currency_key": "b"}"#).unwrap();
        assert_eq!(vault.secret(SECRET_API_CURRENCY_KEY).unwrap(), "b");
        assert!(EnvSecrets::from_json("not json").is_err());
    }
}
