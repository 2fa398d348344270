//! Centralized Error Handling Module
//!
//! Every failure carries a unique numeric code plus a user-facing message.
//! The prompt prints the user message, the log keeps the technical detail.
//!
//! Code ranges:
//! - 1xx: lookup flow errors (input validation, remote APIs, secrets)
//! - 2xx: core engine conditions (cache, stats)
//! - 9xx: generic

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Error built from the code's canned user message
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.user_message())
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    /// True for "fetch again from the source of truth" conditions
    pub fn is_cache_miss(&self) -> bool {
        self.code.is_cache_miss()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code {}: {}", self.code.number(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // ============================================
    // Lookup flow (1xx)
    // ============================================
    /// Prompt input is not a known option
    InvalidOption,
    /// `traceip` argument is not an IPv4 address
    InvalidIp,
    /// Geolocation API call failed
    IpService,
    /// Country API call failed
    CountryService,
    /// Currency API call failed
    CurrencyService,
    /// API keys could not be resolved
    Secrets,
    /// Geolocation answered without usable location data
    IpEmptyResponse,
    /// Currency API quota exhausted
    LimitReached,

    // ============================================
    // Core engine (2xx)
    // ============================================
    /// Key never cached (or explicitly expired)
    CacheMiss,
    /// Key cached but past its deadline
    CacheExpired,
    /// No lookup has been aggregated yet
    NoDataYet,
    /// Aggregator no longer accepts events
    StatsStopped,

    // ============================================
    // Generic (9xx)
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidOption => "INVALID_OPTION",
            Self::InvalidIp => "INVALID_IP",
            Self::IpService => "IP_SERVICE",
            Self::CountryService => "COUNTRY_SERVICE",
            Self::CurrencyService => "CURRENCY_SERVICE",
            Self::Secrets => "SECRETS",
            Self::IpEmptyResponse => "IP_EMPTY_RESPONSE",
            Self::LimitReached => "LIMIT_REACHED",
            Self::CacheMiss => "CACHE_MISS",
            Self::CacheExpired => "CACHE_EXPIRED",
            Self::NoDataYet => "NO_DATA_YET",
            Self::StatsStopped => "STATS_STOPPED",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Stable numeric code shown to the user
    pub fn number(&self) -> u16 {
        match self {
            Self::InvalidOption => 101,
            Self::InvalidIp => 102,
            Self::IpService => 103,
            Self::CountryService => 104,
            Self::CurrencyService => 105,
            Self::Secrets => 106,
            Self::IpEmptyResponse => 107,
            Self::LimitReached => 108,
            Self::CacheMiss => 201,
            Self::CacheExpired => 202,
            Self::NoDataYet => 203,
            Self::StatsStopped => 204,
            Self::Unknown => 999,
        }
    }

    /// Message printed at the prompt
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidOption => "Invalid option, please check the information entered",
            Self::InvalidIp => "The IP entered is not valid, check the data and try again",
            Self::IpService => "Error while retrieving the IP information",
            Self::CountryService => "Error while retrieving the region information",
            Self::CurrencyService => "Error while retrieving the currency information",
            Self::Secrets => "Error while retrieving the API secrets",
            Self::IpEmptyResponse => "The requested IP returned no information to display",
            Self::LimitReached => "The currency service reached its allowed limit, a new API key is required",
            Self::CacheMiss => "Key not found",
            Self::CacheExpired => "The cached value has expired",
            Self::NoDataYet => crate::utils::constants::NO_RECORD_INFORMATION_AVAILABLE_YET,
            Self::StatsStopped => "The stats service is stopped",
            Self::Unknown => "Unexpected error",
        }
    }

    /// Miss-class condition: missing and expired are handled identically
    pub fn is_cache_miss(&self) -> bool {
        matches!(self, Self::CacheMiss | Self::CacheExpired)
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    pub fn invalid_option(input: &str) -> Self {
        Self::new(
            ErrorCode::InvalidOption,
            format!("{} (input: {:?})", ErrorCode::InvalidOption.user_message(), input),
        )
    }

    pub fn invalid_ip(ip: &str) -> Self {
        Self::new(
            ErrorCode::InvalidIp,
            format!("{} (ip: {})", ErrorCode::InvalidIp.user_message(), ip),
        )
    }

    pub fn cache_miss() -> Self {
        Self::from_code(ErrorCode::CacheMiss)
    }

    pub fn cache_expired() -> Self {
        Self::from_code(ErrorCode::CacheExpired)
    }

    pub fn stats_stopped() -> Self {
        Self::from_code(ErrorCode::StatsStopped)
    }

    /// Missing or unusable API key
    pub fn missing_secret(name: &str) -> Self {
        Self::new(
            ErrorCode::Secrets,
            format!("{}: {}", ErrorCode::Secrets.user_message(), name),
        )
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "IO error", err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "HTTP error", err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "JSON parse error", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::invalid_ip("1.2.3");
        assert_eq!(err.code, ErrorCode::InvalidIp);
        assert_eq!(err.code_str(), "INVALID_IP");
        assert!(err.to_string().starts_with("Code 102: "));
    }

    #[test]
    fn test_cache_miss_class() {
        assert!(AppError::cache_miss().is_cache_miss());
        assert!(AppError::cache_expired().is_cache_miss());
        assert!(!AppError::stats_stopped().is_cache_miss());
        assert!(!ErrorCode::NoDataYet.is_cache_miss());
    }

    #[test]
    fn test_original_numbers_kept() {
        assert_eq!(ErrorCode::InvalidOption.number(), 101);
        assert_eq!(ErrorCode::LimitReached.number(), 108);
    }
}
