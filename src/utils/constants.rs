//! Constants Module - Single Source of Truth
//!
//! API endpoints, reference coordinates, defaults and prompt messages used
//! across the application live here.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "RusterFraud";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for outbound HTTP requests
pub const USER_AGENT: &str = "RusterFraud/0.1.0";

// ============================================
// DEFAULTS
// ============================================

/// Cache TTL for country / currency responses (minutes)
pub const DEFAULT_CACHE_TTL_MINUTES: u64 = 30;

/// Upper bound on the cache TTL (one year); larger values are clamped
pub const MAX_CACHE_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Stats aggregator worker count
pub const DEFAULT_STATS_WORKERS: usize = 3;

/// Timeout for outbound API requests (seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 20;

/// Log file (appended)
pub const DEFAULT_LOG_FILE: &str = "app.log";

/// Cache key under which the latest currency rates are stored
pub const CURRENCY_CACHE_KEY: &str = "currency";

// ============================================
// REMOTE APIS
// ============================================

/// ipapi.com - geolocation (`/{ip}?access_key=`)
pub const API_IP_BASE_URL: &str = "http://api.ipapi.com/api";

/// restcountries.com - country metadata (`/name/{country}?fullText=true`)
pub const API_COUNTRY_BASE_URL: &str = "https://restcountries.com/v3.1";

/// fixer.io - currency rates (`/latest?access_key=`)
pub const API_CURRENCY_BASE_URL: &str = "https://data.fixer.io/api";

/// Secret names
pub const SECRET_API_IP_KEY: &str = "ipapi_key";
pub const SECRET_API_CURRENCY_KEY: &str = "currency_key";

// ============================================
// GEO
// ============================================

/// Reference point all distances are measured from (Buenos Aires)
pub const REFERENCE_NAME: &str = "Buenos Aires";
pub const REFERENCE_LATITUDE: f64 = -34.61315;
pub const REFERENCE_LONGITUDE: f64 = -58.37723;

/// Mean earth radius (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// ============================================
// PROMPT
// ============================================

pub const INFO_USER_MESSAGE_SELECT_OPTION: &str = "Enter your option: ";

/// Returned by the stats report before any lookup was aggregated
pub const NO_RECORD_INFORMATION_AVAILABLE_YET: &str = "No information available to display yet";

/// Separator framing the per-country breakdown
pub const REPORT_SEPARATOR: &str = "==============================";

/// Timestamp layout used in reports
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
