//! Ruster Fraud Library
//!
//! Fraud-signal IP lookup: geolocates an address, enriches it with country
//! and currency data, and keeps running distance statistics per country.
//!
//! - `core`: stats aggregator (worker pool + report), lookup flow, prompt parsing
//! - `utils`: TTL cache, Haversine distance, constants
//! - `providers`: ipapi / restcountries / fixer clients, API key vault
//! - `models`: config, errors, wire types

pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::{Command, FraudLookup, LookupReport, StatsAggregator, StatsRegistry};
pub use models::{AppConfig, AppError, AppResult, CountryStat, ErrorCode, LookupEvent, ReferencePoint};
pub use providers::{EnvSecrets, SecretsVault};
pub use utils::{estimated_distance_km, haversine_km, CacheStats, TtlCache};
