//! Type definitions for the fraud lookup tool
//!
//! Core engine types (`LookupEvent`, `CountryStat`) plus the wire DTOs of the
//! three remote APIs.

use serde::Deserialize;
use std::collections::BTreeMap;

// ============================================
// STATS ENGINE
// ============================================

/// One successful IP-to-location resolution, consumed by exactly one worker
#[derive(Debug, Clone, PartialEq)]
pub struct LookupEvent {
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl LookupEvent {
    pub fn new(country: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            country: country.into(),
            lat,
            lon,
        }
    }
}

/// Per-country aggregate. The distance is fixed when the country is first seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountryStat {
    pub country: String,
    pub distance_km: u64,
    pub invoke_count: u64,
}

// ============================================
// ipapi.com
// ============================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpApiResponse {
    #[serde(default)]
    pub ip: String,
    #[serde(default, rename = "type")]
    pub ip_type: String,
    #[serde(default)]
    pub continent_code: Option<String>,
    #[serde(default)]
    pub continent_name: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub region_code: Option<String>,
    #[serde(default)]
    pub region_name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub location: IpLocation,
}

impl IpApiResponse {
    /// Continent code, country code and country name all present
    pub fn contains_valid_response(&self) -> bool {
        [&self.continent_code, &self.country_code, &self.country_name]
            .iter()
            .all(|field| field.as_deref().is_some_and(|v| !v.is_empty()))
    }

    pub fn country(&self) -> &str {
        self.country_name.as_deref().unwrap_or_default()
    }

    /// `(lat, lon)`, missing values read as 0.0
    pub fn coordinates(&self) -> (f64, f64) {
        (self.latitude.unwrap_or_default(), self.longitude.unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpLocation {
    #[serde(default)]
    pub geoname_id: Option<i64>,
    #[serde(default)]
    pub capital: Option<String>,
    #[serde(default)]
    pub languages: Vec<Language>,
    #[serde(default)]
    pub country_flag_emoji: Option<String>,
    #[serde(default)]
    pub calling_code: Option<String>,
    #[serde(default)]
    pub is_eu: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Language {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub native: Option<String>,
}

/// ipapi reports quota / key problems inside a 200 body
#[derive(Debug, Clone, Deserialize)]
pub struct IpApiErrorBody {
    pub success: bool,
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: i64,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub info: Option<String>,
}

// ============================================
// restcountries.com
// ============================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryInfo {
    #[serde(default)]
    pub name: CountryName,
    #[serde(default)]
    pub cca2: String,
    #[serde(default)]
    pub cca3: Option<String>,
    /// Currency code -> details; ordered so the "first" currency is stable
    #[serde(default)]
    pub currencies: BTreeMap<String, CurrencyDetail>,
    #[serde(default)]
    pub capital: Vec<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub timezones: Vec<String>,
    #[serde(default)]
    pub latlng: Vec<f64>,
}

impl CountryInfo {
    pub fn primary_currency(&self) -> Option<&str> {
        self.currencies.keys().next().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountryName {
    #[serde(default)]
    pub common: String,
    #[serde(default)]
    pub official: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrencyDetail {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: Option<String>,
}

// ============================================
// fixer.io
// ============================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrencyRates {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub base: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub rates: BTreeMap<String, f64>,
    #[serde(default)]
    pub error: Option<ApiErrorDetail>,
}

impl CurrencyRates {
    /// USD value of one unit of `currency`
    pub fn usd_per_unit(&self, currency: &str) -> Option<f64> {
        let usd = *self.rates.get("USD")?;
        let requested = *self.rates.get(currency)?;
        if requested == 0.0 {
            return None;
        }
        Some(usd / requested)
    }
}
