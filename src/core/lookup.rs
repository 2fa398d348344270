//! IP lookup orchestration
//!
//! One `traceip` flow:
//! 1. geolocate the address (ipapi)
//! 2. hand a `LookupEvent` to the stats aggregator
//! 3. country metadata, cached by country name (restcountries)
//! 4. currency rates, cached under a single key (fixer)
//! 5. assemble the printable `LookupReport`

use chrono::{DateTime, FixedOffset, Utc};
use std::fmt;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn, Instrument};
use uuid::Uuid;

use crate::core::aggregator::StatsAggregator;
use crate::models::config::{AppConfig, ReferencePoint};
use crate::models::errors::AppResult;
use crate::models::types::{CountryInfo, CurrencyRates, IpApiResponse, LookupEvent};
use crate::providers::{http_client, CountriesClient, CurrencyClient, IpApiClient, SecretsVault};
use crate::utils::cache::{CacheStats, TtlCache};
use crate::utils::constants::{CURRENCY_CACHE_KEY, DATE_TIME_FORMAT};
use crate::utils::geo::estimated_distance_km;

pub struct FraudLookup {
    ip_client: IpApiClient,
    countries: CountriesClient,
    currency: CurrencyClient,
    country_cache: TtlCache<String, CountryInfo>,
    currency_cache: TtlCache<String, CurrencyRates>,
    stats: Arc<StatsAggregator>,
    reference: ReferencePoint,
}

impl FraudLookup {
    pub fn new(
        config: &AppConfig,
        secrets: Arc<dyn SecretsVault>,
        stats: Arc<StatsAggregator>,
    ) -> AppResult<Self> {
        let client = http_client(config.http_timeout)?;
        let endpoints = &config.endpoints;

        Ok(Self {
            ip_client: IpApiClient::new(client.clone(), &endpoints.ipapi_url, secrets.clone()),
            countries: CountriesClient::new(client.clone(), &endpoints.countries_url),
            currency: CurrencyClient::new(client, &endpoints.currency_url, secrets),
            country_cache: TtlCache::with_ttl(config.cache_ttl),
            currency_cache: TtlCache::with_ttl(config.cache_ttl),
            stats,
            reference: config.reference.clone(),
        })
    }

    pub fn stats(&self) -> &Arc<StatsAggregator> {
        &self.stats
    }

    pub async fn trace_ip(&self, ip: Ipv4Addr) -> AppResult<LookupReport> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("traceip", %ip, %request_id);

        async move {
            let start = Instant::now();
            let result = self.run(ip).await;
            info!(
                "Elapsed time for flow traceip {}: {:.4} (seconds)",
                ip,
                start.elapsed().as_secs_f64()
            );
            result
        }
        .instrument(span)
        .await
    }

    async fn run(&self, ip: Ipv4Addr) -> AppResult<LookupReport> {
        let located = self.ip_client.geolocate(ip).await?;
        let (lat, lon) = located.coordinates();

        // Counted as soon as the location is known, even if enrichment fails later
        if let Err(e) = self.stats.submit(LookupEvent::new(located.country(), lat, lon)) {
            warn!("Lookup not counted in stats: {}", e);
        }

        let country = self.country_info(located.country()).await?;
        let rates = self.currency_rates().await?;

        Ok(LookupReport::build(&located, &country, &rates, &self.reference))
    }

    async fn country_info(&self, name: &str) -> AppResult<CountryInfo> {
        let key = name.to_string();
        match self.country_cache.get(&key) {
            Ok(country) => Ok(country),
            Err(e) if e.is_cache_miss() => {
                let country = self.countries.country_info(name).await?;
                self.country_cache.set(key, country.clone());
                Ok(country)
            }
            Err(e) => Err(e),
        }
    }

    async fn currency_rates(&self) -> AppResult<CurrencyRates> {
        let key = CURRENCY_CACHE_KEY.to_string();
        match self.currency_cache.get(&key) {
            Ok(rates) => Ok(rates),
            Err(e) if e.is_cache_miss() => {
                let rates = self.currency.latest_rates().await?;
                self.currency_cache.set(key, rates.clone());
                Ok(rates)
            }
            Err(e) => Err(e),
        }
    }

    /// Country and currency cache counters
    pub fn cache_stats(&self) -> (CacheStats, CacheStats) {
        (self.country_cache.stats(), self.currency_cache.stats())
    }
}

// ============================================
// REPORT
// ============================================

#[derive(Debug, Clone)]
pub struct LookupReport {
    pub ip: String,
    pub country: String,
    pub iso_code: String,
    /// `(name, code)`
    pub languages: Vec<(String, String)>,
    pub currency: Option<String>,
    /// USD value of one unit of `currency`
    pub usd_rate: Option<f64>,
    pub timezones: Vec<String>,
    pub distance_km: u64,
    pub reference: ReferencePoint,
    pub lat: f64,
    pub lon: f64,
}

impl LookupReport {
    pub fn build(
        located: &IpApiResponse,
        country: &CountryInfo,
        rates: &CurrencyRates,
        reference: &ReferencePoint,
    ) -> Self {
        let (lat, lon) = located.coordinates();
        let currency = country.primary_currency().map(str::to_string);
        let usd_rate = currency.as_deref().and_then(|c| rates.usd_per_unit(c));

        Self {
            ip: located.ip.clone(),
            country: located.country().to_string(),
            iso_code: country.cca2.clone(),
            languages: located
                .location
                .languages
                .iter()
                .map(|l| {
                    (
                        l.name.clone().unwrap_or_default(),
                        l.code.clone().unwrap_or_default(),
                    )
                })
                .collect(),
            currency,
            usd_rate,
            timezones: country.timezones.clone(),
            distance_km: estimated_distance_km(reference.lat, reference.lon, lat, lon),
            reference: reference.clone(),
            lat,
            lon,
        }
    }

    /// Printable summary as of `now`
    pub fn render(&self, now: DateTime<Utc>) -> String {
        let stamp = now.format(DATE_TIME_FORMAT);
        let mut out = format!(
            "\n\t\tIP: {},  current date: {}\n\t\t\tCountry: {}\n\t\t\tISO Code: {}",
            self.ip, stamp, self.country, self.iso_code
        );

        for (name, code) in &self.languages {
            out.push_str(&format!("\n\t\t\tLanguages: {} ({})", name, code));
        }

        match (&self.currency, self.usd_rate) {
            (Some(code), Some(rate)) => {
                out.push_str(&format!("\n\t\t\tCurrency: {} (1 {} = {:.6} U$S)", code, code, rate))
            }
            (Some(code), None) => {
                out.push_str(&format!("\n\t\t\tCurrency: {} (no USD rate available)", code))
            }
            (None, _) => out.push_str("\n\t\t\tCurrency: unknown"),
        }

        for zone in &self.timezones {
            let local = match parse_utc_offset(zone) {
                Some(offset) => now.with_timezone(&offset).format(DATE_TIME_FORMAT).to_string(),
                None => "?".to_string(),
            };
            out.push_str(&format!("\n\t\t\tTime: {} (UTC) or {} ({})", stamp, local, zone));
        }

        out.push_str(&format!(
            "\n\t\t\tEstimated Distance: {} kms ({:.6}, {:.6}) to ({:.6}, {:.6})\n",
            self.distance_km, self.reference.lat, self.reference.lon, self.lat, self.lon
        ));
        out
    }
}

impl fmt::Display for LookupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(Utc::now()))
    }
}

/// `"UTC"`, `"UTC+05:30"`, `"UTC-03:00"` into a fixed offset
pub fn parse_utc_offset(zone: &str) -> Option<FixedOffset> {
    let rest = zone.strip_prefix("UTC")?;
    if rest.is_empty() {
        return FixedOffset::east_opt(0);
    }

    let sign = match rest.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let (hours, minutes) = rest[1..].split_once(':')?;
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_report() -> LookupReport {
        let located: IpApiResponse = serde_json::from_str(
            r#"{"ip": "181.30.0.1", "type": "ipv4", "continent_code": "SA",
                "country_code": "AR", "country_name": "Argentina",
                "latitude": -34.61, "longitude": -58.38,
                "location": {"languages": [{"code": "es", "name": "Spanish"}]}}"#,
        )
        .unwrap();
        let country: CountryInfo = serde_json::from_str(
            r#"{"name": {"common": "Argentina"}, "cca2": "AR",
                "currencies": {"ARS": {"name": "Argentine peso"}},
                "timezones": ["UTC-03:00"]}"#,
        )
        .unwrap();
        let rates: CurrencyRates = serde_json::from_str(
            r#"{"success": true, "base": "EUR", "rates": {"USD": 1.0, "ARS": 1000.0}}"#,
        )
        .unwrap();
        LookupReport::build(&located, &country, &rates, &ReferencePoint::default())
    }

    #[test]
    fn test_parse_offsets() {
        assert_eq!(parse_utc_offset("UTC"), FixedOffset::east_opt(0));
        assert_eq!(parse_utc_offset("UTC-03:00"), FixedOffset::west_opt(3 * 3600));
        assert_eq!(parse_utc_offset("UTC+05:30"), FixedOffset::east_opt(5 * 3600 + 1800));
        assert_eq!(parse_utc_offset("GMT+1"), None);
        assert_eq!(parse_utc_offset("UTC+5"), None);
    }

    #[test]
    fn test_report_fields() {
        let report = sample_report();
        assert_eq!(report.country, "Argentina");
        assert_eq!(report.iso_code, "AR");
        assert_eq!(report.currency.as_deref(), Some("ARS"));
        assert!((report.usd_rate.unwrap() - 0.001).abs() < 1e-12);
        assert!(report.distance_km < 5);
    }

    #[test]
    fn test_report_render() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 15, 0, 0).unwrap();
        let text = sample_report().render(now);

        assert!(text.contains("IP: 181.30.0.1,  current date: 2024-05-01 15:00:00"));
        assert!(text.contains("Languages: Spanish (es)"));
        assert!(text.contains("Currency: ARS (1 ARS = 0.001000 U$S)"));
        assert!(text.contains("Time: 2024-05-01 15:00:00 (UTC) or 2024-05-01 12:00:00 (UTC-03:00)"));
        assert!(text.contains("Estimated Distance:"));
    }
}
