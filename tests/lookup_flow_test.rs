//! Lookup flow against mock ipapi / restcountries / fixer servers

use mockito::{Matcher, Mock, Server, ServerGuard};
use ruster_fraud::models::config::ApiEndpoints;
use ruster_fraud::{AppConfig, EnvSecrets, ErrorCode, FraudLookup, ReferencePoint, StatsAggregator};
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

const IPAPI_ARGENTINA: &str = r#"{
    "ip": "181.30.0.1", "type": "ipv4",
    "continent_code": "SA", "continent_name": "South America",
    "country_code": "AR", "country_name": "Argentina",
    "latitude": -34.61, "longitude": -58.38,
    "location": {"languages": [{"code": "es", "name": "Spanish"}]}
}"#;

const COUNTRY_ARGENTINA: &str = r#"[{
    "name": {"common": "Argentina", "official": "Argentine Republic"},
    "cca2": "AR",
    "currencies": {"ARS": {"name": "Argentine peso", "symbol": "$"}},
    "timezones": ["UTC-03:00"]
}]"#;

const FIXER_RATES: &str = r#"{
    "success": true, "timestamp": 1714575600, "base": "EUR", "date": "2024-05-01",
    "rates": {"USD": 1.07, "ARS": 940.5}
}"#;

const FIXER_LIMIT: &str = r#"{
    "success": false,
    "error": {"code": 104, "type": "usage_limit_reached", "info": "monthly limit reached"}
}"#;

fn build_lookup(server: &ServerGuard) -> (FraudLookup, Arc<StatsAggregator>) {
    let config = AppConfig {
        cache_ttl: Duration::from_secs(60),
        stats_workers: 2,
        http_timeout: Duration::from_secs(5),
        log_file: "app.log".to_string(),
        endpoints: ApiEndpoints {
            ipapi_url: server.url(),
            countries_url: server.url(),
            currency_url: server.url(),
        },
        reference: ReferencePoint::default(),
    };
    let secrets = Arc::new(EnvSecrets::new("ip-key", "currency-key"));
    let stats = Arc::new(StatsAggregator::new(config.reference.clone(), config.stats_workers));
    let lookup = FraudLookup::new(&config, secrets, stats.clone()).unwrap();
    (lookup, stats)
}

async fn json_mock(server: &mut ServerGuard, path: &str, body: &str, hits: usize) -> Mock {
    server
        .mock("GET", path)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(hits)
        .create_async()
        .await
}

#[tokio::test]
async fn test_second_lookup_is_served_from_cache() {
    let mut server = Server::new_async().await;
    let ipapi = json_mock(&mut server, "/181.30.0.1", IPAPI_ARGENTINA, 2).await;
    let countries = json_mock(&mut server, "/name/Argentina", COUNTRY_ARGENTINA, 1).await;
    let fixer = json_mock(&mut server, "/latest", FIXER_RATES, 1).await;

    let (lookup, stats) = build_lookup(&server);
    let ip = Ipv4Addr::new(181, 30, 0, 1);

    let first = lookup.trace_ip(ip).await.unwrap();
    let second = lookup.trace_ip(ip).await.unwrap();
    assert_eq!(first.iso_code, "AR");
    assert_eq!(second.currency.as_deref(), Some("ARS"));
    assert!(second.usd_rate.is_some());

    // Geolocation every time, country and rates only once
    ipapi.assert_async().await;
    countries.assert_async().await;
    fixer.assert_async().await;

    let (country_cache, currency_cache) = lookup.cache_stats();
    assert_eq!((country_cache.hits, country_cache.misses), (1, 1));
    assert_eq!((currency_cache.hits, currency_cache.misses), (1, 1));

    stats.close().await;
    let records = stats.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].country, "Argentina");
    assert_eq!(records[0].invoke_count, 2);
}

#[tokio::test]
async fn test_currency_limit_still_counts_lookup() {
    let mut server = Server::new_async().await;
    let _ipapi = json_mock(&mut server, "/181.30.0.1", IPAPI_ARGENTINA, 1).await;
    let _countries = json_mock(&mut server, "/name/Argentina", COUNTRY_ARGENTINA, 1).await;
    let fixer = json_mock(&mut server, "/latest", FIXER_LIMIT, 1).await;

    let (lookup, stats) = build_lookup(&server);

    let err = lookup
        .trace_ip(Ipv4Addr::new(181, 30, 0, 1))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::LimitReached);
    fixer.assert_async().await;

    // Rejected rates are not cached
    assert_eq!(lookup.cache_stats().1.entries, 0);

    stats.close().await;
    let records = stats.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].invoke_count, 1);
}
