//! Ruster Fraud - IP fraud-signal lookup console
//!
//! Prompt options:
//!   traceip <IPv4>  - geolocate an address and print country, currency and distance
//!   record          - print the distance statistics collected so far
//!   exit            - stop the program
//!
//! Environment:
//!   IPAPI_KEY / CURRENCY_KEY    - API keys (or RUSTER_API_SECRETS as JSON)
//!   RUSTER_CACHE_TTL_MINUTES    - Country / currency cache TTL (default: 30)
//!   RUSTER_STATS_WORKERS        - Stats worker pool size (default: 3)
//!   RUSTER_LOG_FILE             - Log file (default: app.log)
//!   RUST_LOG                    - Log level (default: info)

use ruster_fraud::utils::constants::{APP_NAME, APP_VERSION, INFO_USER_MESSAGE_SELECT_OPTION};
use ruster_fraud::{AppConfig, AppError, Command, EnvSecrets, FraudLookup, StatsAggregator};

use eyre::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::default();
    init_logging(&config.log_file);

    print_banner();

    let secrets = Arc::new(EnvSecrets::from_env());
    let stats = Arc::new(StatsAggregator::new(
        config.reference.clone(),
        config.stats_workers,
    ));
    let lookup = FraudLookup::new(&config, secrets, stats.clone())?;

    info!(
        "🚀 {} v{} ready (cache TTL {}s, {} stats workers)",
        APP_NAME,
        APP_VERSION,
        config.cache_ttl.as_secs(),
        config.stats_workers
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        prompt();

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                println!("\n\n🛑 Shutting down gracefully...");
                break;
            }
        };

        // stdin closed
        let Some(line) = line else {
            break;
        };

        match Command::parse(&line) {
            Ok(Command::TraceIp(ip)) => match lookup.trace_ip(ip).await {
                Ok(report) => println!("{}", report),
                Err(e) => report_error(&e),
            },
            Ok(Command::Record) => match stats.try_stats() {
                Ok(report) => println!("{}", report),
                Err(e) => {
                    info!("{}", e);
                    println!("{}", e.code.user_message());
                }
            },
            Ok(Command::Exit) => break,
            Err(e) => report_error(&e),
        }
    }

    stats.shutdown().await;

    let (countries, currency) = lookup.cache_stats();
    info!(
        "📦 Country cache: {} entries, {} hits, {} misses ({:.1}% hit rate)",
        countries.entries, countries.hits, countries.misses, countries.hit_rate
    );
    info!(
        "📦 Currency cache: {} entries, {} hits, {} misses ({:.1}% hit rate)",
        currency.entries, currency.hits, currency.misses, currency.hit_rate
    );
    info!("👋 {} stopped", APP_NAME);

    Ok(())
}

/// Log to the configured file, falling back to stderr when it cannot be opened
fn init_logging(log_file: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (writer, ansi, open_error) = match OpenOptions::new().create(true).append(true).open(log_file) {
        Ok(file) => (BoxMakeWriter::new(Mutex::new(file)), false, None),
        Err(e) => (BoxMakeWriter::new(std::io::stderr), true, Some(e)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false)
        .compact()
        .init();

    if let Some(e) = open_error {
        warn!("⚠️ Cannot open log file {}: {}, logging to stderr", log_file, e);
    }
}

fn report_error(err: &AppError) {
    error!("{}", err);
    println!("{}", err.code.user_message());
}

fn prompt() {
    print!("{}", INFO_USER_MESSAGE_SELECT_OPTION);
    let _ = std::io::stdout().flush();
}

fn print_banner() {
    println!(
        r#"
    ==============================================
       R U S T E R   F R A U D   v{}
       IP fraud-signal lookup
    ==============================================

    Options:
      traceip <IPv4>   geolocate and enrich an address
      record           distance statistics
      exit             quit
    "#,
        APP_VERSION
    );
}
