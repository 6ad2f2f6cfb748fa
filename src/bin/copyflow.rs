//! CopyFlow Binary - Copy-Trade Detection over Envio-Indexed Swaps
//!
//! Pulls ETH/USDC swaps from an Envio HyperIndex GraphQL endpoint, summarizes
//! wallet performance and flags suspect wallets that trail a reference wallet.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin copyflow -- all
//! cargo run --release --bin copyflow -- performance --wallet 0x66a9...
//! cargo run --release --bin copyflow -- detect --wallet 0x66a9... --suspect 0xfbd4...
//! cargo run --release --bin copyflow -- export --wallet 0x66a9... --date 2024-01-31 --backend sqlite
//! cargo run --release --bin copyflow -- activity --wallet 0x66a9... --date 2024-01-31
//! ```
//!
//! ## Environment Variables
//!
//! - ENVIO_GRAPHQL_ENDPOINT - GraphQL endpoint (default: http://localhost:8080/v1/graphql)
//! - COPYFLOW_OUTPUT_DIR - JSON export directory (default: ./data)
//! - COPYFLOW_DB_PATH - SQLite database path (default: data/copyflow.db) - used when --backend sqlite
//! - ANALYSIS_DAYS - Trailing window in days (default: 7)
//! - COPY_TIME_THRESHOLD_SECS - Max gap between reference and copy trade (default: 300)
//! - TRADE_QUERY_LIMIT - Trades fetched per wallet for detection/export (default: 1000)
//! - HTTP_TIMEOUT_SECS - GraphQL request timeout (default: 30)
//! - EXPORT_DRY_RUN - Log exports without writing (default: false)
//! - RUST_LOG - Logging level (optional, default: info)

use chrono::{Duration, NaiveDate, Utc};
use copyflow::analytics_core::{ExportWriter, PatternMatch};
use copyflow::envio::EnvioClient;
use copyflow::{AnalyticsConfig, CopyTradeAnalytics};
use std::env;

const DEFAULT_REFERENCE_WALLET: &str = "0x66a9893c904a664803c4fcbfa47e75f5d30e7dab";
const DEFAULT_SUSPECT_WALLET: &str = "0xfbd4cdb40e862397a2f89a854e0e7e8f7e794c37";
const TOP_MATCHES_SHOWN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Performance,
    Detect,
    Export,
    Activity,
    All,
}

impl Mode {
    fn from_args(args: &[String]) -> Result<Self, String> {
        // First positional argument that is not a flag or a flag's value
        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            if arg.starts_with("--") {
                iter.next();
                continue;
            }
            return match arg.as_str() {
                "performance" => Ok(Mode::Performance),
                "detect" => Ok(Mode::Detect),
                "export" => Ok(Mode::Export),
                "activity" => Ok(Mode::Activity),
                "all" => Ok(Mode::All),
                other => Err(format!("Unknown mode '{}'", other)),
            };
        }
        Ok(Mode::All)
    }
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|x| x == flag)
        .and_then(|idx| args.get(idx + 1))
        .cloned()
}

fn parse_date_arg(args: &[String]) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match flag_value(args, "--date") {
        Some(s) => Ok(NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map_err(|e| format!("Invalid --date '{}': {}", s, e))?),
        // Yesterday in UTC
        None => Ok((Utc::now() - Duration::days(1)).date_naive()),
    }
}

fn print_matches(matches: &[PatternMatch]) {
    println!("\n=== Copy Trading Detection ===");
    println!("Found {} potential patterns", matches.len());
    for (i, pattern) in matches.iter().take(TOP_MATCHES_SHOWN).enumerate() {
        println!("\nPattern {}:", i + 1);
        println!("  Time diff: {}s", pattern.time_diff_seconds);
        println!("  Similarity: {:.2}%", pattern.similarity_score * 100.0);
        println!("  Trade type: {}", pattern.trade_type);
        println!("  Reference: {} ({} ETH)", pattern.reference_tx, pattern.reference_eth);
        println!("  Suspect:   {} ({} ETH)", pattern.suspect_tx, pattern.suspect_eth);
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    dotenv::dotenv().ok();

    let args: Vec<String> = env::args().collect();
    let mode = Mode::from_args(&args)?;
    let backend = AnalyticsConfig::parse_backend_from_args(&args);
    let config = AnalyticsConfig::from_env(backend)?;

    let wallet = flag_value(&args, "--wallet").unwrap_or_else(|| DEFAULT_REFERENCE_WALLET.to_string());
    let suspect = flag_value(&args, "--suspect").unwrap_or_else(|| DEFAULT_SUSPECT_WALLET.to_string());

    log::info!("🚀 Starting CopyFlow ({:?})", mode);
    log::info!("   GraphQL endpoint: {}", config.graphql_endpoint);
    log::info!("   Backend: {} -> {}", config.backend.as_str(), config.output_path.display());
    log::info!("   Analysis window: {} days", config.analysis_days);
    log::info!("   Copy threshold: {}s", config.time_threshold_secs);

    let client = EnvioClient::new(&config.graphql_endpoint, config.http_timeout_secs)?;
    let writer = ExportWriter::new(config.backend, config.output_path.clone(), config.dry_run)?;
    let mut analytics = CopyTradeAnalytics::new(client, writer).with_query_limit(config.query_limit);

    if matches!(mode, Mode::Performance | Mode::All) {
        let performance = analytics
            .analyze_wallet_performance(&wallet, config.analysis_days)
            .await?;

        println!("\n=== Wallet Performance ===");
        println!("Wallet: {}", wallet);
        println!("Transactions: {}", performance.transaction_count);
        println!("Total Buy ETH: {:.4}", performance.total_buy_eth);
        println!("Total Sell ETH: {:.4}", performance.total_sell_eth);
        println!("Avg Buy Price: ${:.2}", performance.avg_buy_price);
        println!("Avg Sell Price: ${:.2}", performance.avg_sell_price);
    }

    if matches!(mode, Mode::Detect | Mode::All) {
        let matches = analytics
            .detect_copy_trading_patterns(
                &wallet,
                &suspect,
                config.analysis_days,
                config.time_threshold_secs,
            )
            .await?;
        print_matches(&matches);
    }

    if matches!(mode, Mode::Export | Mode::All) {
        let target_date = parse_date_arg(&args)?;
        // Persistence failures are reported, not fatal
        match analytics.export_wallet_day(&wallet, target_date).await {
            Ok(export) => {
                println!("\n=== Data Export ===");
                println!(
                    "Exported {} transactions for {} on {}",
                    export.transactions.len(),
                    wallet,
                    target_date
                );
            }
            Err(e) => log::error!("Export failed for {} on {}: {}", wallet, target_date, e),
        }
    }

    if mode == Mode::Activity {
        let date = parse_date_arg(&args)?;

        println!("\n=== Indexed Wallet Activity ({}) ===", date);
        match analytics.wallet_activity(&wallet, date).await? {
            Some(activity) => println!("{}", serde_json::to_string_pretty(&activity)?),
            None => println!("No activity recorded for {}", wallet),
        }

        println!("\n=== Indexed Daily Summary ({}) ===", date);
        match analytics.daily_summary(date).await? {
            Some(summary) => println!("{}", serde_json::to_string_pretty(&summary)?),
            None => println!("No daily summary recorded"),
        }
    }

    log::info!("✅ CopyFlow finished");
    Ok(())
}
