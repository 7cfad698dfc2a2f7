//! Converter CLI
//!
//! Command-line front end for the currency converter. Runs the conversion
//! engine in-process against the configured cache database.

use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};

use converter_client::{CurrencyLayerClient, CurrencyLayerConfig};
use converter_hex::{ConverterConfig, ConverterService};
use converter_repo::{Store, build_store};
use converter_types::domain::cache::DEFAULT_FRESHNESS_WINDOW_SECS;
use converter_types::{CacheStatus, ConversionResult, CurrencyCode};

#[derive(Parser)]
#[command(name = "converter")]
#[command(author, version, about = "Currency converter CLI", long_about = None)]
struct Cli {
    /// Cache database (memory://, sqlite://..., postgres://...)
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite://data/rates.db?mode=rwc"
    )]
    database_url: String,

    /// Access key for the live rate service
    #[arg(long, env = "CURRENCYLAYER_ACCESS_KEY", hide_env_values = true)]
    access_key: Option<String>,

    /// Base URL of the live rate service
    #[arg(
        long,
        env = "CURRENCYLAYER_BASE_URL",
        default_value = CurrencyLayerConfig::DEFAULT_BASE_URL
    )]
    base_url: String,

    /// Currency every rate table is fetched against
    #[arg(long, env = "PIVOT_CURRENCY", default_value = "USD")]
    pivot: CurrencyCode,

    /// Seconds a cached rate table stays fresh
    #[arg(long, env = "CACHE_WINDOW_SECS", default_value_t = DEFAULT_FRESHNESS_WINDOW_SECS)]
    window_secs: i64,

    /// Print JSON instead of a table
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported currencies
    Currencies,
    /// Convert an amount into every known currency
    Convert {
        /// Amount to convert (spaces are ignored, e.g. "1 000")
        amount: String,
        /// Source currency
        #[arg(long, default_value = "USD")]
        from: CurrencyCode,
    },
    /// Show unscaled cross rates from one currency
    Rates {
        /// Source currency
        #[arg(long, default_value = "USD")]
        from: CurrencyCode,
    },
    /// Rate cache maintenance
    Cache {
        #[command(subcommand)]
        action: CacheCommands,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Show when the cached table was fetched and whether it is fresh
    Status {
        /// Cache key (defaults to the pivot currency)
        #[arg(long)]
        base: Option<CurrencyCode>,
    },
    /// Remove the cached table so the next request refetches
    Clear {
        /// Cache key (defaults to the pivot currency)
        #[arg(long)]
        base: Option<CurrencyCode>,
    },
}

type CliService = ConverterService<Store, Arc<CurrencyLayerClient>, Arc<CurrencyLayerClient>>;

/// Lines of `CODE  value` with `decimals` places, in code order.
fn format_values(values: &ConversionResult, decimals: usize) -> Vec<String> {
    values
        .iter()
        .map(|(code, value)| format!("{}  {:>16.*}", code, decimals, value))
        .collect()
}

fn format_status(status: &CacheStatus) -> Vec<String> {
    let fetched = status
        .fetched_at
        .map(|ts| ts.to_rfc3339())
        .unwrap_or_else(|| "never".to_string());

    vec![
        format!("Base:       {}", status.base),
        format!("Fetched at: {}", fetched),
        format!("Fresh:      {}", if status.fresh { "yes" } else { "no" }),
        format!("Rates:      {}", status.rates),
    ]
}

async fn build_service(cli: &Cli) -> Result<CliService> {
    if cli.window_secs < 0 {
        anyhow::bail!("--window-secs must not be negative");
    }
    let freshness_window = Duration::try_seconds(cli.window_secs)
        .ok_or_else(|| anyhow::anyhow!("--window-secs is out of range: {}", cli.window_secs))?;

    let store = build_store(&cli.database_url).await?;

    // Cache commands never reach the network, so the key is only checked on use
    let access_key = cli.access_key.clone().unwrap_or_default();
    let client = Arc::new(CurrencyLayerClient::new(
        CurrencyLayerConfig::new(access_key).with_base_url(cli.base_url.clone()),
    ));

    let config = ConverterConfig {
        pivot: cli.pivot.clone(),
        freshness_window,
    };

    Ok(ConverterService::new(store, client.clone(), client, config))
}

fn require_access_key(cli: &Cli) -> Result<()> {
    match cli.access_key.as_deref() {
        Some(key) if !key.trim().is_empty() => Ok(()),
        _ => anyhow::bail!(
            "An access key is required: pass --access-key or set CURRENCYLAYER_ACCESS_KEY"
        ),
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let service = build_service(&cli).await?;

    match &cli.command {
        Commands::Currencies => {
            require_access_key(&cli)?;
            let catalog = service.list_currencies().await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&catalog)?);
            } else {
                for (code, name) in catalog.iter() {
                    println!("{}  {}", code, name);
                }
            }
        }

        Commands::Convert { amount, from } => {
            require_access_key(&cli)?;
            let resp = service.convert_input(from, amount).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&resp)?);
            } else {
                println!("{:.2} {} is:", resp.amount, resp.source);
                print_lines(format_values(&resp.amounts, 2));
            }
        }

        Commands::Rates { from } => {
            require_access_key(&cli)?;
            let resp = service.rates_for(from).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&resp)?);
            } else {
                println!("1 {} is:", resp.source);
                print_lines(format_values(&resp.rates, 6));
            }
        }

        Commands::Cache { action } => {
            let cache = service.provider().cache();
            match action {
                CacheCommands::Status { base } => {
                    let base = base.as_ref().unwrap_or(service.pivot());
                    let status = cache
                        .status(base, Utc::now(), service.provider().window())
                        .await?;
                    if cli.json {
                        println!("{}", serde_json::to_string_pretty(&status)?);
                    } else {
                        print_lines(format_status(&status));
                    }
                }
                CacheCommands::Clear { base } => {
                    let base = base.as_ref().unwrap_or(service.pivot());
                    cache.clear(base).await?;
                    println!("✓ Cleared cached rates for {}", base);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use chrono::TimeZone;

    fn code(s: &str) -> CurrencyCode {
        s.parse().unwrap()
    }

    #[test]
    fn test_cli_parses_convert() {
        let cli = Cli::try_parse_from([
            "converter",
            "--database-url",
            "memory://",
            "convert",
            "1 000",
            "--from",
            "eur",
        ])
        .unwrap();

        match cli.command {
            Commands::Convert { amount, from } => {
                assert_eq!(amount, "1 000");
                assert_eq!(from, code("EUR"));
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn test_cli_rejects_invalid_code() {
        let result = Cli::try_parse_from(["converter", "rates", "--from", "EURO"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parses_cache_clear() {
        let cli = Cli::try_parse_from(["converter", "cache", "clear", "--base", "gbp"]).unwrap();
        match cli.command {
            Commands::Cache {
                action: CacheCommands::Clear { base },
            } => assert_eq!(base, Some(code("GBP"))),
            _ => panic!("expected cache clear"),
        }
    }

    #[test]
    fn test_format_values_sorted_two_decimals() {
        let values = BTreeMap::from([(code("GBP"), 8.888888), (code("EUR"), 10.0)]);

        let lines = format_values(&values, 2);

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("EUR"));
        assert!(lines[0].ends_with("10.00"));
        assert!(lines[1].starts_with("GBP"));
        assert!(lines[1].ends_with("8.89"));
    }

    #[test]
    fn test_format_status() {
        let status = CacheStatus {
            base: CurrencyCode::usd(),
            fetched_at: Some(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()),
            fresh: false,
            rates: 3,
        };

        let lines = format_status(&status);

        assert_eq!(lines[1], "Fetched at: 2024-01-01T12:00:00+00:00");
        assert_eq!(lines[2], "Fresh:      no");

        let empty = CacheStatus {
            fetched_at: None,
            ..status
        };
        assert_eq!(format_status(&empty)[1], "Fetched at: never");
    }

    #[test]
    fn test_blank_access_key_rejected() {
        let cli = Cli::try_parse_from(["converter", "--access-key", " ", "currencies"]).unwrap();
        assert!(require_access_key(&cli).is_err());
    }

    #[tokio::test]
    async fn test_cache_commands_need_no_access_key() {
        let cli = Cli::try_parse_from([
            "converter",
            "--database-url",
            "memory://",
            "cache",
            "status",
        ])
        .unwrap();

        let service = build_service(&cli).await.unwrap();
        let status = service.cache_status().await.unwrap();
        assert_eq!(status.fetched_at, None);
        assert!(!status.fresh);
    }

    #[tokio::test]
    async fn test_window_out_of_range_rejected() {
        for secs in ["-1", "9223372036854775807"] {
            let window = format!("--window-secs={}", secs);
            let cli = Cli::try_parse_from([
                "converter",
                "--database-url",
                "memory://",
                window.as_str(),
                "cache",
                "status",
            ])
            .unwrap();

            assert!(build_service(&cli).await.is_err());
        }
    }
}
