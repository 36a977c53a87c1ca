use std::path::{Path, PathBuf};

use almanac_config::AlmanacConfig;
use almanac_core::{Minute, MinuteRange};
use almanac_ephem::{EphemerisStore, TableSource};
use almanac_search::{Almanac, Sweep, compute_almanac};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "almanac", about = "Almanac event search over tabulated ephemeris samples")]
struct Cli {
    /// Log more (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect events and durations in a time range
    Sweep {
        /// JSON array of sample records ({"body", "at", <fields>...})
        #[arg(long)]
        samples: PathBuf,
        /// Range start, UTC (YYYY-MM-DDThh:mm:ssZ or YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// Range end, UTC, inclusive
        #[arg(long)]
        end: String,
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
        /// Concurrent fetches during prefetch
        #[arg(long, default_value = "8")]
        max_fetches: usize,
    },
    /// Show the fetch requests a sweep would issue
    Plan {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the default configuration as TOML
    Defaults,
}

fn init_logging(verbose: u8) {
    let base = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(base));
    // stdout carries results; logs go to stderr
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

fn parse_minute(s: &str, what: &str) -> Minute {
    Minute::parse(s).unwrap_or_else(|| {
        eprintln!("Invalid {what} time: {s}");
        eprintln!("Expected YYYY-MM-DDThh:mm:ssZ, YYYY-MM-DD hh:mm or YYYY-MM-DD");
        std::process::exit(1);
    })
}

fn require_range(start: &str, end: &str) -> MinuteRange {
    let (start, end) = (parse_minute(start, "start"), parse_minute(end, "end"));
    MinuteRange::new(start, end).unwrap_or_else(|| {
        eprintln!("Invalid range: end {end} is before start {start}");
        std::process::exit(1);
    })
}

fn load_config(path: Option<&Path>) -> AlmanacConfig {
    let Some(path) = path else {
        return AlmanacConfig::default();
    };
    AlmanacConfig::load(path).unwrap_or_else(|e| {
        eprintln!("Failed to load config {}: {e}", path.display());
        std::process::exit(1);
    })
}

fn print_text(almanac: &Almanac) {
    println!("Events ({}):", almanac.instants.len());
    for e in &almanac.instants {
        println!("  {e}");
    }
    println!("Durations ({}):", almanac.durations.len());
    for d in &almanac.durations {
        let hours = d.minutes() / 60;
        let minutes = d.minutes() % 60;
        println!("  {d}  ({hours}h {minutes:02}m)");
    }
    if !almanac.pairing_warnings.is_empty() {
        println!("Unpaired ({}):", almanac.pairing_warnings.len());
        for w in &almanac.pairing_warnings {
            println!("  {w}");
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Sweep {
            samples,
            start,
            end,
            config,
            json,
            max_fetches,
        } => {
            let range = require_range(&start, &end);
            let config = load_config(config.as_deref());
            let source = TableSource::from_json_path(&samples).unwrap_or_else(|e| {
                eprintln!("Failed to load samples {}: {e}", samples.display());
                std::process::exit(1);
            });
            info!(rows = source.len(), bodies = source.bodies().count(), "samples loaded");

            let mut store = EphemerisStore::new(source, config.retry)
                .with_max_concurrent_fetches(max_fetches.max(1));
            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("interrupted; cancelling");
                    on_interrupt.cancel();
                }
            });

            let almanac = match compute_almanac(&mut store, &config, range, &cancel).await {
                Ok(a) => a,
                Err(e) => {
                    eprintln!("Search failed: {e}");
                    std::process::exit(1);
                }
            };
            let stats = store.stats();
            info!(
                fetches = stats.fetches,
                retries = stats.retries,
                cache_hits = stats.cache_hits,
                "ephemeris usage"
            );

            if json {
                match serde_json::to_string_pretty(&almanac) {
                    Ok(s) => println!("{s}"),
                    Err(e) => {
                        eprintln!("Failed to encode JSON: {e}");
                        std::process::exit(1);
                    }
                }
            } else {
                print_text(&almanac);
            }
        }

        Commands::Plan { start, end, config } => {
            let range = require_range(&start, &end);
            let config = load_config(config.as_deref());
            let plan = Sweep::new(&config).and_then(|s| s.plan(range));
            match plan {
                Ok(requests) => {
                    println!(
                        "Observer: {:.4} deg, {:.4} deg, {:.0} m",
                        config.observer.latitude_deg,
                        config.observer.longitude_deg,
                        config.observer.altitude_m
                    );
                    for r in requests {
                        println!("{:<8} {}  {}", r.body.name(), r.range, r.fields);
                    }
                }
                Err(e) => {
                    eprintln!("Invalid request: {e}");
                    std::process::exit(1);
                }
            }
        }

        Commands::Defaults => match AlmanacConfig::default().to_toml_string() {
            Ok(s) => print!("{s}"),
            Err(e) => {
                eprintln!("Failed to render defaults: {e}");
                std::process::exit(1);
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_args() {
        let cli = Cli::try_parse_from([
            "almanac",
            "-v",
            "sweep",
            "--samples",
            "s.json",
            "--start",
            "2024-03-20",
            "--end",
            "2024-03-21",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Sweep {
                json, max_fetches, ..
            } => {
                assert!(json);
                assert_eq!(max_fetches, 8);
            }
            _ => panic!("expected sweep"),
        }
    }

    #[test]
    fn range_parses_dates() {
        let r = require_range("2024-03-20", "2024-03-20T00:10:00Z");
        assert_eq!(r.len(), 11);
    }

    #[test]
    fn plan_requires_range() {
        assert!(Cli::try_parse_from(["almanac", "plan", "--start", "2024-01-01"]).is_err());
    }
}
